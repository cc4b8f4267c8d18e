use infrastructure::config::{mask_token, Config};
use shared::error::Error;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_save_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        model: "llama3:8b".to_string(),
        server_url: "http://gpu-box:11434".to_string(),
        token: "abcd-secret-wxyz".to_string(),
        config_dir: dir.path().join("nested"),
        memory_size: 4,
        ..Config::default()
    };

    let path = config.save().unwrap();
    assert_eq!(path, dir.path().join("nested").join("config.json"));

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(mask_token(&loaded.token), "abcd****wxyz");
}

#[test]
fn test_partial_files_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();

    let toml_path = dir.path().join("config.toml");
    fs::write(&toml_path, "model = \"mistral\"\n").unwrap();
    let from_toml = Config::load_from_file(&toml_path).unwrap();
    assert_eq!(from_toml.model, "mistral");
    assert_eq!(from_toml.server_url, "http://localhost:11434");
    assert_eq!(from_toml.memory_size, 10);

    let yaml_path = dir.path().join("config.yaml");
    fs::write(&yaml_path, "server_url: http://remote:11434\nlog_level: debug\n").unwrap();
    let from_yaml = Config::load_from_file(&yaml_path).unwrap();
    assert_eq!(from_yaml.model, "qwen3:14b");
    assert_eq!(from_yaml.server_url, "http://remote:11434");
    assert_eq!(from_yaml.log_level, "debug");
}

#[test]
fn test_malformed_file_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        Config::load_from_file(&dir.path().join("missing.json")),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_environment_overrides_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"model": "from-file", "memory_size": 3}"#).unwrap();

    let mut config = Config::load_from_file(&path).unwrap();
    config.apply_env(|key| match key {
        "CMDR_MODEL" => Some("from-env".to_string()),
        "CMDR_MEMORY_SIZE" => Some("not-a-number".to_string()),
        _ => None,
    });

    assert_eq!(config.model, "from-env");
    assert_eq!(config.memory_size, 3);
    assert!(config.validate().is_ok());
}
