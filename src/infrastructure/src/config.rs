use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use shared::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CMDR_";
const CONFIG_FILE_NAMES: [&str; 4] = ["config.json", "config.toml", "config.yaml", "config.yml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub server_url: String,
    pub token: String,
    pub log_level: String,
    pub config_dir: PathBuf,
    /// Number of user/assistant exchanges kept in conversation memory.
    pub memory_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "qwen3:14b".to_string(),
            server_url: "http://localhost:11434".to_string(),
            token: String::new(),
            log_level: "info".to_string(),
            config_dir: default_config_dir(),
            memory_size: 10,
        }
    }
}

fn default_config_dir() -> PathBuf {
    match env::var("HOME").or_else(|_| env::var("USERPROFILE")) {
        Ok(home) => PathBuf::from(home).join(".cmdr"),
        Err(_) => {
            tracing::warn!("Failed to get user home directory, using current directory");
            PathBuf::from(".cmdr")
        }
    }
}

impl Config {
    /// Defaults, then the first config file found, then `.env` and
    /// `CMDR_*` environment variables. Creates the config directory.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let mut config = Self::default();
        if let Ok(dir) = env::var(format!("{ENV_PREFIX}CONFIG_DIR")) {
            config.config_dir = PathBuf::from(dir);
        }

        let config_dir = config.config_dir.clone();
        for path in Self::config_paths(&config_dir) {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                config.config_dir = config_dir.clone();
                tracing::debug!(file = %path.display(), "Config file loaded");
                break;
            }
        }

        config.apply_env(|key| env::var(key).ok());

        fs::create_dir_all(&config.config_dir).map_err(|e| {
            Error::Configuration(format!(
                "failed to create config directory {}: {}",
                config.config_dir.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Candidate files, highest priority first: the config directory,
    /// then the working directory.
    pub fn config_paths(config_dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = CONFIG_FILE_NAMES
            .iter()
            .map(|name| config_dir.join(name))
            .collect();
        paths.extend(CONFIG_FILE_NAMES.iter().map(PathBuf::from));
        paths
    }

    /// Load configuration from file (JSON, TOML or YAML by extension)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| Error::Configuration(format!("YAML error: {}", e))),
            _ => serde_json::from_str(&content)
                .map_err(|e| Error::Configuration(format!("JSON error: {}", e))),
        }
    }

    /// Overrides fields from `CMDR_*` variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(model) = var("MODEL") {
            self.model = model;
        }
        if let Some(url) = var("SERVER_URL") {
            self.server_url = url;
        }
        if let Some(token) = var("TOKEN") {
            self.token = token;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(dir) = var("CONFIG_DIR") {
            self.config_dir = PathBuf::from(dir);
        }
        if let Some(size) = var("MEMORY_SIZE") {
            match size.parse() {
                Ok(size) => self.memory_size = size,
                Err(_) => tracing::warn!(value = %size, "Ignoring invalid CMDR_MEMORY_SIZE"),
            }
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Writes the configuration as pretty JSON and returns the file path.
    pub fn save(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.config_dir).map_err(|e| {
            Error::Configuration(format!(
                "failed to create config directory {}: {}",
                self.config_dir.display(),
                e
            ))
        })?;

        let path = self.config_path();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("JSON error: {}", e)))?;
        fs::write(&path, content).map_err(|e| {
            Error::Configuration(format!("failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("model cannot be empty".to_string()));
        }
        if self.server_url.trim().is_empty() {
            return Err(Error::Configuration("server_url cannot be empty".to_string()));
        }
        if self.memory_size == 0 {
            return Err(Error::Configuration(
                "memory_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        (!self.token.is_empty()).then(|| self.token.clone())
    }
}

/// Masks a token for display, keeping four characters at each end.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        1..=8 => "****".to_string(),
        n => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{head}****{tail}")
        }
    }
}
