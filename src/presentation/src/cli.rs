use anyhow::Context;
use application::Assistant;
use clap::Parser;
use colored::Colorize;
use infrastructure::config::mask_token;
use infrastructure::{Config, OllamaClient, PromptLoader, ShellExecutor, WindowMemory};
use shared::types::Result;
use shared::version;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::logging;
use crate::shutdown::spawn_signal_listener;
use crate::terminal::ReadlineTerminal;

#[derive(Parser, Clone, Debug, Default)]
#[command(name = "cmdr")]
#[command(about = "Chat with a local model that writes and runs shell scripts for you")]
pub struct Cli {
    /// Save the -m/-u/-t values into the config file and exit
    #[arg(long)]
    pub init: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub view: bool,

    /// Print the system prompt sent to the model and exit
    #[arg(long)]
    pub prompt: bool,

    /// Print version information and exit
    #[arg(long)]
    pub version: bool,

    /// Model name
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Model server URL
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub server_url: Option<String>,

    /// Bearer token for the model server
    #[arg(short = 't', long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Command-line values win over every other configuration source.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        if let Some(token) = &self.token {
            config.token = token.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    if cli.version {
        println!("{}", version::get());
        return Ok(());
    }

    let log_level = logging::init(cli.log_level.as_deref().unwrap_or("info"));

    let mut config = Config::load().context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    log_level.set(&config.log_level);

    if cli.init {
        let path = config.save().context("Failed to save configuration")?;
        println!("{}", "Configuration initialized successfully.".green());
        println!("Saved to {}", path.display());
        return Ok(());
    }

    if cli.view {
        print!("{}", render_config(&config));
        return Ok(());
    }

    if cli.prompt {
        let loader = PromptLoader::new();
        let system_prompt = loader.load_system_prompt();
        println!(
            "{}",
            loader.conversation_prompt(&system_prompt, &[], "{input}")
        );
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    run_chat(&config).await
}

async fn run_chat(config: &Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let listener = spawn_signal_listener(cancel.clone());

    let model = OllamaClient::new(&config.server_url, &config.model, config.token())
        .context("Failed to create model client")?;
    info!(model = %config.model, server_url = %config.server_url, "LLM initialized successfully");

    let terminal = ReadlineTerminal::spawn().context("Failed to create line editor")?;
    let system_prompt = PromptLoader::new().load_system_prompt();

    let mut assistant = Assistant::new(
        model,
        ShellExecutor::new(),
        WindowMemory::new(config.memory_size),
        terminal,
        system_prompt,
        cancel,
    );

    let result = assistant.run().await;
    listener.abort();
    result.context("Chat session failed")?;

    info!("Chat session ended");
    Ok(())
}

pub fn render_config(config: &Config) -> String {
    format!(
        "Configuration:\n  Model:      {}\n  Server URL: {}\n  Token:      {}\n  Log level:  {}\n  Config dir: {}\n  Memory:     {} exchanges\n",
        config.model,
        config.server_url,
        mask_token(&config.token),
        config.log_level,
        config.config_dir.display(),
        config.memory_size,
    )
}
