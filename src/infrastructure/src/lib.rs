pub mod config;
pub mod memory;
pub mod ollama_client;
pub mod prompts;
pub mod script_executor;

pub use config::Config;
pub use memory::WindowMemory;
pub use ollama_client::OllamaClient;
pub use prompts::PromptLoader;
pub use script_executor::ShellExecutor;
