pub mod cli;
pub mod logging;
pub mod shutdown;
pub mod terminal;

pub use cli::Cli;
