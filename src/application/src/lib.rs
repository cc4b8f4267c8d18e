pub mod assistant;
pub mod report;
pub mod response_parser;

pub use assistant::{Assistant, LoopState, Turn, TurnOutcome};
pub use response_parser::parse_script;
