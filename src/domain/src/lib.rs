pub mod entities;
pub mod services;

pub use entities::execution::ExecutionRecord;
pub use entities::message::{ChatMessage, Role};
pub use entities::proposal::{Disposition, ScriptProposal};
