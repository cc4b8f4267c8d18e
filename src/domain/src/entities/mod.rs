pub mod execution;
pub mod message;
pub mod proposal;
