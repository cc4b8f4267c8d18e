use serde::{Deserialize, Serialize};

/// Outcome of running one confirmed script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub command: String,
    /// Combined stdout and stderr, kept regardless of exit status.
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `-1` when the process ended without an exit code (killed by a signal).
    pub exit_code: i32,
    pub duration: String,
    pub success: bool,
}
