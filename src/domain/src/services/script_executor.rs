use async_trait::async_trait;
use shared::error::Result;
use shared::types::Shell;
use tokio_util::sync::CancellationToken;

use crate::entities::execution::ExecutionRecord;

/// Runs a script on the host shell.
///
/// A nonzero exit is reported through the returned record, never as an
/// error. `Err` is reserved for a process that could not be started
/// (`Error::ExecutionLaunch`) and for cancellation (`Error::Cancelled`),
/// in which case the child has already been killed.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute(&self, script: &str, cancel: &CancellationToken) -> Result<ExecutionRecord>;

    fn shell(&self) -> Shell;
}
