use async_trait::async_trait;
use domain::entities::execution::ExecutionRecord;
use domain::services::ScriptExecutor;
use shared::error::{Error, Result};
use shared::types::Shell;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// Runs scripts through the host shell with no sandboxing; the
/// confirmation prompt in the turn loop is the only gate.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: Shell,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            shell: Shell::host(),
        }
    }

    pub fn with_shell(shell: Shell) -> Self {
        Self { shell }
    }

    fn command(&self, script: &str) -> Command {
        let mut cmd = Command::new(self.shell.program());
        cmd.arg(self.shell.command_flag())
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so cancellation reaches everything the shell forks.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptExecutor for ShellExecutor {
    async fn execute(&self, script: &str, cancel: &CancellationToken) -> Result<ExecutionRecord> {
        let start_time = Instant::now();
        tracing::warn!(
            shell = %self.shell,
            "Executing trusted script: {}...",
            script.chars().take(50).collect::<String>()
        );

        let mut child = self.command(script).spawn().map_err(Error::ExecutionLaunch)?;

        let finished = {
            let run = wait_with_combined_output(&mut child);
            tokio::select! {
                result = run => Some(result),
                _ = cancel.cancelled() => None,
            }
        };

        let Some(result) = finished else {
            terminate(&mut child).await;
            tracing::info!("Script execution cancelled");
            return Err(Error::Cancelled);
        };

        let (status, output) = result?;
        let duration = format!("{:?}", start_time.elapsed());
        let output = String::from_utf8_lossy(&output).to_string();
        let exit_code = status.code().unwrap_or(-1);
        let success = status.success();

        tracing::info!(exit_code, success, duration = %duration, "Script finished");

        Ok(ExecutionRecord {
            command: script.to_string(),
            output,
            error: (!success).then(|| status.to_string()),
            exit_code,
            duration,
            success,
        })
    }

    fn shell(&self) -> Shell {
        self.shell
    }
}

/// Kills the script's whole process group, then reaps the shell.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            tracing::warn!(pid, error = %e, "Failed to kill script process group");
        }
    }

    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "Failed to kill cancelled script");
    }
}

/// Reads stdout and stderr into one buffer in arrival order, then reaps
/// the child.
async fn wait_with_combined_output(
    child: &mut Child,
) -> Result<(std::process::ExitStatus, Vec<u8>)> {
    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(Error::Infrastructure(
            "child process output was not captured".to_string(),
        ));
    };

    let output = read_combined(stdout, stderr).await?;
    let status = child.wait().await?;
    Ok((status, output))
}

async fn read_combined<O, E>(mut stdout: O, mut stderr: E) -> std::io::Result<Vec<u8>>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut combined = Vec::new();
    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => {
                match read? {
                    0 => out_open = false,
                    n => combined.extend_from_slice(&out_buf[..n]),
                }
            }
            read = stderr.read(&mut err_buf), if err_open => {
                match read? {
                    0 => err_open = false,
                    n => combined.extend_from_slice(&err_buf[..n]),
                }
            }
        }
    }

    Ok(combined)
}
