use async_trait::async_trait;
use domain::services::Terminal;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use shared::error::{Error, Result};
use std::io::{self, Write};
use std::sync::mpsc;
use std::thread;
use tokio::sync::oneshot;

#[cfg(unix)]
use nix::sys::termios::{self, SetArg, Termios};
#[cfg(unix)]
use std::os::fd::AsFd;

struct ReadRequest {
    prompt: String,
    reply: oneshot::Sender<Result<Option<String>>>,
}

/// Line editor with history, driven from a dedicated thread so a pending
/// read never blocks the async runtime and can be abandoned on shutdown.
///
/// The tty mode seen at startup is put back on drop, since an abandoned
/// read leaves the editor's raw mode in place.
pub struct ReadlineTerminal {
    requests: mpsc::Sender<ReadRequest>,
    #[cfg(unix)]
    mode: ModeGuard<io::Stdin>,
}

/// Snapshot of a terminal's attributes, restorable on demand.
#[cfg(unix)]
pub struct ModeGuard<F: AsFd> {
    fd: F,
    saved: Option<Termios>,
}

#[cfg(unix)]
impl<F: AsFd> ModeGuard<F> {
    /// Holds nothing when `fd` is not a terminal.
    pub fn capture(fd: F) -> Self {
        let saved = termios::tcgetattr(&fd).ok();
        Self { fd, saved }
    }

    pub fn restore(&self) {
        let Some(saved) = &self.saved else {
            return;
        };
        if let Err(e) = termios::tcsetattr(&self.fd, SetArg::TCSANOW, saved) {
            tracing::debug!(error = %e, "Failed to restore terminal mode");
        }
    }
}

impl ReadlineTerminal {
    /// Fails when the line editor cannot be initialized.
    pub fn spawn() -> anyhow::Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(), ReadlineError>>();
        let (requests, incoming) = mpsc::channel::<ReadRequest>();

        thread::Builder::new()
            .name("readline".to_string())
            .spawn(move || {
                let mut editor = match DefaultEditor::new() {
                    Ok(editor) => {
                        let _ = ready_tx.send(Ok(()));
                        editor
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                for request in incoming {
                    let line = read_one(&mut editor, &request.prompt);
                    let _ = request.reply.send(line);
                }
            })?;

        ready_rx
            .recv()
            .map_err(|_| anyhow::anyhow!("readline thread exited during startup"))??;

        Ok(Self {
            requests,
            #[cfg(unix)]
            mode: ModeGuard::capture(io::stdin()),
        })
    }
}

impl Drop for ReadlineTerminal {
    fn drop(&mut self) {
        #[cfg(unix)]
        self.mode.restore();
    }
}

fn read_one(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(Error::InputRead(e.to_string())),
    }
}

#[async_trait]
impl Terminal for ReadlineTerminal {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(ReadRequest {
                prompt: prompt.to_string(),
                reply,
            })
            .map_err(|_| Error::InputRead("line editor is no longer running".to_string()))?;

        response
            .await
            .map_err(|_| Error::InputRead("line editor stopped before replying".to_string()))?
    }

    fn print(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}
