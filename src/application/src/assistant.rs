//! The interactive turn loop.
//!
//! One turn reads a line, handles control tokens, otherwise streams a
//! model answer, parses it into a proposal and routes it through the
//! confirm/execute path. The only state carried between turns is the
//! most recent execution record, threaded through [`LoopState`].

use colored::Colorize;
use domain::entities::execution::ExecutionRecord;
use domain::entities::message::ChatMessage;
use domain::entities::proposal::{Disposition, ScriptProposal};
use domain::services::{ChatModel, ConversationMemory, ScriptExecutor, Terminal};
use futures::StreamExt;
use shared::confirmation::{is_affirmative, EXECUTE_PROMPT};
use shared::error::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::report::{execution_summary, with_execution_context};
use crate::response_parser::parse_script;

pub const USER_PROMPT: &str = "You: ";
pub const BOT_PREFIX: &str = "Bot: ";
pub const WELCOME: &str =
    "Welcome to cmdr! Type 'exit' to exit, 'clear' to clear history, or 'help' for more info.";
pub const HELP: &str = "Available commands: exit, clear, help";

/// State threaded from one turn to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Overwritten by every completed execution, read when sending.
    pub last_execution: Option<ExecutionRecord>,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// `exit`, end of input, interrupt or cancellation.
    Exited,
    /// Empty line, or the model request failed.
    Idle,
    Cleared,
    HelpShown,
    ParseFailed,
    Clarification,
    SaveSuggested,
    Declined,
    Executed,
    LaunchFailed,
}

#[derive(Debug)]
pub struct Turn {
    pub state: LoopState,
    pub outcome: TurnOutcome,
}

impl Turn {
    fn new(state: LoopState, outcome: TurnOutcome) -> Self {
        Self { state, outcome }
    }
}

enum ControlToken {
    Exit,
    Clear,
    Help,
    Empty,
}

impl ControlToken {
    /// Exact, case-sensitive match on the trimmed line.
    fn parse(input: &str) -> Option<Self> {
        match input {
            "exit" => Some(Self::Exit),
            "clear" => Some(Self::Clear),
            "help" => Some(Self::Help),
            "" => Some(Self::Empty),
            _ => None,
        }
    }
}

pub struct Assistant<M, E, Mem, T> {
    model: M,
    executor: E,
    memory: Mem,
    terminal: T,
    system_prompt: String,
    cancel: CancellationToken,
}

impl<M, E, Mem, T> Assistant<M, E, Mem, T>
where
    M: ChatModel,
    E: ScriptExecutor,
    Mem: ConversationMemory,
    T: Terminal,
{
    pub fn new(
        model: M,
        executor: E,
        memory: Mem,
        terminal: T,
        system_prompt: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            model,
            executor,
            memory,
            terminal,
            system_prompt: system_prompt.into(),
            cancel,
        }
    }

    pub fn memory(&self) -> &Mem {
        &self.memory
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs turns until one exits. Returns the final loop state; `Err`
    /// only for an unrecoverable input failure.
    pub async fn run(&mut self) -> Result<LoopState> {
        info!(shell = %self.executor.shell(), os = std::env::consts::OS, "Starting chat session");
        self.terminal.println(WELCOME);

        let mut state = LoopState::default();
        loop {
            let turn = self.turn(state).await?;
            state = turn.state;
            debug!(outcome = ?turn.outcome, "Turn finished");
            if turn.outcome == TurnOutcome::Exited {
                break;
            }
        }
        Ok(state)
    }

    pub async fn turn(&mut self, state: LoopState) -> Result<Turn> {
        let Some(line) = self.read_line(USER_PROMPT).await? else {
            return Ok(Turn::new(state, TurnOutcome::Exited));
        };
        let input = line.trim();

        match ControlToken::parse(input) {
            Some(ControlToken::Exit) => {
                info!("Exiting the chat...");
                Ok(Turn::new(state, TurnOutcome::Exited))
            }
            Some(ControlToken::Clear) => match self.memory.clear() {
                Ok(()) => {
                    info!("Chat history cleared.");
                    self.terminal.println("Chat history cleared.");
                    Ok(Turn::new(state, TurnOutcome::Cleared))
                }
                Err(e) => {
                    error!(error = %e, "Failed to clear memory");
                    self.terminal.println(&format!("Error: {}", e));
                    Ok(Turn::new(state, TurnOutcome::Idle))
                }
            },
            Some(ControlToken::Help) => {
                self.terminal.println(HELP);
                Ok(Turn::new(state, TurnOutcome::HelpShown))
            }
            Some(ControlToken::Empty) => Ok(Turn::new(state, TurnOutcome::Idle)),
            None => {
                let input = input.to_string();
                self.send(state, &input).await
            }
        }
    }

    async fn send(&mut self, state: LoopState, input: &str) -> Result<Turn> {
        let payload = with_execution_context(input, state.last_execution.as_ref());

        let mut messages = vec![ChatMessage::system(self.system_prompt.as_str())];
        messages.extend(self.memory.messages());
        messages.push(ChatMessage::user(payload.as_str()));

        let response = match self.stream_response(messages).await {
            Ok(response) => response,
            Err(Error::Cancelled) => return Ok(Turn::new(state, TurnOutcome::Exited)),
            Err(e) => {
                error!(error = %e, "Failed to process AI response");
                self.terminal.println(&format!("Error: {}", e).red().to_string());
                return Ok(Turn::new(state, TurnOutcome::Idle));
            }
        };

        self.memory.append(&payload, &response);

        match parse_script(&response) {
            Ok(proposal) => self.dispatch(state, proposal).await,
            Err(e) => {
                error!(error = %e, "Failed to parse script");
                self.terminal
                    .println(&format!("\nError: {}", e).red().to_string());
                Ok(Turn::new(state, TurnOutcome::ParseFailed))
            }
        }
    }

    /// Prints chunks as they arrive and returns the accumulated text.
    async fn stream_response(&mut self, messages: Vec<ChatMessage>) -> Result<String> {
        let cancel = self.cancel.clone();

        let mut stream = tokio::select! {
            stream = self.model.stream_chat(messages) => stream?,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };

        let mut full = String::with_capacity(4096);
        let mut started = false;

        let result = loop {
            let next = tokio::select! {
                next = stream.next() => next,
                _ = cancel.cancelled() => break Err(Error::Cancelled),
            };
            match next {
                Some(Ok(chunk)) => {
                    if !started {
                        self.terminal.print(BOT_PREFIX);
                        started = true;
                    }
                    self.terminal.print(&chunk);
                    full.push_str(&chunk);
                }
                Some(Err(e)) => break Err(e),
                None => break Ok(()),
            }
        };

        if started {
            self.terminal.println("");
        }
        result.map(|()| full)
    }

    async fn dispatch(&mut self, mut state: LoopState, proposal: ScriptProposal) -> Result<Turn> {
        match proposal.disposition() {
            Disposition::Clarification => {
                self.terminal
                    .println(&format!("\nAI did not provide a script: {}", proposal.script));
                Ok(Turn::new(state, TurnOutcome::Clarification))
            }
            Disposition::SaveToFile => {
                self.terminal.println(&format!(
                    "\nAI: Please save the following content as a .{} script file and execute:",
                    self.executor.shell().script_extension()
                ));
                self.terminal.println(&proposal.script);
                Ok(Turn::new(state, TurnOutcome::SaveSuggested))
            }
            Disposition::Runnable => {
                let script = proposal.script.trim();
                self.terminal.println(&format!("\n{}", EXECUTE_PROMPT));

                let Some(answer) = self.read_line(USER_PROMPT).await? else {
                    return Ok(Turn::new(state, TurnOutcome::Exited));
                };
                if !is_affirmative(&answer) {
                    self.terminal.println(&"Script not executed.".yellow().to_string());
                    return Ok(Turn::new(state, TurnOutcome::Declined));
                }

                match self.executor.execute(script, &self.cancel).await {
                    Ok(record) => {
                        self.terminal.println(&execution_summary(&record));
                        state.last_execution = Some(record);
                        Ok(Turn::new(state, TurnOutcome::Executed))
                    }
                    Err(Error::Cancelled) => Ok(Turn::new(state, TurnOutcome::Exited)),
                    Err(e) => {
                        error!(error = %e, "Failed to execute script");
                        self.terminal
                            .println(&format!("Execution error: {}", e).red().to_string());
                        Ok(Turn::new(state, TurnOutcome::LaunchFailed))
                    }
                }
            }
        }
    }

    /// Reads a line, giving up as soon as the session is cancelled.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let cancel = self.cancel.clone();
        tokio::select! {
            line = self.terminal.read_line(prompt) => line,
            _ = cancel.cancelled() => Ok(None),
        }
    }
}
