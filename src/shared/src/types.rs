use serde::{Deserialize, Serialize};
use std::fmt;

pub type Result<T> = anyhow::Result<T>;

/// Interpreter used to run generated scripts on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    PowerShell,
}

impl Shell {
    /// PowerShell on Windows targets, bash everywhere else.
    pub fn host() -> Self {
        if cfg!(windows) {
            Shell::PowerShell
        } else {
            Shell::Bash
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::PowerShell => "powershell",
        }
    }

    /// Flag that makes the interpreter run its next argument as a script.
    pub fn command_flag(&self) -> &'static str {
        match self {
            Shell::Bash => "-c",
            Shell::PowerShell => "-Command",
        }
    }

    /// Extension suggested when a multi-line script should be saved.
    pub fn script_extension(&self) -> &'static str {
        match self {
            Shell::Bash => "sh",
            Shell::PowerShell => "ps1",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shell::Bash => write!(f, "bash"),
            Shell::PowerShell => write!(f, "powershell"),
        }
    }
}
