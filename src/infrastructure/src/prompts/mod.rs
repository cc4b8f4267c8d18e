//! System prompt selection and OS version detection.

mod templates;

use domain::entities::message::{ChatMessage, Role};
use shared::error::{Error, Result};
use shared::types::Shell;
use std::process::Command;

pub use templates::{OS_VERSION_PLACEHOLDER, POWERSHELL_ASSISTANT, SHELL_ASSISTANT};

#[derive(Debug, Clone)]
pub struct PromptLoader {
    os_version: String,
    shell: Shell,
}

impl PromptLoader {
    /// Probes the host OS version once; the probe spawns short-lived
    /// commands.
    pub fn new() -> Self {
        Self::with_os_version(detect_os_version(), Shell::host())
    }

    pub fn with_os_version(os_version: impl Into<String>, shell: Shell) -> Self {
        Self {
            os_version: os_version.into(),
            shell,
        }
    }

    pub fn os_version(&self) -> &str {
        &self.os_version
    }

    pub fn load_system_prompt(&self) -> String {
        let template = match self.shell {
            Shell::PowerShell => POWERSHELL_ASSISTANT,
            Shell::Bash => SHELL_ASSISTANT,
        };
        template.replace(OS_VERSION_PLACEHOLDER, &self.os_version)
    }

    pub fn load_template(&self, name: &str) -> Result<&'static str> {
        match name {
            "powershell" => Ok(POWERSHELL_ASSISTANT),
            "shell" => Ok(SHELL_ASSISTANT),
            other => Err(Error::Configuration(format!("unknown template: {}", other))),
        }
    }

    pub fn available_templates(&self) -> &'static [&'static str] {
        &["powershell", "shell"]
    }

    /// Plain-text rendering of a whole request, as shown by `--prompt`.
    pub fn conversation_prompt(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        input: &str,
    ) -> String {
        let mut rendered = String::with_capacity(system_prompt.len() + 256);
        rendered.push_str(system_prompt);
        rendered.push_str("\nCurrent conversation:\n");
        for message in history {
            let speaker = match message.role {
                Role::User => "Human",
                Role::Assistant => "AI",
                Role::System => "System",
            };
            rendered.push_str(&format!("{}: {}\n", speaker, message.content));
        }
        rendered.push_str(&format!("Human: {}\nAI:", input));
        rendered
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn run_probe(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn detect_os_version() -> String {
    match std::env::consts::OS {
        "windows" => run_probe("cmd", &["/c", "ver"])
            .unwrap_or_else(|| "Windows (version unknown)".to_string()),
        "linux" => std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|content| pretty_name(&content))
            .or_else(|| run_probe("uname", &["-a"]))
            .unwrap_or_else(|| "Linux (version unknown)".to_string()),
        "macos" => run_probe("sw_vers", &["-productName", "-productVersion"])
            .map(|s| s.lines().collect::<Vec<_>>().join(" "))
            .unwrap_or_else(|| "macOS (version unknown)".to_string()),
        other => format!("{} {}", other, std::env::consts::ARCH),
    }
}

/// `PRETTY_NAME` from an os-release file, unquoted.
fn pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
