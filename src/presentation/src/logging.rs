use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Maps a configured log level onto a filter directive; unknown values
/// fall back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn rust_log_is_set() -> bool {
    std::env::var_os(EnvFilter::DEFAULT_ENV).is_some()
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(level)))
}

/// Adjusts the level of the installed subscriber once configuration is known.
pub struct LogLevel {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogLevel {
    /// No-op while `RUST_LOG` is set.
    pub fn set(&self, level: &str) {
        if rust_log_is_set() {
            return;
        }
        if let Err(e) = self.handle.reload(EnvFilter::new(level_directive(level))) {
            tracing::warn!(error = %e, "Failed to change log level");
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `level`. Logs go
/// to stderr, away from streamed model output.
pub fn init(level: &str) -> LogLevel {
    let (filter, handle) = reload::Layer::new(filter_for(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();

    LogLevel { handle }
}
