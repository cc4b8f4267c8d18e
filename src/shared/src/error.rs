use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input string is empty")]
    EmptyInput,

    #[error("no valid JSON found in input")]
    NoJsonFound,

    #[error("extracted string is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("failed to decode proposal: {0}")]
    ProposalDecode(#[source] serde_json::Error),

    /// Wraps an extraction or decode failure from the response parser.
    #[error("failed to parse model response: {0}")]
    MalformedProposal(#[source] Box<Error>),

    #[error("failed to launch script: {0}")]
    ExecutionLaunch(#[source] std::io::Error),

    #[error("failed to read input: {0}")]
    InputRead(String),

    #[error("failed to clear conversation memory: {0}")]
    MemoryClear(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl Error {
    /// Extractor and decode failures surfaced by the response parser.
    pub fn malformed(inner: Error) -> Self {
        Error::MalformedProposal(Box::new(inner))
    }

    /// The innermost error of a `MalformedProposal` chain.
    pub fn root(&self) -> &Error {
        match self {
            Error::MalformedProposal(inner) => inner.root(),
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Infrastructure(format!("IO error: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Configuration(format!("TOML deserialization error: {}", err))
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Configuration(format!("TOML serialization error: {}", err))
    }
}
