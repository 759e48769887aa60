use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{message}")]
    Source { message: String },

    #[error("LLM error: {message}")]
    Llm { message: String },

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

impl AgentError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AgentError::InvalidArgument(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        AgentError::Source { message: msg.into() }
    }

    /// True for caller-level contract violations that must propagate out of
    /// the aggregator instead of being folded into `metadata.errors`.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, AgentError::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
