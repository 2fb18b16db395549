use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrubMateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Match index {index} out of range for {len} indexed questions")]
    OutOfRange { index: usize, len: usize },

    #[error("{0}")]
    Custom(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrubMateError>;
