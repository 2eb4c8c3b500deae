//! Error types for Scoper.

use thiserror::Error;

/// Library-level error type for Scoper operations.
#[derive(Error, Debug)]
pub enum ScoperError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not find a video ID in: {0}")]
    Parse(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown search mode: {0}. Use FUZZY or SEMANTIC.")]
    UnknownMode(String),

    #[error("Caption fetch failed: {0}")]
    AdapterFailure(String),

    #[error("Embedding model error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ScoperError {
    /// Whether this error was caused by the request itself rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ScoperError::Parse(_)
                | ScoperError::InvalidQuery(_)
                | ScoperError::UnknownMode(_)
                | ScoperError::InvalidInput(_)
        )
    }
}

/// Result type alias for Scoper operations.
pub type Result<T> = std::result::Result<T, ScoperError>;
