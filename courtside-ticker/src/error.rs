//! Error types for the court ticker

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TickerError {
    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A court script could not be loaded or is unusable
    #[error("Script error: {0}")]
    Script(String),

    /// Shutdown arrived while the court was waiting
    #[error("Cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for TickerError {
    fn from(error: serde_json::Error) -> Self {
        TickerError::Script(error.to_string())
    }
}

/// Result type alias for ticker operations
pub type Result<T> = std::result::Result<T, TickerError>;
