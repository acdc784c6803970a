//! Error types for the device listener

use std::net::SocketAddr;

use thiserror::Error;

/// Failures surfaced by the listener. None of them stop the supervision loop;
/// they decide whether a connection ends or the listen socket is rebuilt.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listen socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The listen socket stopped accepting connections
    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// I/O failure on an established connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for listener operations
pub type Result<T> = std::result::Result<T, ListenerError>;
