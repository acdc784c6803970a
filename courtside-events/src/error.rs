//! Error types for broadcast publishing

use thiserror::Error;

/// Failure to hand a message to the broadcast surface.
///
/// Publishing is fire-and-forget: producers log these and keep going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The broadcast surface has shut down
    #[error("Broadcast channel is closed")]
    Closed,

    /// The broadcast surface refused the message
    #[error("Broadcast rejected message: {0}")]
    Rejected(String),
}

/// Result type alias for publish operations
pub type PublishResult<T> = Result<T, PublishError>;
