//! Error types for packet decoding

use thiserror::Error;

/// Reasons a single packet is rejected by the frame extractor.
///
/// These never escape [`crate::extract_frames`]; they classify skipped packets
/// and are available to callers that decode payloads one at a time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Packet body was blank after trimming
    #[error("Packet payload is empty")]
    EmptyPayload,

    /// Packet body is not valid base64
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// Decoded bytes are not valid UTF-8
    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Result type alias for decoding operations
pub type ParseResult<T> = Result<T, ParseError>;
