//! Protocol error types for inbound client events.

use thiserror::Error;

/// Errors in a client's event that are reported back to that client.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A move coordinate was missing or not an integer.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// The event envelope could not be decoded.
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for protocol decoding
pub type Result<T> = std::result::Result<T, ProtocolError>;
