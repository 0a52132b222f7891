//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes were not valid JSON, or a payload did not have the
    /// shape its message type requires.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// Well-formed JSON that violates a protocol rule, such as an
    /// unknown game mode name.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
