//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum, so a
//! `ProtocolError` always means the bytes were wrong, never the move.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown intent name,
    /// a missing field, or a value of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but makes no sense at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
