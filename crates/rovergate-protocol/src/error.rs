//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
///
/// Each Rovergate crate defines its own error enum; a `ProtocolError` always
/// means the bytes were the problem, never the game state.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, an unknown
    /// request `type`, or a truncated frame.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame breaks a protocol rule before decoding even starts (for
    /// example, it is empty).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
