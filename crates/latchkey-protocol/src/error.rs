//! Error types for the protocol layer.
//!
//! Each crate in Latchkey defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the shape of the data
//! (a malformed cached profile, a token the server should never have
//! issued), not in storage or networking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into a stored string).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a stored string back into a value).
    ///
    /// Common causes: a profile cached by an older app version, a value
    /// truncated by the backend, or plain garbage under the key.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A session token that can't be carried in an HTTP header.
    ///
    /// Tokens must be non-empty visible ASCII. The reason string says
    /// which rule was broken; the token itself is never included.
    #[error("invalid session token: {0}")]
    InvalidToken(&'static str),
}
