//! Codec trait and implementations for cached values.
//!
//! The key-value store only holds opaque strings. Anything richer than a
//! token (today: the cached [`UserProfile`](crate::UserProfile)) has to be
//! turned into a string on the way in and parsed on the way out. A "codec"
//! (coder/decoder) is the thing that does that.
//!
//! The session layer doesn't care HOW values are serialized: it just
//! needs something that implements [`Codec`]. [`JsonCodec`] is the only
//! implementation; it matches what the backend sends, so a profile from a
//! login response can be cached verbatim.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to store strings and decodes them back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the codec lives inside the session controller, which
///   is shared across Tokio tasks.
/// - `'static` → it owns everything it needs; no borrowed configuration.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a string suitable for the store.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses a stored string back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the string is malformed or
    /// doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use latchkey_protocol::{Codec, JsonCodec, UserProfile};
///
/// let codec = JsonCodec;
/// let profile = UserProfile::guest();
///
/// let stored = codec.encode(&profile).unwrap();
/// let restored: UserProfile = codec.decode(&stored).unwrap();
/// assert_eq!(profile, restored);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
