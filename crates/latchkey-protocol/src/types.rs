//! Core data types for sessions and the auth endpoints.
//!
//! Everything here is either sent to the auth backend, received from it,
//! or cached in the key-value store between process restarts.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ProtocolError;

/// The `id` of the fallback profile shown when nobody is signed in, or
/// when a signed-in user's cached profile couldn't be read.
pub const GUEST_USER_ID: &str = "guest";

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// An opaque credential proving an authenticated identity to the backend.
///
/// This is a newtype around `String` with two extra guarantees:
///
/// 1. **It is always header-safe.** Construction rejects empty strings and
///    anything outside visible ASCII, so the API binding can always turn a
///    token into an `Authorization` header without a fallible step at the
///    moment it matters.
/// 2. **It never leaks into logs.** `Debug` prints a placeholder instead of
///    the secret, so `tracing::debug!(?state)` is safe.
///
/// `#[serde(try_from = "String")]` routes deserialization through
/// [`SessionToken::new`], so a bad token in a server response fails to
/// parse instead of slipping through.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Validates and wraps a raw token string.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidToken`] if the token is empty or
    /// contains whitespace, control, or non-ASCII characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, ProtocolError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ProtocolError::InvalidToken("token is empty"));
        }
        if !raw.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ProtocolError::InvalidToken(
                "token must be visible ASCII",
            ));
        }
        Ok(Self(raw))
    }

    /// Borrows the raw token, e.g. to build a header or write it to a store.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionToken {
    type Error = ProtocolError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// A denormalized snapshot of the signed-in user.
///
/// Only `id` is required on the wire. Everything else is optional because
/// the two apps (customer and workshop staff) get differently shaped users
/// back from the same endpoints. Fields we don't model explicitly land in
/// `extra` and survive a cache round trip untouched.
///
/// JSON keys are camelCase (`memberSince`) to match the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend identifier. Numeric ids are accepted and kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,

    /// Any other fields the backend sent (role, workshop id, avatar, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// The minimal guest-shaped profile used when no real profile is known.
    pub fn guest() -> Self {
        Self {
            id: GUEST_USER_ID.to_string(),
            name: "Guest".to_string(),
            email: None,
            phone: None,
            member_since: None,
            extra: Map::new(),
        }
    }

    /// Returns `true` if this is the fallback profile from [`guest()`](Self::guest).
    pub fn is_guest(&self) -> bool {
        self.id == GUEST_USER_ID
    }
}

/// Accepts `"42"` or `42` for an id field.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/signup`.
///
/// The registration form differs between the two apps, so anything beyond
/// the common fields goes into `extra` and is flattened into the request.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpFields {
    pub name: String,
    pub email: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for SignUpFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpFields")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("extra", &self.extra)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Successful body of both `POST /auth/login` and `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: SessionToken,
    pub user: UserProfile,
}

/// Body of a failed auth request, when the server bothered to structure it.
///
/// Backends disagree on the field name, so both `message` and `error` are
/// accepted. The first non-blank one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parses a raw response body, returning the user-presentable message
    /// if there is one. Plain-text or empty bodies yield `None`.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.user_message().map(str::to_string))
    }

    /// The first non-blank message field, trimmed.
    pub fn user_message(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
    }
}
