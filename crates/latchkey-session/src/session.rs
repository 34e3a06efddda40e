//! Session types: configuration and the state the rest of the app sees.
//!
//! The controller owns exactly one [`SessionState`]. It tracks:
//! - WHO is signed in (`session` token and `user` profile)
//! - WHETHER startup hydration has finished (`is_loading`)
//! - WHAT went wrong last time someone tried to sign in (`error`)
//! - HOW MANY sign-in/sign-up attempts are still waiting on the server

use latchkey_protocol::{SessionToken, UserProfile};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session persistence and error reporting.
///
/// Sensible defaults are provided; override just the fields you need:
///
/// ```rust
/// use latchkey_session::SessionConfig;
///
/// let config = SessionConfig {
///     generic_error_message: "Could not sign in.".into(),
///     ..SessionConfig::default()
/// };
/// assert_eq!(config.token_key, "session_token");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Store key holding the raw session token.
    pub token_key: String,

    /// Store key holding the serialized user profile.
    pub profile_key: String,

    /// Shown when a sign-in/up failure carries no message of its own.
    pub generic_error_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "session_token".to_string(),
            profile_key: "user_profile".to_string(),
            generic_error_message: "Something went wrong. Please try again."
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///   Hydrating ──(no stored token)──→ Anonymous ⇄ Authenticated
///       │                                ↑ sign-in/up    │
///       └──────(stored token)───────→ Authenticated ─────┘ sign-out
/// ```
///
/// A failed sign-in/up leaves the phase where it was and only updates
/// [`SessionState::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Startup read of the store hasn't finished. Render a loading state
    /// and don't branch on `session` yet.
    Hydrating,
    Anonymous,
    Authenticated,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The externally visible session.
///
/// Invariants the controller maintains:
/// - `is_loading` is `true` from construction until hydration finishes,
///   and never becomes `true` again.
/// - After hydration, `user` is always `Some`: the real profile when
///   authenticated (or the guest profile if none was cached), the guest
///   profile when anonymous. A profile is never shown without its token.
/// - `error` only ever holds the most recent failure, and is cleared when
///   a new sign-in/up attempt starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session: Option<SessionToken>,
    pub user: Option<UserProfile>,
    pub is_loading: bool,
    pub error: Option<String>,

    /// Sign-in/up attempts currently awaiting the server. Separate from
    /// `is_loading`, which only ever describes startup.
    pub in_flight: u32,
}

impl SessionState {
    /// The state of a freshly constructed controller.
    pub fn hydrating() -> Self {
        Self {
            session: None,
            user: None,
            is_loading: true,
            error: None,
            in_flight: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Hydrating
        } else if self.session.is_some() {
            Phase::Authenticated
        } else {
            Phase::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == Phase::Authenticated
    }

    /// `true` while at least one sign-in/up attempt is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.in_flight > 0
    }
}
