//! Error types for the session layer.

/// Errors returned by sign-in and sign-up.
///
/// Storage problems never show up here: the controller logs them and
/// degrades instead. What remains is everything the calling screen may
/// want to react to (show a modal, shake the password field, ...).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server answered, and the answer was no (bad credentials, email
    /// already registered, server error).
    ///
    /// `message` is the server's own explanation when the response body
    /// was structured enough to carry one.
    #[error("request rejected with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The request never got an answer (offline, DNS, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The server said yes, but in a shape we can't use (missing token,
    /// malformed profile, a token that can't be sent as a header).
    #[error("invalid server response: {0}")]
    InvalidResponse(String),
}

impl SessionError {
    /// A message fit to show a user: the server's message when it sent
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// The HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
