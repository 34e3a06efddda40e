//! The network seams: remote auth endpoints and the API binding.
//!
//! Latchkey's session layer doesn't make HTTP requests itself. It talks
//! to two traits:
//!
//! - [`AuthApi`]: the three remote endpoints (login, signup, logout).
//! - [`TokenBinding`]: the shared network client whose authorization
//!   header must always match the current session.
//!
//! In production both are implemented by `latchkey-api` over one
//! `reqwest` client. In tests they are small mocks that count calls and
//! record header changes.

use std::future::Future;
use std::sync::Arc;

use latchkey_protocol::{AuthResponse, Credentials, SessionToken, SignUpFields};

use crate::SessionError;

/// The remote authentication endpoints.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the controller shares one instance across
///   every task that signs in or out.
/// - Returned futures are `Send` so controller operations can be spawned.
pub trait AuthApi: Send + Sync + 'static {
    /// `POST /auth/login {email, password} -> {token, user}`
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, SessionError>> + Send;

    /// `POST /auth/signup {fields} -> {token, user}`
    fn sign_up(
        &self,
        fields: &SignUpFields,
    ) -> impl Future<Output = Result<AuthResponse, SessionError>> + Send;

    /// `POST /auth/logout`, authorized by the currently bound token.
    fn logout(&self) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// The network client's authorization header, as seen by the controller.
///
/// Both calls are synchronous and infallible: the header is replaced in
/// place, nothing is queued or retried. Requests built before a call keep
/// the header they were built with.
pub trait TokenBinding: Send + Sync + 'static {
    fn set_auth_token(&self, token: &SessionToken);
    fn clear_auth_token(&self);
}

impl<T: AuthApi> AuthApi for Arc<T> {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, SessionError>> + Send {
        (**self).login(credentials)
    }

    fn sign_up(
        &self,
        fields: &SignUpFields,
    ) -> impl Future<Output = Result<AuthResponse, SessionError>> + Send {
        (**self).sign_up(fields)
    }

    fn logout(&self) -> impl Future<Output = Result<(), SessionError>> + Send {
        (**self).logout()
    }
}

impl<T: TokenBinding> TokenBinding for Arc<T> {
    fn set_auth_token(&self, token: &SessionToken) {
        (**self).set_auth_token(token);
    }

    fn clear_auth_token(&self) {
        (**self).clear_auth_token();
    }
}
