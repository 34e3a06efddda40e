//! The session handle handed to the rest of the app.

use std::sync::Arc;

use latchkey_protocol::{SessionToken, SignUpFields, UserProfile};
use latchkey_store::KeyValueStore;
use tokio::sync::watch;

use crate::{AuthApi, SessionController, SessionError, SessionState, TokenBinding};

/// A read-only view of the session plus the operations that change it.
///
/// Screens get one of these instead of the controller itself. It has no
/// logic of its own: every accessor reads the controller's latest state
/// and every operation forwards to the controller.
///
/// Cloning is cheap (one `Arc` increment), so pass it around freely.
///
/// ```text
/// SessionContext { session, user, is_loading, error, sign_in, sign_up, sign_out }
/// ```
pub struct SessionContext<S, A, B> {
    controller: Arc<SessionController<S, A, B>>,
}

// A derived Clone would require S, A, B: Clone, which the Arc doesn't need.
impl<S, A, B> Clone for SessionContext<S, A, B> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
        }
    }
}

impl<S, A, B> SessionContext<S, A, B>
where
    S: KeyValueStore,
    A: AuthApi,
    B: TokenBinding,
{
    pub fn new(controller: Arc<SessionController<S, A, B>>) -> Self {
        Self { controller }
    }

    pub fn session(&self) -> Option<SessionToken> {
        self.controller.snapshot().session
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.controller.snapshot().user
    }

    /// `true` until startup hydration finishes. Don't branch on
    /// [`session`](Self::session) while this is set.
    pub fn is_loading(&self) -> bool {
        self.controller.snapshot().is_loading
    }

    /// The most recent sign-in/up failure, ready to show a user.
    pub fn error(&self) -> Option<String> {
        self.controller.snapshot().error
    }

    pub fn snapshot(&self) -> SessionState {
        self.controller.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.controller.subscribe()
    }

    pub async fn wait_until_loaded(&self) -> SessionState {
        self.controller.wait_until_loaded().await
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        self.controller.sign_in(email, password).await
    }

    pub async fn sign_up(
        &self,
        fields: &SignUpFields,
    ) -> Result<UserProfile, SessionError> {
        self.controller.sign_up(fields).await
    }

    pub async fn sign_out(&self) {
        self.controller.sign_out().await;
    }
}
