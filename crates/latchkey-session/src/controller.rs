//! The session controller: the one owner of session state.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Running startup hydration exactly once
//! - Signing in, signing up, and signing out
//! - Writing every token change through to the store
//! - Keeping the API binding's authorization header in step with the token
//! - Publishing each new [`SessionState`] to subscribers
//!
//! # Ordering within one transition
//!
//! ```text
//! store write ──→ binding mutation ──→ state published
//! ```
//!
//! An observer that sees `Authenticated` can rely on the token being
//! active on the network client, and durable if the store accepted it.
//! The binding is mutated inside the same `send_modify` that publishes,
//! so no subscriber can observe the new state before the header changes.
//!
//! # Concurrency note
//!
//! Overlapping sign-in attempts are not serialized. Each one writes the
//! store and publishes when its own response arrives, so the last
//! response to land wins in both places. A sign-in still in flight when
//! `sign_out` runs can re-authenticate afterwards. Callers that need
//! stricter ordering should disable their submit button while
//! [`SessionState::is_submitting`] is true.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use latchkey_protocol::{
    AuthResponse, Codec, Credentials, JsonCodec, SessionToken, SignUpFields,
    UserProfile,
};
use latchkey_store::KeyValueStore;
use tokio::sync::watch;

use crate::{
    AuthApi, Phase, SessionConfig, SessionContext, SessionError, SessionState,
    TokenBinding, hydrator,
};

/// Owns the session state machine and everything it touches.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [Hydrating] ──hydrate()──→ [Anonymous] ⇄ [Authenticated]
///                                        sign_in / sign_up →
///                                        ← sign_out
/// ```
///
/// The controller is built once by the composition root and shared as an
/// `Arc`. Tests build a fresh one per case with mock collaborators.
///
/// ## Type parameters
///
/// - `S` → where the session is persisted ([`KeyValueStore`])
/// - `A` → the remote auth endpoints ([`AuthApi`])
/// - `B` → the network client whose header follows the token ([`TokenBinding`])
pub struct SessionController<S, A, B> {
    store: S,
    api: A,
    binding: B,
    codec: JsonCodec,
    config: SessionConfig,

    /// The current state, published to every subscriber.
    ///
    /// `watch` keeps only the latest value, which is exactly what a UI
    /// wants: nobody needs the intermediate states it missed.
    state: watch::Sender<SessionState>,

    /// Set by the first `hydrate()` call; later calls return immediately.
    hydration_started: AtomicBool,

    /// Bumped by every published token change. Hydration compares it
    /// before and after reading the store to detect being overtaken.
    epoch: AtomicU64,
}

impl<S, A, B> SessionController<S, A, B>
where
    S: KeyValueStore,
    A: AuthApi,
    B: TokenBinding,
{
    /// Creates a controller in the `Hydrating` state.
    ///
    /// Nothing is read yet. Call [`hydrate`](Self::hydrate) (usually from
    /// a spawned task) to load the persisted session.
    pub fn new(store: S, api: A, binding: B, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::hydrating());
        Self {
            store,
            api,
            binding,
            codec: JsonCodec,
            config,
            state,
            hydration_started: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolves once hydration has finished, returning the state at that
    /// point. Returns immediately if it already has.
    pub async fn wait_until_loaded(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let loaded = rx.wait_for(|s| !s.is_loading).await.map(|s| s.clone());
        // The sender lives in `self`, so the channel can't close under us.
        loaded.unwrap_or_else(|_| self.snapshot())
    }

    /// A cloneable handle for the rest of the app.
    pub fn context(self: &Arc<Self>) -> SessionContext<S, A, B> {
        SessionContext::new(Arc::clone(self))
    }

    // -----------------------------------------------------------------------
    // Hydration
    // -----------------------------------------------------------------------

    /// Loads the persisted session and leaves the `Hydrating` state.
    ///
    /// Runs at most once per controller; repeated calls are no-ops. If a
    /// sign-in, sign-up, or sign-out completes while the store is being
    /// read, the stored result is stale: it is dropped and only
    /// `is_loading` is cleared.
    pub async fn hydrate(&self) {
        if self.hydration_started.swap(true, Ordering::AcqRel) {
            tracing::debug!("hydration already started");
            return;
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let hydrated = hydrator::hydrate(&self.store, &self.codec, &self.config).await;

        self.state.send_modify(|state| {
            state.is_loading = false;

            if self.epoch.load(Ordering::Acquire) != epoch {
                tracing::debug!("session changed during hydration; keeping newer state");
                return;
            }

            match hydrated.token {
                Some(token) => {
                    let user = hydrated.profile.unwrap_or_else(UserProfile::guest);
                    self.binding.set_auth_token(&token);
                    tracing::info!(user_id = %user.id, "session restored");
                    state.session = Some(token);
                    state.user = Some(user);
                }
                None => {
                    self.binding.clear_auth_token();
                    tracing::info!("no session to restore");
                    state.session = None;
                    state.user = Some(UserProfile::guest());
                }
            }
        });
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Signs in with email and password.
    ///
    /// On success the token and profile are written to the store, the
    /// binding carries the new token, and `Authenticated` is published.
    /// The profile is returned.
    ///
    /// # Errors
    /// Whatever the login endpoint failed with. Before returning, `error`
    /// is set to a user-presentable message; session, user, and store are
    /// left untouched.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        let credentials = Credentials::new(email, password);
        self.begin_attempt();
        let outcome = self.api.login(&credentials).await;
        self.finish_attempt("sign-in", outcome).await
    }

    /// Registers a new account and signs into it.
    ///
    /// Same contract as [`sign_in`](Self::sign_in), against the
    /// registration endpoint.
    pub async fn sign_up(
        &self,
        fields: &SignUpFields,
    ) -> Result<UserProfile, SessionError> {
        self.begin_attempt();
        let outcome = self.api.sign_up(fields).await;
        self.finish_attempt("sign-up", outcome).await
    }

    /// Ends the session.
    ///
    /// If a session is active, the logout endpoint is told first; its
    /// failure is logged and otherwise ignored. A sign-out that arrives
    /// while still hydrating looks for a persisted token instead, and
    /// logs that session out the same way. The store is then cleared,
    /// the binding header removed, and `Anonymous` published with the
    /// guest profile and no error. Calling this while already anonymous
    /// is harmless.
    pub async fn sign_out(&self) {
        let (had_session, hydrating) = {
            let state = self.state.borrow();
            (state.session.is_some(), state.phase() == Phase::Hydrating)
        };
        let had_session = had_session || (hydrating && self.bind_persisted_token().await);

        if had_session {
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "logout request failed; signing out locally");
            }
        }

        self.clear_store().await;

        self.state.send_modify(|state| {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            self.binding.clear_auth_token();
            state.session = None;
            state.user = Some(UserProfile::guest());
            state.error = None;
        });

        if had_session {
            tracing::info!("signed out");
        } else {
            tracing::debug!("sign-out with no active session");
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn begin_attempt(&self) {
        self.state.send_modify(|state| {
            state.error = None;
            state.in_flight += 1;
        });
    }

    async fn finish_attempt(
        &self,
        action: &'static str,
        outcome: Result<AuthResponse, SessionError>,
    ) -> Result<UserProfile, SessionError> {
        match outcome {
            Ok(AuthResponse { token, user }) => {
                self.persist(&token, &user).await;

                let profile = user.clone();
                self.state.send_modify(|state| {
                    self.epoch.fetch_add(1, Ordering::AcqRel);
                    self.binding.set_auth_token(&token);
                    state.session = Some(token);
                    state.user = Some(profile);
                    state.in_flight = state.in_flight.saturating_sub(1);
                });

                tracing::info!(user_id = %user.id, action, "authenticated");
                Ok(user)
            }
            Err(e) => {
                let message = e.user_message(&self.config.generic_error_message);
                tracing::warn!(action, error = %e, "authentication failed");

                self.state.send_modify(|state| {
                    state.error = Some(message);
                    state.in_flight = state.in_flight.saturating_sub(1);
                });
                Err(e)
            }
        }
    }

    /// Write-through of a new session: stale profile out, token in, then
    /// the new profile.
    ///
    /// Failures degrade to "not persisted" and never fail the sign-in. A
    /// profile left over from an earlier session must never be paired with
    /// a new token, so the old profile is removed before the token is
    /// written. If that removal fails, the new token is not written at all.
    async fn persist(&self, token: &SessionToken, user: &UserProfile) {
        let token_key = &self.config.token_key;
        let profile_key = &self.config.profile_key;

        if let Err(e) = self.store.remove(profile_key).await {
            tracing::warn!(
                key = %profile_key,
                error = %e,
                "stale profile could not be removed; session not persisted"
            );
            self.clear_store().await;
            return;
        }

        if let Err(e) = self.store.set(token_key, Some(token.as_str())).await {
            tracing::warn!(
                key = %token_key,
                error = %e,
                "session token not persisted; it will not survive a restart"
            );
            self.clear_store().await;
            return;
        }

        let encoded = match self.codec.encode(user) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "profile could not be encoded; not cached");
                return;
            }
        };

        if let Err(e) = self.store.set(profile_key, Some(&encoded)).await {
            tracing::warn!(key = %profile_key, error = %e, "profile not cached");
            self.remove_logged(profile_key).await;
        }
    }

    /// Points the binding at the stored token so a logout request can
    /// carry it. Returns whether a usable token was found.
    ///
    /// Only binds while no session has been published, so a sign-in or
    /// hydration that lands first keeps its own header.
    async fn bind_persisted_token(&self) -> bool {
        let raw = match self.store.get(&self.config.token_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!(error = %e, "no readable token to log out");
                return false;
            }
        };
        let Ok(token) = SessionToken::try_from(raw) else {
            return false;
        };
        self.state.send_if_modified(|state| {
            if state.session.is_none() {
                self.binding.set_auth_token(&token);
            }
            false
        });
        true
    }

    async fn clear_store(&self) {
        self.remove_logged(&self.config.token_key).await;
        self.remove_logged(&self.config.profile_key).await;
    }

    async fn remove_logged(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            tracing::warn!(key = %key, error = %e, "failed to remove stored value");
        }
    }
}
