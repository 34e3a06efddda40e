//! Startup hydration: reading the persisted session back.
//!
//! Hydration is deliberately forgiving. Nothing it reads can make startup
//! fail; the worst outcome is "nobody is signed in".

use latchkey_protocol::{Codec, SessionToken, UserProfile};
use latchkey_store::KeyValueStore;

use crate::SessionConfig;

/// What the store held at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hydrated {
    pub token: Option<SessionToken>,

    /// The cached profile. `None` with a token present is normal (the
    /// cache was never written, or couldn't be decoded); the controller
    /// falls back to the guest profile.
    pub profile: Option<UserProfile>,
}

/// Reads the token key, then (only if a token was found) the profile key.
///
/// Exactly one `get` per key, never more. A failed token read means "no
/// session", not an error. If the stored token can never be read back
/// ([`StoreError::is_unrecoverable`](latchkey_store::StoreError::is_unrecoverable))
/// or isn't a valid token, both keys are removed best-effort so the bad
/// credential doesn't come back on every start.
pub async fn hydrate<S, C>(store: &S, codec: &C, config: &SessionConfig) -> Hydrated
where
    S: KeyValueStore,
    C: Codec,
{
    let raw = match store.get(&config.token_key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!("no stored session");
            return Hydrated::default();
        }
        Err(e) => {
            tracing::warn!(error = %e, "session token read failed; starting anonymous");
            if e.is_unrecoverable() {
                discard(store, config).await;
            }
            return Hydrated::default();
        }
    };

    let token = match SessionToken::new(raw) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "stored session token is invalid; discarding");
            discard(store, config).await;
            return Hydrated::default();
        }
    };

    let profile = match store.get(&config.profile_key).await {
        Ok(Some(raw)) => match codec.decode::<UserProfile>(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "cached profile unreadable; using guest profile");
                None
            }
        },
        Ok(None) => {
            tracing::debug!("no cached profile; using guest profile");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "cached profile read failed; using guest profile");
            None
        }
    };

    Hydrated {
        token: Some(token),
        profile,
    }
}

async fn discard<S: KeyValueStore>(store: &S, config: &SessionConfig) {
    for key in [&config.token_key, &config.profile_key] {
        if let Err(e) = store.remove(key).await {
            tracing::warn!(key = %key, error = %e, "failed to discard stored session");
        }
    }
}
