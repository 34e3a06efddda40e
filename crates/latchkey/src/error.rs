//! Unified error type for Latchkey.

use latchkey_api::ApiError;
use latchkey_protocol::ProtocolError;
use latchkey_session::SessionError;
use latchkey_store::StoreError;

/// Every error the session stack can hand an app.
///
/// Apps built on the `latchkey` crate match on this one type instead of
/// importing each sub-crate's error. Each variant is `#[from]`, so `?`
/// lifts a `StoreError` or `SessionError` into it without ceremony.
#[derive(Debug, thiserror::Error)]
pub enum LatchkeyError {
    /// The key-value store couldn't be opened or used.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encoding or decoding session data failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Sign-in or sign-up failed (rejected, offline, bad response).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The HTTP client couldn't be built.
    #[error(transparent)]
    Api(#[from] ApiError),
}
