//! Persistent key-value store abstraction for Latchkey.
//!
//! Provides the [`KeyValueStore`] capability the session layer persists
//! through, and two backends that look nothing alike underneath:
//!
//! - [`WebStore`]: a synchronous, same-origin, non-durable storage area
//!   (what a browser gives you) wrapped to look asynchronous. Failures are
//!   logged and swallowed: a disabled storage area just means "no session
//!   persisted".
//! - [`EncryptedFileStore`]: a durable, encrypted, per-app store for
//!   native targets. Genuinely asynchronous, and its failures propagate.
//!
//! [`PlatformStore`] picks one of them once, from [`Platform`], so nothing
//! above this crate ever branches on which platform it runs on.

mod encrypted;
mod error;
mod platform;
mod web;

pub use encrypted::{EncryptedFileStore, KEY_LEN, StoreKey};
pub use error::StoreError;
pub use platform::{Platform, PlatformStore, StoreConfig};
pub use web::{MemoryStorage, SharedStorage, SyncStorage, WebStore};

use std::future::Future;
use std::sync::Arc;

/// Asynchronous get/set/remove of string values by string key.
///
/// Every call is independently fallible and returns a [`StoreError`]
/// value rather than panicking, so callers on UI paths can decide how to
/// degrade.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → a store is shared by the session controller
///   across Tokio tasks for the lifetime of the app.
/// - The returned futures are `Send` so controller operations can be
///   `tokio::spawn`ed.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value stored under `key`, or `None` if there is none.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Writes `value` under `key`. `None` deletes the key.
    ///
    /// Deleting a key that doesn't exist is not an error.
    fn set(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes `key`. Shorthand for `set(key, None)`.
    fn remove(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.set(key, None)
    }
}

/// A shared store is still a store. Lets one backend outlive a controller
/// (e.g. to simulate a process restart in tests).
impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).set(key, value)
    }
}
