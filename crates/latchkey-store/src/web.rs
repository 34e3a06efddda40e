//! Web backend: a synchronous storage area wrapped to look asynchronous.
//!
//! Browsers hand out a same-origin key-value area with a blocking API
//! (`getItem` / `setItem` / `removeItem`). It can be missing entirely
//! (private mode, disabled by policy) or refuse writes (quota). None of
//! that is worth showing a user, so [`WebStore`] logs the problem and
//! degrades to "nothing stored".

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{KeyValueStore, StoreError};

/// The blocking storage-area API a [`WebStore`] wraps.
///
/// [`MemoryStorage`] is the built-in implementation. A browser binding
/// implements the same three calls over the real storage object.
pub trait SyncStorage: Send + Sync + 'static {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// A storage area picked at runtime, e.g. whatever binding the host page
/// provides.
pub type SharedStorage = Arc<dyn SyncStorage>;

impl<T: SyncStorage + ?Sized> SyncStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// An in-process, non-durable storage area.
///
/// Contents live exactly as long as the value does, like a tab's session
/// storage. An optional byte quota mimics the browser's write limit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage area that rejects writes once keys plus values would
    /// exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl SyncStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self.items.lock();
        if let Some(quota) = self.quota_bytes {
            // Size after the write: everything except the old value for
            // this key, plus the new entry.
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StoreError::QuotaExceeded { key: key.to_string() });
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WebStore
// ---------------------------------------------------------------------------

/// [`KeyValueStore`] over a [`SyncStorage`] area that may not exist.
///
/// `get` on a missing or failing backend returns `Ok(None)`; `set` is a
/// no-op returning `Ok(())`. Both log at `warn`. This store never returns
/// an error.
#[derive(Clone)]
pub struct WebStore<B: SyncStorage = MemoryStorage> {
    backend: Option<B>,
}

impl WebStore<MemoryStorage> {
    /// A web store backed by a fresh in-memory storage area.
    pub fn new() -> Self {
        Self::with_backend(MemoryStorage::new())
    }

    /// A web store whose storage area is disabled.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }
}

impl Default for WebStore<MemoryStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl WebStore<SharedStorage> {
    /// A web store over any storage area, type-erased so it can be chosen
    /// at runtime.
    pub fn shared(backend: impl SyncStorage) -> Self {
        let backend: SharedStorage = Arc::new(backend);
        Self::with_backend(backend)
    }
}

impl<B: SyncStorage> WebStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Wraps whatever the environment offered, if anything.
    pub fn from_backend(backend: Option<B>) -> Self {
        if backend.is_none() {
            tracing::warn!("web storage unavailable; sessions will not persist");
        }
        Self { backend }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }
}

impl<B: SyncStorage> fmt::Debug for WebStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebStore")
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}

impl<B: SyncStorage> KeyValueStore for WebStore<B> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(backend) = &self.backend else {
            tracing::warn!(key, "web storage unavailable; read treated as empty");
            return Ok(None);
        };
        match backend.get_item(key) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "web storage read failed");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let Some(backend) = &self.backend else {
            tracing::warn!(key, "web storage unavailable; write dropped");
            return Ok(());
        };
        let result = match value {
            Some(value) => backend.set_item(key, value),
            None => backend.remove_item(key),
        };
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "web storage write failed");
        }
        Ok(())
    }
}
