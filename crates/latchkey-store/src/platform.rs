//! Backend selection by platform.
//!
//! The choice between web and native storage is made exactly once, when
//! the app is composed, and is a pure function of [`Platform`]. Everything
//! above this module talks to a [`PlatformStore`] and never asks which
//! one it got.

use std::fmt;
use std::path::PathBuf;

use crate::{
    EncryptedFileStore, KeyValueStore, MemoryStorage, SharedStorage, StoreError,
    StoreKey, WebStore,
};

/// Which runtime environment the app is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Browser build: same-origin, non-durable storage.
    Web,
    /// Device build: encrypted, durable, per-app storage.
    Native,
}

impl Platform {
    /// The platform of the current compilation target.
    pub const fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Self::Web
        } else {
            Self::Native
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Web => write!(f, "web"),
            Self::Native => write!(f, "native"),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Where the native store keeps its data and key. Ignored on the web.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the sealed value files.
    pub dir: PathBuf,

    /// Path of the 32-byte store key. Defaults to `<dir>/store.key`.
    pub key_file: Option<PathBuf>,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            key_file: None,
        }
    }

    pub fn key_file_path(&self) -> PathBuf {
        self.key_file
            .clone()
            .unwrap_or_else(|| self.dir.join("store.key"))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(".latchkey")
    }
}

// ---------------------------------------------------------------------------
// PlatformStore
// ---------------------------------------------------------------------------

/// The store chosen for this process.
///
/// An enum rather than a trait object: the set of backends is closed, and
/// `KeyValueStore`'s async methods aren't object-safe anyway.
#[derive(Debug)]
pub enum PlatformStore {
    Web(WebStore<SharedStorage>),
    Native(EncryptedFileStore),
}

impl PlatformStore {
    /// Opens the backend for `platform`. The web backend gets a fresh
    /// in-memory storage area.
    ///
    /// # Errors
    /// Only the native backend can fail to open (key file unreadable,
    /// data directory not creatable).
    pub async fn open(
        platform: Platform,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        Self::open_with_web(platform, config, None).await
    }

    /// Like [`open`](Self::open), but on [`Platform::Web`] uses `web`
    /// when given instead of an in-memory area. Ignored on native.
    pub async fn open_with_web(
        platform: Platform,
        config: &StoreConfig,
        web: Option<WebStore<SharedStorage>>,
    ) -> Result<Self, StoreError> {
        let store = match platform {
            Platform::Web => Self::Web(
                web.unwrap_or_else(|| WebStore::shared(MemoryStorage::new())),
            ),
            Platform::Native => {
                let key = StoreKey::load_or_generate(&config.key_file_path()).await?;
                Self::Native(EncryptedFileStore::open(&config.dir, &key).await?)
            }
        };
        tracing::info!(%platform, "key-value store selected");
        Ok(store)
    }

    pub fn platform(&self) -> Platform {
        match self {
            Self::Web(_) => Platform::Web,
            Self::Native(_) => Platform::Native,
        }
    }
}

impl KeyValueStore for PlatformStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Web(store) => store.get(key).await,
            Self::Native(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        match self {
            Self::Web(store) => store.set(key, value).await,
            Self::Native(store) => store.set(key, value).await,
        }
    }
}
