//! Native backend: durable, encrypted, one file per key.
//!
//! Each value is sealed with ChaCha20-Poly1305 under a 256-bit
//! [`StoreKey`]. A fresh random 96-bit nonce is drawn for every write and
//! stored in front of the ciphertext:
//!
//! ```text
//! <dir>/<key>.enc  =  nonce (12 bytes) || ciphertext + tag
//! ```
//!
//! The key name is bound in as associated data, so renaming
//! `user_profile.enc` to `session_token.enc` makes it fail to open
//! instead of being read as a token.
//!
//! Writes land in a uniquely named temporary file first and are renamed
//! into place, so a crash mid-write leaves either the old value or the
//! new one, and concurrent writes to one key resolve last-writer-wins.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::Rng;

use crate::{KeyValueStore, StoreError};

/// Length of a [`StoreKey`] in bytes.
pub const KEY_LEN: usize = 32;

/// ChaCha20-Poly1305 nonce length.
const NONCE_LEN: usize = 12;

const FILE_EXT: &str = "enc";

// ---------------------------------------------------------------------------
// StoreKey
// ---------------------------------------------------------------------------

/// The 256-bit key values are sealed under.
///
/// On a device this would come from the platform keystore. Here it is
/// either supplied directly or kept in a private key file next to the
/// data ([`load_or_generate`](Self::load_or_generate)).
#[derive(Clone)]
pub struct StoreKey([u8; KEY_LEN]);

impl StoreKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Draws a new key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self(rand::rng().random())
    }

    /// Reads the key at `path`, creating it with fresh randomness if the
    /// file doesn't exist yet.
    ///
    /// # Errors
    /// - [`StoreError::InvalidKeyMaterial`]: the file isn't exactly
    ///   [`KEY_LEN`] bytes
    /// - [`StoreError::Io`]: the file couldn't be read or created
    pub async fn load_or_generate(path: &Path) -> Result<Self, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let bytes: [u8; KEY_LEN] =
                    bytes.as_slice().try_into().map_err(|_| {
                        StoreError::InvalidKeyMaterial {
                            expected: KEY_LEN,
                            actual: bytes.len(),
                        }
                    })?;
                Ok(Self(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let key = Self::generate();
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                write_private(path, &key.0).await?;
                tracing::info!(path = %path.display(), "generated new store key");
                Ok(key)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// EncryptedFileStore
// ---------------------------------------------------------------------------

/// A [`KeyValueStore`] that seals every value into its own file.
///
/// Unlike [`WebStore`](crate::WebStore), failures here are real and are
/// returned to the caller: a locked or full disk, a value sealed under a
/// different key, a key name that can't be a file name.
pub struct EncryptedFileStore {
    dir: PathBuf,
    cipher: ChaCha20Poly1305,
}

impl EncryptedFileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub async fn open(
        dir: impl Into<PathBuf>,
        key: &StoreKey,
    ) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "encrypted store opened");
        Ok(Self {
            dir,
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key.0)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{FILE_EXT}")))
    }

    fn seal(&self, key: &str, value: &str) -> Result<Vec<u8>, StoreError> {
        let nonce: [u8; NONCE_LEN] = rand::rng().random();
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: value.as_bytes(),
                    aad: key.as_bytes(),
                },
            )
            .map_err(|_| StoreError::EncryptFailed { key: key.to_string() })?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn unseal(&self, key: &str, sealed: &[u8]) -> Result<String, StoreError> {
        let corrupt = || StoreError::Corrupt { key: key.to_string() };
        if sealed.len() < NONCE_LEN {
            return Err(corrupt());
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: key.as_bytes(),
                },
            )
            .map_err(|_| corrupt())?;
        String::from_utf8(plaintext).map_err(|_| corrupt())
    }
}

impl fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl KeyValueStore for EncryptedFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        let sealed = match tokio::fs::read(&path).await {
            Ok(sealed) => sealed,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        self.unseal(key, &sealed).map(Some)
    }

    async fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match value {
            Some(value) => {
                let sealed = self.seal(key, value)?;
                // One temp file per write; overlapping writers must never
                // share (and rename away) each other's half-written file.
                let suffix: u64 = rand::rng().random();
                let tmp = self.dir.join(format!(".{key}.{FILE_EXT}.{suffix:016x}.tmp"));
                let written = match write_private(&tmp, &sealed).await {
                    Ok(()) => tokio::fs::rename(&tmp, &path).await.map_err(StoreError::from),
                    Err(e) => Err(e),
                };
                if let Err(e) = written {
                    let _ = tokio::fs::remove_file(&tmp).await;
                    return Err(e);
                }
            }
            None => match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }
        Ok(())
    }
}

/// Keys become file names, so they are limited to `[A-Za-z0-9_.-]` and
/// may not start with a dot (that namespace holds temporary files).
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Writes `data` to `path`, readable only by the owner where the OS has
/// such a notion.
async fn write_private(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    tokio::fs::write(path, data).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await?;
    }
    Ok(())
}
