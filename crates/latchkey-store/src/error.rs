/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage backend can't be used at all (e.g. disabled by policy).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused a write because it is full.
    #[error("storage quota exceeded writing {key:?}")]
    QuotaExceeded { key: String },

    /// The key can't be mapped onto the backend's namespace.
    #[error("invalid store key {0:?}")]
    InvalidKey(String),

    /// Reading or writing the underlying files failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value exists but can never be read back: it fails
    /// authentication, was sealed under another key, or is truncated.
    #[error("stored value for {key:?} is corrupt or sealed with another key")]
    Corrupt { key: String },

    /// Sealing a value failed.
    #[error("encryption failed for {key:?}")]
    EncryptFailed { key: String },

    /// A store key file had the wrong length.
    #[error("store key must be {expected} bytes, got {actual}")]
    InvalidKeyMaterial { expected: usize, actual: usize },
}

impl StoreError {
    /// Returns `true` if retrying can never succeed for this value.
    ///
    /// The session hydrator uses this to decide whether a failed token
    /// read should also wipe the stored credential.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_corrupt_is_unrecoverable() {
        assert!(StoreError::Corrupt { key: "k".into() }.is_unrecoverable());
        assert!(!StoreError::Unavailable("off".into()).is_unrecoverable());
        assert!(
            !StoreError::Io(std::io::Error::other("locked")).is_unrecoverable()
        );
    }

    #[test]
    fn test_display_includes_key() {
        let err = StoreError::QuotaExceeded { key: "user_profile".into() };
        assert!(err.to_string().contains("user_profile"));
    }
}
