//! Credential pool with a circular rotation cursor.
//!
//! Keys are opaque strings loaded from configuration or from the
//! environment (`ANIMA_API_KEY`, then `ANIMA_API_KEY_1` through
//! `ANIMA_API_KEY_10`). The cursor is atomic, so concurrent invocations
//! rotate without ever skipping or repeating a slot.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::InvokeError;

/// Environment variable holding the primary API key.
const ENV_PRIMARY: &str = "ANIMA_API_KEY";
/// Numbered fallback keys run from `_1` to `_10`.
const ENV_FALLBACK_MAX: usize = 10;

/// One key handed out by the pool, tagged with its slot index.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Slot in the pool, for logs and rotation accounting.
    pub index: usize,
    /// The API key itself.
    pub key: String,
}

// Keys never appear in Debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("index", &self.index)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// A fixed set of API keys with a shared rotation cursor.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.keys.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl CredentialPool {
    /// Build a pool from explicit keys. Blank entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::NoCredentials`] when no usable key remains.
    pub fn new(keys: Vec<String>) -> Result<Self, InvokeError> {
        let keys: Vec<String> = keys
            .into_iter()
            .filter(|key| !key.trim().is_empty())
            .collect();
        if keys.is_empty() {
            return Err(InvokeError::NoCredentials);
        }
        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Load keys from the environment: `ANIMA_API_KEY` first, then the
    /// numbered fallbacks in order.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::NoCredentials`] when none of the variables
    /// are set.
    pub fn from_env() -> Result<Self, InvokeError> {
        let mut keys = Vec::new();
        if let Ok(key) = std::env::var(ENV_PRIMARY) {
            keys.push(key);
        }
        for i in 1..=ENV_FALLBACK_MAX {
            if let Ok(key) = std::env::var(format!("{ENV_PRIMARY}_{i}")) {
                keys.push(key);
            }
        }
        Self::new(keys)
    }

    /// Number of keys in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false after construction; kept for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The credential under the cursor, without advancing it.
    #[must_use]
    pub fn current(&self) -> Credential {
        let index = self.cursor.load(Ordering::Relaxed) % self.keys.len();
        Credential {
            index,
            key: self.keys[index].clone(),
        }
    }

    /// Advance the cursor one slot and return the credential now under it.
    ///
    /// The advance is a single atomic update modulo the pool size, so two
    /// racing rotations land on two different slots.
    pub fn rotate(&self) -> Credential {
        let len = self.keys.len();
        let previous = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| Some((c + 1) % len))
            .unwrap_or(0);
        let index = (previous + 1) % len;
        Credential {
            index,
            key: self.keys[index].clone(),
        }
    }
}
