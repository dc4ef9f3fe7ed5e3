//! Collection keys and key generation.

use crate::error::CollectionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Type-safe collection key wrapper.
///
/// # Examples
///
/// ```
/// use kasane_core::CollectionKey;
///
/// let key = CollectionKey::new("orders");
/// assert_eq!(key.as_str(), "orders");
///
/// let key: CollectionKey = "invoices".into();
/// assert!(!key.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionKey(String);

impl CollectionKey {
    /// Creates a new CollectionKey.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the key is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the key and returns the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CollectionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CollectionKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CollectionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for CollectionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Produces process-unique collection keys.
///
/// A generator is initialized eagerly and captures an epoch tag from the
/// system clock. Every call to [`next`](KeyGenerator::next) takes a fresh
/// number from an atomic counter, so two callers can never receive the same
/// key even when they race.
///
/// Keys have the form `<prefix><epoch>-<sequence>`, both numbers base-62.
///
/// # Examples
///
/// ```
/// use kasane_core::KeyGenerator;
///
/// let generator = KeyGenerator::new("agg-")?;
/// let first = generator.next();
/// let second = generator.next();
/// assert_ne!(first, second);
/// assert!(first.as_str().starts_with("agg-"));
/// # Ok::<(), kasane_core::CollectionError>(())
/// ```
#[derive(Debug)]
pub struct KeyGenerator {
    prefix: String,
    epoch: String,
    sequence: AtomicU64,
}

impl KeyGenerator {
    /// Creates a generator whose keys start with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::GeneratorUnavailable`] if the system clock
    /// reports a time before the Unix epoch.
    pub fn new(prefix: impl Into<String>) -> Result<Self, CollectionError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CollectionError::GeneratorUnavailable(e.to_string()))?;
        let epoch = u64::try_from(since_epoch.as_millis())
            .map_err(|e| CollectionError::GeneratorUnavailable(e.to_string()))?;

        Ok(Self {
            prefix: prefix.into(),
            epoch: encode_base62(epoch),
            sequence: AtomicU64::new(0),
        })
    }

    /// Returns a key no earlier call on this generator has returned.
    pub fn next(&self) -> CollectionKey {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        CollectionKey(format!(
            "{}{}-{}",
            self.prefix,
            self.epoch,
            encode_base62(n)
        ))
    }

    /// Returns how many keys have been handed out.
    pub fn issued(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

fn encode_base62(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 62) as usize]);
        n /= 62;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}
