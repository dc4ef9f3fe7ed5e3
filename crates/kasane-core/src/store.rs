//! Concurrency-safe keyed collection store.

use crate::config::StoreConfig;
use crate::error::CollectionError;
use crate::key::{CollectionKey, KeyGenerator};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Size reported for a collection that has been deleted.
///
/// Distinct from `0`, which is the size of a collection that exists but is
/// empty.
pub const REMOVED_SIZE: i64 = -1;

/// Result of [`CollectionStore::append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// The key the value was appended under, generated if none was given.
    pub key: CollectionKey,
    /// Length of the collection after the append.
    pub size: usize,
}

/// Copy of a collection taken by [`CollectionStore::get`].
///
/// Owns its values, so later appends to the same key never show up in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<V> {
    /// The key the collection is stored under.
    pub key: CollectionKey,
    /// Values in append order.
    pub items: Vec<V>,
}

impl<V> Snapshot<V> {
    /// Number of values in the snapshot.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Consumes the snapshot and returns its values.
    pub fn into_items(self) -> Vec<V> {
        self.items
    }
}

/// Result of [`CollectionStore::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// The key that was deleted.
    pub key: CollectionKey,
    /// Whether a collection existed under the key.
    pub existed: bool,
}

impl Removed {
    /// Always [`REMOVED_SIZE`].
    pub fn size(&self) -> i64 {
        REMOVED_SIZE
    }
}

/// A process-wide store of named, ordered collections.
///
/// Every operation runs under one mutex, so no caller ever sees a
/// half-applied append or delete. Share a single instance between callers
/// with [`Arc`](std::sync::Arc).
///
/// # Examples
///
/// ```
/// use kasane_core::{CollectionError, CollectionStore, REMOVED_SIZE};
///
/// let store = CollectionStore::new()?;
///
/// let appended = store.append(None, None::<i32>);
/// assert_eq!(appended.size, 0);
/// let key = appended.key;
///
/// assert_eq!(store.append(Some(key.clone()), Some(42)).size, 1);
/// assert_eq!(store.append(Some(key.clone()), Some(43)).size, 2);
///
/// let snapshot = store.get(Some(key.as_str()))?;
/// assert_eq!(snapshot.items, vec![42, 43]);
///
/// assert_eq!(store.delete(Some(key.as_str()))?.size(), REMOVED_SIZE);
/// assert!(matches!(
///     store.get(Some(key.as_str())),
///     Err(CollectionError::KeyNotFound(_))
/// ));
/// # Ok::<(), CollectionError>(())
/// ```
pub struct CollectionStore<V> {
    entries: Mutex<HashMap<CollectionKey, Vec<V>>>,
    generator: KeyGenerator,
}

impl<V> fmt::Debug for CollectionStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore")
            .field("collections", &self.len())
            .field("generator", &self.generator)
            .finish()
    }
}

impl<V> CollectionStore<V> {
    /// Creates a store with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::GeneratorUnavailable`] if the key
    /// generator cannot be initialized.
    pub fn new() -> Result<Self, CollectionError> {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store from an explicit configuration.
    ///
    /// The key generator is built here, before the store is shared, so
    /// concurrent first appends cannot race on its initialization.
    pub fn with_config(config: StoreConfig) -> Result<Self, CollectionError> {
        let generator = KeyGenerator::new(config.key_prefix)?;
        Ok(Self {
            entries: Mutex::new(HashMap::with_capacity(config.initial_capacity)),
            generator,
        })
    }

    /// Appends `value` to the collection at `key`.
    ///
    /// A missing or empty key is replaced by a freshly generated one. A
    /// missing value still creates the collection if needed and reports its
    /// current size. A generated key never names an existing collection,
    /// even one a caller created under a key of the same shape.
    pub fn append(&self, key: Option<CollectionKey>, value: Option<V>) -> Appended {
        let (key, size) = {
            let mut entries = self.lock();
            let key = match key {
                Some(key) if !key.is_empty() => key,
                _ => loop {
                    let candidate = self.generator.next();
                    if !entries.contains_key(candidate.as_str()) {
                        break candidate;
                    }
                },
            };
            let collection = entries.entry(key.clone()).or_default();
            if let Some(value) = value {
                collection.push(value);
            }
            let size = collection.len();
            (key, size)
        };

        debug!(key = %key, size, "appended to collection");
        Appended { key, size }
    }

    /// Returns a copy of the collection at `key`.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::KeyRequired`] if `key` is missing or empty
    /// - [`CollectionError::KeyNotFound`] if no collection exists for `key`
    pub fn get(&self, key: Option<&str>) -> Result<Snapshot<V>, CollectionError>
    where
        V: Clone,
    {
        let key = require_key(key, "get")?;

        let items = self
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| CollectionError::KeyNotFound(CollectionKey::new(key)))?;

        debug!(key, size = items.len(), "read collection");
        Ok(Snapshot {
            key: CollectionKey::new(key),
            items,
        })
    }

    /// Removes the collection at `key`.
    ///
    /// Deleting a key that has no collection is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::KeyRequired`] if `key` is missing or empty.
    pub fn delete(&self, key: Option<&str>) -> Result<Removed, CollectionError> {
        let key = require_key(key, "delete")?;

        let existed = self.lock().remove(key).is_some();

        debug!(key, existed, "deleted collection");
        Ok(Removed {
            key: CollectionKey::new(key),
            existed,
        })
    }

    /// Returns `true` if a collection exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Returns the number of collections in the store.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the store holds no collections.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Critical sections never leave the map half-updated, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, HashMap<CollectionKey, Vec<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn require_key<'a>(
    key: Option<&'a str>,
    operation: &'static str,
) -> Result<&'a str, CollectionError> {
    match key {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(CollectionError::key_required(operation)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store() -> CollectionStore<i32> {
        CollectionStore::new().expect("store")
    }

    #[test]
    fn test_append_without_key_or_value() {
        let store = store();
        let appended = store.append(None, None);
        assert_eq!(appended.size, 0);
        assert!(!appended.key.is_empty());
        assert!(store.contains_key(appended.key.as_str()));
        assert_eq!(
            store.get(Some(appended.key.as_str())).expect("present").size(),
            0
        );
    }

    #[test]
    fn test_append_without_key_generates_fresh_keys() {
        let store = store();
        let keys: HashSet<_> = (0..100).map(|i| store.append(None, Some(i)).key).collect();
        assert_eq!(keys.len(), 100);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_generated_key_skips_caller_chosen_key() {
        let store = store();
        let first = store.append(None, None).key;
        let (tag, _) = first.as_str().rsplit_once('-').expect("generated key shape");
        let taken = CollectionKey::new(format!("{}-2", tag));
        store.append(Some(taken.clone()), Some(99));

        let appended = store.append(None, None);
        assert_ne!(appended.key, taken);
        assert_ne!(appended.key, first);
        assert_eq!(appended.size, 0);
        assert_eq!(store.get(Some(taken.as_str())).expect("present").items, vec![99]);
    }

    #[test]
    fn test_empty_key_is_treated_as_missing() {
        let store = store();
        let appended = store.append(Some(CollectionKey::new("")), Some(1));
        assert!(!appended.key.is_empty());
        assert_eq!(appended.size, 1);
    }

    #[test]
    fn test_size_counts_only_present_values() {
        let store = store();
        let key = CollectionKey::new("orders");
        assert_eq!(store.append(Some(key.clone()), Some(1)).size, 1);
        assert_eq!(store.append(Some(key.clone()), None).size, 1);
        assert_eq!(store.append(Some(key.clone()), Some(2)).size, 2);
        assert_eq!(store.append(Some(key.clone()), Some(2)).size, 3);
    }

    #[test]
    fn test_get_returns_values_in_append_order() {
        let store = store();
        let key = CollectionKey::new("orders");
        for value in [3, 1, 2] {
            store.append(Some(key.clone()), Some(value));
        }
        let snapshot = store.get(Some("orders")).expect("present");
        assert_eq!(snapshot.key, key);
        assert_eq!(snapshot.size(), 3);
        assert_eq!(snapshot.into_items(), vec![3, 1, 2]);
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_appends() {
        let store = store();
        let key = CollectionKey::new("orders");
        store.append(Some(key.clone()), Some(1));
        let snapshot = store.get(Some("orders")).expect("present");
        store.append(Some(key), Some(2));
        assert_eq!(snapshot.items, vec![1]);
    }

    #[test]
    fn test_get_requires_key() {
        let store = store();
        assert_eq!(
            store.get(None),
            Err(CollectionError::KeyRequired { operation: "get" })
        );
        assert_eq!(
            store.get(Some("")),
            Err(CollectionError::KeyRequired { operation: "get" })
        );
    }

    #[test]
    fn test_get_unknown_key() {
        let store = store();
        assert_eq!(
            store.get(Some("missing")),
            Err(CollectionError::KeyNotFound(CollectionKey::new("missing")))
        );
    }

    #[test]
    fn test_delete_then_get() {
        let store = store();
        let key = store.append(None, Some(7)).key;

        let removed = store.delete(Some(key.as_str())).expect("deleted");
        assert!(removed.existed);
        assert_eq!(removed.size(), REMOVED_SIZE);
        assert!(matches!(
            store.get(Some(key.as_str())),
            Err(CollectionError::KeyNotFound(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_missing_key_is_idempotent() {
        let store = store();
        let removed = store.delete(Some("missing")).expect("not an error");
        assert!(!removed.existed);
        assert_eq!(removed.size(), -1);
    }

    #[test]
    fn test_delete_requires_key() {
        let store = store();
        assert_eq!(
            store.delete(None),
            Err(CollectionError::KeyRequired { operation: "delete" })
        );
        assert_eq!(
            store.delete(Some("")),
            Err(CollectionError::KeyRequired { operation: "delete" })
        );
    }

    #[test]
    fn test_append_after_delete_starts_over() {
        let store = store();
        let key = CollectionKey::new("batch");
        store.append(Some(key.clone()), Some(1));
        store.append(Some(key.clone()), Some(2));
        store.delete(Some("batch")).expect("deleted");
        assert_eq!(store.append(Some(key), Some(3)).size, 1);
        assert_eq!(store.get(Some("batch")).expect("present").items, vec![3]);
    }

    #[test]
    fn test_key_prefix_from_config() {
        let store: CollectionStore<i32> = CollectionStore::with_config(StoreConfig {
            key_prefix: "agg-".to_string(),
            initial_capacity: 16,
        })
        .expect("store");
        assert!(store.append(None, None).key.as_str().starts_with("agg-"));
    }

    #[test]
    fn test_concurrent_appends_to_same_key() {
        let store = Arc::new(store());
        let key = CollectionKey::new("shared");

        std::thread::scope(|s| {
            for i in 0..16 {
                let store = Arc::clone(&store);
                let key = key.clone();
                s.spawn(move || {
                    for j in 0..100 {
                        store.append(Some(key.clone()), Some(i * 100 + j));
                    }
                });
            }
        });

        let snapshot = store.get(Some("shared")).expect("present");
        assert_eq!(snapshot.size(), 1600);
        let unique: HashSet<_> = snapshot.items.iter().collect();
        assert_eq!(unique.len(), 1600);
    }

    #[test]
    fn test_concurrent_appends_without_key() {
        let store = store();

        let keys: Vec<CollectionKey> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| store.append(None, None).key))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("append thread panicked"))
                .collect()
        });

        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 8);
        assert_eq!(store.len(), 8);
    }
}
