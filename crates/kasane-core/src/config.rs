//! Store configuration.

use serde::Deserialize;

/// Construction-time configuration for a [`CollectionStore`](crate::CollectionStore).
///
/// # Examples
///
/// ```
/// use kasane_core::StoreConfig;
///
/// let config = StoreConfig {
///     key_prefix: "batch-".to_string(),
///     ..StoreConfig::default()
/// };
/// assert_eq!(config.initial_capacity, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prefix prepended to every generated key. Default: empty.
    pub key_prefix: String,
    /// Number of collections to preallocate room for. Default: 0.
    pub initial_capacity: usize,
}
