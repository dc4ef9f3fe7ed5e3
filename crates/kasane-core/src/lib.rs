//! Core collection store for kasane.
//!
//! This crate has no async runtime dependency. It provides a
//! concurrency-safe store of named, ordered collections that workflow
//! activities can append to, read back and delete.
//!
//! # Core Types
//!
//! - [`CollectionStore`] - Keyed collections behind a single lock
//! - [`KeyGenerator`] - Unique keys for callers that don't bring one
//! - [`CollectionKey`] - Type-safe collection key
//! - [`StoreConfig`] - Construction-time configuration
//! - [`CollectionError`] - Error types for store operations

mod config;
mod error;
mod key;
mod store;

pub use config::StoreConfig;
pub use error::CollectionError;
pub use key::{CollectionKey, KeyGenerator};
pub use store::{Appended, CollectionStore, Removed, Snapshot, REMOVED_SIZE};
