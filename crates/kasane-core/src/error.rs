//! Collection store error types.

use crate::key::CollectionKey;
use thiserror::Error;

/// Errors that can occur while operating on a [`CollectionStore`](crate::CollectionStore).
///
/// Append never fails; only lookups, deletes and store construction can.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CollectionError {
    /// A key is mandatory for this operation but none was supplied.
    #[error("{operation} called with no key")]
    KeyRequired {
        /// The operation that was called without a key.
        operation: &'static str,
    },

    /// No collection exists for the given key.
    #[error("no collection for key: {0}")]
    KeyNotFound(CollectionKey),

    /// The key generator could not be initialized.
    #[error("key generator unavailable: {0}")]
    GeneratorUnavailable(String),
}

impl CollectionError {
    pub(crate) fn key_required(operation: &'static str) -> Self {
        Self::KeyRequired { operation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CollectionError::key_required("get");
        assert_eq!(error.to_string(), "get called with no key");

        let error = CollectionError::KeyNotFound(CollectionKey::new("orders"));
        assert_eq!(error.to_string(), "no collection for key: orders");

        let error = CollectionError::GeneratorUnavailable("clock skew".to_string());
        assert_eq!(error.to_string(), "key generator unavailable: clock skew");
    }
}
