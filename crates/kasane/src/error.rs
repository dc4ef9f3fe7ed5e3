//! Activity error types.

use kasane_core::CollectionError;
use thiserror::Error;

/// Errors that can occur while evaluating a collection activity.
///
/// # Non-Exhaustive
///
/// This enum is marked `#[non_exhaustive]`. When matching on it, always
/// include a wildcard pattern:
///
/// ```
/// use kasane::{ActivityError, CollectionError};
///
/// fn describe(error: &ActivityError) -> String {
///     match error {
///         ActivityError::Collection(CollectionError::KeyNotFound(key)) => {
///             format!("nothing stored under {}", key)
///         }
///         ActivityError::UnknownOperation(name) => format!("bad operation {}", name),
///         other => other.to_string(),
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ActivityError {
    /// The activity settings could not be read.
    #[error("Invalid activity settings: {0}")]
    InvalidSettings(String),

    /// The operation name is not one of `append`, `get` or `delete`.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// An input had the wrong JSON type.
    #[error("Input '{field}' must be {expected}")]
    InvalidInput {
        /// Name of the offending input.
        field: &'static str,
        /// Description of the accepted type.
        expected: &'static str,
    },

    /// The underlying store rejected the operation.
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasane_core::CollectionKey;

    #[test]
    fn test_error_display() {
        let error = ActivityError::UnknownOperation("merge".to_string());
        assert_eq!(error.to_string(), "Unknown operation: merge");

        let error = ActivityError::InvalidInput {
            field: "key",
            expected: "a string",
        };
        assert_eq!(error.to_string(), "Input 'key' must be a string");
    }

    #[test]
    fn test_collection_error_is_transparent() {
        let error: ActivityError =
            CollectionError::KeyNotFound(CollectionKey::new("orders")).into();
        assert_eq!(error.to_string(), "no collection for key: orders");
    }
}
