//! The collection activity and the trait it implements.

use crate::context::ActivityContext;
use crate::error::ActivityError;
use async_trait::async_trait;
use kasane_core::{CollectionKey, CollectionStore};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// A unit of work a workflow host can evaluate.
///
/// # Examples
///
/// ```
/// use kasane::{Activity, ActivityContext, ActivityError};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct Echo;
///
/// #[async_trait]
/// impl Activity for Echo {
///     async fn eval(&self, ctx: &mut ActivityContext) -> Result<bool, ActivityError> {
///         let message = ctx.input_str("message")?.unwrap_or_default().to_string();
///         ctx.set_output("message", message);
///         Ok(true)
///     }
///
///     fn name(&self) -> &str {
///         "echo"
///     }
/// }
/// ```
#[async_trait]
pub trait Activity: Send + Sync + Debug {
    /// Evaluates the activity against the host-supplied context.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` - The activity finished and its outputs are set
    /// - `Ok(false)` - The activity has not finished yet
    /// - `Err(error)` - The activity failed; no shared state was changed
    async fn eval(&self, ctx: &mut ActivityContext) -> Result<bool, ActivityError>;

    /// Returns the activity name.
    fn name(&self) -> &str;
}

/// The three operations a collection activity can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Operation {
    /// Append an object to a collection, creating it if needed.
    Append,
    /// Read a whole collection.
    Get,
    /// Remove a collection.
    Delete,
}

impl Operation {
    /// Returns the operation name as the host spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Append => "append",
            Operation::Get => "get",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Operation::Append),
            "get" => Ok(Operation::Get),
            "delete" => Ok(Operation::Delete),
            other => Err(ActivityError::UnknownOperation(other.to_string())),
        }
    }
}

impl TryFrom<String> for Operation {
    type Error = ActivityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Settings a collection activity is created with.
///
/// # Examples
///
/// ```
/// use kasane::{CollectionSettings, Operation};
/// use serde_json::json;
///
/// let settings = CollectionSettings::from_value(json!({"operation": "append"}))?;
/// assert_eq!(settings.operation, Operation::Append);
/// # Ok::<(), kasane::ActivityError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionSettings {
    /// Operation performed when no `operation` input is given.
    pub operation: Operation,
}

impl CollectionSettings {
    /// Creates settings for the given operation.
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    /// Reads settings from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::InvalidSettings`] if the value is not an
    /// object with a known `operation`.
    pub fn from_value(value: Value) -> Result<Self, ActivityError> {
        serde_json::from_value(value).map_err(|e| ActivityError::InvalidSettings(e.to_string()))
    }

    /// Reads settings from the host's settings map.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ActivityError> {
        Self::from_value(Value::Object(map.clone()))
    }
}

/// Aggregates objects into named collections held in a shared store.
///
/// Inputs: `operation` (optional, overrides the setting), `key` (string)
/// and `object` (any JSON). Outputs: `key`, `size` and, for `get`,
/// `collection`. After a `delete`, `size` is `-1`.
///
/// # Examples
///
/// ```
/// use kasane::prelude::*;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(CollectionStore::new()?);
/// let append = CollectionActivity::new(CollectionSettings::new(Operation::Append), store);
///
/// let mut ctx = ActivityContext::new();
/// ctx.set_input("object", json!({"name": "walter", "age": 45}));
/// append.eval(&mut ctx).await?;
///
/// assert_eq!(ctx.get_output("size"), Some(&json!(1)));
/// assert!(ctx.get_output("key").is_some());
/// # Ok(())
/// # }
/// ```
pub struct CollectionActivity {
    settings: CollectionSettings,
    store: Arc<CollectionStore<Value>>,
}

impl Debug for CollectionActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionActivity")
            .field("operation", &self.settings.operation)
            .field("collections", &self.store.len())
            .finish()
    }
}

impl CollectionActivity {
    /// Creates an activity that works on `store`.
    pub fn new(settings: CollectionSettings, store: Arc<CollectionStore<Value>>) -> Self {
        Self { settings, store }
    }

    /// Creates an activity from the host's settings map.
    pub fn from_settings(
        settings: &Map<String, Value>,
        store: Arc<CollectionStore<Value>>,
    ) -> Result<Self, ActivityError> {
        Ok(Self::new(CollectionSettings::from_map(settings)?, store))
    }

    /// Returns the store the activity works on.
    pub fn store(&self) -> &Arc<CollectionStore<Value>> {
        &self.store
    }

    fn operation(&self, ctx: &ActivityContext) -> Result<Operation, ActivityError> {
        match ctx.input_str("operation")? {
            Some(name) => name.parse(),
            None => Ok(self.settings.operation),
        }
    }

    fn run(&self, operation: Operation, ctx: &mut ActivityContext) -> Result<(), ActivityError> {
        let key = ctx.input_str("key")?.map(str::to_string);

        match operation {
            Operation::Append => {
                let object = ctx.get_input("object").cloned();
                let appended = self.store.append(key.map(CollectionKey::from), object);
                ctx.set_output("key", appended.key.into_string());
                ctx.set_output("size", appended.size);
            }
            Operation::Get => {
                let snapshot = self.store.get(key.as_deref())?;
                let size = snapshot.size();
                ctx.set_output("key", snapshot.key.as_str());
                ctx.set_output("collection", Value::Array(snapshot.into_items()));
                ctx.set_output("size", size);
            }
            Operation::Delete => {
                let removed = self.store.delete(key.as_deref())?;
                ctx.set_output("key", removed.key.as_str());
                ctx.set_output("size", removed.size());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Activity for CollectionActivity {
    async fn eval(&self, ctx: &mut ActivityContext) -> Result<bool, ActivityError> {
        // Outputs of an earlier evaluation must not outlive it.
        ctx.clear_outputs();
        let operation = self.operation(ctx)?;

        match self.run(operation, ctx) {
            Ok(()) => {
                info!(
                    "Activity '{}' completed '{}' ({:?} since context creation)",
                    self.name(),
                    operation,
                    ctx.elapsed()
                );
                Ok(true)
            }
            Err(e) => {
                warn!("Activity '{}' failed '{}': {}", self.name(), operation, e);
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        "collection"
    }
}
