//! Activity evaluation context.

use crate::error::ActivityError;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Inputs handed to an activity by the host and the outputs it writes back.
///
/// Values are JSON, matching what a workflow host maps between steps.
///
/// # Examples
///
/// ```
/// use kasane::ActivityContext;
/// use serde_json::json;
///
/// let mut ctx = ActivityContext::new();
/// ctx.set_input("key", "orders");
/// ctx.set_input("object", json!({"id": 7}));
///
/// assert_eq!(ctx.input_str("key")?, Some("orders"));
/// assert_eq!(ctx.get_input("object"), Some(&json!({"id": 7})));
/// # Ok::<(), kasane::ActivityError>(())
/// ```
#[derive(Debug)]
pub struct ActivityContext {
    inputs: HashMap<String, Value>,
    outputs: HashMap<String, Value>,
    started_at: Instant,
}

impl Default for ActivityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityContext {
    /// Creates a context with no inputs or outputs.
    pub fn new() -> Self {
        Self {
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Sets an input, replacing any previous value.
    pub fn set_input(&mut self, name: &str, value: impl Into<Value>) {
        self.inputs.insert(name.to_string(), value.into());
    }

    /// Returns an input. JSON `null` is reported as absent.
    pub fn get_input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name).filter(|v| !v.is_null())
    }

    /// Removes an input and returns it.
    pub fn remove_input(&mut self, name: &str) -> Option<Value> {
        self.inputs.remove(name)
    }

    /// Returns a string input.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::InvalidInput`] if the input is present but
    /// not a JSON string.
    pub fn input_str(&self, name: &'static str) -> Result<Option<&str>, ActivityError> {
        match self.get_input(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ActivityError::InvalidInput {
                field: name,
                expected: "a string",
            }),
        }
    }

    /// Sets an output, replacing any previous value.
    pub fn set_output(&mut self, name: &str, value: impl Into<Value>) {
        self.outputs.insert(name.to_string(), value.into());
    }

    /// Returns an output.
    pub fn get_output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    /// Returns an iterator over all outputs.
    pub fn outputs(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.outputs.iter()
    }

    /// Removes every output, keeping inputs.
    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
    }

    /// Returns the time elapsed since the context was created.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}
