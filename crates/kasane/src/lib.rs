//! Collection aggregation activity for workflow engines.
//!
//! The name "Kasane" (重ね) means "to pile up" in Japanese: steps of a
//! workflow pile objects into a named collection, read the whole pile back,
//! and clear it when they are done.
//!
//! # Example
//!
//! ```rust
//! use kasane::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(CollectionStore::new()?);
//!     let append = CollectionActivity::new(
//!         CollectionSettings::new(Operation::Append),
//!         Arc::clone(&store),
//!     );
//!     let get = CollectionActivity::new(CollectionSettings::new(Operation::Get), store);
//!
//!     let mut ctx = ActivityContext::new();
//!     ctx.set_input("key", "orders");
//!     ctx.set_input("object", json!({"id": 1}));
//!     append.eval(&mut ctx).await?;
//!
//!     let mut ctx = ActivityContext::new();
//!     ctx.set_input("key", "orders");
//!     get.eval(&mut ctx).await?;
//!     assert_eq!(ctx.get_output("collection"), Some(&json!([{"id": 1}])));
//!     Ok(())
//! }
//! ```

mod activity;
mod context;
mod error;

// Re-export core types
pub use kasane_core::*;

pub use activity::{Activity, CollectionActivity, CollectionSettings, Operation};
pub use context::ActivityContext;
pub use error::ActivityError;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Activity, ActivityContext, ActivityError, CollectionActivity, CollectionError,
        CollectionKey, CollectionSettings, CollectionStore, Operation, StoreConfig,
    };
}
