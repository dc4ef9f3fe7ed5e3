//! Order Batching with a shared collection.
//!
//! This example demonstrates:
//! 1. Several concurrent flows appending orders to one batch
//! 2. A flow that starts a batch without choosing a key
//! 3. Reading the batch back and clearing it

use kasane::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

async fn append_order(
    append: &CollectionActivity,
    batch: &str,
    order: Value,
) -> Result<i64, ActivityError> {
    let mut ctx = ActivityContext::new();
    ctx.set_input("key", batch);
    ctx.set_input("object", order);
    append.eval(&mut ctx).await?;
    Ok(ctx.get_output("size").and_then(Value::as_i64).unwrap_or_default())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let store = Arc::new(CollectionStore::with_config(StoreConfig {
        key_prefix: "batch-".to_string(),
        ..StoreConfig::default()
    })?);
    let append = Arc::new(CollectionActivity::new(
        CollectionSettings::new(Operation::Append),
        Arc::clone(&store),
    ));
    let get = CollectionActivity::new(CollectionSettings::new(Operation::Get), Arc::clone(&store));
    let delete = CollectionActivity::new(
        CollectionSettings::new(Operation::Delete),
        Arc::clone(&store),
    );

    println!("=== Order Batching ===\n");

    // Open a batch and let the store pick its key
    let mut ctx = ActivityContext::new();
    append.eval(&mut ctx).await?;
    let batch = ctx
        .get_output("key")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    println!("Opened batch {}", batch);

    let mut flows = Vec::new();
    for id in 1..=5 {
        let append = Arc::clone(&append);
        let batch = batch.clone();
        flows.push(tokio::spawn(async move {
            let order = json!({"id": id, "amount": id * 100});
            append_order(&append, &batch, order).await
        }));
    }
    for flow in flows {
        let size = flow.await??;
        println!("Order appended, batch size now {}", size);
    }

    let mut ctx = ActivityContext::new();
    ctx.set_input("key", batch.as_str());
    get.eval(&mut ctx).await?;
    if let Some(Value::Array(orders)) = ctx.get_output("collection") {
        let total: i64 = orders
            .iter()
            .filter_map(|o| o.get("amount").and_then(Value::as_i64))
            .sum();
        println!("Batch {} holds {} orders, total {}", batch, orders.len(), total);
    }

    delete.eval(&mut ctx).await?;
    println!(
        "Batch {} cleared (size {})",
        batch,
        ctx.get_output("size").cloned().unwrap_or_default()
    );

    match get.eval(&mut ctx).await {
        Ok(_) => println!("Batch still present"),
        Err(e) => println!("Batch gone: {}", e),
    }

    Ok(())
}
