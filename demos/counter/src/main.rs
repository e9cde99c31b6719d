//! Counter example binary
//!
//! Drives a counter through a few commands and prints every snapshot.

use counter::CounterStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter=debug,rxstore_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Counter Example: guarded reactive store ===\n");

    let counter = CounterStore::new();

    // Observers go on before start(); they hear the initial state on start.
    counter.store().state().subscribe(|state| match serde_json::to_string(state) {
        Ok(json) => println!("  state: {json}"),
        Err(error) => tracing::warn!(%error, "Could not serialize state"),
    });

    counter.start()?;

    println!("\n>>> decrement (suppressed at zero)");
    counter.decrement();

    println!("\n>>> increment x3");
    counter.increment();
    counter.increment();
    counter.increment();

    println!("\n>>> decrement");
    counter.decrement();

    println!("\n>>> reset");
    counter.reset();

    println!("\n>>> reset again (suppressed)");
    counter.reset();

    tracing::info!(count = counter.snapshot().count, "Done");
    Ok(())
}
