//! Simple CLI demo for the todo example.
//!
//! Builds a list, edits and completes items, switches filters and prints
//! the list after each step.

use todo::{Filter, TodoListState, TodoListStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_list(label: &str, state: &TodoListState) -> anyhow::Result<()> {
    println!("\n--- {label} (filter: {:?}) ---", state.filter);
    for item in &state.filtered_items {
        let mark = if item.is_done { "x" } else { " " };
        println!("  [{mark}] #{} {}", item.id, item.text);
    }
    tracing::debug!(json = %serde_json::to_string(state)?, "List snapshot");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo=debug,rxstore_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Todo Example ===");

    let list = TodoListStore::new();
    list.start()?;

    println!("\nCreating todos...");
    list.create_item("Buy milk");
    list.create_item("Walk the dog");
    list.create_item("Write report");
    list.create_item(""); // ignored
    print_list("after create", &list.snapshot())?;

    let items = list.items();
    let (Some(milk), Some(dog), Some(report)) = (items.first(), items.get(1), items.get(2)) else {
        anyhow::bail!("expected three items, found {}", items.len());
    };

    println!("\nEditing #{}...", milk.id);
    let milk = milk.commands();
    milk.start_edition();
    milk.update_editing_text("Buy oat milk");
    milk.accept_edition();

    println!("Completing #{} and #{}...", dog.id, report.id);
    dog.commands().mark_done();
    report.commands().start_edition();
    report.commands().mark_done(); // cancels the edition first
    print_list("after edits", &list.snapshot())?;

    list.set_filter(Filter::NotDone);
    print_list("not done", &list.snapshot())?;

    list.set_filter(Filter::Done);
    print_list("done", &list.snapshot())?;

    println!("\nRemoving #{}...", report.id);
    list.remove_item(report.id);
    print_list("after remove", &list.snapshot())?;

    tracing::info!(items = list.item_count(), "Done");
    Ok(())
}
