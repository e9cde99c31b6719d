//! Todo example: a list store composing dynamically created item stores.
//!
//! This example shows how to build a to-do list out of guarded reactive
//! stores. It demonstrates:
//!
//! - Cross-cutting guards (completing an item cancels its edition)
//! - Guards that consult injected collaborators (the id generator)
//! - A parent owning a growing set of child stores in an arena
//! - A derived view (`filtered_items`) recomputed on every relevant change
//! - Bound snapshots: read an item and act on it through the same value
//!
//! # Quick Start
//!
//! ```
//! use todo::{Filter, TodoListStore};
//!
//! let list = TodoListStore::new();
//! list.start().unwrap();
//!
//! list.create_item("buy milk");
//! list.create_item("walk the dog");
//!
//! // Act on the first item through its bound snapshot
//! let first = &list.items()[0];
//! first.commands().mark_done();
//!
//! list.set_filter(Filter::NotDone);
//! let open: Vec<_> = list.filtered().iter().map(|item| item.text.clone()).collect();
//! assert_eq!(open, vec!["walk the dog".to_string()]);
//! ```

pub mod item;
pub mod list;

// Re-export commonly used types
pub use item::{
    TodoItemCommand, TodoItemCommandPorts, TodoItemEvent, TodoItemEventPorts, TodoItemGuard, TodoItemPorts,
    TodoItemReducer, TodoItemState, TodoItemStore,
};
pub use list::{
    Filter, TodoListCommand, TodoListCommandPorts, TodoListEnvironment, TodoListEvent, TodoListEventPorts,
    TodoListGuard, TodoListPorts, TodoListReducer, TodoListState, TodoListStore,
};
