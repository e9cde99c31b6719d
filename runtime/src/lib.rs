//! # rxstore Runtime
//!
//! Runtime implementation for guarded reactive stores.
//!
//! This crate provides the push-based plumbing that turns a [`Guard`] and a
//! [`Reducer`] into a running store.
//!
//! ## Core Components
//!
//! - **Port**: Synchronous multicast subject for commands and events
//! - **Replay**: Replay-last shared value; late subscribers see only the
//!   current snapshot
//! - **Store**: Command port → guard (with latest state) → event port →
//!   reducer → state, all within the caller's stack frame
//! - **Arena**: Ownership of dynamically created child stores
//!
//! ## Propagation Model
//!
//! Single-threaded and cooperative. `send()` runs every matched wiring,
//! every resulting fold and every state observer before it returns. There
//! is no scheduler, no queue and no I/O, so a guard always reads the state
//! as of the immediately preceding event.
//!
//! ## Example
//!
//! ```ignore
//! use rxstore_runtime::Store;
//!
//! let store = Store::new(CounterState::default(), CounterReducer, CounterGuard, ());
//! store.state().subscribe(|s| println!("count = {}", s.count));
//! store.start()?;
//!
//! store.send(CounterCommand::Increment);
//! assert_eq!(store.current().count, 1);
//! ```
//!
//! [`Guard`]: rxstore_core::Guard
//! [`Reducer`]: rxstore_core::Reducer

/// Multicast ports and subscriptions
pub mod port;

/// Replay-last shared values
pub mod replay;

/// The Store runtime
pub mod store;

/// Ownership arena for child stores
pub mod arena;

/// Snapshots bundled with the handle that issues commands
pub mod bound;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Commands never produce errors: a command that does not apply is
    /// absorbed by its guard. Only lifecycle and construction mistakes
    /// surface here.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// `start()` was called on a store that is already running
        ///
        /// The second call has no effect.
        #[error("Store '{store}' is already started")]
        AlreadyStarted {
            /// Name of the store
            store: String,
        },

        /// The store configuration was rejected at construction
        #[error("Invalid store configuration: {0}")]
        InvalidConfig(String),
    }
}

pub use arena::Arena;
pub use bound::Bound;
pub use error::StoreError;
pub use port::{Port, Subscription};
pub use replay::Replay;
pub use store::{Store, Update, WeakStore};

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use rxstore_runtime::StoreConfig;
///
/// let config = StoreConfig::new("todo-list").with_metrics(false);
/// assert!(config.validate().is_ok());
/// assert!(StoreConfig::new("").validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name used in log fields and metric labels
    pub name: String,
    /// Whether to record `metrics` counters and histograms
    pub metrics: bool,
}

impl StoreConfig {
    /// Create a configuration for a store with the given name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: true,
        }
    }

    /// Enable or disable metrics recording
    #[must_use]
    pub const fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Check the configuration before any wiring happens
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the name is blank.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "store name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("store")
    }
}
