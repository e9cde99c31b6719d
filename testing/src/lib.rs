//! # rxstore Testing
//!
//! Testing utilities and helpers for rxstore.
//!
//! This crate provides:
//! - Deterministic environment implementations (`test_ids`)
//! - Fluent Given-When-Then tests for reducers and guards
//! - [`Recorder`] for capturing what a port or replay emitted
//! - Property-based testing utilities
//!
//! ## Example
//!
//! ```ignore
//! use rxstore_testing::Recorder;
//!
//! #[test]
//! fn decrement_floors_at_zero() {
//!     let counter = CounterStore::new();
//!     let events = Recorder::port(counter.store().events());
//!     let decrements = Recorder::port(&counter.ports().commands.decrement);
//!     counter.start().unwrap();
//!
//!     counter.decrement();
//!
//!     assert_eq!(decrements.len(), 1);
//!     assert!(events.is_empty());
//!     assert_eq!(counter.snapshot().count, 0);
//! }
//! ```

use rxstore_core::environment::SequentialIds;
use rxstore_runtime::{Port, Replay, Subscription};
use std::cell::RefCell;
use std::rc::Rc;


pub use reducer_test::{GuardTest, ReducerTest, assertions};

/// Deterministic environment implementations for tests
pub mod mocks {
    use super::SequentialIds;

    /// A fresh id sequence starting at 1
    ///
    /// # Example
    ///
    /// ```
    /// use rxstore_testing::test_ids;
    /// use rxstore_core::environment::{IdGenerator, ItemId};
    ///
    /// let ids = test_ids();
    /// assert_eq!(ids.next_id(), ItemId::new(1));
    /// ```
    #[must_use]
    pub const fn test_ids() -> SequentialIds {
        SequentialIds::new()
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a `tracing` subscriber for the current test binary
    ///
    /// Honours `RUST_LOG`, defaulting to `rxstore_runtime=debug`. Safe to
    /// call from every test; only the first call installs anything.
    pub fn init_tracing() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "rxstore_runtime=debug".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities
pub mod properties {
    use proptest::collection::vec;
    use proptest::strategy::Strategy;

    /// Sequences of up to `max_len` values drawn from `element`
    ///
    /// Intended for driving a store with random command sequences.
    pub fn sequences<S: Strategy>(element: S, max_len: usize) -> impl Strategy<Value = Vec<S::Value>> {
        vec(element, 0..=max_len)
    }
}

/// Captures every value emitted by a port or replay
///
/// # Example
///
/// ```
/// use rxstore_runtime::Port;
/// use rxstore_testing::Recorder;
///
/// let port = Port::new();
/// let recorder = Recorder::port(&port);
/// port.publish(&"a");
/// port.publish(&"b");
/// assert_eq!(recorder.values(), vec!["a", "b"]);
/// ```
pub struct Recorder<T> {
    values: Rc<RefCell<Vec<T>>>,
    subscription: Subscription,
}

impl<T: Clone + 'static> Recorder<T> {
    /// Record every subsequent value published on `port`
    #[must_use]
    pub fn port(port: &Port<T>) -> Self {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&values);
        let subscription = port.subscribe(move |value: &T| sink.borrow_mut().push(value.clone()));
        Self {
            values,
            subscription,
        }
    }

    /// Record a replay, starting with the value it replays (if live)
    #[must_use]
    pub fn replay(replay: &Replay<T>) -> Self {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&values);
        let subscription = replay.subscribe(move |value: &T| sink.borrow_mut().push(value.clone()));
        Self {
            values,
            subscription,
        }
    }

    /// Everything recorded so far
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values.borrow().clone()
    }

    /// The most recent value
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values.borrow().last().cloned()
    }

    /// Number of recorded values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Forget what was recorded, keep recording
    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }

    /// Stop recording and return what was captured
    #[must_use]
    pub fn detach(self) -> Vec<T> {
        self.subscription.unsubscribe();
        self.values.borrow().clone()
    }
}

// Re-export commonly used items
pub use helpers::init_tracing;
pub use mocks::test_ids;
