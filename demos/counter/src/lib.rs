//! # Counter Example
//!
//! The smallest guarded reactive store: one numeric field, three commands,
//! three events.
//!
//! This example showcases:
//! - Commands vs events: guards sit between them, never inside the reducer
//! - A guard that floors the count at zero
//! - Per-kind command and event ports next to the merged ones
//! - Bound snapshots that can issue commands
//!
//! ## Example
//!
//! ```
//! use counter::CounterStore;
//!
//! let counter = CounterStore::new();
//! counter.start().unwrap();
//!
//! counter.decrement(); // suppressed: already at zero
//! counter.increment();
//! counter.increment();
//! counter.reset();
//!
//! assert_eq!(counter.snapshot().count, 0);
//! ```

use rxstore_core::{Events, Guard, Reducer, smallvec};
use rxstore_macros::Kind;
use rxstore_runtime::{Bound, Port, Store, StoreConfig, StoreError};
use serde::{Deserialize, Serialize};

/// Counter state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
}

/// Counter commands
///
/// Requests; the guard decides whether they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Kind)]
#[serde(rename_all = "kebab-case")]
pub enum CounterCommand {
    /// Increment the counter by 1
    Increment,
    /// Decrement the counter by 1, never below zero
    Decrement,
    /// Reset the counter to 0
    Reset,
}

/// Counter events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Kind)]
#[serde(rename_all = "kebab-case")]
pub enum CounterEvent {
    /// The count went up by one
    Incremented,
    /// The count went down by one
    Decremented,
    /// The count went back to zero
    WasReset,
}

/// Counter reducer
///
/// Folds events unconditionally; the floor at zero is the guard's job.
/// Arithmetic saturates at the bounds of `i64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Event = CounterEvent;

    fn reduce(&self, state: &mut CounterState, event: CounterEvent) {
        match event {
            CounterEvent::Incremented => state.count = state.count.saturating_add(1),
            CounterEvent::Decremented => state.count = state.count.saturating_sub(1),
            CounterEvent::WasReset => state.count = 0,
        }
    }
}

/// Counter guard
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterGuard;

impl Guard for CounterGuard {
    type State = CounterState;
    type Command = CounterCommand;
    type Event = CounterEvent;
    type Environment = ();

    fn guard(&self, state: &CounterState, command: &CounterCommand, _env: &()) -> Events<CounterEvent> {
        match command {
            CounterCommand::Increment if state.count < i64::MAX => smallvec![CounterEvent::Incremented],
            CounterCommand::Decrement if state.count > 0 => smallvec![CounterEvent::Decremented],
            CounterCommand::Reset if state.count != 0 => smallvec![CounterEvent::WasReset],
            CounterCommand::Increment | CounterCommand::Decrement | CounterCommand::Reset => Events::new(),
        }
    }
}

/// One port per command kind, carrying only the invocations of that kind
#[derive(Debug, Clone)]
pub struct CounterCommandPorts {
    /// `increment()` invocations
    pub increment: Port<()>,
    /// `decrement()` invocations
    pub decrement: Port<()>,
    /// `reset()` invocations
    pub reset: Port<()>,
}

impl CounterCommandPorts {
    fn split(commands: &Port<CounterCommand>) -> Self {
        let only = |kind: CounterCommand| {
            commands.filter_map(move |command: &CounterCommand| (*command == kind).then_some(()))
        };
        Self {
            increment: only(CounterCommand::Increment),
            decrement: only(CounterCommand::Decrement),
            reset: only(CounterCommand::Reset),
        }
    }
}

/// One port per event kind, carrying only the accepted events of that kind
#[derive(Debug, Clone)]
pub struct CounterEventPorts {
    /// Accepted increments
    pub incremented: Port<()>,
    /// Accepted decrements
    pub decremented: Port<()>,
    /// Accepted resets
    pub was_reset: Port<()>,
}

impl CounterEventPorts {
    fn split(events: &Port<CounterEvent>) -> Self {
        let only =
            |kind: CounterEvent| events.filter_map(move |event: &CounterEvent| (*event == kind).then_some(()));
        Self {
            incremented: only(CounterEvent::Incremented),
            decremented: only(CounterEvent::Decremented),
            was_reset: only(CounterEvent::WasReset),
        }
    }
}

/// The counter's per-kind ports
#[derive(Debug, Clone)]
pub struct CounterPorts {
    /// One port per command kind
    pub commands: CounterCommandPorts,
    /// One port per event kind
    pub events: CounterEventPorts,
}

/// Counter store
///
/// Cloning yields another handle to the same counter.
#[derive(Debug, Clone)]
pub struct CounterStore {
    store: Store<CounterState, CounterCommand, CounterEvent>,
    ports: CounterPorts,
}

impl CounterStore {
    /// A counter starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// A counter starting at `count`
    #[must_use]
    pub fn starting_at(count: i64) -> Self {
        let store = Store::new(CounterState { count }, CounterReducer, CounterGuard, ());
        Self::wrap(store)
    }

    /// A counter with custom store configuration
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(count: i64, config: StoreConfig) -> Result<Self, StoreError> {
        let store = Store::with_config(CounterState { count }, CounterReducer, CounterGuard, (), config)?;
        Ok(Self::wrap(store))
    }

    fn wrap(store: Store<CounterState, CounterCommand, CounterEvent>) -> Self {
        let ports = CounterPorts {
            commands: CounterCommandPorts::split(store.commands()),
            events: CounterEventPorts::split(store.events()),
        };
        Self { store, ports }
    }

    /// Activate the counter
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyStarted`] on a second call.
    pub fn start(&self) -> Result<(), StoreError> {
        self.store.start()
    }

    /// Increment by one
    pub fn increment(&self) {
        self.store.send(CounterCommand::Increment);
    }

    /// Decrement by one, unless already at zero
    pub fn decrement(&self) {
        self.store.send(CounterCommand::Decrement);
    }

    /// Reset to zero, unless already there
    pub fn reset(&self) {
        self.store.send(CounterCommand::Reset);
    }

    /// The current state with this counter's commands attached
    #[must_use]
    pub fn snapshot(&self) -> Bound<CounterState, Self> {
        Bound::new(self.store.current(), self.clone())
    }

    /// Per-kind command and event ports
    #[must_use]
    pub const fn ports(&self) -> &CounterPorts {
        &self.ports
    }

    /// The underlying store (merged ports, state, updates)
    #[must_use]
    pub const fn store(&self) -> &Store<CounterState, CounterCommand, CounterEvent> {
        &self.store
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}
