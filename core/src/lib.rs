//! # rxstore Core
//!
//! Core traits and types for guarded reactive stores.
//!
//! A store turns **commands** (intents that may be ignored) into **events**
//! (facts that always apply) and folds those events into an immutable
//! **state** snapshot that any number of observers can follow.
//!
//! ## Core Concepts
//!
//! - **Command**: A request to change something. Carries no guarantee.
//! - **Guard**: Pure function `(State, Command, Environment) → Events`.
//!   The only place domain rules live.
//! - **Event**: A fact. Always accepted by the reducer.
//! - **Reducer**: Pure, total fold `(State, Event) → State`.
//! - **Environment**: Injected collaborators (id generators).
//!
//! ## Architecture Principles
//!
//! - Guards sit between commands and events, never inside the reducer
//! - Reducers never re-check guard conditions
//! - Closed enums for commands and events; every `match` is exhaustive
//!
//! ## Example
//!
//! ```
//! use rxstore_core::{Events, smallvec};
//! use rxstore_core::guard::Guard;
//! use rxstore_core::reducer::Reducer;
//!
//! #[derive(Clone, Debug, Default)]
//! struct LightState {
//!     on: bool,
//! }
//!
//! enum LightCommand {
//!     Toggle,
//! }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum LightEvent {
//!     SwitchedOn,
//!     SwitchedOff,
//! }
//!
//! struct LightReducer;
//!
//! impl Reducer for LightReducer {
//!     type State = LightState;
//!     type Event = LightEvent;
//!
//!     fn reduce(&self, state: &mut LightState, event: LightEvent) {
//!         match event {
//!             LightEvent::SwitchedOn => state.on = true,
//!             LightEvent::SwitchedOff => state.on = false,
//!         }
//!     }
//! }
//!
//! struct LightGuard;
//!
//! impl Guard for LightGuard {
//!     type State = LightState;
//!     type Command = LightCommand;
//!     type Event = LightEvent;
//!     type Environment = ();
//!
//!     fn guard(&self, state: &LightState, command: &LightCommand, _env: &()) -> Events<LightEvent> {
//!         match command {
//!             LightCommand::Toggle if state.on => smallvec![LightEvent::SwitchedOff],
//!             LightCommand::Toggle => smallvec![LightEvent::SwitchedOn],
//!         }
//!     }
//! }
//!
//! let mut state = LightState::default();
//! for event in LightGuard.guard(&state, &LightCommand::Toggle, &()) {
//!     LightReducer.reduce(&mut state, event);
//! }
//! assert!(state.on);
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Environment module - injected collaborators
pub mod environment;

/// Events produced by a single guard decision.
///
/// Most decisions produce zero or one event; a few chain two
/// (cancel an edition, then mark done). Empty means the command was
/// suppressed.
pub type Events<E> = SmallVec<[E; 4]>;

/// Reducer module - the pure fold from events to state
///
/// Reducers are pure functions: `(State, Event) → State`
///
/// They never see commands and never decide whether something may happen.
/// By the time an event reaches a reducer, it has already happened.
pub mod reducer {
    /// The Reducer trait - folds one event into state
    ///
    /// # Type Parameters
    ///
    /// - `State`: The snapshot type this reducer produces
    /// - `Event`: The closed set of facts it understands
    ///
    /// # Totality
    ///
    /// Implementations `match` exhaustively on `Event` without a wildcard
    /// arm, so adding a variant without a fold case is a compile error
    /// rather than a silently lost transition.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CounterReducer {
    ///     type State = CounterState;
    ///     type Event = CounterEvent;
    ///
    ///     fn reduce(&self, state: &mut CounterState, event: CounterEvent) {
    ///         match event {
    ///             CounterEvent::Incremented => state.count += 1,
    ///             CounterEvent::Decremented => state.count -= 1,
    ///             CounterEvent::WasReset => state.count = 0,
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The event type this reducer folds
        type Event;

        /// Fold an event into state
        ///
        /// The runtime calls this on a private copy of the current
        /// snapshot and publishes the result, so observers only ever see
        /// complete, immutable values. Must not panic.
        fn reduce(&self, state: &mut Self::State, event: Self::Event);
    }
}

/// Guard module - the rules between commands and events
///
/// Guards look at a command together with the latest state and decide
/// which events (if any) it produces. A guard is the only place a domain
/// rule is enforced.
pub mod guard {
    use super::Events;

    /// The Guard trait - decides what a command means right now
    ///
    /// # Type Parameters
    ///
    /// - `State`: The snapshot the decision is made against
    /// - `Command`: The closed set of intents
    /// - `Event`: The events a decision can produce
    /// - `Environment`: Injected collaborators (for example an id generator)
    ///
    /// # Suppression
    ///
    /// Returning an empty [`Events`] silently absorbs the command. There is
    /// no error channel: a command that does not apply right now is simply
    /// a no-op.
    pub trait Guard {
        /// The state type decisions are made against
        type State;

        /// The command type this guard accepts
        type Command;

        /// The event type this guard produces
        type Event;

        /// The environment type with injected dependencies
        type Environment;

        /// Decide which events a command produces given the latest state
        fn guard(
            &self,
            state: &Self::State,
            command: &Self::Command,
            env: &Self::Environment,
        ) -> Events<Self::Event>;
    }
}

/// Kind module - stable tags for commands and events
pub mod kind {
    /// A stable, human-readable tag for a command or event variant
    ///
    /// Used as a log field and metric label. Usually derived with
    /// `#[derive(Kind)]` from `rxstore-macros`.
    pub trait Kind {
        /// The tag of this value's variant (`"increment"`, `"was-reset"`, ...)
        fn kind(&self) -> &'static str;
    }
}

pub use environment::{IdGenerator, ItemId, SequentialIds};
pub use guard::Guard;
pub use kind::Kind;
pub use reducer::Reducer;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TallyState {
        total: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TallyEvent {
        Added(u32),
        Cleared,
    }

    enum TallyCommand {
        Add(u32),
        Clear,
    }

    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = TallyState;
        type Event = TallyEvent;

        fn reduce(&self, state: &mut TallyState, event: TallyEvent) {
            match event {
                TallyEvent::Added(n) => state.total += n,
                TallyEvent::Cleared => state.total = 0,
            }
        }
    }

    struct TallyGuard;

    impl Guard for TallyGuard {
        type State = TallyState;
        type Command = TallyCommand;
        type Event = TallyEvent;
        type Environment = ();

        fn guard(&self, state: &TallyState, command: &TallyCommand, _env: &()) -> Events<TallyEvent> {
            match command {
                TallyCommand::Add(0) => Events::new(),
                TallyCommand::Add(n) => smallvec![TallyEvent::Added(*n)],
                TallyCommand::Clear if state.total == 0 => Events::new(),
                TallyCommand::Clear => smallvec![TallyEvent::Cleared],
            }
        }
    }

    #[test]
    fn guard_suppresses_inapplicable_commands() {
        let state = TallyState::default();
        assert!(TallyGuard.guard(&state, &TallyCommand::Add(0), &()).is_empty());
        assert!(TallyGuard.guard(&state, &TallyCommand::Clear, &()).is_empty());
    }

    #[test]
    fn guard_then_reduce() {
        let mut state = TallyState::default();
        for command in [TallyCommand::Add(3), TallyCommand::Add(4), TallyCommand::Clear, TallyCommand::Add(2)] {
            for event in TallyGuard.guard(&state, &command, &()) {
                TallyReducer.reduce(&mut state, event);
            }
        }
        assert_eq!(state, TallyState { total: 2 });
    }
}
