//! The Store - runtime coordinator for a guard and a reducer.

use crate::error::StoreError;
use crate::port::{Port, Subscription};
use crate::replay::Replay;
use crate::StoreConfig;
use futures::Stream;
use rxstore_core::{Events, Guard, Kind, Reducer};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;
use tokio::sync::watch;

/// A new state paired with the event that produced it
pub struct Update<S, E> {
    /// The snapshot after folding `event`
    pub state: Rc<S>,
    /// The event that was folded
    pub event: E,
}

impl<S, E: Clone> Clone for Update<S, E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            event: self.event.clone(),
        }
    }
}

impl<S: fmt::Debug, E: fmt::Debug> fmt::Debug for Update<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("state", &self.state)
            .field("event", &self.event)
            .finish()
    }
}

struct Inner<S, C, E> {
    config: StoreConfig,
    commands: Port<C>,
    events: Port<E>,
    state: Replay<S>,
    updates: Port<Update<S, E>>,
    mirror: RefCell<Option<watch::Sender<S>>>,
    started: Cell<bool>,
    dispatching: Cell<bool>,
    pending: RefCell<VecDeque<E>>,
}

impl<S, C, E> Inner<S, C, E>
where
    S: Clone + 'static,
    C: Kind + 'static,
    E: Kind + Clone + 'static,
{
    fn fold<R>(&self, reducer: &R, event: &E)
    where
        R: Reducer<State = S, Event = E>,
    {
        if !self.started.get() {
            tracing::debug!(
                store = %self.config.name,
                kind = event.kind(),
                "Event dropped: store not started"
            );
            return;
        }

        let start = Instant::now();
        let mut next = S::clone(&self.state.get());
        reducer.reduce(&mut next, event.clone());
        let duration = start.elapsed();

        tracing::trace!(store = %self.config.name, kind = event.kind(), "Event folded");
        if self.config.metrics {
            metrics::counter!(
                "store.events.total",
                "store" => self.config.name.clone(),
                "kind" => event.kind()
            )
            .increment(1);
            metrics::histogram!("store.reducer.duration_seconds", "store" => self.config.name.clone())
                .record(duration.as_secs_f64());
        }

        // Mirror first: state observers may fold again before we return.
        if let Some(mirror) = self.mirror.borrow().as_ref() {
            mirror.send_replace(next.clone());
        }
        let state = self.state.set(next);
        self.updates.publish(&Update {
            state,
            event: event.clone(),
        });
    }

    fn dispatch(&self, events: &Events<E>) {
        for event in events {
            self.publish_event(event.clone());
        }
    }

    /// Publish on the event port, one event at a time
    ///
    /// Events raised while an event is being delivered wait in `pending`
    /// and go out, in order, once that delivery completes. Every observer
    /// of the event port therefore sees causes before their consequences.
    fn publish_event(&self, event: E) {
        if self.dispatching.replace(true) {
            self.pending.borrow_mut().push_back(event);
            return;
        }

        self.events.publish(&event);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(next) = next else {
                break;
            };
            self.events.publish(&next);
        }
        self.dispatching.set(false);
    }
}

/// The Store - one entity's command ports, event ports, reducer and state
///
/// The Store wires:
/// 1. Commands (combined with the latest state) through the guard
/// 2. Accepted events through the reducer
/// 3. Every folded snapshot out to state observers and the update port
///
/// Events raised by wirings while an event is being delivered are queued
/// and delivered after it, so the merged event port reads in causal order.
/// All of them are folded before [`Store::send`] returns to the outermost
/// caller.
///
/// Cloning a `Store` yields another handle to the same entity.
///
/// # Activation
///
/// A new store is wired but inert. Attach observers, then call
/// [`Store::start`] exactly once: the initial state is published and
/// commands start flowing. Commands sent before `start()` are lost, not
/// queued.
///
/// # Example
///
/// ```ignore
/// let store = Store::new(CounterState::default(), CounterReducer, CounterGuard, ());
/// store.start()?;
///
/// store.send(CounterCommand::Decrement); // suppressed: count is already 0
/// store.send(CounterCommand::Increment);
/// assert_eq!(store.current().count, 1);
/// ```
pub struct Store<S, C, E> {
    inner: Rc<Inner<S, C, E>>,
}

impl<S, C, E> Store<S, C, E>
where
    S: Clone + 'static,
    C: Kind + 'static,
    E: Kind + Clone + 'static,
{
    /// Create a new store with initial state, reducer, guard, and environment
    ///
    /// Uses [`StoreConfig::default`]. The store is not started.
    #[must_use]
    pub fn new<R, G>(initial_state: S, reducer: R, guard: G, environment: G::Environment) -> Self
    where
        R: Reducer<State = S, Event = E> + 'static,
        G: Guard<State = S, Command = C, Event = E> + 'static,
        G::Environment: 'static,
    {
        Self::build(initial_state, reducer, guard, environment, StoreConfig::default())
    }

    /// Create a new store with custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `config` fails validation.
    /// Nothing is wired in that case.
    pub fn with_config<R, G>(
        initial_state: S,
        reducer: R,
        guard: G,
        environment: G::Environment,
        config: StoreConfig,
    ) -> Result<Self, StoreError>
    where
        R: Reducer<State = S, Event = E> + 'static,
        G: Guard<State = S, Command = C, Event = E> + 'static,
        G::Environment: 'static,
    {
        config.validate()?;
        Ok(Self::build(initial_state, reducer, guard, environment, config))
    }

    fn build<R, G>(
        initial_state: S,
        reducer: R,
        guard: G,
        environment: G::Environment,
        config: StoreConfig,
    ) -> Self
    where
        R: Reducer<State = S, Event = E> + 'static,
        G: Guard<State = S, Command = C, Event = E> + 'static,
        G::Environment: 'static,
    {
        let store = Self {
            inner: Rc::new(Inner {
                config,
                commands: Port::new(),
                events: Port::new(),
                state: Replay::new(initial_state),
                updates: Port::new(),
                mirror: RefCell::new(None),
                started: Cell::new(false),
                dispatching: Cell::new(false),
                pending: RefCell::new(VecDeque::new()),
            }),
        };

        // The reducer must be the first event observer so later wirings
        // read a state that already includes the event.
        let weak = Rc::downgrade(&store.inner);
        store.inner.events.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.fold(&reducer, event);
            }
        });

        store.wire_guard(guard, environment);
        tracing::debug!(store = %store.inner.config.name, "Store wired");
        store
    }

    fn wire_guard<G>(&self, guard: G, environment: G::Environment)
    where
        G: Guard<State = S, Command = C, Event = E> + 'static,
        G::Environment: 'static,
    {
        let weak: Weak<Inner<S, C, E>> = Rc::downgrade(&self.inner);
        self.inner.commands.subscribe(move |command| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let Some(state) = inner.state.latest() else {
                tracing::debug!(
                    store = %inner.config.name,
                    kind = command.kind(),
                    "Command dropped: store not started"
                );
                if inner.config.metrics {
                    metrics::counter!("store.commands.dropped", "store" => inner.config.name.clone())
                        .increment(1);
                }
                return;
            };

            let events = guard.guard(&state, command, &environment);
            if events.is_empty() {
                tracing::debug!(
                    store = %inner.config.name,
                    kind = command.kind(),
                    "Command suppressed by guard"
                );
                if inner.config.metrics {
                    metrics::counter!(
                        "store.commands.suppressed",
                        "store" => inner.config.name.clone(),
                        "kind" => command.kind()
                    )
                    .increment(1);
                }
                return;
            }

            tracing::debug!(
                store = %inner.config.name,
                kind = command.kind(),
                events = events.len(),
                "Command accepted"
            );
            inner.dispatch(&events);
        });
    }

    /// Add an effect wiring from commands (combined with the latest state)
    /// to events
    ///
    /// Runs after the guard for every command. Like the guard, it never
    /// fires before [`Store::start`].
    pub fn wire_command<F>(&self, decide: F) -> Subscription
    where
        F: Fn(&C, &S) -> Events<E> + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        self.inner.commands.subscribe(move |command| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Some(state) = inner.state.latest() {
                inner.dispatch(&decide(command, &state));
            }
        })
    }

    /// Add an effect wiring from events (combined with the latest state)
    /// to further events
    ///
    /// The state passed in already includes the triggering event. Used for
    /// derived views; the wiring must not answer its own output forever.
    pub fn wire_event<F>(&self, react: F) -> Subscription
    where
        F: Fn(&E, &S) -> Events<E> + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        self.inner.events.subscribe(move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Some(state) = inner.state.latest() {
                inner.dispatch(&react(event, &state));
            }
        })
    }

    /// Activate the store
    ///
    /// Publishes the initial (or current) state to every state observer and
    /// opens the command gate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyStarted`] on any call after the first;
    /// such calls change nothing.
    pub fn start(&self) -> Result<(), StoreError> {
        if self.inner.started.replace(true) {
            tracing::warn!(store = %self.inner.config.name, "Store already started");
            return Err(StoreError::AlreadyStarted {
                store: self.inner.config.name.clone(),
            });
        }

        tracing::info!(store = %self.inner.config.name, "Store started");
        self.inner.state.connect();
        Ok(())
    }

    /// Whether [`Store::start`] has been called
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Send a command to the store
    ///
    /// Every matched wiring, fold and state observer runs before this
    /// returns. A command the guard rejects is silently absorbed.
    #[tracing::instrument(
        skip_all,
        name = "store_send",
        fields(store = %self.inner.config.name, kind = command.kind())
    )]
    pub fn send(&self, command: C) {
        if self.inner.config.metrics {
            metrics::counter!(
                "store.commands.total",
                "store" => self.inner.config.name.clone(),
                "kind" => command.kind()
            )
            .increment(1);
        }
        self.inner.commands.publish(&command);
    }

    /// Publish an event directly, bypassing every guard
    ///
    /// For internal wiring and tests. The reducer accepts it unconditionally
    /// (once started).
    pub fn emit(&self, event: E) {
        self.inner.publish_event(event);
    }

    /// The merged command port
    #[must_use]
    pub fn commands(&self) -> &Port<C> {
        &self.inner.commands
    }

    /// The merged event port
    #[must_use]
    pub fn events(&self) -> &Port<E> {
        &self.inner.events
    }

    /// The shared, replay-last state
    #[must_use]
    pub fn state(&self) -> &Replay<S> {
        &self.inner.state
    }

    /// Every folded snapshot together with its event
    #[must_use]
    pub fn updates(&self) -> &Port<Update<S, E>> {
        &self.inner.updates
    }

    /// The current snapshot (the initial state before `start()`)
    #[must_use]
    pub fn current(&self) -> Rc<S> {
        self.inner.state.get()
    }

    /// The store's configured name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// A handle that does not keep the store alive
    ///
    /// Wirings that point back at a parent (a child folding into its list,
    /// a store reacting to its own events) must hold one of these.
    #[must_use]
    pub fn downgrade(&self) -> WeakStore<S, C, E> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// A thread-safe, read-only mirror of the current snapshot
    ///
    /// The mirror is opt-in: it is created by the first call, seeded with
    /// the current snapshot, and only then kept up to date by every fold.
    /// Receivers always see the latest value; intermediate snapshots may be
    /// skipped.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<S> {
        self.inner
            .mirror
            .borrow_mut()
            .get_or_insert_with(|| watch::channel(S::clone(&self.inner.state.get())).0)
            .subscribe()
    }

    /// The mirror as a stream: the current snapshot, then each newer one
    ///
    /// Ends when the store is dropped.
    pub fn changes(&self) -> impl Stream<Item = S> + 'static {
        futures::stream::unfold((self.watch(), true), |(mut rx, first)| async move {
            if !first {
                rx.changed().await.ok()?;
            }
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, (rx, false)))
        })
    }
}

impl<S, C, E> Clone for Store<S, C, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Non-owning handle to a [`Store`], see [`Store::downgrade`]
pub struct WeakStore<S, C, E> {
    inner: Weak<Inner<S, C, E>>,
}

impl<S, C, E> WeakStore<S, C, E> {
    /// The store, if any strong handle is still alive
    #[must_use]
    pub fn upgrade(&self) -> Option<Store<S, C, E>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<S, C, E> Clone for WeakStore<S, C, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S, C, E> fmt::Debug for WeakStore<S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<S, C, E> fmt::Debug for Store<S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.config.name)
            .field("started", &self.inner.started.get())
            .finish_non_exhaustive()
    }
}
