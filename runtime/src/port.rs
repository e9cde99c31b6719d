//! Synchronous multicast ports.
//!
//! A [`Port`] is the push-based subject every store is built from: command
//! ports, event ports and the update port are all ports. Publishing calls
//! every observer, in subscription order, before returning.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Observer<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    observers: RefCell<Vec<(u64, Observer<T>)>>,
    next_id: Cell<u64>,
}

/// Type-erased removal, so a [`Subscription`] does not carry `T`
trait Detach {
    fn detach(&self, id: u64) -> bool;
    fn contains(&self, id: u64) -> bool;
}

impl<T> Detach for Registry<T> {
    fn detach(&self, id: u64) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|(observer_id, _)| *observer_id == id)
    }
}

/// A synchronous multicast subject
///
/// Cloning a port yields another handle to the same observer list.
///
/// # Reentrancy
///
/// Observers may publish to any port (including this one) and may
/// subscribe or unsubscribe while being notified. Each publish notifies the
/// observers registered when it began; observers added during a publish
/// first hear the next one.
///
/// # Example
///
/// ```
/// use rxstore_runtime::Port;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let port = Port::<u32>::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// port.subscribe(move |n| sink.borrow_mut().push(*n));
///
/// port.publish(&1);
/// port.publish(&2);
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub struct Port<T> {
    registry: Rc<Registry<T>>,
}

impl<T: 'static> Port<T> {
    /// Create a port with no observers
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Deliver a value to every current observer
    pub fn publish(&self, value: &T) {
        // Snapshot so observers can touch the registry while we iterate.
        let observers: Vec<Observer<T>> = self
            .registry
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();

        for observer in observers {
            observer(value);
        }
    }

    /// Register an observer for every subsequent value
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        let observer: Observer<T> = Rc::new(observer);
        self.registry.observers.borrow_mut().push((id, observer));

        let registry: Weak<dyn Detach> = Rc::downgrade(&self.registry) as Weak<dyn Detach>;
        Subscription { registry, id }
    }

    /// Number of registered observers
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.registry.observers.borrow().len()
    }

    /// A derived port carrying only the values `select` maps to `Some`
    ///
    /// This is how a store exposes one port per command or event kind:
    ///
    /// ```ignore
    /// let increments = store.commands().filter_map(|c| match c {
    ///     CounterCommand::Increment => Some(()),
    ///     _ => None,
    /// });
    /// ```
    #[must_use]
    pub fn filter_map<U, F>(&self, select: F) -> Port<U>
    where
        U: 'static,
        F: Fn(&T) -> Option<U> + 'static,
    {
        let derived = Port::new();
        let downstream = derived.clone();
        self.subscribe(move |value| {
            if let Some(out) = select(value) {
                downstream.publish(&out);
            }
        });
        derived
    }
}

impl<T: 'static> Default for Port<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Port<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for Port<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("observers", &self.registry.observers.borrow().len())
            .finish()
    }
}

/// Handle to one registered observer
///
/// Dropping a subscription does **not** detach the observer; call
/// [`Subscription::unsubscribe`] for that. Stores run for the life of the
/// process unless something explicitly tears a wiring down.
pub struct Subscription {
    registry: Weak<dyn Detach>,
    id: u64,
}

impl Subscription {
    /// Detach the observer. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.detach(self.id))
    }

    /// Whether the observer is still registered on a live port
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
