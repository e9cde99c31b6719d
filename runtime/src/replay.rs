//! Replay-last shared values.

use crate::port::{Port, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

struct ReplayInner<T> {
    value: RefCell<Rc<T>>,
    live: Cell<bool>,
    changes: Port<T>,
}

/// A shared value that replays its latest state to every new subscriber
///
/// A replay starts *disconnected*: it holds a value but emits nothing and
/// [`Replay::latest`] returns `None`. [`Replay::connect`] makes it live and
/// delivers the current value to everyone already subscribed. From then on
/// a new subscriber immediately receives exactly one value (the current
/// one), never the history, followed by every later value.
///
/// Values are handed out as `Rc<T>` snapshots; setting a new value never
/// mutates a snapshot someone else is holding.
///
/// # Example
///
/// ```
/// use rxstore_runtime::Replay;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let count = Replay::new(0);
/// count.connect();
/// count.set(1);
/// count.set(2);
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// count.subscribe(move |n| sink.borrow_mut().push(*n));
/// count.set(3);
///
/// assert_eq!(*seen.borrow(), vec![2, 3]);
/// ```
pub struct Replay<T> {
    inner: Rc<ReplayInner<T>>,
}

impl<T: 'static> Replay<T> {
    /// Create a disconnected replay holding `initial`
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(ReplayInner {
                value: RefCell::new(Rc::new(initial)),
                live: Cell::new(false),
                changes: Port::new(),
            }),
        }
    }

    /// Go live and deliver the current value to existing subscribers
    ///
    /// Returns `false` (and does nothing) if already connected.
    pub fn connect(&self) -> bool {
        if self.inner.live.replace(true) {
            return false;
        }
        let current = self.get();
        self.inner.changes.publish(&current);
        true
    }

    /// Whether [`Replay::connect`] has been called
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.inner.live.get()
    }

    /// The held value, connected or not
    #[must_use]
    pub fn get(&self) -> Rc<T> {
        Rc::clone(&self.inner.value.borrow())
    }

    /// The current value if live, `None` before [`Replay::connect`]
    #[must_use]
    pub fn latest(&self) -> Option<Rc<T>> {
        self.is_live().then(|| self.get())
    }

    /// Replace the value and, if live, publish it
    pub fn set(&self, value: T) -> Rc<T> {
        let snapshot = Rc::new(value);
        // Release the borrow before observers run; they may read or set.
        *self.inner.value.borrow_mut() = Rc::clone(&snapshot);
        if self.is_live() {
            self.inner.changes.publish(&snapshot);
        }
        snapshot
    }

    /// Subscribe, receiving the current value first if live
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let observer = Rc::new(observer);
        let registered = Rc::clone(&observer);
        let subscription = self.inner.changes.subscribe(move |value| registered(value));
        if let Some(current) = self.latest() {
            observer(&current);
        }
        subscription
    }

    /// Later values only, without the replayed one
    #[must_use]
    pub fn changes(&self) -> Port<T> {
        self.inner.changes.clone()
    }
}

impl<T> Clone for Replay<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Replay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replay")
            .field("value", &self.inner.value.borrow())
            .field("live", &self.inner.live.get())
            .finish()
    }
}
