//! Snapshots bundled with the handle that issues commands.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A state snapshot carrying its own command handle
///
/// Lets a caller read a snapshot and act on the same entity without
/// holding the store separately. The snapshot is a convenience view, not a
/// second source of truth: it never changes after creation.
///
/// # Example
///
/// ```ignore
/// let counter = CounterStore::new();
/// counter.start()?;
///
/// let snapshot = counter.snapshot();
/// assert_eq!(snapshot.count, 0);
/// snapshot.commands().increment();
/// assert_eq!(counter.snapshot().count, 1);
/// ```
pub struct Bound<S, H> {
    state: Rc<S>,
    handle: H,
}

impl<S, H> Bound<S, H> {
    /// Bundle a snapshot with its handle
    #[must_use]
    pub const fn new(state: Rc<S>, handle: H) -> Self {
        Self { state, handle }
    }

    /// The handle that issues commands to the snapshot's entity
    #[must_use]
    pub const fn commands(&self) -> &H {
        &self.handle
    }

    /// The shared snapshot
    #[must_use]
    pub fn state(&self) -> Rc<S> {
        Rc::clone(&self.state)
    }

    /// Split into snapshot and handle
    #[must_use]
    pub fn into_parts(self) -> (Rc<S>, H) {
        (self.state, self.handle)
    }
}

impl<S, H> Deref for Bound<S, H> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

impl<S, H: Clone> Clone for Bound<S, H> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            handle: self.handle.clone(),
        }
    }
}

impl<S: fmt::Debug, H> fmt::Debug for Bound<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bound").field(&self.state).finish()
    }
}
