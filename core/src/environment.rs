//! Injected collaborators for guards.
//!
//! Guards stay pure by receiving anything non-deterministic (ids, today)
//! through their environment instead of reaching for globals.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

/// Identifier of a child entity, minted once and never reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Id generator trait - abstracts id minting for testability
///
/// # Examples
///
/// ```
/// use rxstore_core::environment::{IdGenerator, ItemId, SequentialIds};
///
/// let ids = SequentialIds::new();
/// assert_eq!(ids.next_id(), ItemId::new(1));
/// assert_eq!(ids.next_id(), ItemId::new(2));
/// ```
pub trait IdGenerator {
    /// Mint the next id. Never returns the same id twice.
    fn next_id(&self) -> ItemId;
}

/// Monotonically increasing ids, one sequence per owner
///
/// Lives as long as whatever owns it (typically one list factory) and is
/// never reset. Uses a [`Cell`], so it is `!Sync`: the whole propagation
/// model is single-threaded.
#[derive(Debug)]
pub struct SequentialIds {
    next: Cell<u64>,
}

impl SequentialIds {
    /// A sequence starting at 1
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// A sequence starting at `first`
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: Cell::new(first),
        }
    }

    /// The id the next call to [`IdGenerator::next_id`] will return
    #[must_use]
    pub fn peek(&self) -> ItemId {
        ItemId(self.next.get())
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> ItemId {
        let id = self.next.get();
        self.next.set(id + 1);
        ItemId(id)
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for std::rc::Rc<T> {
    fn next_id(&self) -> ItemId {
        (**self).next_id()
    }
}
