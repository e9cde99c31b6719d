//! Ownership arena for dynamically created child stores.
//!
//! A parent that spawns children at runtime keeps them here, each next to
//! the subscription that folds the child's state back into the parent.
//! Removing a child tears that subscription down, so a retired child can
//! never write into its former parent.

use crate::port::Subscription;
use std::collections::BTreeMap;
use std::fmt;

struct Child<H> {
    handle: H,
    fold: Subscription,
}

/// Ordered map from key to child handle plus its fold subscription
///
/// `H` is whatever the parent hands out for a child: a bare
/// [`Store`](crate::Store) or a domain wrapper carrying its ports.
/// Iteration follows key order; with monotonically minted keys that is
/// creation order.
pub struct Arena<K, H> {
    children: BTreeMap<K, Child<H>>,
}

impl<K: Ord + Copy, H> Arena<K, H> {
    /// An empty arena
    #[must_use]
    pub const fn new() -> Self {
        Self {
            children: BTreeMap::new(),
        }
    }

    /// Take ownership of a child and the subscription folding it into the
    /// parent
    ///
    /// A child already under `key` is replaced and its fold detached.
    pub fn adopt(&mut self, key: K, handle: H, fold: Subscription) {
        if let Some(previous) = self.children.insert(key, Child { handle, fold }) {
            previous.fold.unsubscribe();
        }
    }

    /// Release a child, detaching its fold subscription
    pub fn release(&mut self, key: &K) -> Option<H> {
        let child = self.children.remove(key)?;
        child.fold.unsubscribe();
        Some(child.handle)
    }

    /// Look up a child
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&H> {
        self.children.get(key).map(|child| &child.handle)
    }

    /// Number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the arena is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.children.keys().copied()
    }
}

impl<K: Ord + Copy, H> Default for Arena<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, H> fmt::Debug for Arena<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("keys", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}
