//! # Immutable handler snapshots.
//!
//! A [`Snapshot`] is the ordered set of handlers subscribed to one event type at one
//! point in time. Snapshots are never mutated: every subscribe/unsubscribe builds a
//! brand-new snapshot from the previous one and swaps it into the dispatcher.
//!
//! ```text
//! v1: [h1, h2]          subscribe(h3)    v2: [h1, h2, h3]
//!                       ───────────────►
//! v2: [h1, h2, h3]      unsubscribe(h2)  v3: [h1, h3]
//!                       ───────────────►
//! ```
//!
//! A publisher that captured `v2` keeps iterating `v2` to the end, even after `v3`
//! has been installed.

use std::fmt;
use std::sync::Arc;

use crate::subscribers::SubscriptionId;

/// Shared handler callback: receives an immutable reference to the event, returns nothing.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

/// An `(id, handler)` pair.
///
/// Two entries holding the same handler under different ids are independent subscriptions.
pub struct HandlerEntry<E> {
    id: SubscriptionId,
    handler: Handler<E>,
}

impl<E> HandlerEntry<E> {
    pub(crate) fn new(id: SubscriptionId, handler: Handler<E>) -> Self {
        Self { id, handler }
    }

    /// Subscription id of this entry.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The subscribed callback.
    #[inline]
    pub fn handler(&self) -> &Handler<E> {
        &self.handler
    }

    #[inline]
    pub(crate) fn call(&self, event: &E) {
        (self.handler)(event)
    }
}

impl<E> Clone for HandlerEntry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<E> fmt::Debug for HandlerEntry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Immutable, insertion-ordered sequence of [`HandlerEntry`].
pub struct Snapshot<E> {
    entries: Box<[HandlerEntry<E>]>,
}

impl<E> Snapshot<E> {
    pub(crate) fn empty() -> Self {
        Self {
            entries: Box::default(),
        }
    }

    /// Builds `self + [entry]`.
    pub(crate) fn with_appended(&self, entry: HandlerEntry<E>) -> Self {
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.extend_from_slice(&self.entries);
        next.push(entry);
        Self {
            entries: next.into_boxed_slice(),
        }
    }

    /// Builds `self` without the entry for `id`, or `None` if `id` is absent.
    pub(crate) fn without(&self, id: SubscriptionId) -> Option<Self> {
        let index = self.position(id)?;
        let mut next = Vec::with_capacity(self.entries.len() - 1);
        next.extend_from_slice(&self.entries[..index]);
        next.extend_from_slice(&self.entries[index + 1..]);
        Some(Self {
            entries: next.into_boxed_slice(),
        })
    }

    fn position(&self, id: SubscriptionId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Number of subscribed handlers.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nobody is subscribed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the snapshot holds a subscription with `id`.
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.position(id).is_some()
    }

    /// Entries in delivery order.
    pub fn iter(&self) -> std::slice::Iter<'_, HandlerEntry<E>> {
        self.entries.iter()
    }

    /// Subscription ids in delivery order.
    pub fn ids(&self) -> impl Iterator<Item = SubscriptionId> + '_ {
        self.entries.iter().map(HandlerEntry::id)
    }
}

impl<'a, E> IntoIterator for &'a Snapshot<E> {
    type Item = &'a HandlerEntry<E>;
    type IntoIter = std::slice::Iter<'a, HandlerEntry<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E> fmt::Debug for Snapshot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
