//! # Subscription ids and disposable tokens.
//!
//! [`SubscriptionToken`] is the capability returned by `subscribe`. It does not own the
//! handler; it only authorizes removing exactly one subscription from the dispatcher
//! that issued it.
//!
//! ## Rules
//! - `dispose()` is idempotent: 0, 1 or N calls (from any thread) end in the same state.
//! - Cloning a token does not duplicate the subscription; disposing any clone removes it.
//! - A default (empty) token refers to no dispatcher; `dispose()` is a no-op.
//! - Tokens hold a **weak** dispatcher reference, so a handler that captures its own
//!   token never keeps its dispatcher alive.
//!
//! ## Example
//! ```rust
//! use fanout::Dispatcher;
//!
//! let dispatcher = Dispatcher::<u32>::new();
//! let token = dispatcher.subscribe(|n: &u32| println!("got {n}"));
//! let copy = token.clone();
//!
//! assert_eq!(token, copy);
//! copy.dispose();
//! token.dispose(); // already removed: no-op
//! assert!(dispatcher.is_empty());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Weak;

use super::guard::SubscriptionGuard;

/// Globally unique, monotonically increasing subscription id.
///
/// Allocated from a single process-wide counter shared by every dispatcher, so ids
/// are totally ordered across event types. `0` is never allocated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Removal side of a dispatcher, erased over the event type.
pub(crate) trait Unsubscribe: Send + Sync {
    /// Removes the subscription if present; unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    /// Whether the current snapshot holds `id`.
    fn contains(&self, id: SubscriptionId) -> bool;
}

/// Disposable handle to a single subscription.
#[derive(Clone, Default)]
pub struct SubscriptionToken {
    id: SubscriptionId,
    dispatcher: Option<Weak<dyn Unsubscribe>>,
}

impl SubscriptionToken {
    pub(crate) fn new(id: SubscriptionId, dispatcher: Weak<dyn Unsubscribe>) -> Self {
        Self {
            id,
            dispatcher: Some(dispatcher),
        }
    }

    /// Id of the subscription this token refers to.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the subscription from its dispatcher.
    ///
    /// Safe to call any number of times, concurrently, or on a default token.
    /// A `publish` already in flight still delivers to the handler (it iterates the
    /// snapshot it captured); later publishes do not.
    pub fn dispose(&self) {
        if let Some(dispatcher) = self.dispatcher.as_ref().and_then(Weak::upgrade) {
            dispatcher.unsubscribe(self.id);
        }
    }

    /// Returns `true` while the subscription is part of the dispatcher's current snapshot.
    pub fn is_active(&self) -> bool {
        self.dispatcher
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|dispatcher| dispatcher.contains(self.id))
    }

    /// Converts the token into a guard that disposes the subscription on drop.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard::new(self)
    }

    fn dispatcher_addr(&self) -> Option<*const ()> {
        self.dispatcher
            .as_ref()
            .map(|weak| Weak::as_ptr(weak).cast::<()>())
    }
}

impl PartialEq for SubscriptionToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.dispatcher_addr() == other.dispatcher_addr()
    }
}

impl Eq for SubscriptionToken {}

impl Hash for SubscriptionToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.dispatcher_addr().hash(state);
    }
}

impl fmt::Debug for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionToken")
            .field("id", &self.id)
            .field("bound", &self.dispatcher.is_some())
            .finish()
    }
}
