//! # Per-event-type dispatcher.
//!
//! [`Dispatcher<E>`] stores the subscriptions for one event type and fans each
//! published event out to all of them.
//!
//! ## Architecture
//! ```text
//!  writers (rare)                                  readers (hot)
//!  subscribe / unsubscribe / clear                 publish(&event)
//!        │                                              │
//!        ▼                                              ▼
//!  lock(write_lock)                              snapshot.load_full()   (one atomic load)
//!  next = current.with_appended(..)                     │
//!       | current.without(id)                    for entry in snapshot:
//!  snapshot.swap(next) ───────────────────►          catch_unwind(entry(&event))
//!  unlock; drop(previous)                               └─ Err ─► call hook → local hook → global hook
//! ```
//!
//! ## Rules
//! - A published snapshot is immutable and complete; readers never lock.
//! - `publish` captures exactly one snapshot and iterates it in subscription order.
//! - Writers serialize through one mutex per dispatcher; no update is lost.
//! - `unsubscribe` of an unknown id is a no-op.
//! - A panicking handler never stops its siblings and never escapes `publish`.
//!
//! ## Reentrancy
//! Handlers may subscribe, unsubscribe or publish from inside a handler. Changes made
//! during a publish apply from the next publish on: a handler added mid-publish is not
//! called by the current one, and a handler removed mid-publish is still called if it
//! was in the captured snapshot.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::Mutex;

use crate::error::{DispatchError, HandlerPanic};
use crate::hooks::{self, PanicHook};
use crate::registry::{self, ErasedDispatcher, Registration};
use crate::subscribers::{SubscriptionId, SubscriptionToken, Unsubscribe};

use super::builder::DispatcherBuilder;
use super::config::DispatcherConfig;
use super::snapshot::{Handler, HandlerEntry, Snapshot};

struct Shared<E> {
    label: &'static str,
    snapshot: ArcSwap<Snapshot<E>>,
    write_lock: Mutex<()>,
    panic_hook: ArcSwapOption<Box<PanicHook<E>>>,
}

impl<E> Shared<E> {
    /// Swaps in the snapshot produced by `rebuild` and returns the previous one.
    ///
    /// `rebuild` returning `None` leaves the slot untouched. The previous snapshot is
    /// handed back so the caller drops it after the lock is released: dropping handler
    /// closures may dispose other subscriptions.
    fn replace<F>(&self, rebuild: F) -> Option<Arc<Snapshot<E>>>
    where
        F: FnOnce(&Snapshot<E>) -> Option<Snapshot<E>>,
    {
        let _writer = self.write_lock.lock();
        let current = self.snapshot.load();
        let next = rebuild(&**current)?;
        Some(self.snapshot.swap(Arc::new(next)))
    }

    fn remove(&self, id: SubscriptionId) {
        let previous = self.replace(|current| current.without(id));
        if previous.is_some() {
            tracing::trace!(event_type = self.label, subscription = %id, "unsubscribed");
        }
    }
}

impl<E: Send + Sync + 'static> Unsubscribe for Shared<E> {
    fn unsubscribe(&self, id: SubscriptionId) {
        self.remove(id);
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.snapshot.load().contains(id)
    }
}

impl<E: Send + Sync + 'static> ErasedDispatcher for Shared<E> {
    fn event_type(&self) -> &'static str {
        self.label
    }

    fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    fn clear(&self) {
        let previous = self.replace(|current| (!current.is_empty()).then(Snapshot::empty));
        if let Some(previous) = previous {
            tracing::trace!(event_type = self.label, removed = previous.len(), "cleared");
        }
    }
}

/// Subscription store and fan-out for events of type `E`.
///
/// Cloning a `Dispatcher` is cheap and yields another handle to the **same**
/// subscriptions. Use [`Dispatcher::new`] for an explicit instance, or declare the
/// type with [`event!`](crate::event) to get a lazily created per-type singleton.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use fanout::Dispatcher;
///
/// #[derive(Debug)]
/// struct Scored { points: u32 }
///
/// let total = Arc::new(AtomicU32::new(0));
/// let dispatcher = Dispatcher::<Scored>::new();
///
/// let t = Arc::clone(&total);
/// let token = dispatcher.subscribe(move |ev: &Scored| {
///     t.fetch_add(ev.points, Ordering::SeqCst);
/// });
///
/// dispatcher.publish(&Scored { points: 3 });
/// token.dispose();
/// dispatcher.publish(&Scored { points: 5 });
///
/// assert_eq!(total.load(Ordering::SeqCst), 3);
/// ```
pub struct Dispatcher<E> {
    shared: Arc<Shared<E>>,
}

impl<E> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: Send + Sync + 'static> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + Sync + 'static> Dispatcher<E> {
    /// Creates an empty, unregistered dispatcher with default configuration.
    pub fn new() -> Self {
        Self::from_parts(DispatcherConfig::default(), None)
    }

    /// Returns a builder for a dispatcher with custom configuration.
    pub fn builder() -> DispatcherBuilder<E> {
        DispatcherBuilder::new(DispatcherConfig::default())
    }

    pub(crate) fn from_parts(cfg: DispatcherConfig, panic_hook: Option<Box<PanicHook<E>>>) -> Self {
        let shared = Arc::new(Shared {
            label: cfg.label_for::<E>(),
            snapshot: ArcSwap::from_pointee(Snapshot::empty()),
            write_lock: Mutex::new(()),
            panic_hook: ArcSwapOption::new(panic_hook.map(Arc::new)),
        });
        let dispatcher = Self { shared };

        if cfg.register {
            registry::register(&dispatcher, Registration::Explicit);
        }
        dispatcher
    }

    /// Builds the registered instance backing a per-type singleton.
    ///
    /// Called by the code generated by [`event!`](crate::event); prefer
    /// [`Event::dispatcher`](crate::Event::dispatcher).
    #[doc(hidden)]
    pub fn singleton() -> Self {
        let dispatcher = Self::from_parts(DispatcherConfig::default(), None);
        tracing::debug!(event_type = dispatcher.label(), "creating dispatcher singleton");
        registry::register(&dispatcher, Registration::Singleton);
        dispatcher
    }

    /// Subscribes a closure; returns the token that removes it.
    ///
    /// Each call creates an independent subscription, even for the same closure value.
    /// The handler is called by every `publish` that starts after this returns.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionToken
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe_handler(Arc::new(handler))
    }

    /// Subscribes an already shared handler.
    ///
    /// Subscribing the same `Handler` several times yields several subscriptions;
    /// one publish then calls it once per subscription.
    pub fn subscribe_handler(&self, handler: Handler<E>) -> SubscriptionToken {
        let mut locked_id = SubscriptionId::default();
        let previous = self.shared.replace(|current| {
            locked_id = registry::next_id();
            Some(current.with_appended(HandlerEntry::new(locked_id, handler)))
        });
        drop(previous);

        tracing::trace!(event_type = self.shared.label, subscription = %locked_id, "subscribed");
        SubscriptionToken::new(locked_id, self.weak())
    }

    /// Subscribes a handler that may be absent.
    ///
    /// # Errors
    /// Returns [`DispatchError::MissingHandler`] when `handler` is `None`; nothing is
    /// subscribed and no id is consumed.
    pub fn try_subscribe(&self, handler: Option<Handler<E>>) -> Result<SubscriptionToken, DispatchError> {
        match handler {
            Some(handler) => Ok(self.subscribe_handler(handler)),
            None => Err(DispatchError::MissingHandler {
                event_type: self.shared.label,
            }),
        }
    }

    /// Removes the subscription with `id`; unknown or already removed ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.shared.remove(id);
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        ErasedDispatcher::clear(self.shared.as_ref());
    }

    /// Delivers `event` to every handler in the current snapshot.
    ///
    /// Never blocks, never allocates, never panics because of a handler. Handler
    /// panics are forwarded to the local and global hooks (see [`hooks`](crate::hooks)).
    #[inline]
    pub fn publish(&self, event: &E) {
        self.dispatch(event, None);
    }

    /// Like [`publish`](Self::publish), with a hook that sees handler panics of this
    /// call first, before the local and global hooks.
    pub fn publish_with<H>(&self, event: &E, on_panic: H)
    where
        H: Fn(&E, &HandlerEntry<E>, &HandlerPanic),
    {
        let on_panic: &dyn Fn(&E, &HandlerEntry<E>, &HandlerPanic) = &on_panic;
        self.dispatch(event, Some(on_panic));
    }

    fn dispatch(&self, event: &E, on_panic: Option<&dyn Fn(&E, &HandlerEntry<E>, &HandlerPanic)>) {
        let snapshot = self.shared.snapshot.load_full();
        for entry in snapshot.iter() {
            self.invoke(entry, event, on_panic);
        }
    }

    #[inline]
    fn invoke(
        &self,
        entry: &HandlerEntry<E>,
        event: &E,
        on_panic: Option<&dyn Fn(&E, &HandlerEntry<E>, &HandlerPanic)>,
    ) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| entry.call(event))) {
            let failure = HandlerPanic::new(self.shared.label, entry.id(), payload.as_ref());
            self.report(event, entry, &failure, on_panic);
        }
    }

    #[cold]
    fn report(
        &self,
        event: &E,
        entry: &HandlerEntry<E>,
        failure: &HandlerPanic,
        on_panic: Option<&dyn Fn(&E, &HandlerEntry<E>, &HandlerPanic)>,
    ) {
        if let Some(hook) = on_panic {
            hooks::run_guarded("call", failure, || hook(event, entry, failure));
        }
        if let Some(hook) = self.shared.panic_hook.load_full() {
            hooks::run_guarded("local", failure, || (**hook)(event, entry, failure));
        }
        hooks::notify_global(event as &dyn Any, failure);
    }

    /// Installs the local exception hook, replacing any previous one.
    pub fn set_panic_hook<H>(&self, hook: H)
    where
        H: Fn(&E, &HandlerEntry<E>, &HandlerPanic) + Send + Sync + 'static,
    {
        let hook: Box<PanicHook<E>> = Box::new(hook);
        self.shared.panic_hook.store(Some(Arc::new(hook)));
    }

    /// Removes the local exception hook.
    pub fn clear_panic_hook(&self) {
        self.shared.panic_hook.store(None);
    }

    /// The current snapshot. It stays valid (and unchanged) while held.
    pub fn snapshot(&self) -> Arc<Snapshot<E>> {
        self.shared.snapshot.load_full()
    }

    /// Number of current subscriptions.
    pub fn len(&self) -> usize {
        self.shared.snapshot.load().len()
    }

    /// Returns `true` if there are no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.shared.snapshot.load().is_empty()
    }

    /// Whether the subscription `id` is currently present.
    pub fn contains(&self, id: SubscriptionId) -> bool {
        Unsubscribe::contains(self.shared.as_ref(), id)
    }

    /// Label used in logs and failure reports.
    pub fn label(&self) -> &'static str {
        self.shared.label
    }

    /// Returns `true` if both handles refer to the same dispatcher.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub(crate) fn erased(&self) -> Weak<dyn ErasedDispatcher> {
        Arc::downgrade(&self.shared) as Weak<dyn ErasedDispatcher>
    }

    pub(crate) fn downgrade_any(&self) -> Weak<dyn Any + Send + Sync> {
        Arc::downgrade(&self.shared) as Weak<dyn Any + Send + Sync>
    }

    /// Rebuilds a handle from [`downgrade_any`](Self::downgrade_any) output; `None`
    /// if `handle` belongs to another event type.
    pub(crate) fn from_any(handle: Arc<dyn Any + Send + Sync>) -> Option<Self> {
        handle.downcast::<Shared<E>>().ok().map(|shared| Self { shared })
    }

    fn weak(&self) -> Weak<dyn Unsubscribe> {
        Arc::downgrade(&self.shared) as Weak<dyn Unsubscribe>
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("label", &self.shared.label)
            .field("subscribers", &self.shared.snapshot.load().len())
            .finish()
    }
}
