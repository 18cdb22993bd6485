//! # Global registry - id allocation and dispatcher diagnostics.
//!
//! Holds the only process-wide state shared by all dispatchers:
//! - the subscription id counter (one sequence for every event type);
//! - a diagnostics list of registered dispatchers, keyed by event `TypeId`.
//!
//! ## Architecture
//! ```text
//! Dispatcher<A>::subscribe ──┐
//! Dispatcher<B>::subscribe ──┼──► next_id() ──► #1, #2, #3, ...  (AtomicU64)
//! Dispatcher<C>::subscribe ──┘
//!
//! Event::dispatcher() (first use) ──► register() ──► [ (TypeId, kind, Weak<dispatcher>), ... ]
//!                                                          ▲
//!                    registered() / lookup() / reset_all() ┘   (diagnostics, tests)
//! ```
//!
//! ## Rules
//! - `publish`/`subscribe`/`unsubscribe` never touch the diagnostics list.
//! - Registration happens once per singleton, on first use; explicit dispatchers
//!   register only when built with `DispatcherConfig::register = true`.
//! - Entries hold weak references: a registered dispatcher is still dropped (with its
//!   handlers) once its last handle goes away, and its entry is pruned.
//! - [`lookup`] returns the per-type singleton when one exists, else the first live
//!   explicit dispatcher registered for the type.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::RwLock;

use crate::dispatcher::Dispatcher;
use crate::subscribers::SubscriptionId;

/// Next subscription id; `0` is reserved for empty tokens.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

static REGISTRY: LazyLock<RwLock<Vec<Entry>>> = LazyLock::new(|| RwLock::new(Vec::new()));

/// Diagnostics operations of a dispatcher, erased over the event type.
pub(crate) trait ErasedDispatcher: Send + Sync {
    fn event_type(&self) -> &'static str;
    fn len(&self) -> usize;
    fn clear(&self);
}

/// How a dispatcher came to be registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Registration {
    /// The per-type singleton behind [`Event::dispatcher`](crate::Event::dispatcher).
    Singleton,
    /// A dispatcher built with `register(true)`.
    Explicit,
}

struct Entry {
    type_id: TypeId,
    kind: Registration,
    handle: Weak<dyn Any + Send + Sync>,
    ops: Weak<dyn ErasedDispatcher>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.ops.strong_count() > 0
    }
}

/// A registered dispatcher, as reported by [`registered`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredDispatcher {
    /// `TypeId` of the event type.
    pub type_id: TypeId,
    /// Dispatcher label (the event type name unless configured otherwise).
    pub event_type: &'static str,
    /// Subscribers in the dispatcher's current snapshot.
    pub subscribers: usize,
}

/// Allocates the next subscription id.
#[inline]
pub(crate) fn next_id() -> SubscriptionId {
    SubscriptionId::from_raw(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Adds a dispatcher to the diagnostics list, pruning entries of dropped dispatchers.
pub(crate) fn register<E>(dispatcher: &Dispatcher<E>, kind: Registration)
where
    E: Send + Sync + 'static,
{
    let entry = Entry {
        type_id: TypeId::of::<E>(),
        kind,
        handle: dispatcher.downgrade_any(),
        ops: dispatcher.erased(),
    };

    tracing::debug!(event_type = dispatcher.label(), ?kind, "dispatcher registered");
    let mut entries = REGISTRY.write();
    entries.retain(Entry::is_live);
    entries.push(entry);
}

/// Returns the registered dispatcher for `E`, if any.
///
/// For types declared with [`event!`](crate::event) this is the per-type singleton
/// once it has been used, even if explicit dispatchers for `E` were registered
/// earlier. Otherwise it is the first explicit dispatcher for `E` still alive.
pub fn lookup<E>() -> Option<Dispatcher<E>>
where
    E: Send + Sync + 'static,
{
    let type_id = TypeId::of::<E>();
    let candidates: Vec<(Registration, Arc<dyn Any + Send + Sync>)> = REGISTRY
        .read()
        .iter()
        .filter(|entry| entry.type_id == type_id)
        .filter_map(|entry| Some((entry.kind, entry.handle.upgrade()?)))
        .collect();

    let pick = candidates
        .iter()
        .position(|(kind, _)| *kind == Registration::Singleton)
        .unwrap_or(0);
    let (_, handle) = candidates.into_iter().nth(pick)?;
    Dispatcher::from_any(handle)
}

/// Lists every live registered dispatcher in registration order.
pub fn registered() -> Vec<RegisteredDispatcher> {
    live()
        .into_iter()
        .map(|(type_id, ops)| RegisteredDispatcher {
            type_id,
            event_type: ops.event_type(),
            subscribers: ops.len(),
        })
        .collect()
}

/// Clears the snapshot of every live registered dispatcher.
///
/// Intended for test harnesses that need a clean slate between runs. Outstanding
/// tokens stay valid and become no-ops. Hooks are left in place.
pub fn reset_all() {
    for (_, dispatcher) in live() {
        dispatcher.clear();
    }
}

/// Upgrades every live entry; the handles are released after the lock.
fn live() -> Vec<(TypeId, Arc<dyn ErasedDispatcher>)> {
    REGISTRY
        .read()
        .iter()
        .filter_map(|entry| Some((entry.type_id, entry.ops.upgrade()?)))
        .collect()
}
