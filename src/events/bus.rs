//! # Free functions over the per-type singletons.
//!
//! Shorthands for `E::dispatcher().subscribe(..)` / `.publish(..)`, for call sites that
//! name the event type through inference or a turbofish.
//!
//! ```text
//! subscribe::<E>(f) ──┐
//! publish(&e)       ──┼──► E::dispatcher() (OnceLock) ──► Dispatcher<E>
//! publish_with(..)  ──┘
//! ```

use crate::dispatcher::HandlerEntry;
use crate::error::HandlerPanic;
use crate::subscribers::SubscriptionToken;

use super::event::Event;

/// Subscribes `handler` to the singleton dispatcher of `E`.
pub fn subscribe<E, F>(handler: F) -> SubscriptionToken
where
    E: Event,
    F: Fn(&E) + Send + Sync + 'static,
{
    E::dispatcher().subscribe(handler)
}

/// Publishes `event` through the singleton dispatcher of `E`.
#[inline]
pub fn publish<E: Event>(event: &E) {
    E::dispatcher().publish(event);
}

/// Publishes `event` through the singleton dispatcher of `E`, with a one-shot
/// exception hook for this call.
pub fn publish_with<E, H>(event: &E, on_panic: H)
where
    E: Event,
    H: Fn(&E, &HandlerEntry<E>, &HandlerPanic),
{
    E::dispatcher().publish_with(event, on_panic);
}
