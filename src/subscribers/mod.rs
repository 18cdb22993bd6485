//! # Subscription handles.
//!
//! A subscriber is any `Fn(&E)` closure registered on a [`Dispatcher`](crate::Dispatcher).
//! This module provides the handles returned to the subscribing side:
//!
//! - [`SubscriptionId`]: globally unique, monotonically increasing id;
//! - [`SubscriptionToken`]: idempotent, cloneable removal capability;
//! - [`SubscriptionGuard`]: RAII wrapper that disposes on drop.
//!
//! ## Architecture
//! ```text
//! subscribe(handler) ──► Dispatcher ──► SubscriptionToken { id, Weak<dispatcher> }
//!                                                │
//!                      token.dispose() ──────────┴──► dispatcher.unsubscribe(id)
//!                                                       (no-op if already gone)
//! ```

mod guard;
mod token;

pub use guard::SubscriptionGuard;
pub use token::{SubscriptionId, SubscriptionToken};

pub(crate) use token::Unsubscribe;
