//! # fanout
//!
//! **fanout** is an in-process, per-event-type publish/subscribe core.
//!
//! It decouples producers and consumers of immutable event values inside one process:
//! producers call `publish(&event)`, consumers register `Fn(&E)` closures, and a
//! disposable token removes a subscription again.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   subscribe(h1)  subscribe(h2)         publish(&event)          token.dispose()
//!        │              │                      │                        │
//!        ▼              ▼                      ▼                        ▼
//! ┌───────────────────────────────────────────────────────────────────────────────┐
//! │  Dispatcher<E>                                                                │
//! │  - write_lock (writers only)       - snapshot: ArcSwap<Snapshot<E>>           │
//! │  - local panic hook (optional)                                                │
//! └──────┬───────────────────────────────────────────┬────────────────────────────┘
//!        │ copy-on-write + atomic swap               │ one atomic load, no lock
//!        ▼                                           ▼
//!   Snapshot v(n+1) = [h1, h2, h3]              Snapshot v(n) = [h1, h2]
//!                                                    │
//!                                     for entry: catch_unwind(entry.handler(&event))
//!                                                    │
//!                                                    └─ panic ─► call hook → local hook → global hook
//! ```
//!
//! ### Per-type singletons
//! ```text
//! event!(E) ──► impl Event for E ──► E::dispatcher() ──► OnceLock<Dispatcher<E>>
//!                                                            │ (first use)
//!                                                            └─► registry::register (diagnostics only)
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / functions                    |
//! |-------------------|--------------------------------------------------------------------|------------------------------------------|
//! | **Dispatch**      | Lock-free fan-out over immutable snapshots.                        | [`Dispatcher`], [`Snapshot`]             |
//! | **Subscriptions** | Idempotent, cloneable removal tokens and RAII guards.              | [`SubscriptionToken`], [`SubscriptionGuard`] |
//! | **Singletons**    | Lazily created per-type dispatchers.                               | [`Event`], [`event!`], [`publish`]       |
//! | **Failures**      | Panic isolation per handler, forwarded to optional hooks.          | [`HandlerPanic`], [`hooks`]              |
//! | **Errors**        | Typed argument errors.                                             | [`DispatchError`]                        |
//! | **Configuration** | Labels, initial hook, diagnostics registration.                    | [`DispatcherConfig`], [`DispatcherBuilder`] |
//! | **Diagnostics**   | Type → dispatcher registry for test harness resets.                | [`registry`]                             |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use fanout::{Event, event};
//!
//! #[derive(Debug, Clone)]
//! struct OrderPlaced { id: u64, total_cents: u64 }
//!
//! event!(OrderPlaced);
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let s = Arc::clone(&seen);
//! let token = fanout::subscribe(move |ev: &OrderPlaced| {
//!     assert!(ev.total_cents > 0);
//!     s.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! fanout::publish(&OrderPlaced { id: 1, total_cents: 1_250 });
//! token.dispose();
//! fanout::publish(&OrderPlaced { id: 2, total_cents: 990 });
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! assert!(OrderPlaced::dispatcher().is_empty());
//! ```
mod dispatcher;
mod error;
mod events;
mod subscribers;

pub mod hooks;
pub mod registry;

// ---- Public re-exports ----

pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, Handler, HandlerEntry, Snapshot};
pub use error::{DispatchError, HandlerPanic};
pub use events::{Event, publish, publish_with, subscribe};
pub use subscribers::{SubscriptionGuard, SubscriptionId, SubscriptionToken};
