//! Dispatcher core: snapshots, fan-out and configuration.
//!
//! The only public entry point is [`Dispatcher`]; the rest describe what it holds.
//!
//! Internal modules:
//! - [`snapshot`]: immutable handler arrays rebuilt on every subscription change;
//! - [`core`]: the dispatcher itself (copy-on-write writers, lock-free `publish`);
//! - [`config`]: construction-time settings;
//! - [`builder`]: fluent construction with label, hook and registration.

mod builder;
mod config;
mod core;
mod snapshot;

pub use builder::DispatcherBuilder;
pub use config::DispatcherConfig;
pub use self::core::Dispatcher;
pub use snapshot::{Handler, HandlerEntry, Snapshot};
