//! Event types: the [`Event`] trait, the [`event!`](crate::event) macro and free
//! functions that route through per-type singleton dispatchers.
//!
//! ## Contents
//! - [`Event`] marks a type as having a process-wide dispatcher
//! - [`subscribe`], [`publish`], [`publish_with`] shorthands over `E::dispatcher()`

mod bus;
mod event;

pub use bus::{publish, publish_with, subscribe};
pub use event::Event;
