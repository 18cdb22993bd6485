//! # Event types and their per-type dispatchers.
//!
//! Any `Send + Sync + 'static` type can be dispatched through an explicit
//! [`Dispatcher`]. Implementing [`Event`] additionally gives the type a process-wide
//! dispatcher that is created on first use and lives until the process exits.
//!
//! [`event!`](crate::event) implements [`Event`] for concrete types; each expansion owns a
//! `std::sync::OnceLock`, so creation is thread-safe and the hot path does no lookup.
//!
//! ## Example
//! ```rust
//! use fanout::{Event, event};
//!
//! #[derive(Debug, Clone)]
//! pub struct PlayerJoined { pub name: String }
//!
//! event!(PlayerJoined);
//!
//! let token = PlayerJoined::dispatcher().subscribe(|ev: &PlayerJoined| {
//!     println!("welcome, {}", ev.name);
//! });
//! PlayerJoined::dispatcher().publish(&PlayerJoined { name: "ada".into() });
//! token.dispose();
//!
//! assert!(std::ptr::eq(PlayerJoined::dispatcher(), PlayerJoined::dispatcher()));
//! ```

use crate::dispatcher::Dispatcher;

/// An event type with a process-wide dispatcher.
///
/// Implement with [`event!`](crate::event) rather than by hand.
pub trait Event: Send + Sync + Sized + 'static {
    /// The per-type singleton dispatcher, created (and registered) on first call.
    fn dispatcher() -> &'static Dispatcher<Self>;
}

impl<E: Event> Dispatcher<E> {
    /// The per-type singleton for `E`; same as [`Event::dispatcher`].
    #[inline]
    pub fn instance() -> &'static Dispatcher<E> {
        E::dispatcher()
    }
}

/// Implements [`Event`] for one or more concrete types.
///
/// ```rust
/// use fanout::event;
///
/// struct Opened;
/// struct Closed { code: u16 }
///
/// event!(Opened, Closed);
/// ```
#[macro_export]
macro_rules! event {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Event for $ty {
                fn dispatcher() -> &'static $crate::Dispatcher<Self> {
                    static DISPATCHER: ::std::sync::OnceLock<$crate::Dispatcher<$ty>> =
                        ::std::sync::OnceLock::new();
                    DISPATCHER.get_or_init($crate::Dispatcher::<$ty>::singleton)
                }
            }
        )+
    };
}
