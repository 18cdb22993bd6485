//! # Dispatcher configuration.
//!
//! Provides [`DispatcherConfig`], the settings a [`Dispatcher`](crate::Dispatcher) is built with.
//!
//! ## Sentinel values
//! - `label = None` → the event type's `std::any::type_name`
//! - `register = false` → dispatcher is not visible to [`registry`](crate::registry)

/// Construction-time settings for a dispatcher.
///
/// ## Field semantics
/// - `label`: name used in logs, [`HandlerPanic::event_type`](crate::HandlerPanic::event_type)
///   and [`DispatchError`](crate::DispatchError) values
/// - `register`: add the dispatcher to the diagnostics registry on creation
///
/// Per-type singletons (see [`Event`](crate::Event)) always register.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Human-readable dispatcher name.
    pub label: Option<&'static str>,

    /// Whether to register the dispatcher for diagnostics (`registry::registered`,
    /// `registry::reset_all`).
    pub register: bool,
}

impl DispatcherConfig {
    /// Returns the configured label, falling back to the type name of `E`.
    #[inline]
    pub fn label_for<E>(&self) -> &'static str {
        self.label.unwrap_or_else(std::any::type_name::<E>)
    }
}
