//! Error types used by the dispatcher.
//!
//! This module defines:
//!
//! - [`DispatchError`]: errors returned directly to the caller of a dispatcher operation.
//! - [`HandlerPanic`]: a description of a handler that panicked during `publish`.
//!
//! Only [`DispatchError`] ever surfaces as a `Result` to the caller. A [`HandlerPanic`]
//! is never returned from `publish`; it is handed to the configured exception hooks
//! (or dropped when none are installed).

use std::any::Any;

use thiserror::Error;

use crate::subscribers::SubscriptionId;

/// # Errors produced by dispatcher operations.
///
/// These are argument errors detected at the call site. They fail fast and are never
/// swallowed by the dispatcher.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A subscription was requested without a handler.
    #[error("missing handler for `{event_type}` subscription")]
    MissingHandler {
        /// Label of the dispatcher that rejected the subscription.
        event_type: &'static str,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanout::DispatchError;
    ///
    /// let err = DispatchError::MissingHandler { event_type: "demo::Ping" };
    /// assert_eq!(err.as_label(), "dispatch_missing_handler");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::MissingHandler { .. } => "dispatch_missing_handler",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::MissingHandler { event_type } => {
                format!("subscribe called without a handler; event_type={event_type}")
            }
        }
    }
}

/// A handler panicked while an event was being published.
///
/// Built by the dispatcher from the unwind payload and passed by reference to every
/// exception hook that applies to the failed invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler {subscription} for `{event_type}` panicked: {message}")]
pub struct HandlerPanic {
    event_type: &'static str,
    subscription: SubscriptionId,
    message: String,
}

impl HandlerPanic {
    pub(crate) fn new(
        event_type: &'static str,
        subscription: SubscriptionId,
        payload: &(dyn Any + Send),
    ) -> Self {
        Self {
            event_type,
            subscription,
            message: panic_message(payload),
        }
    }

    /// Label of the dispatcher the failing handler was subscribed to.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// Subscription id of the failing handler.
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Panic message, or `"unknown panic"` for non-string payloads.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handler_label_and_message() {
        let err = DispatchError::MissingHandler { event_type: "app::Ping" };
        assert_eq!(err.as_label(), "dispatch_missing_handler");
        assert!(err.as_message().contains("app::Ping"));
        assert_eq!(
            err.to_string(),
            "missing handler for `app::Ping` subscription"
        );
    }

    #[test]
    fn test_panic_message_from_str_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn test_panic_message_from_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(format!("code {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "code 7");
    }

    #[test]
    fn test_panic_message_from_opaque_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_handler_panic_display() {
        let payload: Box<dyn Any + Send> = Box::new("bad input");
        let failure = HandlerPanic::new("app::Ping", SubscriptionId::from_raw(9), payload.as_ref());
        assert_eq!(failure.event_type(), "app::Ping");
        assert_eq!(failure.subscription(), SubscriptionId::from_raw(9));
        assert_eq!(failure.message(), "bad input");
        assert_eq!(
            failure.to_string(),
            "handler #9 for `app::Ping` panicked: bad input"
        );
    }
}
