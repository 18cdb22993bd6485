//! # Scope-bound subscriptions.
//!
//! [`SubscriptionGuard`] disposes its subscription when dropped. Use it when a
//! subscription should live exactly as long as some owner (a component, a test, a
//! request scope).
//!
//! ## Example
//! ```rust
//! use fanout::Dispatcher;
//!
//! let dispatcher = Dispatcher::<&'static str>::new();
//! {
//!     let _guard = dispatcher.subscribe(|msg| println!("{msg}")).into_guard();
//!     assert_eq!(dispatcher.len(), 1);
//! }
//! assert!(dispatcher.is_empty());
//! ```

use super::token::SubscriptionToken;

/// Disposes the wrapped subscription on drop.
#[must_use = "dropping the guard disposes the subscription immediately"]
#[derive(Debug)]
pub struct SubscriptionGuard {
    token: SubscriptionToken,
    armed: bool,
}

impl SubscriptionGuard {
    pub(crate) fn new(token: SubscriptionToken) -> Self {
        Self { token, armed: true }
    }

    /// The underlying token.
    pub fn token(&self) -> &SubscriptionToken {
        &self.token
    }

    /// Releases the subscription from the guard without disposing it.
    pub fn detach(mut self) -> SubscriptionToken {
        self.armed = false;
        std::mem::take(&mut self.token)
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if self.armed {
            self.token.dispose();
        }
    }
}
