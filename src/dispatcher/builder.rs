use crate::error::HandlerPanic;
use crate::hooks::PanicHook;

use super::config::DispatcherConfig;
use super::core::Dispatcher;
use super::snapshot::HandlerEntry;

/// Builder for constructing a [`Dispatcher`] with optional settings.
pub struct DispatcherBuilder<E> {
    cfg: DispatcherConfig,
    panic_hook: Option<Box<PanicHook<E>>>,
}

impl<E: Send + Sync + 'static> DispatcherBuilder<E> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self {
            cfg,
            panic_hook: None,
        }
    }

    /// Sets the label used in logs and failure reports.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.cfg.label = Some(label);
        self
    }

    /// Installs a local exception hook from the start.
    ///
    /// Equivalent to calling `Dispatcher::set_panic_hook` right after `build`.
    pub fn with_panic_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&E, &HandlerEntry<E>, &HandlerPanic) + Send + Sync + 'static,
    {
        self.panic_hook = Some(Box::new(hook));
        self
    }

    /// Makes the dispatcher visible to [`registry`](crate::registry) diagnostics.
    pub fn register(mut self, register: bool) -> Self {
        self.cfg.register = register;
        self
    }

    /// Builds and returns the dispatcher.
    pub fn build(self) -> Dispatcher<E> {
        Dispatcher::from_parts(self.cfg, self.panic_hook)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Alarm;

    #[test]
    fn test_builder_defaults_match_new() {
        let built = Dispatcher::<Alarm>::builder().build();
        let plain = Dispatcher::<Alarm>::new();
        assert_eq!(built.label(), plain.label());
        assert!(built.is_empty());
    }

    #[test]
    fn test_builder_label_and_hook() {
        let failures = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&failures);

        let dispatcher = Dispatcher::<Alarm>::builder()
            .with_label("alarm")
            .with_panic_hook(move |_, _, failure| {
                assert_eq!(failure.event_type(), "alarm");
                f.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        dispatcher.subscribe(|_| panic!("sensor offline"));
        dispatcher.publish(&Alarm);

        assert_eq!(dispatcher.label(), "alarm");
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }
}
