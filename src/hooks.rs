//! # Exception hooks.
//!
//! A handler that panics during `publish` is isolated: the panic is caught at the
//! handler boundary and described as a [`HandlerPanic`]. The failure is then forwarded,
//! in this order, to:
//!
//! 1. the **call override** passed to `publish_with` (if any);
//! 2. the **local hook** of the dispatcher (`Dispatcher::set_panic_hook`);
//! 3. the **global hook** shared by every dispatcher ([`set_global_panic_hook`]).
//!
//! Each applicable hook runs exactly once per failure. With no hooks installed the
//! failure is dropped silently; hooks are the only way to observe handler panics.
//!
//! ## Rules
//! - A panicking hook is caught and logged (`warn`); the remaining hooks and handlers still run.
//! - Hooks run synchronously on the publishing thread, between two handler invocations.
//!
//! ## Example
//! ```rust
//! use fanout::{Dispatcher, hooks};
//!
//! hooks::set_global_panic_hook(|_event, failure| {
//!     eprintln!("subscriber failed: {failure}");
//! });
//!
//! let dispatcher = Dispatcher::<u32>::new();
//! dispatcher.subscribe(|_| panic!("boom"));
//! dispatcher.publish(&1); // does not panic; the hook reports the failure
//!
//! hooks::clear_global_panic_hook();
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwapOption;

use crate::dispatcher::HandlerEntry;
use crate::error::{HandlerPanic, panic_message};

/// Per-call and per-dispatcher hook: `(event, failing entry, failure)`.
pub type PanicHook<E> = dyn Fn(&E, &HandlerEntry<E>, &HandlerPanic) + Send + Sync + 'static;

/// Process-wide hook: `(event as Any, failure)`.
///
/// The event can be recovered with `event.downcast_ref::<E>()`.
pub type GlobalPanicHook = dyn Fn(&dyn Any, &HandlerPanic) + Send + Sync + 'static;

static GLOBAL_HOOK: LazyLock<ArcSwapOption<Box<GlobalPanicHook>>> =
    LazyLock::new(ArcSwapOption::empty);

/// Installs the process-wide exception hook, replacing any previous one.
pub fn set_global_panic_hook<F>(hook: F)
where
    F: Fn(&dyn Any, &HandlerPanic) + Send + Sync + 'static,
{
    let hook: Box<GlobalPanicHook> = Box::new(hook);
    GLOBAL_HOOK.store(Some(Arc::new(hook)));
}

/// Removes the process-wide exception hook.
pub fn clear_global_panic_hook() {
    GLOBAL_HOOK.store(None);
}

/// Returns `true` if a process-wide exception hook is installed.
pub fn has_global_panic_hook() -> bool {
    GLOBAL_HOOK.load().is_some()
}

/// Forwards a failure to the global hook, if one is installed.
pub(crate) fn notify_global(event: &dyn Any, failure: &HandlerPanic) {
    if let Some(hook) = GLOBAL_HOOK.load_full() {
        run_guarded("global", failure, || (**hook)(event, failure));
    }
}

/// Runs a hook, containing any panic it raises.
pub(crate) fn run_guarded(hook: &'static str, failure: &HandlerPanic, f: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        tracing::warn!(
            hook,
            event_type = failure.event_type(),
            subscription = %failure.subscription(),
            panic = %panic_message(payload.as_ref()),
            "exception hook panicked"
        );
    }
}
