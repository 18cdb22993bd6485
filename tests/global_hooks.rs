use std::sync::{Arc, Mutex};

use fanout::{Dispatcher, HandlerPanic, hooks};
use serial_test::serial;

#[derive(Debug, Clone, PartialEq)]
struct Reading(u32);

fn install_global(log: &Arc<Mutex<Vec<String>>>) {
    let log = Arc::clone(log);
    hooks::set_global_panic_hook(move |event, failure: &HandlerPanic| {
        let value = event.downcast_ref::<Reading>().map(|r| r.0);
        log.lock()
            .unwrap()
            .push(format!("global:{value:?}:{}", failure.message()));
    });
}

#[test]
#[serial]
fn no_hooks_means_failures_are_silent() {
    hooks::clear_global_panic_hook();
    assert!(!hooks::has_global_panic_hook());

    let dispatcher = Dispatcher::<Reading>::new();
    dispatcher.subscribe(|_| panic!("unobserved"));

    dispatcher.publish(&Reading(1));
}

#[test]
#[serial]
fn local_hook_runs_before_global_hook() {
    let log = Arc::new(Mutex::new(Vec::new()));
    install_global(&log);

    let dispatcher = Dispatcher::<Reading>::new();
    let l = Arc::clone(&log);
    dispatcher.set_panic_hook(move |ev, _, failure| {
        l.lock()
            .unwrap()
            .push(format!("local:{:?}:{}", Some(ev.0), failure.message()));
    });
    dispatcher.subscribe(|_| panic!("sensor"));

    dispatcher.publish(&Reading(3));
    hooks::clear_global_panic_hook();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["local:Some(3):sensor", "global:Some(3):sensor"]
    );
}

#[test]
#[serial]
fn override_local_and_global_run_in_order_once_each() {
    let log = Arc::new(Mutex::new(Vec::new()));
    install_global(&log);

    let dispatcher = Dispatcher::<Reading>::new();
    let l = Arc::clone(&log);
    dispatcher.set_panic_hook(move |_, _, _| l.lock().unwrap().push("local".to_string()));
    dispatcher.subscribe(|_| panic!("x"));

    let l = Arc::clone(&log);
    dispatcher.publish_with(&Reading(9), move |_, _, _| {
        l.lock().unwrap().push("call".to_string())
    });
    hooks::clear_global_panic_hook();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["call", "local", "global:Some(9):x"]
    );
}

#[test]
#[serial]
fn global_hook_sees_every_failure_across_types() {
    let log = Arc::new(Mutex::new(Vec::new()));
    install_global(&log);

    let readings = Dispatcher::<Reading>::new();
    let labels = Dispatcher::<String>::builder().with_label("labels").build();
    readings.subscribe(|_| panic!("a"));
    readings.subscribe(|_| {});
    readings.subscribe(|_| panic!("b"));
    labels.subscribe(|_| panic!("c"));

    readings.publish(&Reading(1));
    labels.publish(&"x".to_string());
    hooks::clear_global_panic_hook();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["global:Some(1):a", "global:Some(1):b", "global:None:c"]
    );
}

#[test]
#[serial]
fn panicking_global_hook_does_not_escape_publish() {
    hooks::set_global_panic_hook(|_, _| panic!("global hook broke"));

    let dispatcher = Dispatcher::<Reading>::new();
    let after = Arc::new(Mutex::new(0));
    dispatcher.subscribe(|_| panic!("first"));
    let a = Arc::clone(&after);
    dispatcher.subscribe(move |_| *a.lock().unwrap() += 1);

    dispatcher.publish(&Reading(0));
    hooks::clear_global_panic_hook();

    assert_eq!(*after.lock().unwrap(), 1);
}

#[test]
#[serial]
fn replacing_global_hook_uses_latest() {
    let first = Arc::new(Mutex::new(0));
    let second = Arc::new(Mutex::new(0));

    let f = Arc::clone(&first);
    hooks::set_global_panic_hook(move |_, _| *f.lock().unwrap() += 1);
    let s = Arc::clone(&second);
    hooks::set_global_panic_hook(move |_, _| *s.lock().unwrap() += 1);

    let dispatcher = Dispatcher::<Reading>::new();
    dispatcher.subscribe(|_| panic!("once"));
    dispatcher.publish(&Reading(0));
    hooks::clear_global_panic_hook();

    assert_eq!(*first.lock().unwrap(), 0);
    assert_eq!(*second.lock().unwrap(), 1);
}
