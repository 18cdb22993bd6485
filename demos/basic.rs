//! # Basic Example
//!
//! Shows per-type singleton dispatch, explicit dispatchers and panic hooks.
//!
//! Flow:
//! ```text
//! publish(&Temperature) ──► Temperature::dispatcher() ──► [logger, alarm]
//! publish(&Command)     ──► commands (explicit)       ──► [executor, faulty]
//!                                                              │ panic
//!                                                              ▼
//!                                            local hook ──► global hook
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use fanout::{Dispatcher, Event, event, hooks, registry};

#[derive(Debug, Clone)]
struct Temperature {
    sensor: &'static str,
    celsius: f32,
}

#[derive(Debug, Clone)]
struct Command {
    name: &'static str,
}

event!(Temperature);

fn main() {
    hooks::set_global_panic_hook(|event, failure| {
        let name = event
            .downcast_ref::<Command>()
            .map(|c| c.name)
            .unwrap_or("<other>");
        println!("[global] {failure} (command: {name})");
    });

    // Per-type singleton.
    let alarms = Arc::new(AtomicU32::new(0));
    let logger = fanout::subscribe(|t: &Temperature| {
        println!("[logger] {} = {:.1}°C", t.sensor, t.celsius);
    });
    let alarm = {
        let alarms = Arc::clone(&alarms);
        Temperature::dispatcher().subscribe(move |t| {
            if t.celsius > 30.0 {
                alarms.fetch_add(1, Ordering::Relaxed);
                println!("[alarm]  {} is too hot", t.sensor);
            }
        })
    };

    for (sensor, celsius) in [("kitchen", 21.5), ("attic", 34.0), ("garage", 12.0)] {
        fanout::publish(&Temperature { sensor, celsius });
    }

    alarm.dispose();
    fanout::publish(&Temperature {
        sensor: "attic",
        celsius: 40.0,
    });
    logger.dispose();

    // Explicit dispatcher with a local hook.
    let commands = Dispatcher::<Command>::builder()
        .with_label("commands")
        .with_panic_hook(|cmd: &Command, entry, failure| {
            println!("[local]  {} failed in {}: {}", cmd.name, entry.id(), failure.message());
        })
        .build();

    let _executor = commands
        .subscribe(|cmd| println!("[exec]   running {}", cmd.name))
        .into_guard();
    let faulty = commands.subscribe(|cmd| {
        if cmd.name == "reboot" {
            panic!("refusing to {}", cmd.name);
        }
    });

    commands.publish(&Command { name: "status" });
    commands.publish(&Command { name: "reboot" });
    faulty.dispose();
    commands.publish(&Command { name: "reboot" });

    println!();
    println!("Summary:");
    println!(" ├─► Alarms raised: {}", alarms.load(Ordering::Relaxed));
    println!(" ├─► {commands:?}");
    for entry in registry::registered() {
        println!(" └─► registered: {} ({} subscribers)", entry.event_type, entry.subscribers);
    }

    hooks::clear_global_panic_hook();
}
