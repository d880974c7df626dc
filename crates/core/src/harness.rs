// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Demo harness driving a full simulated boot.

use crate::bootstrap;
use crate::cli::Cli;
use crate::host::{HostRuntime, ROOT_MODULE_INDEX};
use crate::notify::StderrNotifier;
use bootlace_trace::{TraceEvent, TraceLog};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Exit codes reported by the harness
pub mod exit_codes {
    /// Clean boot
    pub const SUCCESS: i32 = 0;
    /// Boot finished degraded (entry task or drain failure)
    pub const DEGRADED: i32 = 1;
}

/// Name of the callable module the demo root module registers.
const DEMO_SINK: &str = "DemoEvents";

/// Build a host, boot it through the deferred protocol, and report.
pub async fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let trace = match &cli.trace_file {
        Some(path) => TraceLog::with_file(path)?,
        None => TraceLog::new(),
    };

    let runtime = HostRuntime::builder()
        .trace(trace.clone())
        .notifier(Arc::new(StderrNotifier::new()))
        .build();

    // Root module: registering the demo event sink is its observable side
    // effect, so calls addressed to the sink only resolve after drain.
    let bridge = Arc::clone(runtime.bridge());
    runtime.modules().define(ROOT_MODULE_INDEX, move || {
        bridge.register_callable(DEMO_SINK, |method, args| {
            println!("[{}] {} {}", DEMO_SINK, method, json!(args));
            Ok(())
        });
        Ok(json!("root"))
    });
    for index in 1..=cli.modules {
        runtime
            .modules()
            .define_value(index, json!(format!("module-{}", index)));
    }

    bootstrap::start(&runtime)?;

    let delay = Duration::from_millis(cli.entry_delay_ms);
    let fail_entry = cli.fail_entry;
    runtime.register_entry(move || async move {
        tokio::time::sleep(delay).await;
        if fail_entry {
            return Err("injected entry failure".into());
        }
        Ok(())
    })?;

    // The host binds its loader late and then requires the root module,
    // which fires the trap instead of executing the root.
    runtime.bind_registry_loader();
    runtime.require(ROOT_MODULE_INDEX)?;

    // Calls arriving while initialization is pending: two for the sink the
    // root module will register, one for a module that never appears.
    let bridge = runtime.bridge();
    bridge.call_function_return_flushed_queue(DEMO_SINK, "emit", vec![json!("first")])?;
    bridge.call_function_return_flushed_queue("Ghost", "emit", vec![json!("lost")])?;
    bridge.call_function_return_flushed_queue(DEMO_SINK, "emit", vec![json!("second")])?;

    runtime.wait_until_booted().await;

    if cli.json {
        for record in trace.records() {
            println!("{}", serde_json::to_string(&record)?);
        }
    } else {
        print_summary(&trace);
    }

    if trace.find_failures().is_empty() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::DEGRADED)
    }
}

fn print_summary(trace: &TraceLog) {
    let buffered = trace.find_buffered().len();
    let dropped = trace.find_dropped().len();
    let replayed = trace.count(|r| matches!(r.event, TraceEvent::CallReplayed { .. }));
    let failures = trace.find_failures();

    println!(
        "boot finished: {} buffered, {} replayed, {} dropped",
        buffered, replayed, dropped
    );
    for failure in &failures {
        match &failure.event {
            TraceEvent::EntryTaskFailed { message } => {
                println!("entry task failed: {}", message);
            }
            TraceEvent::DrainFailed { message } => {
                println!("drain failed: {}", message);
            }
            _ => {}
        }
    }
}
