// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use bootlace_trace::TraceLog;
use serde_json::json;

fn relay_fixture() -> (Arc<BatchedBridge>, CallRelay, TraceLog) {
    let bridge = BatchedBridge::new();
    let trace = TraceLog::new();
    let relay = CallRelay::install(&bridge, trace.clone());
    (bridge, relay, trace)
}

#[test]
fn test_relay_starts_intercepting() {
    let (_bridge, relay, _trace) = relay_fixture();
    assert_eq!(relay.state(), RelayState::Intercepting);
    assert_eq!(relay.queued_len(), 0);
}

#[test]
fn test_unresolvable_target_is_buffered_with_empty_snapshot() {
    let (bridge, relay, trace) = relay_fixture();

    let snapshot = bridge
        .call_function_return_flushed_queue("NotYet", "emit", vec![json!(1)])
        .unwrap();
    assert_eq!(snapshot, empty_snapshot());
    assert_eq!(relay.queued_len(), 1);

    let buffered = trace.find_buffered();
    assert_eq!(buffered.len(), 1);
    assert_eq!(
        buffered[0].event,
        TraceEvent::CallBuffered {
            module: "NotYet".to_string(),
            method: "emit".to_string(),
            seq: 0,
        }
    );
}

#[test]
fn test_root_registration_module_is_always_buffered() {
    let (bridge, relay, _trace) = relay_fixture();
    // Callable or not, root registration is held back until drain.
    bridge.register_callable(ROOT_REGISTRATION_MODULE, |_m, _a| Ok(()));

    let snapshot = bridge
        .call_function_return_flushed_queue(ROOT_REGISTRATION_MODULE, "runApplication", vec![])
        .unwrap();
    assert_eq!(snapshot, empty_snapshot());
    assert_eq!(relay.queued_len(), 1);
}

#[test]
fn test_resolvable_target_forwards_to_real_entry_point() {
    let (bridge, relay, _trace) = relay_fixture();
    let hits = Arc::new(Mutex::new(0_u32));
    let counted = Arc::clone(&hits);
    bridge.register_callable("Ready", move |_m, _a| {
        *counted.lock() += 1;
        Ok(())
    });

    bridge
        .call_function_return_flushed_queue("Ready", "emit", vec![])
        .unwrap();
    assert_eq!(*hits.lock(), 1);
    assert_eq!(relay.queued_len(), 0);
}

#[rstest::rstest]
#[case(ROOT_REGISTRATION_MODULE, true, true)]
#[case("Ready", true, false)]
#[case("Missing", false, true)]
fn test_buffering_decision(#[case] module: &str, #[case] callable: bool, #[case] buffered: bool) {
    let (bridge, relay, _trace) = relay_fixture();
    if callable {
        bridge.register_callable(module, |_method, _args| Ok(()));
    }

    bridge
        .call_function_return_flushed_queue(module, "emit", vec![])
        .unwrap();
    assert_eq!(relay.queued_len() == 1, buffered);
}

#[test]
fn test_buffer_preserves_enqueue_order() {
    let (bridge, relay, _trace) = relay_fixture();
    for (module, payload) in [("A", 1), ("B", 2), ("A", 3)] {
        bridge
            .call_function_return_flushed_queue(module, "emit", vec![json!(payload)])
            .unwrap();
    }
    assert_eq!(relay.queued_len(), 3);

    let queued = relay.begin_drain();
    let order: Vec<(&str, u64)> = queued
        .iter()
        .map(|call| (call.module.as_str(), call.seq))
        .collect();
    assert_eq!(order, vec![("A", 0), ("B", 1), ("A", 2)]);
}

#[test]
fn test_begin_drain_restores_the_real_entry_point() {
    let (bridge, relay, trace) = relay_fixture();
    bridge
        .call_function_return_flushed_queue("NotYet", "emit", vec![])
        .unwrap();

    let queued = relay.begin_drain();
    assert_eq!(queued.len(), 1);
    assert_eq!(relay.state(), RelayState::Draining);
    assert!(!bridge.dispatch_slot().is_patched());

    // The buffer was handed off; the relay no longer holds it.
    assert_eq!(relay.queued_len(), 0);

    // With interception gone, an unresolvable target is a real bridge error.
    let err = bridge
        .call_function_return_flushed_queue("NotYet", "emit", vec![])
        .unwrap_err();
    assert_eq!(err.to_string(), "module NotYet is not callable");

    assert_eq!(
        trace.count(|r| matches!(r.event, TraceEvent::PatchRemoved { .. })),
        1
    );
    assert_eq!(
        trace.count(|r| matches!(r.event, TraceEvent::DrainStarted { queued: 1 })),
        1
    );
}

#[test]
fn test_finish_drain_moves_to_passthrough() {
    let (_bridge, relay, _trace) = relay_fixture();
    relay.begin_drain();
    relay.finish_drain();
    assert_eq!(relay.state(), RelayState::Passthrough);
}
