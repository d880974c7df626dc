// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::notify::{RecordingNotifier, INIT_FAILURE_NOTICE};
use bootlace_trace::TraceLog;

fn noop_task() -> EntryTask {
    Box::new(|| Box::pin(async { Ok(()) }))
}

#[test]
fn test_take_before_register_fails_not_registered() {
    let slot = EntrySlot::new();
    assert_eq!(slot.take().unwrap_err(), EntrySlotError::NotRegistered);
    // The slot stays usable: registration after a failed take is legal.
    slot.register(noop_task()).unwrap();
    assert!(slot.is_registered());
}

#[test]
fn test_second_register_fails_already_registered() {
    let slot = EntrySlot::new();
    slot.register(noop_task()).unwrap();
    assert_eq!(
        slot.register(noop_task()).unwrap_err(),
        EntrySlotError::AlreadyRegistered
    );
}

#[test]
fn test_take_is_single_use() {
    let slot = EntrySlot::new();
    slot.register(noop_task()).unwrap();

    assert!(slot.take().is_ok());
    assert!(!slot.is_registered());
    assert_eq!(slot.take().unwrap_err(), EntrySlotError::AlreadyConsumed);
}

#[test]
fn test_register_after_consumption_fails() {
    let slot = EntrySlot::new();
    slot.register(noop_task()).unwrap();
    let _task = slot.take().unwrap();

    assert_eq!(
        slot.register(noop_task()).unwrap_err(),
        EntrySlotError::AlreadyRegistered
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        EntrySlotError::AlreadyRegistered.to_string(),
        "entry task already registered"
    );
    assert_eq!(
        EntrySlotError::NotRegistered.to_string(),
        "entry task not registered"
    );
    assert_eq!(
        EntrySlotError::AlreadyConsumed.to_string(),
        "entry task already consumed"
    );
}

#[tokio::test]
async fn test_run_direct_completes_and_marks_booted() {
    let runtime = HostRuntime::builder().trace(TraceLog::new()).build();
    runtime.register_entry(|| async { Ok(()) }).unwrap();

    run_direct(Arc::clone(&runtime)).await;

    assert!(runtime.is_booted());
    assert_eq!(
        runtime
            .trace()
            .count(|r| r.event == TraceEvent::EntryTaskCompleted),
        1
    );
    assert!(runtime.trace().find_failures().is_empty());
}

#[tokio::test]
async fn test_run_direct_absorbs_entry_failure_and_notifies() {
    let notifier = RecordingNotifier::new();
    let runtime = HostRuntime::builder()
        .notifier(Arc::new(notifier.clone()))
        .build();
    runtime
        .register_entry(|| async { Err("entry exploded".into()) })
        .unwrap();

    run_direct(Arc::clone(&runtime)).await;

    assert!(runtime.is_booted(), "a failed entry task still boots");
    let failures = runtime.trace().find_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].event,
        TraceEvent::EntryTaskFailed {
            message: "entry exploded".to_string()
        }
    );
    assert_eq!(notifier.messages(), vec![INIT_FAILURE_NOTICE.to_string()]);
}

#[tokio::test]
async fn test_run_direct_with_missing_registration_is_absorbed() {
    let notifier = RecordingNotifier::new();
    let runtime = HostRuntime::builder()
        .notifier(Arc::new(notifier.clone()))
        .build();

    run_direct(Arc::clone(&runtime)).await;

    assert!(runtime.is_booted());
    let failures = runtime.trace().find_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].event,
        TraceEvent::EntryTaskFailed {
            message: "entry task not registered".to_string()
        }
    );
    assert_eq!(notifier.messages(), vec![INIT_FAILURE_NOTICE.to_string()]);
}
