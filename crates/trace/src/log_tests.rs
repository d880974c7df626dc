// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;

fn buffered(module: &str, seq: u64) -> TraceEvent {
    TraceEvent::CallBuffered {
        module: module.to_string(),
        method: "emit".to_string(),
        seq,
    }
}

#[test]
fn test_new_log_is_empty() {
    let log = TraceLog::new();
    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
}

#[test]
fn test_record_assigns_monotonic_sequence() {
    let log = TraceLog::new();
    log.record(TraceEvent::RootDeferred);
    log.record(buffered("A", 0));
    log.record(buffered("B", 1));

    let records = log.records();
    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().map(|r| r.seq).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn test_clone_shares_the_underlying_store() {
    let log = TraceLog::new();
    let shared = log.clone();
    shared.record(TraceEvent::EntryTaskStarted);

    assert_eq!(log.len(), 1);
    assert_eq!(log.records()[0].event, TraceEvent::EntryTaskStarted);
}

#[test]
fn test_last_returns_tail_in_order() {
    let log = TraceLog::new();
    for seq in 0..5 {
        log.record(buffered("A", seq));
    }

    let tail = log.last(2);
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].seq, 3);
    assert_eq!(tail[1].seq, 4);
}

#[test]
fn test_find_buffered_and_dropped() {
    let log = TraceLog::new();
    log.record(buffered("A", 0));
    log.record(TraceEvent::CallDropped {
        module: "B".to_string(),
        method: "emit".to_string(),
        seq: 1,
    });
    log.record(TraceEvent::CallReplayed {
        module: "A".to_string(),
        method: "emit".to_string(),
        seq: 0,
    });

    assert_eq!(log.find_buffered().len(), 1);
    assert_eq!(log.find_dropped().len(), 1);
    assert_eq!(
        log.count(|r| matches!(r.event, TraceEvent::CallReplayed { .. })),
        1
    );
}

#[test]
fn test_find_failures_covers_both_boundaries() {
    let log = TraceLog::new();
    log.record(TraceEvent::EntryTaskFailed {
        message: "task exploded".to_string(),
    });
    log.record(TraceEvent::DrainCompleted {
        replayed: 0,
        dropped: 0,
    });
    log.record(TraceEvent::DrainFailed {
        message: "root module threw".to_string(),
    });

    let failures = log.find_failures();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].event.is_failure());
}

#[test]
fn test_clear() {
    let log = TraceLog::new();
    log.record(TraceEvent::RootDeferred);
    log.clear();
    assert!(log.is_empty());
}

#[test]
fn test_with_file_writes_one_json_object_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boot.jsonl");

    let log = TraceLog::with_file(&path).unwrap();
    log.record(buffered("A", 0));
    log.record(TraceEvent::DrainCompleted {
        replayed: 1,
        dropped: 0,
    });

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: TraceRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.seq, 0);
    assert!(matches!(first.event, TraceEvent::CallBuffered { .. }));

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["event"]["type"], "drain_completed");
    assert_eq!(second["event"]["replayed"], 1);
}
