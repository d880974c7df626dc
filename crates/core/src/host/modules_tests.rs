// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use serde_json::json;

#[test]
fn test_new_registry_is_empty_and_unordered() {
    let registry = ModuleRegistry::new();
    assert!(registry.is_empty());
    assert!(!registry.is_keyed());
}

#[test]
fn test_resolve_runs_factory_once_and_caches() {
    let registry = ModuleRegistry::new();
    let runs = Arc::new(Mutex::new(0_u32));
    let counted = Arc::clone(&runs);
    registry.define(7, move || {
        *counted.lock() += 1;
        Ok(json!("seven"))
    });

    assert_eq!(registry.resolve(7).unwrap(), json!("seven"));
    assert_eq!(registry.resolve(7).unwrap(), json!("seven"));
    assert_eq!(*runs.lock(), 1);
}

#[test]
fn test_resolve_unknown_index_errors() {
    let registry = ModuleRegistry::new();
    let err = registry.resolve(42).unwrap_err();
    assert_eq!(err.to_string(), "unknown module index 42");
}

#[test]
fn test_factory_error_propagates_and_is_not_cached() {
    let registry = ModuleRegistry::new();
    let runs = Arc::new(Mutex::new(0_u32));
    let counted = Arc::clone(&runs);
    registry.define(1, move || {
        *counted.lock() += 1;
        Err(CallError::failed("factory broke"))
    });

    assert_eq!(registry.resolve(1).unwrap_err().to_string(), "factory broke");
    assert_eq!(registry.resolve(1).unwrap_err().to_string(), "factory broke");
    assert_eq!(*runs.lock(), 2, "a failed factory is retried on next access");
}

#[test]
fn test_define_value_is_ready_immediately() {
    let registry = ModuleRegistry::new();
    registry.define_value(3, json!({"name": "three"}));
    assert_eq!(registry.resolve(3).unwrap(), json!({"name": "three"}));
}

#[test]
fn test_adopt_fills_gaps_without_overwriting() {
    let registry = ModuleRegistry::new();
    registry.define_value(1, json!("mine"));

    let mut exports = HashMap::new();
    exports.insert(1, json!("theirs"));
    exports.insert(2, json!("adopted"));
    registry.adopt(exports);

    assert_eq!(registry.resolve(1).unwrap(), json!("mine"));
    assert_eq!(registry.resolve(2).unwrap(), json!("adopted"));
}

#[test]
fn test_normalize_is_one_time_and_keys_become_deterministic() {
    let registry = ModuleRegistry::new();
    for index in [9, 2, 140, 0, 33] {
        registry.define_value(index, json!(index));
    }
    assert!(!registry.is_keyed());

    let count = registry.normalize();
    assert_eq!(count, 5);
    assert!(registry.is_keyed());
    assert_eq!(registry.ids(), vec![0, 2, 9, 33, 140]);

    // Idempotent: a second call changes nothing.
    assert_eq!(registry.normalize(), 5);
    assert_eq!(registry.ids(), vec![0, 2, 9, 33, 140]);
}

#[test]
fn test_lookups_behave_identically_across_normalization() {
    let registry = ModuleRegistry::new();
    registry.define(5, || Ok(json!("five")));

    assert_eq!(registry.resolve(5).unwrap(), json!("five"));
    registry.normalize();
    assert_eq!(registry.resolve(5).unwrap(), json!("five"));
    assert!(registry.contains(5));
    assert!(!registry.contains(6));
}

#[test]
fn test_define_after_normalize_lands_in_keyed_table() {
    let registry = ModuleRegistry::new();
    registry.normalize();
    registry.define_value(8, json!("late"));
    assert_eq!(registry.ids(), vec![8]);
    assert_eq!(registry.resolve(8).unwrap(), json!("late"));
}
