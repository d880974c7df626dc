// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Buffered relay over the bridge's batched dispatch entry point.

use crate::host::bridge::{self, empty_snapshot, BatchedBridge};
use bootlace_patcher::{CallArgs, CallResult, NextFn, Unpatch};
use bootlace_trace::{TraceEvent, TraceLog};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};

/// Module name reserved for root registration; calls addressed to it are
/// always buffered during the interception window.
pub const ROOT_REGISTRATION_MODULE: &str = "AppRegistry";

/// Lifecycle of the relay.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelayState {
    /// Buffering calls to unready targets.
    Intercepting,
    /// Replaying the buffer against the live bridge.
    Draining,
    /// Interception removed; all calls flow untouched.
    Passthrough,
}

/// One buffered cross-boundary call.
#[derive(Clone, Debug)]
pub struct QueuedCall {
    pub module: String,
    pub method: String,
    pub args: Vec<Value>,
    /// Enqueue position; replay preserves this order exactly.
    pub seq: u64,
}

/// Wraps `callFunctionReturnFlushedQueue` with a single instead-hook.
///
/// While intercepting, a call addressed to [`ROOT_REGISTRATION_MODULE`] or
/// to a module the bridge does not report callable is buffered and answered
/// with an empty snapshot, so the bridge believes the call was serviced and
/// does not retry. Everything else forwards to the real entry point.
///
/// State transitions are driven exclusively by the bootstrap path.
#[derive(Clone)]
pub struct CallRelay {
    inner: Arc<RelayInner>,
}

struct RelayInner {
    bridge: Weak<BatchedBridge>,
    queue: Mutex<Vec<QueuedCall>>,
    state: Mutex<RelayState>,
    unpatch: Mutex<Option<Unpatch>>,
    trace: TraceLog,
}

impl CallRelay {
    /// Install the relay on the bridge's dispatch slot.
    pub(crate) fn install(bridge: &Arc<BatchedBridge>, trace: TraceLog) -> Self {
        let relay = Self {
            inner: Arc::new(RelayInner {
                bridge: Arc::downgrade(bridge),
                queue: Mutex::new(Vec::new()),
                state: Mutex::new(RelayState::Intercepting),
                unpatch: Mutex::new(None),
                trace: trace.clone(),
            }),
        };

        let hook = relay.clone();
        let unpatch = bridge
            .dispatch_slot()
            .patch_instead(move |args, next| hook.intercept(args, next));
        *relay.inner.unpatch.lock() = Some(unpatch);

        trace.record(TraceEvent::PatchInstalled {
            target: "bridge".to_string(),
            method: "callFunctionReturnFlushedQueue".to_string(),
            kind: "instead".to_string(),
        });
        relay
    }

    fn intercept(&self, args: &mut CallArgs, next: &NextFn) -> CallResult {
        if self.state() != RelayState::Intercepting {
            return next(args);
        }
        let Some(bridge) = self.inner.bridge.upgrade() else {
            return next(args);
        };
        // Calls the relay cannot make sense of are the bridge's problem.
        let Ok((module, method, call_args)) = bridge::parse_dispatch_args(args) else {
            return next(args);
        };

        if module == ROOT_REGISTRATION_MODULE || !bridge.get_callable_module(&module) {
            let seq = {
                let mut queue = self.inner.queue.lock();
                let seq = queue.len() as u64;
                queue.push(QueuedCall {
                    module: module.clone(),
                    method: method.clone(),
                    args: call_args,
                    seq,
                });
                seq
            };
            self.inner
                .trace
                .record(TraceEvent::CallBuffered { module, method, seq });
            return Ok(empty_snapshot());
        }

        next(args)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RelayState {
        *self.inner.state.lock()
    }

    /// Number of calls currently buffered.
    pub fn queued_len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Restore the real entry point and hand the buffer to the caller.
    pub(crate) fn begin_drain(&self) -> Vec<QueuedCall> {
        *self.inner.state.lock() = RelayState::Draining;
        if let Some(unpatch) = self.inner.unpatch.lock().take() {
            unpatch.unpatch();
            self.inner.trace.record(TraceEvent::PatchRemoved {
                target: "bridge".to_string(),
                method: "callFunctionReturnFlushedQueue".to_string(),
            });
        }
        let queued = std::mem::take(&mut *self.inner.queue.lock());
        self.inner.trace.record(TraceEvent::DrainStarted {
            queued: queued.len(),
        });
        queued
    }

    /// Mark the buffer fully replayed.
    pub(crate) fn finish_drain(&self) {
        *self.inner.state.lock() = RelayState::Passthrough;
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
