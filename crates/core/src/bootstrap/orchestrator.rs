// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entry-task slot and the orchestrator task.

use crate::host::context::HostRuntime;
use crate::host::loader::ROOT_MODULE_INDEX;
use crate::notify::{BOOT_FAILURE_NOTICE, INIT_FAILURE_NOTICE};
use crate::relay::{CallRelay, QueuedCall};
use bootlace_patcher::{CallError, CallResult, MethodFn, MethodSlot};
use bootlace_trace::TraceEvent;
use parking_lot::Mutex;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by an application entry task.
pub type EntryError = Box<dyn std::error::Error + Send + Sync>;

/// Future produced by an entry task.
pub type EntryFuture = Pin<Box<dyn Future<Output = Result<(), EntryError>> + Send>>;

/// The registered application entry task: zero arguments, asynchronous,
/// run exactly once.
pub type EntryTask = Box<dyn FnOnce() -> EntryFuture + Send>;

/// Registration contract violations. Synchronous and non-recoverable:
/// they signal programmer error, not a runtime condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntrySlotError {
    /// The slot already holds (or has already held) a task.
    #[error("entry task already registered")]
    AlreadyRegistered,

    /// No task has been registered.
    #[error("entry task not registered")]
    NotRegistered,

    /// The task was already taken.
    #[error("entry task already consumed")]
    AlreadyConsumed,
}

enum EntryState {
    Empty,
    Registered(EntryTask),
    Consumed,
}

/// Holds at most one entry task; set once, read once.
pub struct EntrySlot {
    state: Mutex<EntryState>,
}

impl EntrySlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EntryState::Empty),
        }
    }

    /// Store the task. Fails fast if a task was ever stored before.
    pub fn register(&self, task: EntryTask) -> Result<(), EntrySlotError> {
        let mut state = self.state.lock();
        match &*state {
            EntryState::Empty => {
                *state = EntryState::Registered(task);
                Ok(())
            }
            EntryState::Registered(_) | EntryState::Consumed => {
                Err(EntrySlotError::AlreadyRegistered)
            }
        }
    }

    /// Take the task out. Usable exactly once.
    pub fn take(&self) -> Result<EntryTask, EntrySlotError> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, EntryState::Consumed) {
            EntryState::Registered(task) => Ok(task),
            EntryState::Empty => {
                *state = EntryState::Empty;
                Err(EntrySlotError::NotRegistered)
            }
            EntryState::Consumed => Err(EntrySlotError::AlreadyConsumed),
        }
    }

    /// Whether a task is stored and not yet consumed.
    pub fn is_registered(&self) -> bool {
        matches!(&*self.state.lock(), EntryState::Registered(_))
    }
}

impl Default for EntrySlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The root-module invocation captured at trap time and deferred until the
/// entry task settles. Invokes the underlying loader directly, bypassing
/// the trapped slot.
pub(crate) struct DeferredRoot {
    original: Arc<MethodFn>,
}

impl DeferredRoot {
    pub(crate) fn capture(loader: &MethodSlot) -> Result<Self, CallError> {
        loader
            .original()
            .map(|original| Self { original })
            .ok_or_else(|| CallError::invariant("loader has no bound implementation to defer"))
    }

    fn invoke(&self) -> CallResult {
        let mut args = vec![json!(ROOT_MODULE_INDEX)];
        (*self.original)(&mut args)
    }
}

/// Orchestrator body for the deferred path: run the entry task, then drain.
pub(crate) async fn run(runtime: Arc<HostRuntime>, relay: CallRelay, root: DeferredRoot) {
    run_entry(&runtime).await;
    drain(&runtime, &relay, &root);
    runtime.mark_booted();
}

/// Orchestrator body when the host had already initialized: no relay, no
/// deferred root.
pub(crate) async fn run_direct(runtime: Arc<HostRuntime>) {
    run_entry(&runtime).await;
    runtime.mark_booted();
}

async fn run_entry(runtime: &HostRuntime) {
    let trace = runtime.trace();
    trace.record(TraceEvent::EntryTaskStarted);

    let outcome = match runtime.entry().take() {
        Ok(task) => task().await,
        Err(err) => Err(EntryError::from(err)),
    };

    match outcome {
        Ok(()) => trace.record(TraceEvent::EntryTaskCompleted),
        Err(err) => {
            trace.record(TraceEvent::EntryTaskFailed {
                message: err.to_string(),
            });
            notify(runtime, INIT_FAILURE_NOTICE);
        }
    }
}

/// Drain sequence: restore the entry point, invoke the deferred root,
/// replay the buffer in order. Failures here are absorbed so the host keeps
/// booting in a degraded state.
fn drain(runtime: &HostRuntime, relay: &CallRelay, root: &DeferredRoot) {
    let trace = runtime.trace();
    let queued = relay.begin_drain();

    match replay(runtime, root, &queued) {
        Ok((replayed, dropped)) => {
            trace.record(TraceEvent::DrainCompleted { replayed, dropped });
        }
        Err(err) => {
            trace.record(TraceEvent::DrainFailed {
                message: err.to_string(),
            });
            notify(runtime, BOOT_FAILURE_NOTICE);
        }
    }

    relay.finish_drain();
}

fn replay(
    runtime: &HostRuntime,
    root: &DeferredRoot,
    queued: &[QueuedCall],
) -> Result<(usize, usize), CallError> {
    root.invoke()?;

    let bridge = runtime.bridge();
    let trace = runtime.trace();
    let mut replayed = 0;
    let mut dropped = 0;
    for call in queued {
        if bridge.get_callable_module(&call.module) {
            bridge.call_function(&call.module, &call.method, call.args.clone())?;
            trace.record(TraceEvent::CallReplayed {
                module: call.module.clone(),
                method: call.method.clone(),
                seq: call.seq,
            });
            replayed += 1;
        } else {
            // Still unresolvable: dropped without error.
            trace.record(TraceEvent::CallDropped {
                module: call.module.clone(),
                method: call.method.clone(),
                seq: call.seq,
            });
            dropped += 1;
        }
    }
    Ok((replayed, dropped))
}

fn notify(runtime: &HostRuntime, message: &str) {
    runtime.trace().record(TraceEvent::Notice {
        message: message.to_string(),
    });
    runtime.notifier().alert(message);
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
