// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot trap on the host's loader slot.

use super::orchestrator::{self, DeferredRoot};
use crate::host::context::HostRuntime;
use crate::host::loader::{self, ROOT_MODULE_INDEX};
use crate::relay::CallRelay;
use bootlace_patcher::{CallError, CallResult};
use bootlace_trace::TraceEvent;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;

/// Errors starting the bootstrap protocol.
#[derive(Debug, Error)]
pub enum BootError {
    /// The orchestrator is scheduled as an asynchronous task, so a reactor
    /// must already be running.
    #[error("bootstrap must be started from within a tokio runtime")]
    NoRuntime,
}

enum TrapPhase {
    Armed,
    Fired,
}

/// Start the deferred-bootstrap protocol on the runtime's loader slot.
///
/// If the loader is already bound the host has already initialized: the
/// entry task runs directly, with the same error absorption, and no trap or
/// relay is installed. Otherwise a trap is installed that fires on the
/// first root-index call; non-root calls pass straight through to whatever
/// loader is bound at call time.
pub fn start(runtime: &Arc<HostRuntime>) -> Result<(), BootError> {
    let handle = Handle::try_current().map_err(|_| BootError::NoRuntime)?;

    if runtime.loader().is_bound() {
        handle.spawn(orchestrator::run_direct(Arc::clone(runtime)));
        return Ok(());
    }

    install_trap(runtime, handle);
    Ok(())
}

fn install_trap(runtime: &Arc<HostRuntime>, handle: Handle) {
    let phase = Arc::new(Mutex::new(TrapPhase::Armed));
    let trap_runtime = Arc::clone(runtime);

    // The patch stays installed for the life of the process: after firing it
    // forwards everything except a repeated root-index call, which must
    // surface as a fatal error instead of re-running initialization.
    let _guard = runtime.loader().patch_instead(move |args, next| {
        let index = loader::parse_index(args)?;
        if index != ROOT_MODULE_INDEX {
            return next(args);
        }
        {
            let mut phase = phase.lock();
            match *phase {
                TrapPhase::Fired => {
                    return Err(CallError::invariant(
                        "host re-initialization is not supported",
                    ))
                }
                TrapPhase::Armed => *phase = TrapPhase::Fired,
            }
        }
        fire(&trap_runtime, &handle)
    });

    runtime.trace().record(TraceEvent::PatchInstalled {
        target: "host".to_string(),
        method: "requireModule".to_string(),
        kind: "instead".to_string(),
    });
}

/// Trigger sequence, synchronous with respect to the loader call:
/// normalize the module table, install the relay, capture the deferred
/// root invocation, schedule the orchestrator, and return without running
/// the root module.
fn fire(runtime: &Arc<HostRuntime>, handle: &Handle) -> CallResult {
    let trace = runtime.trace();

    let count = runtime.modules().normalize();
    trace.record(TraceEvent::ModulesNormalized { count });

    let relay = CallRelay::install(runtime.bridge(), trace.clone());
    let root = DeferredRoot::capture(runtime.loader())?;

    handle.spawn(orchestrator::run(Arc::clone(runtime), relay, root));
    trace.record(TraceEvent::RootDeferred);

    Ok(Value::Null)
}
