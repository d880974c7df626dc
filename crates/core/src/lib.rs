// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred bootstrap for an embedded module host.
//!
//! bootlace alters the boot behavior of an already-initialized module host
//! from the outside, without touching its code: a one-shot trap on the host's
//! module loader defers root-module execution, a relay buffers cross-boundary
//! bridge calls whose targets are not ready yet, and an orchestrator runs the
//! registered application entry task exactly once before draining the buffer
//! in order. Interception is built on the ordered patch chains of
//! `bootlace-patcher`; every structural step is recorded to a
//! `bootlace-trace` log.
//!
//! The typical sequence, from the embedding host's point of view:
//!
//! 1. Construct a [`host::HostRuntime`] and call [`bootstrap::start`].
//! 2. Register the application entry task.
//! 3. Bind the real loader and require the root module index.
//! 4. Await [`host::HostRuntime::wait_until_booted`].

pub mod bootstrap;
pub mod host;
pub mod notify;
pub mod relay;

#[doc(hidden)]
pub mod cli;
#[doc(hidden)]
pub mod harness;

/// Re-exported interception primitives from bootlace-patcher.
pub mod patch {
    pub use bootlace_patcher::{
        CallArgs, CallError, CallResult, MethodFn, MethodSlot, NextFn, PatchKind, Unpatch,
    };
}

/// Re-exported trace types from bootlace-trace.
pub mod trace {
    pub use bootlace_trace::{TraceEvent, TraceLog, TraceRecord};
}
