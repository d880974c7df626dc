// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recorded boot event data types.

use super::duration_serde;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// One recorded boot event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Sequence number within the log.
    pub seq: u64,

    /// Wall-clock timestamp.
    pub timestamp: SystemTime,

    /// Elapsed time since the log was created.
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,

    /// What happened.
    pub event: TraceEvent,
}

/// Structural events of a host boot.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// An interception patch was installed on a method slot.
    PatchInstalled {
        target: String,
        method: String,
        kind: String,
    },
    /// An interception patch was removed.
    PatchRemoved { target: String, method: String },
    /// The module table was rewritten into its deterministic keyed form.
    ModulesNormalized { count: usize },
    /// The root module invocation was captured and deferred.
    RootDeferred,
    /// A bridge call was buffered during the interception window.
    CallBuffered {
        module: String,
        method: String,
        seq: u64,
    },
    /// A buffered call was replayed against the live bridge.
    CallReplayed {
        module: String,
        method: String,
        seq: u64,
    },
    /// A buffered call's target was still not callable at replay time.
    CallDropped {
        module: String,
        method: String,
        seq: u64,
    },
    /// The application entry task was picked up.
    EntryTaskStarted,
    /// The application entry task finished cleanly.
    EntryTaskCompleted,
    /// The application entry task failed and was absorbed.
    EntryTaskFailed { message: String },
    /// Drain began with this many buffered calls.
    DrainStarted { queued: usize },
    /// Drain finished; counts cover the buffered calls only.
    DrainCompleted { replayed: usize, dropped: usize },
    /// Root invocation or replay dispatch failed during drain.
    DrainFailed { message: String },
    /// A user-visible notification was raised.
    Notice { message: String },
}

impl TraceEvent {
    /// Whether this event records a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::EntryTaskFailed { .. } | Self::DrainFailed { .. }
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
