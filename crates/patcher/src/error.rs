// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error type shared by slot invocation and patch callbacks.

use thiserror::Error;

/// Errors surfaced through a method slot.
///
/// Callbacks construct `Failed` (or return errors of their own converted
/// into it); the slot itself produces `Unbound`. `Invariant` marks a
/// contract violation rather than a runtime condition: callers must treat
/// it as fatal and never retry.
#[derive(Debug, Error)]
pub enum CallError {
    /// The slot has no bound implementation to dispatch to.
    #[error("no implementation bound for {target}.{method}")]
    Unbound { target: String, method: String },

    /// Failure raised by a callback or by the bound implementation.
    #[error("{message}")]
    Failed { message: String },

    /// Contract violation signaling programmer or host error.
    #[error("invariant violated: {message}")]
    Invariant { message: String },
}

impl CallError {
    /// Create an ordinary failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Create a fatal contract-violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    /// Whether this error is a non-recoverable contract violation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant { .. })
    }
}
