// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible notification surface for degraded boots.

use parking_lot::Mutex;
use std::sync::Arc;

/// Fixed message raised when the application entry task fails.
pub const INIT_FAILURE_NOTICE: &str =
    "An error occurred while initializing the application. Check the boot trace for more information.";

/// Fixed message raised when drain or root-module execution fails.
pub const BOOT_FAILURE_NOTICE: &str =
    "An error occurred while starting the host. Check the boot trace for more information.";

/// Sink for blocking, user-visible notifications.
///
/// Raised at most twice per boot: once if the entry task fails, once if the
/// drain phase fails. Neither is fatal to the process.
pub trait Notifier: Send + Sync {
    /// Raise a notification.
    fn alert(&self, message: &str);
}

/// Production notifier writing to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrNotifier;

impl StderrNotifier {
    /// Create a new stderr notifier.
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Notifier recording messages in memory, for tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Create a new recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages raised so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
