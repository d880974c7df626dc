// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide host runtime context.

use crate::bootstrap::{EntryError, EntryFuture, EntrySlot, EntrySlotError, EntryTask};
use crate::host::bridge::BatchedBridge;
use crate::host::loader;
use crate::host::modules::ModuleRegistry;
use crate::notify::{Notifier, StderrNotifier};
use bootlace_patcher::{CallResult, MethodSlot};
use bootlace_trace::TraceLog;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// The shared singletons of one host process: module table, bridge, loader
/// slot, entry-task slot, trace log, and notifier.
///
/// Constructed once through [`HostRuntimeBuilder`] and passed by `Arc` to
/// every component. There is no teardown; the host process is long-lived
/// and exits by termination.
pub struct HostRuntime {
    modules: Arc<ModuleRegistry>,
    bridge: Arc<BatchedBridge>,
    loader: MethodSlot,
    entry: EntrySlot,
    trace: TraceLog,
    notifier: Arc<dyn Notifier>,
    boot_tx: watch::Sender<bool>,
    boot_rx: watch::Receiver<bool>,
}

impl HostRuntime {
    /// Start building a runtime.
    pub fn builder() -> HostRuntimeBuilder {
        HostRuntimeBuilder::new()
    }

    /// The module table.
    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    /// The native bridge.
    pub fn bridge(&self) -> &Arc<BatchedBridge> {
        &self.bridge
    }

    /// The loader slot.
    pub fn loader(&self) -> &MethodSlot {
        &self.loader
    }

    /// The boot trace log.
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// The notification sink.
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub(crate) fn entry(&self) -> &EntrySlot {
        &self.entry
    }

    /// Register the application entry task. Single-use; a second call fails
    /// with [`EntrySlotError::AlreadyRegistered`].
    pub fn register_entry_task(&self, task: EntryTask) -> Result<(), EntrySlotError> {
        self.entry.register(task)
    }

    /// Register the application entry task from an async closure.
    pub fn register_entry<F, Fut>(&self, entry: F) -> Result<(), EntrySlotError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), EntryError>> + Send + 'static,
    {
        self.entry
            .register(Box::new(move || Box::pin(entry()) as EntryFuture))
    }

    /// Whether an entry task is registered and not yet consumed.
    pub fn entry_registered(&self) -> bool {
        self.entry.is_registered()
    }

    /// Bind the real loader: resolve indices against the module table.
    pub fn bind_registry_loader(&self) {
        loader::bind_registry_loader(&self.loader, Arc::clone(&self.modules));
    }

    /// Require a module through the loader slot.
    pub fn require(&self, index: u32) -> CallResult {
        self.loader.invoke1(json!(index))
    }

    /// Whether the boot sequence (orchestrator plus drain) has finished.
    pub fn is_booted(&self) -> bool {
        *self.boot_rx.borrow()
    }

    /// Wait until the boot sequence has finished.
    pub async fn wait_until_booted(&self) {
        let mut rx = self.boot_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub(crate) fn mark_booted(&self) {
        let _ = self.boot_tx.send(true);
    }
}

/// Builder for [`HostRuntime`].
pub struct HostRuntimeBuilder {
    modules: Arc<ModuleRegistry>,
    trace: Option<TraceLog>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl HostRuntimeBuilder {
    /// Create a builder with an empty module table.
    pub fn new() -> Self {
        Self {
            modules: Arc::new(ModuleRegistry::new()),
            trace: None,
            notifier: None,
        }
    }

    /// Register a module whose factory runs on first access.
    pub fn module<F>(self, index: u32, factory: F) -> Self
    where
        F: Fn() -> CallResult + Send + Sync + 'static,
    {
        self.modules.define(index, factory);
        self
    }

    /// Register a module with an already-computed exported value.
    pub fn module_value(self, index: u32, value: Value) -> Self {
        self.modules.define_value(index, value);
        self
    }

    /// Use this trace log instead of a fresh in-memory one.
    pub fn trace(mut self, trace: TraceLog) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Use this notifier instead of stderr.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the shared runtime.
    pub fn build(self) -> Arc<HostRuntime> {
        let (boot_tx, boot_rx) = watch::channel(false);
        Arc::new(HostRuntime {
            modules: self.modules,
            bridge: BatchedBridge::new(),
            loader: loader::loader_slot(),
            entry: EntrySlot::new(),
            trace: self.trace.unwrap_or_default(),
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(StderrNotifier::new())),
            boot_tx,
            boot_rx,
        })
    }
}

impl Default for HostRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
