// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Method slots: named indirection cells with layered patch chains.

use crate::chain::{self, CallArgs, CallResult, HookFn, MethodFn, NextFn, PatchKind, PatchRecord};
use crate::error::CallError;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};

/// A named indirection cell through which every call to one logical
/// `(target, method)` pair is routed.
///
/// Cloning shares the cell. Invocation snapshots the current dispatch
/// function before calling it, so callbacks may patch or unpatch the same
/// slot re-entrantly; changes take effect on subsequent invocations.
#[derive(Clone)]
pub struct MethodSlot {
    inner: Arc<SlotInner>,
}

struct SlotInner {
    target: String,
    method: String,
    state: Mutex<SlotState>,
}

struct SlotState {
    original: Option<Arc<MethodFn>>,
    records: Vec<PatchRecord>,
    compiled: Option<Arc<MethodFn>>,
    next_id: u64,
}

impl MethodSlot {
    /// Create a slot bound to an implementation.
    pub fn new<F>(target: impl Into<String>, method: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&mut CallArgs) -> CallResult + Send + Sync + 'static,
    {
        let slot = Self::unbound(target, method);
        slot.bind(implementation);
        slot
    }

    /// Create a slot with no implementation yet.
    ///
    /// Patches installed before binding layer onto whatever implementation
    /// is bound later; invoking an unbound, unpatched slot fails with
    /// [`CallError::Unbound`].
    pub fn unbound(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SlotInner {
                target: target.into(),
                method: method.into(),
                state: Mutex::new(SlotState {
                    original: None,
                    records: Vec::new(),
                    compiled: None,
                    next_id: 0,
                }),
            }),
        }
    }

    /// The owning object's name.
    pub fn target(&self) -> &str {
        &self.inner.target
    }

    /// The method name within the target.
    pub fn method(&self) -> &str {
        &self.inner.method
    }

    /// Bind (or rebind) the underlying implementation.
    ///
    /// An installed chain stays layered on top of the new implementation,
    /// capturing late assignment to the slot.
    pub fn bind<F>(&self, implementation: F)
    where
        F: Fn(&mut CallArgs) -> CallResult + Send + Sync + 'static,
    {
        let mut state = self.inner.state.lock();
        state.original = Some(Arc::new(implementation));
        recompile(&self.inner.target, &self.inner.method, &mut state);
    }

    /// Whether an implementation is bound.
    pub fn is_bound(&self) -> bool {
        self.inner.state.lock().original.is_some()
    }

    /// Whether any patches are installed.
    pub fn is_patched(&self) -> bool {
        !self.inner.state.lock().records.is_empty()
    }

    /// Number of installed patches.
    pub fn patch_count(&self) -> usize {
        self.inner.state.lock().records.len()
    }

    /// Kinds of the installed patches, in install order.
    pub fn kinds(&self) -> Vec<PatchKind> {
        self.inner
            .state
            .lock()
            .records
            .iter()
            .map(PatchRecord::kind)
            .collect()
    }

    /// The currently bound underlying implementation, bypassing the chain.
    pub fn original(&self) -> Option<Arc<MethodFn>> {
        self.inner.state.lock().original.clone()
    }

    /// Route a call through the chain (or straight to the implementation
    /// when unpatched).
    pub fn invoke(&self, args: &mut CallArgs) -> CallResult {
        let current = {
            let state = self.inner.state.lock();
            state.compiled.clone().or_else(|| state.original.clone())
        };
        match current {
            Some(dispatch) => (*dispatch)(args),
            None => Err(CallError::Unbound {
                target: self.inner.target.clone(),
                method: self.inner.method.clone(),
            }),
        }
    }

    /// Convenience for single-value calls.
    pub fn invoke1(&self, arg: Value) -> CallResult {
        let mut args = vec![arg];
        self.invoke(&mut args)
    }

    /// Install a before-hook.
    ///
    /// Runs ahead of the implementation in install order and may mutate the
    /// arguments in place. An error skips the implementation and all
    /// remaining before-hooks and propagates to the caller unchanged.
    pub fn patch_before<F>(&self, callback: F) -> Unpatch
    where
        F: Fn(&mut CallArgs) -> Result<(), CallError> + Send + Sync + 'static,
    {
        self.push(HookFn::Before(Arc::new(callback)))
    }

    /// Install an after-hook.
    ///
    /// Receives the arguments and the computed result; its return value
    /// becomes the input to the next after-hook. An error skips remaining
    /// after-hooks and propagates; side effects already performed are not
    /// rolled back.
    pub fn patch_after<F>(&self, callback: F) -> Unpatch
    where
        F: Fn(&CallArgs, Value) -> CallResult + Send + Sync + 'static,
    {
        self.push(HookFn::After(Arc::new(callback)))
    }

    /// Install an instead-hook, wrapping the whole call path for its layer.
    ///
    /// The callback decides whether to continue via the supplied
    /// continuation. The most recently installed instead-hook wraps all
    /// earlier ones.
    pub fn patch_instead<F>(&self, callback: F) -> Unpatch
    where
        F: Fn(&mut CallArgs, &NextFn) -> CallResult + Send + Sync + 'static,
    {
        self.push(HookFn::Instead(Arc::new(callback)))
    }

    fn push(&self, hook: HookFn) -> Unpatch {
        let mut state = self.inner.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.records.push(PatchRecord { id, hook });
        recompile(&self.inner.target, &self.inner.method, &mut state);
        Unpatch {
            slot: Arc::downgrade(&self.inner),
            id,
        }
    }
}

fn recompile(target: &str, method: &str, state: &mut SlotState) {
    state.compiled = chain::compile(target, method, state.original.clone(), &state.records);
}

/// Handle removing one installed patch.
///
/// Removal is idempotent; a second call is a no-op. Unpatching while the
/// patch's own callback is on the call stack is legal and only affects
/// subsequent invocations. When the last patch is removed the trampoline is
/// discarded and the slot dispatches the original implementation directly.
#[derive(Clone)]
#[must_use = "dropping the handle without calling unpatch leaves the patch installed"]
pub struct Unpatch {
    slot: Weak<SlotInner>,
    id: u64,
}

impl Unpatch {
    /// Remove the patch this handle refers to.
    pub fn unpatch(&self) {
        let Some(inner) = self.slot.upgrade() else {
            return;
        };
        let mut state = inner.state.lock();
        let len = state.records.len();
        state.records.retain(|record| record.id != self.id);
        if state.records.len() != len {
            recompile(&inner.target, &inner.method, &mut state);
        }
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
