// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Patch records and trampoline compilation.

use crate::error::CallError;
use serde_json::Value;
use std::sync::Arc;

/// Arguments flowing through a slot; before-hooks may mutate them in place.
pub type CallArgs = Vec<Value>;

/// Result of invoking a slot or continuing a chain.
pub type CallResult = Result<Value, CallError>;

/// A bound method implementation or a compiled trampoline.
pub type MethodFn = dyn Fn(&mut CallArgs) -> CallResult + Send + Sync;

/// Continuation handed to an instead-hook.
///
/// The hook must invoke it to continue down the chain, or skip it to fully
/// replace the call for its layer.
pub type NextFn = dyn Fn(&mut CallArgs) -> CallResult + Send + Sync;

pub(crate) type BeforeFn = dyn Fn(&mut CallArgs) -> Result<(), CallError> + Send + Sync;
pub(crate) type AfterFn = dyn Fn(&CallArgs, Value) -> CallResult + Send + Sync;
pub(crate) type InsteadFn = dyn Fn(&mut CallArgs, &NextFn) -> CallResult + Send + Sync;

/// Which layer of the interception chain a patch occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PatchKind {
    Before,
    After,
    Instead,
}

pub(crate) enum HookFn {
    Before(Arc<BeforeFn>),
    After(Arc<AfterFn>),
    Instead(Arc<InsteadFn>),
}

/// One installed patch. Identity is `id`; position in the slot's record list
/// is the insertion order used for chain composition.
pub(crate) struct PatchRecord {
    pub(crate) id: u64,
    pub(crate) hook: HookFn,
}

impl PatchRecord {
    pub(crate) fn kind(&self) -> PatchKind {
        match self.hook {
            HookFn::Before(_) => PatchKind::Before,
            HookFn::After(_) => PatchKind::After,
            HookFn::Instead(_) => PatchKind::Instead,
        }
    }
}

/// Compile the record list into a single trampoline closure.
///
/// The innermost layer runs before-hooks in install order, dispatches the
/// bound implementation exactly once, then runs after-hooks in install
/// order on the result. Instead-hooks nest around it in reverse install
/// order so the most recently installed one wraps all earlier ones.
///
/// Returns `None` for an empty chain so the slot dispatches the original
/// directly, indistinguishable from never having been patched.
pub(crate) fn compile(
    target: &str,
    method: &str,
    original: Option<Arc<MethodFn>>,
    records: &[PatchRecord],
) -> Option<Arc<MethodFn>> {
    if records.is_empty() {
        return None;
    }

    let befores: Vec<Arc<BeforeFn>> = records
        .iter()
        .filter_map(|record| match &record.hook {
            HookFn::Before(hook) => Some(Arc::clone(hook)),
            _ => None,
        })
        .collect();
    let afters: Vec<Arc<AfterFn>> = records
        .iter()
        .filter_map(|record| match &record.hook {
            HookFn::After(hook) => Some(Arc::clone(hook)),
            _ => None,
        })
        .collect();
    let insteads: Vec<Arc<InsteadFn>> = records
        .iter()
        .filter_map(|record| match &record.hook {
            HookFn::Instead(hook) => Some(Arc::clone(hook)),
            _ => None,
        })
        .collect();

    let target = target.to_string();
    let method = method.to_string();
    let core: Box<NextFn> = Box::new(move |args: &mut CallArgs| {
        for before in &befores {
            (**before)(args)?;
        }
        let implementation = original.clone().ok_or_else(|| CallError::Unbound {
            target: target.clone(),
            method: method.clone(),
        })?;
        let mut result = (*implementation)(args)?;
        for after in &afters {
            result = (**after)(args, result)?;
        }
        Ok(result)
    });

    let mut layer = core;
    for instead in insteads {
        let inner = layer;
        layer = Box::new(move |args: &mut CallArgs| (*instead)(args, &*inner));
    }

    Some(Arc::from(layer))
}
