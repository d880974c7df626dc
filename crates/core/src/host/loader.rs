// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The host's module loader slot.

use crate::host::modules::ModuleRegistry;
use bootlace_patcher::{CallArgs, CallError, MethodSlot};
use serde_json::Value;
use std::sync::Arc;

/// Module index reserved for the host's root module.
pub const ROOT_MODULE_INDEX: u32 = 0;

/// Create the loader slot, unbound.
///
/// The host binds the real loader later; interception installed beforehand
/// captures that late assignment.
pub fn loader_slot() -> MethodSlot {
    MethodSlot::unbound("host", "requireModule")
}

/// Bind the slot to a loader resolving indices against the registry.
///
/// Resolution executes a module's factory on first access and caches its
/// exported value.
pub fn bind_registry_loader(slot: &MethodSlot, modules: Arc<ModuleRegistry>) {
    slot.bind(move |args: &mut CallArgs| {
        let index = parse_index(args)?;
        modules.resolve(index)
    });
}

/// Extract the module index from loader call arguments.
pub(crate) fn parse_index(args: &CallArgs) -> Result<u32, CallError> {
    args.first()
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| CallError::failed("module index must be a non-negative integer"))
}
