// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host model: module table, native bridge, loader slot, and the
//! process-wide runtime context shared by every component.

pub mod bridge;
pub mod context;
pub mod loader;
pub mod modules;

pub use bridge::{empty_snapshot, BatchedBridge};
pub use context::{HostRuntime, HostRuntimeBuilder};
pub use loader::{bind_registry_loader, ROOT_MODULE_INDEX};
pub use modules::ModuleRegistry;
