// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Module table with one-time normalization into deterministic key order.

use bootlace_patcher::{CallError, CallResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Factory executed on first access to produce a module's exported value.
pub type ModuleFactory = Arc<dyn Fn() -> CallResult + Send + Sync>;

enum ModuleEntry {
    Pending(ModuleFactory),
    Ready(Value),
}

/// The host's module table.
///
/// Starts out backed by a hash table whose iteration order is not
/// load-bearing. [`ModuleRegistry::normalize`] rewrites it once into a
/// keyed table with deterministic index order; lookups behave identically
/// before and after.
pub struct ModuleRegistry {
    table: Mutex<Table>,
}

enum Table {
    Unordered(HashMap<u32, ModuleEntry>),
    Keyed(BTreeMap<u32, ModuleEntry>),
}

impl Table {
    fn get(&self, index: u32) -> Option<&ModuleEntry> {
        match self {
            Self::Unordered(map) => map.get(&index),
            Self::Keyed(map) => map.get(&index),
        }
    }

    fn insert(&mut self, index: u32, entry: ModuleEntry) {
        match self {
            Self::Unordered(map) => {
                map.insert(index, entry);
            }
            Self::Keyed(map) => {
                map.insert(index, entry);
            }
        }
    }

    fn contains(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    fn len(&self) -> usize {
        match self {
            Self::Unordered(map) => map.len(),
            Self::Keyed(map) => map.len(),
        }
    }

    fn ids(&self) -> Vec<u32> {
        match self {
            Self::Unordered(map) => map.keys().copied().collect(),
            Self::Keyed(map) => map.keys().copied().collect(),
        }
    }
}

impl ModuleRegistry {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table::Unordered(HashMap::new())),
        }
    }

    /// Register a module whose factory runs on first access.
    pub fn define<F>(&self, index: u32, factory: F)
    where
        F: Fn() -> CallResult + Send + Sync + 'static,
    {
        self.table
            .lock()
            .insert(index, ModuleEntry::Pending(Arc::new(factory)));
    }

    /// Register a module with an already-computed exported value.
    pub fn define_value(&self, index: u32, value: Value) {
        self.table.lock().insert(index, ModuleEntry::Ready(value));
    }

    /// Adopt exported values from a host-supplied table.
    ///
    /// Indices already defined are left untouched.
    pub fn adopt(&self, exports: HashMap<u32, Value>) {
        let mut table = self.table.lock();
        for (index, value) in exports {
            if !table.contains(index) {
                table.insert(index, ModuleEntry::Ready(value));
            }
        }
    }

    /// Rewrite the table into its deterministic keyed form.
    ///
    /// Synchronous, one-time; calling again is a no-op. Returns the number
    /// of entries.
    pub fn normalize(&self) -> usize {
        let mut table = self.table.lock();
        if let Table::Unordered(map) = &mut *table {
            let keyed: BTreeMap<u32, ModuleEntry> = std::mem::take(map).into_iter().collect();
            *table = Table::Keyed(keyed);
        }
        table.len()
    }

    /// Whether normalization has happened.
    pub fn is_keyed(&self) -> bool {
        matches!(&*self.table.lock(), Table::Keyed(_))
    }

    /// Module indices in the table's current iteration order.
    ///
    /// Deterministic (ascending) once normalized.
    pub fn ids(&self) -> Vec<u32> {
        self.table.lock().ids()
    }

    /// Whether an index is defined.
    pub fn contains(&self, index: u32) -> bool {
        self.table.lock().contains(index)
    }

    /// Number of defined modules.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve an index to its exported value, executing the factory on
    /// first access and caching the result.
    pub fn resolve(&self, index: u32) -> CallResult {
        let factory = {
            let table = self.table.lock();
            match table.get(index) {
                None => {
                    return Err(CallError::failed(format!("unknown module index {}", index)))
                }
                Some(ModuleEntry::Ready(value)) => return Ok(value.clone()),
                Some(ModuleEntry::Pending(factory)) => Arc::clone(factory),
            }
        };

        // Run the factory without holding the table lock so module code may
        // resolve other modules.
        let value = (*factory)()?;
        self.table
            .lock()
            .insert(index, ModuleEntry::Ready(value.clone()));
        Ok(value)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "modules_tests.rs"]
mod tests;
