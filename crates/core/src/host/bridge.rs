// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Batched native bridge: named callable modules and the patchable
//! dispatch entry point.

use bootlace_patcher::{CallArgs, CallError, CallResult, MethodSlot};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Handler backing one callable module: `(method, args)`.
pub type CallableModule = Arc<dyn Fn(&str, &[Value]) -> Result<(), CallError> + Send + Sync>;

/// The snapshot returned for a call serviced with nothing queued.
pub fn empty_snapshot() -> Value {
    Value::Null
}

/// The host's batched dispatch bridge.
///
/// `callFunctionReturnFlushedQueue` is the single entry point through which
/// batched calls arrive; it routes through a [`MethodSlot`] so it can be
/// intercepted. The other contract methods (`getCallableModule`,
/// `flushedQueue`, `callFunction`) dispatch directly.
pub struct BatchedBridge {
    dispatch: MethodSlot,
    callable: Mutex<HashMap<String, CallableModule>>,
    outbound: Mutex<Vec<Value>>,
}

impl BatchedBridge {
    /// Create a bridge with its dispatch slot bound.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<BatchedBridge>| {
            let owner = weak.clone();
            let dispatch = MethodSlot::new(
                "bridge",
                "callFunctionReturnFlushedQueue",
                move |args: &mut CallArgs| {
                    let Some(bridge) = owner.upgrade() else {
                        return Err(CallError::failed("bridge no longer exists"));
                    };
                    let (module, method, call_args) = parse_dispatch_args(args)?;
                    bridge.call_function(&module, &method, call_args)?;
                    Ok(bridge.flushed_queue())
                },
            );
            BatchedBridge {
                dispatch,
                callable: Mutex::new(HashMap::new()),
                outbound: Mutex::new(Vec::new()),
            }
        })
    }

    /// Register a callable module by name.
    pub fn register_callable<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&str, &[Value]) -> Result<(), CallError> + Send + Sync + 'static,
    {
        self.callable.lock().insert(name.into(), Arc::new(handler));
    }

    /// Whether a module is callable right now.
    pub fn get_callable_module(&self, name: &str) -> bool {
        self.callable.lock().contains_key(name)
    }

    /// Dispatch a call directly to a callable module.
    pub fn call_function(
        &self,
        module: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<(), CallError> {
        let handler = self.callable.lock().get(module).cloned();
        match handler {
            Some(handler) => (*handler)(method, &args),
            None => Err(CallError::failed(format!(
                "module {} is not callable",
                module
            ))),
        }
    }

    /// Queue a host-side value for the next flushed-queue snapshot.
    pub fn queue_outbound(&self, value: Value) {
        self.outbound.lock().push(value);
    }

    /// Drain queued outbound values into a snapshot.
    pub fn flushed_queue(&self) -> Value {
        let mut outbound = self.outbound.lock();
        if outbound.is_empty() {
            empty_snapshot()
        } else {
            Value::Array(std::mem::take(&mut *outbound))
        }
    }

    /// Execute a batched call through the (interceptable) dispatch slot and
    /// return the flushed-queue snapshot.
    pub fn call_function_return_flushed_queue(
        &self,
        module: &str,
        method: &str,
        args: Vec<Value>,
    ) -> CallResult {
        let mut slot_args = vec![json!(module), json!(method), Value::Array(args)];
        self.dispatch.invoke(&mut slot_args)
    }

    /// The slot backing the batched dispatch entry point.
    pub fn dispatch_slot(&self) -> &MethodSlot {
        &self.dispatch
    }
}

/// Split a dispatch slot call into `(module, method, args)`.
pub(crate) fn parse_dispatch_args(args: &CallArgs) -> Result<(String, String, Vec<Value>), CallError> {
    let module = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| CallError::failed("malformed bridge call: missing module name"))?
        .to_string();
    let method = args
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| CallError::failed("malformed bridge call: missing method name"))?
        .to_string();
    let call_args = match args.get(2) {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    };
    Ok((module, method, call_args))
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
