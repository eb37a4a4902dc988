//! Execution context
//!
//! A `VmContext` is threaded through every internal operation. It knows the
//! current realm (for intrinsic prototypes), whether assignments are strict,
//! and how deep the current chain of re-entrant calls is.

use std::sync::Arc;

use crate::error::{VmError, VmResult};
use crate::function;
use crate::intrinsics::Intrinsics;
use crate::object::ObjectRef;
use crate::operations;
use crate::realm::Realm;
use crate::runtime::RuntimeConfig;
use crate::string::JsString;
use crate::symbol::Symbol;
use crate::value::Value;

/// Execution context
pub struct VmContext {
    realm: Arc<Realm>,
    config: RuntimeConfig,
    depth: usize,
    strict: bool,
}

impl VmContext {
    /// Create a context bound to `realm`
    pub fn new(realm: Arc<Realm>, config: RuntimeConfig) -> Self {
        let strict = config.strict_mode;
        Self {
            realm,
            config,
            depth: 0,
            strict,
        }
    }

    // ===== Getters =====

    /// Current realm
    pub fn realm(&self) -> &Arc<Realm> {
        &self.realm
    }

    /// Intrinsics of the current realm
    pub fn intrinsics(&self) -> &Intrinsics {
        self.realm.intrinsics()
    }

    /// Global object of the current realm
    pub fn global(&self) -> &ObjectRef {
        self.realm.global()
    }

    /// Configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Whether failed assignments throw
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Switch assignment strictness (the host flips this per function)
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Current re-entrancy depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `f` one level deeper, failing with `StackOverflow` at the limit.
    pub fn enter<T>(&mut self, f: impl FnOnce(&mut Self) -> VmResult<T>) -> VmResult<T> {
        if self.depth >= self.config.max_stack_depth {
            tracing::debug!(depth = self.depth, "maximum stack depth reached");
            return Err(VmError::StackOverflow);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ===== Object creation =====

    /// `OrdinaryObjectCreate(%Object.prototype%)`
    pub fn new_object(&self) -> ObjectRef {
        ObjectRef::ordinary(Some(self.intrinsics().object_prototype.clone()))
    }

    /// Native function in this realm
    pub fn new_function<F>(&self, name: &str, length: u32, f: F) -> ObjectRef
    where
        F: Fn(&mut VmContext, &Value, &[Value]) -> VmResult<Value> + Send + Sync + 'static,
    {
        function::native_function(self, name, length, f)
    }

    /// `Symbol.for(key)`
    pub fn symbol_for(&self, key: &str) -> Symbol {
        self.realm.symbol_registry().for_key(&JsString::new(key))
    }

    // ===== Invocation =====

    /// `Call(f, this, args)`
    pub fn call(&mut self, f: &Value, this: &Value, args: &[Value]) -> VmResult<Value> {
        operations::call(self, f, this, args)
    }

    /// `Construct(f, args, newTarget)`; `new_target` defaults to `f`
    pub fn construct(
        &mut self,
        f: &Value,
        args: &[Value],
        new_target: Option<&ObjectRef>,
    ) -> VmResult<Value> {
        operations::construct(self, f, args, new_target)
    }
}
