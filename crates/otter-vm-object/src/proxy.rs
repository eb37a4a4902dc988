//! Proxy exotic objects
//!
//! A proxy stores its target and handler until revoked. Revocation drops
//! both references, so every later operation sees an empty slot and throws.
//! Whether the proxy is callable or constructible is fixed at creation from
//! the target.

use parking_lot::RwLock;

use crate::context::VmContext;
use crate::error::{VmError, VmResult};
use crate::function::FunctionBuilder;
use crate::object::{ObjectKind, ObjectRef};
use crate::value::Value;

/// `[[ProxyTarget]]` and `[[ProxyHandler]]`
pub struct ProxyData {
    slots: RwLock<Option<(ObjectRef, ObjectRef)>>,
    callable: bool,
    constructor: bool,
}

impl ProxyData {
    /// Target, or `None` once revoked
    pub fn target(&self) -> Option<ObjectRef> {
        self.slots.read().as_ref().map(|(t, _)| t.clone())
    }

    /// Handler, or `None` once revoked
    pub fn handler(&self) -> Option<ObjectRef> {
        self.slots.read().as_ref().map(|(_, h)| h.clone())
    }

    /// Target and handler together, or a TypeError naming `operation`
    pub fn target_and_handler(&self, operation: &str) -> VmResult<(ObjectRef, ObjectRef)> {
        self.slots.read().clone().ok_or_else(|| {
            VmError::type_error(format!(
                "Cannot perform '{operation}' on a proxy that has been revoked"
            ))
        })
    }

    /// Check if this proxy has been revoked
    pub fn is_revoked(&self) -> bool {
        self.slots.read().is_none()
    }

    /// Revoke; later calls are no-ops.
    pub fn revoke(&self) {
        if self.slots.write().take().is_some() {
            tracing::debug!("proxy revoked");
        }
    }

    /// Target had `[[Call]]` at creation
    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Target had `[[Construct]]` at creation
    pub fn is_constructor(&self) -> bool {
        self.constructor
    }
}

impl std::fmt::Debug for ProxyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target() {
            Some(target) => write!(f, "Proxy {{ target: {target:?} }}"),
            None => write!(f, "Proxy {{ <revoked> }}"),
        }
    }
}

/// `ProxyCreate(target, handler)`
pub fn proxy_create(target: &Value, handler: &Value) -> VmResult<ObjectRef> {
    let (Value::Object(target), Value::Object(handler)) = (target, handler) else {
        return Err(VmError::type_error(
            "Cannot create proxy with a non-object as target or handler",
        ));
    };
    let data = ProxyData {
        slots: RwLock::new(Some((target.clone(), handler.clone()))),
        callable: target.is_callable(),
        constructor: target.is_constructor(),
    };
    Ok(ObjectRef::new(ObjectKind::Proxy(data), None))
}

/// Result of `Proxy.revocable`
pub struct RevocableProxy {
    /// The proxy object
    pub proxy: ObjectRef,
    /// Native function revoking `proxy`
    pub revoke: ObjectRef,
}

/// `Proxy.revocable(target, handler)`
pub fn proxy_revocable(ctx: &VmContext, target: &Value, handler: &Value) -> VmResult<RevocableProxy> {
    let proxy = proxy_create(target, handler)?;
    let held = proxy.clone();
    let revoke = FunctionBuilder::new("", 0, move |_, _, _| {
        if let Some(data) = held.as_proxy() {
            data.revoke();
        }
        Ok(Value::undefined())
    })
    .capture(proxy.clone())
    .prototype(ctx.intrinsics().function_prototype.clone())
    .build();
    Ok(RevocableProxy { proxy, revoke })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;

    #[test]
    fn test_proxy_creation() {
        let target = Value::object(ObjectRef::ordinary(None));
        let handler = Value::object(ObjectRef::ordinary(None));
        let proxy = proxy_create(&target, &handler).unwrap();
        let data = proxy.as_proxy().unwrap();
        assert!(!data.is_revoked());
        assert!(!data.is_callable());
        assert_eq!(data.target().map(Value::object), Some(target));
    }

    #[test]
    fn test_non_object_target_rejected() {
        let handler = Value::object(ObjectRef::ordinary(None));
        let err = proxy_create(&Value::int32(1), &handler).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut ctx = VmRuntime::new().create_context();
        let target = Value::object(ctx.new_object());
        let handler = Value::object(ctx.new_object());
        let RevocableProxy { proxy, revoke } = proxy_revocable(&ctx, &target, &handler).unwrap();

        let revoke = Value::object(revoke);
        ctx.call(&revoke, &Value::undefined(), &[]).unwrap();
        ctx.call(&revoke, &Value::undefined(), &[]).unwrap();

        let data = proxy.as_proxy().unwrap();
        assert!(data.is_revoked());
        assert!(data.target().is_none());
        assert!(data.target_and_handler("get").unwrap_err().is_type_error());
    }
}
