//! Proxy internal methods
//!
//! Each operation looks up its trap on the handler. Without a trap it
//! forwards to the same internal method of the target through dispatch, so
//! a proxy over another proxy or over a typed array behaves like its
//! target. With a trap, the result is checked against the target's
//! invariants before it is returned.

use rustc_hash::FxHashSet;

use crate::array::create_array_from_list;
use crate::context::VmContext;
use crate::descriptor::{PropertyDescriptor, from_property_descriptor, to_property_descriptor};
use crate::error::{VmError, VmResult};
use crate::internal_methods::{InternalMethods, ORDINARY_METHODS};
use crate::object::ObjectRef;
use crate::operations;
use crate::ordinary::is_compatible_property_descriptor;
use crate::property_key::PropertyKey;
use crate::value::{Value, same_value};

pub(crate) static PROXY_METHODS: InternalMethods = InternalMethods {
    get_prototype_of: proxy_get_prototype_of,
    set_prototype_of: proxy_set_prototype_of,
    is_extensible: proxy_is_extensible,
    prevent_extensions: proxy_prevent_extensions,
    get_own_property: proxy_get_own_property,
    define_own_property: proxy_define_own_property,
    has_property: proxy_has,
    get: proxy_get,
    set: proxy_set,
    delete: proxy_delete,
    own_property_keys: proxy_own_keys,
    call: Some(proxy_call),
    construct: Some(proxy_construct),
    ..ORDINARY_METHODS
};

fn proxy_slots(proxy: &ObjectRef, trap_name: &str) -> VmResult<(ObjectRef, ObjectRef)> {
    match proxy.as_proxy() {
        Some(data) => data.target_and_handler(trap_name),
        None => Err(VmError::internal("proxy operation on a non-proxy")),
    }
}

/// Look up `trap_name` on the handler.
///
/// Returns `Ok(None)` when the trap is undefined or null, so the caller
/// forwards to the target; a present but non-callable trap is a TypeError.
fn get_trap(ctx: &mut VmContext, handler: &ObjectRef, trap_name: &str) -> VmResult<Option<Value>> {
    let trap = operations::get(ctx, handler, &PropertyKey::intern(trap_name))?;
    if trap.is_nullish() {
        return Ok(None);
    }
    if !trap.is_callable() {
        return Err(VmError::type_error(format!(
            "Proxy handler's '{trap_name}' trap must be a function"
        )));
    }
    Ok(Some(trap))
}

fn call_trap(
    ctx: &mut VmContext,
    trap: &Value,
    handler: &ObjectRef,
    args: &[Value],
) -> VmResult<Value> {
    operations::call(ctx, trap, &Value::object(handler.clone()), args)
}

/// `[[GetPrototypeOf]]`
fn proxy_get_prototype_of(ctx: &mut VmContext, proxy: &ObjectRef) -> VmResult<Option<ObjectRef>> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "getPrototypeOf")?;
        let Some(trap) = get_trap(ctx, &handler, "getPrototypeOf")? else {
            return target.internal_get_prototype_of(ctx);
        };
        let handler_proto = match call_trap(ctx, &trap, &handler, &[Value::object(target.clone())])? {
            Value::Object(o) => Some(o),
            Value::Null => None,
            _ => {
                return Err(VmError::type_error(
                    "'getPrototypeOf' on proxy: trap returned neither object nor null",
                ));
            }
        };
        if target.internal_is_extensible(ctx)? {
            return Ok(handler_proto);
        }
        if target.internal_get_prototype_of(ctx)? != handler_proto {
            return Err(VmError::type_error(
                "'getPrototypeOf' on proxy: proxy target is non-extensible but the trap did not return its actual prototype",
            ));
        }
        Ok(handler_proto)
    })
}

/// `[[SetPrototypeOf]]`
fn proxy_set_prototype_of(
    ctx: &mut VmContext,
    proxy: &ObjectRef,
    proto: Option<ObjectRef>,
) -> VmResult<bool> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "setPrototypeOf")?;
        let Some(trap) = get_trap(ctx, &handler, "setPrototypeOf")? else {
            return target.internal_set_prototype_of(ctx, proto);
        };
        let proto_value = proto.clone().map_or(Value::null(), Value::object);
        let result = call_trap(ctx, &trap, &handler, &[Value::object(target.clone()), proto_value])?;
        if !result.to_boolean() {
            return Ok(false);
        }
        if target.internal_is_extensible(ctx)? {
            return Ok(true);
        }
        if target.internal_get_prototype_of(ctx)? != proto {
            return Err(VmError::type_error(
                "'setPrototypeOf' on proxy: trap returned truish for setting a new prototype on the non-extensible proxy target",
            ));
        }
        Ok(true)
    })
}

/// `[[IsExtensible]]`
fn proxy_is_extensible(ctx: &mut VmContext, proxy: &ObjectRef) -> VmResult<bool> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "isExtensible")?;
        let Some(trap) = get_trap(ctx, &handler, "isExtensible")? else {
            return target.internal_is_extensible(ctx);
        };
        let result = call_trap(ctx, &trap, &handler, &[Value::object(target.clone())])?.to_boolean();
        if result != target.internal_is_extensible(ctx)? {
            return Err(VmError::type_error(format!(
                "'isExtensible' on proxy: trap result does not reflect extensibility of proxy target (which is '{}')",
                !result
            )));
        }
        Ok(result)
    })
}

/// `[[PreventExtensions]]`
fn proxy_prevent_extensions(ctx: &mut VmContext, proxy: &ObjectRef) -> VmResult<bool> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "preventExtensions")?;
        let Some(trap) = get_trap(ctx, &handler, "preventExtensions")? else {
            return target.internal_prevent_extensions(ctx);
        };
        let result = call_trap(ctx, &trap, &handler, &[Value::object(target.clone())])?.to_boolean();
        if result && target.internal_is_extensible(ctx)? {
            return Err(VmError::type_error(
                "'preventExtensions' on proxy: trap returned truish but the proxy target is extensible",
            ));
        }
        Ok(result)
    })
}

/// `[[GetOwnProperty]]`
fn proxy_get_own_property(
    ctx: &mut VmContext,
    proxy: &ObjectRef,
    key: &PropertyKey,
) -> VmResult<Option<PropertyDescriptor>> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "getOwnPropertyDescriptor")?;
        let Some(trap) = get_trap(ctx, &handler, "getOwnPropertyDescriptor")? else {
            return target.internal_get_own_property(ctx, key);
        };
        let result = call_trap(
            ctx,
            &trap,
            &handler,
            &[Value::object(target.clone()), key.to_value()],
        )?;
        if !result.is_object() && !result.is_undefined() {
            return Err(VmError::type_error(format!(
                "'getOwnPropertyDescriptor' on proxy: trap returned neither object nor undefined for property '{key}'"
            )));
        }
        let target_desc = target.internal_get_own_property(ctx, key)?;

        if result.is_undefined() {
            let Some(target_desc) = target_desc else {
                return Ok(None);
            };
            if !target_desc.is_configurable() {
                return Err(VmError::type_error(format!(
                    "'getOwnPropertyDescriptor' on proxy: trap returned undefined for property '{key}' which is non-configurable in the proxy target"
                )));
            }
            if !target.internal_is_extensible(ctx)? {
                return Err(VmError::type_error(format!(
                    "'getOwnPropertyDescriptor' on proxy: trap returned undefined for property '{key}' which exists in the non-extensible proxy target"
                )));
            }
            return Ok(None);
        }

        let extensible = target.internal_is_extensible(ctx)?;
        let partial = to_property_descriptor(ctx, &result)?;
        let result_desc = PropertyDescriptor::from_property(&partial.to_property());
        if !is_compatible_property_descriptor(extensible, &result_desc, target_desc.as_ref()) {
            return Err(VmError::type_error(format!(
                "'getOwnPropertyDescriptor' on proxy: trap returned descriptor for property '{key}' that is incompatible with the existing property in the proxy target"
            )));
        }
        if !result_desc.is_configurable() {
            match &target_desc {
                Some(t) if !t.is_configurable() => {}
                _ => {
                    return Err(VmError::type_error(format!(
                        "'getOwnPropertyDescriptor' on proxy: trap reported non-configurability for property '{key}' which is either non-existent or configurable in the proxy target"
                    )));
                }
            }
            if partial.writable == Some(false)
                && target_desc.as_ref().is_some_and(PropertyDescriptor::is_writable)
            {
                return Err(VmError::type_error(format!(
                    "'getOwnPropertyDescriptor' on proxy: trap reported non-configurable and writable for property '{key}' which is non-configurable, non-writable in the proxy target"
                )));
            }
        }
        Ok(Some(result_desc))
    })
}

/// `[[DefineOwnProperty]]`
fn proxy_define_own_property(
    ctx: &mut VmContext,
    proxy: &ObjectRef,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> VmResult<bool> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "defineProperty")?;
        let Some(trap) = get_trap(ctx, &handler, "defineProperty")? else {
            return target.internal_define_own_property(ctx, key, desc);
        };
        let desc_obj = from_property_descriptor(ctx, Some(desc))?;
        let result = call_trap(
            ctx,
            &trap,
            &handler,
            &[Value::object(target.clone()), key.to_value(), desc_obj],
        )?;
        if !result.to_boolean() {
            return Ok(false);
        }

        let target_desc = target.internal_get_own_property(ctx, key)?;
        let extensible = target.internal_is_extensible(ctx)?;
        let setting_config_false = desc.configurable == Some(false);

        match target_desc {
            None => {
                if !extensible {
                    return Err(VmError::type_error(format!(
                        "'defineProperty' on proxy: trap returned truish for adding property '{key}' to the non-extensible proxy target"
                    )));
                }
                if setting_config_false {
                    return Err(VmError::type_error(format!(
                        "'defineProperty' on proxy: trap returned truish for defining non-configurable property '{key}' which is non-existent in the proxy target"
                    )));
                }
            }
            Some(target_desc) => {
                if !is_compatible_property_descriptor(extensible, desc, Some(&target_desc)) {
                    return Err(VmError::type_error(format!(
                        "'defineProperty' on proxy: trap returned truish for adding property '{key}' that is incompatible with the existing property in the proxy target"
                    )));
                }
                if setting_config_false && target_desc.is_configurable() {
                    return Err(VmError::type_error(format!(
                        "'defineProperty' on proxy: trap returned truish for defining non-configurable property '{key}' which is configurable in the proxy target"
                    )));
                }
                if target_desc.is_data_descriptor()
                    && !target_desc.is_configurable()
                    && target_desc.is_writable()
                    && desc.writable == Some(false)
                {
                    return Err(VmError::type_error(format!(
                        "'defineProperty' on proxy: trap returned truish for defining non-configurable property '{key}' which cannot be non-writable, unless there exists a corresponding non-configurable, non-writable own property of the target object"
                    )));
                }
            }
        }
        Ok(true)
    })
}

/// `[[HasProperty]]`
fn proxy_has(ctx: &mut VmContext, proxy: &ObjectRef, key: &PropertyKey) -> VmResult<bool> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "has")?;
        let Some(trap) = get_trap(ctx, &handler, "has")? else {
            return target.internal_has_property(ctx, key);
        };
        let result = call_trap(
            ctx,
            &trap,
            &handler,
            &[Value::object(target.clone()), key.to_value()],
        )?
        .to_boolean();
        if !result && let Some(target_desc) = target.internal_get_own_property(ctx, key)? {
            if !target_desc.is_configurable() {
                return Err(VmError::type_error(format!(
                    "'has' on proxy: trap returned falsish for property '{key}' which exists in the proxy target as non-configurable"
                )));
            }
            if !target.internal_is_extensible(ctx)? {
                return Err(VmError::type_error(format!(
                    "'has' on proxy: trap returned falsish for property '{key}' but the proxy target is not extensible"
                )));
            }
        }
        Ok(result)
    })
}

/// `[[Get]]`
fn proxy_get(
    ctx: &mut VmContext,
    proxy: &ObjectRef,
    key: &PropertyKey,
    receiver: &Value,
) -> VmResult<Value> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "get")?;
        let Some(trap) = get_trap(ctx, &handler, "get")? else {
            return target.internal_get(ctx, key, receiver);
        };
        let result = call_trap(
            ctx,
            &trap,
            &handler,
            &[Value::object(target.clone()), key.to_value(), receiver.clone()],
        )?;
        if let Some(target_desc) = target.internal_get_own_property(ctx, key)?
            && !target_desc.is_configurable()
        {
            if target_desc.is_data_descriptor() && !target_desc.is_writable() {
                let expected = target_desc.value.clone().unwrap_or_default();
                if !same_value(&result, &expected) {
                    return Err(VmError::type_error(format!(
                        "'get' on proxy: property '{key}' is a read-only and non-configurable data property on the proxy target but the proxy did not return its actual value"
                    )));
                }
            }
            if target_desc.is_accessor_descriptor()
                && target_desc.get.clone().flatten().is_none()
                && !result.is_undefined()
            {
                return Err(VmError::type_error(format!(
                    "'get' on proxy: property '{key}' is a non-configurable accessor property on the proxy target and does not have a getter function, but the trap did not return 'undefined'"
                )));
            }
        }
        Ok(result)
    })
}

/// `[[Set]]`
fn proxy_set(
    ctx: &mut VmContext,
    proxy: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> VmResult<bool> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "set")?;
        let Some(trap) = get_trap(ctx, &handler, "set")? else {
            return target.internal_set(ctx, key, value, receiver);
        };
        let result = call_trap(
            ctx,
            &trap,
            &handler,
            &[
                Value::object(target.clone()),
                key.to_value(),
                value.clone(),
                receiver.clone(),
            ],
        )?;
        if !result.to_boolean() {
            return Ok(false);
        }
        if let Some(target_desc) = target.internal_get_own_property(ctx, key)?
            && !target_desc.is_configurable()
        {
            if target_desc.is_data_descriptor() && !target_desc.is_writable() {
                let current = target_desc.value.clone().unwrap_or_default();
                if !same_value(&value, &current) {
                    return Err(VmError::type_error(format!(
                        "'set' on proxy: trap returned truish for property '{key}' which exists in the proxy target as a non-configurable and non-writable data property with a different value"
                    )));
                }
            }
            if target_desc.is_accessor_descriptor() && target_desc.set.clone().flatten().is_none() {
                return Err(VmError::type_error(format!(
                    "'set' on proxy: trap returned truish for property '{key}' which exists in the proxy target as a non-configurable and non-writable accessor property without a setter"
                )));
            }
        }
        Ok(true)
    })
}

/// `[[Delete]]`
fn proxy_delete(ctx: &mut VmContext, proxy: &ObjectRef, key: &PropertyKey) -> VmResult<bool> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "deleteProperty")?;
        let Some(trap) = get_trap(ctx, &handler, "deleteProperty")? else {
            return target.internal_delete(ctx, key);
        };
        let result = call_trap(
            ctx,
            &trap,
            &handler,
            &[Value::object(target.clone()), key.to_value()],
        )?;
        if !result.to_boolean() {
            return Ok(false);
        }
        let Some(target_desc) = target.internal_get_own_property(ctx, key)? else {
            return Ok(true);
        };
        if !target_desc.is_configurable() {
            return Err(VmError::type_error(format!(
                "'deleteProperty' on proxy: trap returned truish for property '{key}' which is non-configurable in the proxy target"
            )));
        }
        if !target.internal_is_extensible(ctx)? {
            return Err(VmError::type_error(format!(
                "'deleteProperty' on proxy: trap returned truish for property '{key}' but the proxy target is non-extensible"
            )));
        }
        Ok(true)
    })
}

/// `[[OwnPropertyKeys]]`
fn proxy_own_keys(ctx: &mut VmContext, proxy: &ObjectRef) -> VmResult<Vec<PropertyKey>> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "ownKeys")?;
        let Some(trap) = get_trap(ctx, &handler, "ownKeys")? else {
            return target.internal_own_property_keys(ctx);
        };
        let result_array = call_trap(ctx, &trap, &handler, &[Value::object(target.clone())])?;
        let elements = operations::create_list_from_array_like(ctx, &result_array)?;

        let mut trap_result = Vec::with_capacity(elements.len());
        let mut seen = FxHashSet::default();
        for element in &elements {
            let Some(key) = PropertyKey::from_value(element) else {
                return Err(VmError::type_error(format!(
                    "{element:?} is not a valid property name"
                )));
            };
            if !seen.insert(key.clone()) {
                return Err(VmError::type_error(format!(
                    "'ownKeys' on proxy: trap returned duplicate entries ('{key}')"
                )));
            }
            trap_result.push(key);
        }

        let extensible = target.internal_is_extensible(ctx)?;
        let mut configurable_keys = Vec::new();
        let mut nonconfigurable_keys = Vec::new();
        for key in target.internal_own_property_keys(ctx)? {
            match target.internal_get_own_property(ctx, &key)? {
                Some(desc) if !desc.is_configurable() => nonconfigurable_keys.push(key),
                _ => configurable_keys.push(key),
            }
        }
        if extensible && nonconfigurable_keys.is_empty() {
            return Ok(trap_result);
        }

        let mut unchecked = seen;
        for key in &nonconfigurable_keys {
            if !unchecked.remove(key) {
                return Err(VmError::type_error(format!(
                    "'ownKeys' on proxy: trap result did not include '{key}'"
                )));
            }
        }
        if extensible {
            return Ok(trap_result);
        }
        for key in &configurable_keys {
            if !unchecked.remove(key) {
                return Err(VmError::type_error(format!(
                    "'ownKeys' on proxy: trap result did not include '{key}'"
                )));
            }
        }
        if !unchecked.is_empty() {
            return Err(VmError::type_error(
                "'ownKeys' on proxy: trap returned extra keys but proxy target is non-extensible",
            ));
        }
        Ok(trap_result)
    })
}

/// `[[Call]]`
fn proxy_call(
    ctx: &mut VmContext,
    proxy: &ObjectRef,
    this: &Value,
    args: &[Value],
) -> VmResult<Value> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "apply")?;
        let Some(trap) = get_trap(ctx, &handler, "apply")? else {
            return target.internal_call(ctx, this, args);
        };
        let arg_array = create_array_from_list(ctx, args);
        call_trap(
            ctx,
            &trap,
            &handler,
            &[Value::object(target), this.clone(), Value::object(arg_array)],
        )
    })
}

/// `[[Construct]]`
fn proxy_construct(
    ctx: &mut VmContext,
    proxy: &ObjectRef,
    args: &[Value],
    new_target: &ObjectRef,
) -> VmResult<Value> {
    ctx.enter(|ctx| {
        let (target, handler) = proxy_slots(proxy, "construct")?;
        let Some(trap) = get_trap(ctx, &handler, "construct")? else {
            return target.internal_construct(ctx, args, new_target);
        };
        let arg_array = create_array_from_list(ctx, args);
        let result = call_trap(
            ctx,
            &trap,
            &handler,
            &[
                Value::object(target),
                Value::object(arg_array),
                Value::object(new_target.clone()),
            ],
        )?;
        if !result.is_object() {
            return Err(VmError::type_error(
                "'construct' on proxy: trap returned non-object",
            ));
        }
        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Property, PropertyAttributes};
    use crate::proxy::proxy_create;
    use crate::runtime::VmRuntime;

    fn setup() -> VmContext {
        VmRuntime::new().create_context()
    }

    fn handler_with(ctx: &VmContext, trap: &str, f: crate::function::FunctionBuilder) -> ObjectRef {
        let handler = ctx.new_object();
        let func = f.prototype(ctx.intrinsics().function_prototype.clone()).build();
        handler.insert_property(PropertyKey::intern(trap), Property::data(Value::object(func)));
        handler
    }

    #[test]
    fn test_missing_trap_forwards_to_target() {
        let mut ctx = setup();
        let target = ctx.new_object();
        target.insert_property(PropertyKey::string("x"), Property::data(Value::int32(7)));
        let proxy = proxy_create(&Value::object(target.clone()), &Value::object(ctx.new_object())).unwrap();
        let receiver = Value::object(proxy.clone());

        assert_eq!(
            proxy.internal_get(&mut ctx, &PropertyKey::string("x"), &receiver).unwrap(),
            Value::int32(7)
        );
        assert!(proxy.internal_set(&mut ctx, &PropertyKey::string("y"), Value::int32(1), &receiver).unwrap());
        // the new property lands on the receiver, which forwards its define to the target
        assert!(target.own_property(&PropertyKey::string("y")).is_some());
    }

    #[test]
    fn test_get_trap_invariant() {
        let mut ctx = setup();
        let target = ctx.new_object();
        target.insert_property(
            PropertyKey::string("p"),
            Property::data_with_attrs(Value::int32(5), PropertyAttributes::frozen()),
        );
        let handler = handler_with(
            &ctx,
            "get",
            crate::function::FunctionBuilder::new("get", 3, |_, _, _| Ok(Value::int32(6))),
        );
        let proxy = proxy_create(&Value::object(target), &Value::object(handler)).unwrap();
        let err = proxy
            .internal_get(&mut ctx, &PropertyKey::string("p"), &Value::object(proxy.clone()))
            .unwrap_err();
        assert!(err.is_type_error());

        let other = proxy
            .internal_get(&mut ctx, &PropertyKey::string("q"), &Value::object(proxy.clone()))
            .unwrap();
        assert_eq!(other, Value::int32(6));
    }

    #[test]
    fn test_set_trap_invariant() {
        let mut ctx = setup();
        let target = ctx.new_object();
        target.insert_property(
            PropertyKey::string("p"),
            Property::data_with_attrs(Value::int32(5), PropertyAttributes::frozen()),
        );
        let handler = handler_with(
            &ctx,
            "set",
            crate::function::FunctionBuilder::new("set", 4, |_, _, _| Ok(Value::boolean(true))),
        );
        let proxy = proxy_create(&Value::object(target), &Value::object(handler)).unwrap();
        let receiver = Value::object(proxy.clone());

        // reporting success for the frozen value itself is allowed
        assert!(proxy.internal_set(&mut ctx, &PropertyKey::string("p"), Value::int32(5), &receiver).unwrap());
        let err = proxy
            .internal_set(&mut ctx, &PropertyKey::string("p"), Value::int32(6), &receiver)
            .unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_non_callable_trap_is_type_error() {
        let mut ctx = setup();
        let handler = ctx.new_object();
        handler.insert_property(PropertyKey::intern("has"), Property::data(Value::int32(1)));
        let proxy = proxy_create(&Value::object(ctx.new_object()), &Value::object(handler)).unwrap();
        assert!(proxy
            .internal_has_property(&mut ctx, &PropertyKey::string("a"))
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_own_keys_duplicates_rejected() {
        let mut ctx = setup();
        let handler = handler_with(
            &ctx,
            "ownKeys",
            crate::function::FunctionBuilder::new("ownKeys", 1, |ctx, _, _| {
                let list = create_array_from_list(ctx, &[Value::string("a"), Value::string("a")]);
                Ok(Value::object(list))
            }),
        );
        let proxy = proxy_create(&Value::object(ctx.new_object()), &Value::object(handler)).unwrap();
        assert!(proxy.internal_own_property_keys(&mut ctx).unwrap_err().is_type_error());
    }

    #[test]
    fn test_apply_trap_receives_argument_array() {
        let mut ctx = setup();
        let target = ctx.new_function("t", 0, |_, _, _| Ok(Value::int32(0)));
        let handler = handler_with(
            &ctx,
            "apply",
            crate::function::FunctionBuilder::new("apply", 3, |ctx, _, args| {
                let list = operations::create_list_from_array_like(ctx, &args[2])?;
                Ok(Value::number(list.len() as f64))
            }),
        );
        let proxy = proxy_create(&Value::object(target), &Value::object(handler)).unwrap();
        assert!(proxy.is_callable());
        let result = ctx
            .call(&Value::object(proxy), &Value::undefined(), &[Value::null(), Value::null()])
            .unwrap();
        assert_eq!(result, Value::int32(2));
    }
}
