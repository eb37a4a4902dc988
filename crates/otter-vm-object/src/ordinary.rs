//! Ordinary object internal methods
//!
//! These are the default algorithms every object kind starts from. Where an
//! algorithm needs another internal method of the same object (for example
//! `[[Get]]` asking `[[GetOwnProperty]]`), it goes back through dispatch so
//! exotic overrides stay in effect.

use rustc_hash::FxHashSet;

use crate::context::VmContext;
use crate::descriptor::{Property, PropertyAttributes, PropertyDescriptor};
use crate::error::VmResult;
use crate::object::ObjectRef;
use crate::operations;
use crate::property_key::PropertyKey;
use crate::property_table::PropertyTable;
use crate::value::{Value, same_value};

/// `OrdinaryGetPrototypeOf`
pub fn ordinary_get_prototype_of(
    _ctx: &mut VmContext,
    obj: &ObjectRef,
) -> VmResult<Option<ObjectRef>> {
    Ok(obj.prototype())
}

/// `OrdinarySetPrototypeOf`
///
/// Returns `false` for a non-extensible object or when `proto` would close
/// a cycle. The walk stops at the first proxy, whose prototype is not known
/// without running traps.
pub fn ordinary_set_prototype_of(
    _ctx: &mut VmContext,
    obj: &ObjectRef,
    proto: Option<ObjectRef>,
) -> VmResult<bool> {
    if obj.prototype() == proto {
        return Ok(true);
    }
    if !obj.extensible_flag() {
        return Ok(false);
    }

    let mut visited = FxHashSet::default();
    let mut cursor = proto.clone();
    while let Some(p) = cursor {
        if p.ptr_eq(obj) {
            tracing::debug!(object = ?obj, "prototype cycle rejected");
            return Ok(false);
        }
        if p.as_proxy().is_some() || !visited.insert(p.addr()) {
            break;
        }
        cursor = p.prototype();
    }

    obj.data_mut().prototype = proto;
    Ok(true)
}

/// `OrdinaryIsExtensible`
pub fn ordinary_is_extensible(_ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<bool> {
    Ok(obj.extensible_flag())
}

/// `OrdinaryPreventExtensions`
pub fn ordinary_prevent_extensions(_ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<bool> {
    obj.data_mut().extensible = false;
    Ok(true)
}

/// `OrdinaryGetOwnProperty`
pub fn ordinary_get_own_property(
    _ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
) -> VmResult<Option<PropertyDescriptor>> {
    Ok(obj
        .data()
        .properties
        .get(key)
        .map(PropertyDescriptor::from_property))
}

/// `OrdinaryDefineOwnProperty`
pub fn ordinary_define_own_property(
    _ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> VmResult<bool> {
    let mut data = obj.data_mut();
    let extensible = data.extensible;
    let current = data
        .properties
        .get(key)
        .map(PropertyDescriptor::from_property);
    Ok(validate_and_apply_property_descriptor(
        Some((&mut data.properties, key)),
        extensible,
        desc,
        current.as_ref(),
    ))
}

/// `IsCompatiblePropertyDescriptor`
pub fn is_compatible_property_descriptor(
    extensible: bool,
    desc: &PropertyDescriptor,
    current: Option<&PropertyDescriptor>,
) -> bool {
    validate_and_apply_property_descriptor(None, extensible, desc, current)
}

/// `ValidateAndApplyPropertyDescriptor`
///
/// `current` must be complete when present. With `target` absent this only
/// validates.
pub fn validate_and_apply_property_descriptor(
    target: Option<(&mut PropertyTable, &PropertyKey)>,
    extensible: bool,
    desc: &PropertyDescriptor,
    current: Option<&PropertyDescriptor>,
) -> bool {
    let Some(current) = current else {
        if !extensible {
            return false;
        }
        if let Some((table, key)) = target {
            table.insert(key.clone(), desc.to_property());
        }
        return true;
    };

    if desc.is_empty() {
        return true;
    }

    if !current.is_configurable() {
        if desc.configurable == Some(true) {
            return false;
        }
        if desc.enumerable.is_some_and(|e| Some(e) != current.enumerable) {
            return false;
        }
        if !desc.is_generic_descriptor()
            && desc.is_accessor_descriptor() != current.is_accessor_descriptor()
        {
            return false;
        }
        if current.is_accessor_descriptor() {
            if let Some(get) = &desc.get
                && !same_accessor(get, current.get.as_ref())
            {
                return false;
            }
            if let Some(set) = &desc.set
                && !same_accessor(set, current.set.as_ref())
            {
                return false;
            }
        } else if !current.is_writable() {
            if desc.writable == Some(true) {
                return false;
            }
            if let (Some(new), Some(old)) = (&desc.value, &current.value)
                && !same_value(new, old)
            {
                return false;
            }
        }
    }

    let Some((table, key)) = target else {
        return true;
    };

    let enumerable = desc.enumerable.unwrap_or(current.is_enumerable());
    let configurable = desc.configurable.unwrap_or(current.is_configurable());

    let merged = if current.is_data_descriptor() && desc.is_accessor_descriptor() {
        Property::accessor(
            desc.get.clone().flatten(),
            desc.set.clone().flatten(),
            enumerable,
            configurable,
        )
    } else if current.is_accessor_descriptor() && desc.is_data_descriptor() {
        Property::data_with_attrs(
            desc.value.clone().unwrap_or_default(),
            PropertyAttributes::new(desc.is_writable(), enumerable, configurable),
        )
    } else {
        let mut property = current.to_property();
        match &mut property {
            Property::Data { value, attributes } => {
                if let Some(v) = &desc.value {
                    *value = v.clone();
                }
                if let Some(w) = desc.writable {
                    attributes.writable = w;
                }
            }
            Property::Accessor { get, set, .. } => {
                if let Some(g) = &desc.get {
                    *get = g.clone();
                }
                if let Some(s) = &desc.set {
                    *set = s.clone();
                }
            }
        }
        let attributes = property.attributes_mut();
        attributes.enumerable = enumerable;
        attributes.configurable = configurable;
        property
    };
    table.insert(key.clone(), merged);
    true
}

fn same_accessor(new: &Option<ObjectRef>, current: Option<&Option<ObjectRef>>) -> bool {
    let current = current.cloned().flatten();
    new.clone() == current
}

/// `OrdinaryHasProperty`
pub fn ordinary_has_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
) -> VmResult<bool> {
    if obj.internal_get_own_property(ctx, key)?.is_some() {
        return Ok(true);
    }
    match obj.internal_get_prototype_of(ctx)? {
        Some(parent) => parent.internal_has_property(ctx, key),
        None => Ok(false),
    }
}

/// `OrdinaryGet`
///
/// Getters run with `this = receiver`, which differs from `obj` for
/// inherited properties and for `Reflect.get` with an explicit receiver.
pub fn ordinary_get(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    receiver: &Value,
) -> VmResult<Value> {
    let Some(desc) = obj.internal_get_own_property(ctx, key)? else {
        return match obj.internal_get_prototype_of(ctx)? {
            Some(parent) => parent.internal_get(ctx, key, receiver),
            None => Ok(Value::undefined()),
        };
    };
    if desc.is_data_descriptor() {
        return Ok(desc.value.unwrap_or_default());
    }
    match desc.get.flatten() {
        Some(getter) => operations::call(ctx, &Value::object(getter), receiver, &[]),
        None => Ok(Value::undefined()),
    }
}

/// `OrdinarySet`
pub fn ordinary_set(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> VmResult<bool> {
    let own_desc = obj.internal_get_own_property(ctx, key)?;
    ordinary_set_with_own_descriptor(ctx, obj, key, value, receiver, own_desc)
}

/// `OrdinarySetWithOwnDescriptor`
pub fn ordinary_set_with_own_descriptor(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
    own_desc: Option<PropertyDescriptor>,
) -> VmResult<bool> {
    let own_desc = match own_desc {
        Some(desc) => desc,
        None => match obj.internal_get_prototype_of(ctx)? {
            Some(parent) => return parent.internal_set(ctx, key, value, receiver),
            None => PropertyDescriptor::data(Value::undefined(), true, true, true),
        },
    };

    if own_desc.is_data_descriptor() {
        if !own_desc.is_writable() {
            return Ok(false);
        }
        let Value::Object(receiver_obj) = receiver else {
            return Ok(false);
        };
        return match receiver_obj.internal_get_own_property(ctx, key)? {
            Some(existing) => {
                if existing.is_accessor_descriptor() || !existing.is_writable() {
                    return Ok(false);
                }
                receiver_obj.internal_define_own_property(
                    ctx,
                    key,
                    &PropertyDescriptor::value_only(value),
                )
            }
            None => operations::create_data_property(ctx, receiver_obj, key, value),
        };
    }

    match own_desc.set.flatten() {
        Some(setter) => {
            operations::call(ctx, &Value::object(setter), receiver, &[value])?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// `OrdinaryDelete`
pub fn ordinary_delete(ctx: &mut VmContext, obj: &ObjectRef, key: &PropertyKey) -> VmResult<bool> {
    let Some(desc) = obj.internal_get_own_property(ctx, key)? else {
        return Ok(true);
    };
    if desc.is_configurable() {
        obj.remove_property(key);
        return Ok(true);
    }
    Ok(false)
}

/// `OrdinaryOwnPropertyKeys`
pub fn ordinary_own_property_keys(
    _ctx: &mut VmContext,
    obj: &ObjectRef,
) -> VmResult<Vec<PropertyKey>> {
    Ok(obj.data().properties.keys())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;

    fn setup() -> VmContext {
        VmRuntime::new().create_context()
    }

    fn frozen_data(value: Value) -> PropertyDescriptor {
        PropertyDescriptor::data(value, false, false, false)
    }

    #[test]
    fn test_define_on_non_extensible_fails() {
        let mut ctx = setup();
        let obj = ctx.new_object();
        ordinary_prevent_extensions(&mut ctx, &obj).unwrap();
        let ok = ordinary_define_own_property(
            &mut ctx,
            &obj,
            &PropertyKey::string("x"),
            &PropertyDescriptor::value_only(Value::int32(1)),
        )
        .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_non_configurable_restrictions() {
        let key = PropertyKey::string("p");
        let current = frozen_data(Value::int32(5));

        let same = PropertyDescriptor::value_only(Value::int32(5));
        assert!(is_compatible_property_descriptor(true, &same, Some(&current)));

        let different = PropertyDescriptor::value_only(Value::int32(6));
        assert!(!is_compatible_property_descriptor(true, &different, Some(&current)));

        let make_writable = PropertyDescriptor {
            writable: Some(true),
            ..Default::default()
        };
        assert!(!is_compatible_property_descriptor(true, &make_writable, Some(&current)));

        let make_configurable = PropertyDescriptor {
            configurable: Some(true),
            ..Default::default()
        };
        assert!(!is_compatible_property_descriptor(true, &make_configurable, Some(&current)));

        let to_accessor = PropertyDescriptor {
            get: Some(None),
            ..Default::default()
        };
        assert!(!is_compatible_property_descriptor(true, &to_accessor, Some(&current)));

        let mut table = PropertyTable::new();
        table.insert(key.clone(), current.to_property());
        assert!(validate_and_apply_property_descriptor(
            Some((&mut table, &key)),
            true,
            &PropertyDescriptor::default(),
            Some(&current)
        ));
    }

    #[test]
    fn test_non_configurable_writable_may_become_read_only() {
        let mut ctx = setup();
        let obj = ctx.new_object();
        let key = PropertyKey::string("v");
        let initial = PropertyDescriptor::data(Value::int32(1), true, true, false);
        assert!(ordinary_define_own_property(&mut ctx, &obj, &key, &initial).unwrap());

        let freeze = PropertyDescriptor {
            value: Some(Value::int32(2)),
            writable: Some(false),
            ..Default::default()
        };
        assert!(ordinary_define_own_property(&mut ctx, &obj, &key, &freeze).unwrap());

        let thaw = PropertyDescriptor {
            writable: Some(true),
            ..Default::default()
        };
        assert!(!ordinary_define_own_property(&mut ctx, &obj, &key, &thaw).unwrap());
        let stored = obj.own_property(&key).unwrap();
        assert_eq!(stored.value(), Some(&Value::int32(2)));
        assert!(stored.is_enumerable());
    }

    #[test]
    fn test_data_to_accessor_conversion_keeps_flags() {
        let mut ctx = setup();
        let obj = ctx.new_object();
        let key = PropertyKey::string("k");
        obj.insert_property(
            key.clone(),
            Property::data_with_attrs(Value::int32(1), PropertyAttributes::new(true, false, true)),
        );
        let to_accessor = PropertyDescriptor {
            get: Some(None),
            ..Default::default()
        };
        assert!(ordinary_define_own_property(&mut ctx, &obj, &key, &to_accessor).unwrap());
        let stored = obj.own_property(&key).unwrap();
        assert!(stored.is_accessor());
        assert!(!stored.is_enumerable());
        assert!(stored.is_configurable());
    }

    #[test]
    fn test_set_prototype_rejects_cycle() {
        let mut ctx = setup();
        let a = ctx.new_object();
        let b = ObjectRef::ordinary(Some(a.clone()));
        assert!(!ordinary_set_prototype_of(&mut ctx, &a, Some(b.clone())).unwrap());
        assert!(!ordinary_set_prototype_of(&mut ctx, &a, Some(a.clone())).unwrap());
        assert!(ordinary_set_prototype_of(&mut ctx, &b, None).unwrap());
        assert!(ordinary_set_prototype_of(&mut ctx, &a, Some(b)).unwrap());
    }

    #[test]
    fn test_set_prototype_on_non_extensible() {
        let mut ctx = setup();
        let obj = ctx.new_object();
        let current = obj.prototype();
        ordinary_prevent_extensions(&mut ctx, &obj).unwrap();
        assert!(ordinary_set_prototype_of(&mut ctx, &obj, current).unwrap());
        assert!(!ordinary_set_prototype_of(&mut ctx, &obj, None).unwrap());
    }

    #[test]
    fn test_delete_respects_configurable() {
        let mut ctx = setup();
        let obj = ctx.new_object();
        let key = PropertyKey::string("fixed");
        obj.insert_property(
            key.clone(),
            Property::data_with_attrs(Value::null(), PropertyAttributes::frozen()),
        );
        assert!(!ordinary_delete(&mut ctx, &obj, &key).unwrap());
        assert!(ordinary_delete(&mut ctx, &obj, &PropertyKey::string("missing")).unwrap());
    }
}
