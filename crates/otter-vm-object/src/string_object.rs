//! String exotic objects
//!
//! `new String("ab")` exposes one read-only, enumerable index property per
//! code unit. Those properties are synthesized from `[[StringData]]` and
//! never stored.

use crate::context::VmContext;
use crate::descriptor::{Property, PropertyAttributes, PropertyDescriptor};
use crate::error::VmResult;
use crate::internal_methods::{InternalMethods, ORDINARY_METHODS};
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary::{
    is_compatible_property_descriptor, ordinary_define_own_property, ordinary_get_own_property,
};
use crate::property_key::PropertyKey;
use crate::string::JsString;
use crate::value::Value;

pub(crate) static STRING_METHODS: InternalMethods = InternalMethods {
    get_own_property: string_get_own_property,
    define_own_property: string_define_own_property,
    own_property_keys: string_own_property_keys,
    ..ORDINARY_METHODS
};

/// `StringCreate(value, prototype)`; `proto` defaults to `%String.prototype%`
pub fn string_create(ctx: &VmContext, value: JsString, proto: Option<ObjectRef>) -> ObjectRef {
    let proto = proto.unwrap_or_else(|| ctx.intrinsics().string_prototype.clone());
    let length = value.len();
    let obj = ObjectRef::new(ObjectKind::String(value), Some(proto));
    obj.insert_property(
        PropertyKey::intern("length"),
        Property::data_with_attrs(Value::number(length as f64), PropertyAttributes::frozen()),
    );
    obj
}

/// `StringGetOwnProperty(S, P)`
fn string_index_property(obj: &ObjectRef, key: &PropertyKey) -> Option<PropertyDescriptor> {
    let index = key.as_index()?;
    let unit = obj.as_string_exotic()?.unit_string_at(index as usize)?;
    Some(PropertyDescriptor::data(Value::String(unit), false, true, false))
}

fn string_get_own_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
) -> VmResult<Option<PropertyDescriptor>> {
    if let Some(desc) = ordinary_get_own_property(ctx, obj, key)? {
        return Ok(Some(desc));
    }
    Ok(string_index_property(obj, key))
}

fn string_define_own_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> VmResult<bool> {
    if let Some(current) = string_index_property(obj, key) {
        return Ok(is_compatible_property_descriptor(
            obj.extensible_flag(),
            desc,
            Some(&current),
        ));
    }
    ordinary_define_own_property(ctx, obj, key, desc)
}

fn string_own_property_keys(_ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<Vec<PropertyKey>> {
    let len = obj.as_string_exotic().map_or(0, JsString::len) as u32;
    let stored = obj.data().properties.keys();
    let mut keys: Vec<PropertyKey> = (0..len).map(PropertyKey::Index).collect();
    keys.extend(
        stored
            .into_iter()
            .filter(|k| k.as_index().is_none_or(|i| i >= len)),
    );
    Ok(keys)
}
