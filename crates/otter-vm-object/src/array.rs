//! Array exotic objects
//!
//! Elements live in the ordinary property table under `PropertyKey::Index`;
//! only `[[DefineOwnProperty]]` differs, to keep `length` in step with the
//! largest index.

use crate::context::VmContext;
use crate::conversion;
use crate::descriptor::{Property, PropertyAttributes, PropertyDescriptor};
use crate::error::{VmError, VmResult};
use crate::internal_methods::{InternalMethods, ORDINARY_METHODS};
use crate::number;
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary::{ordinary_define_own_property, ordinary_delete, ordinary_get_own_property};
use crate::property_key::PropertyKey;
use crate::value::Value;

pub(crate) static ARRAY_METHODS: InternalMethods = InternalMethods {
    define_own_property: array_define_own_property,
    ..ORDINARY_METHODS
};

fn length_key() -> PropertyKey {
    PropertyKey::intern("length")
}

/// `ArrayCreate(length, proto)`; `proto` defaults to `%Array.prototype%`
pub fn array_create(
    ctx: &VmContext,
    length: u64,
    proto: Option<ObjectRef>,
) -> VmResult<ObjectRef> {
    if length > u64::from(u32::MAX) {
        return Err(VmError::range_error("Invalid array length"));
    }
    let proto = proto.unwrap_or_else(|| ctx.intrinsics().array_prototype.clone());
    let array = ObjectRef::new(ObjectKind::Array, Some(proto));
    array.insert_property(
        length_key(),
        Property::data_with_attrs(
            Value::number(length as f64),
            PropertyAttributes::new(true, false, false),
        ),
    );
    Ok(array)
}

/// `CreateArrayFromList(elements)`
pub fn create_array_from_list(ctx: &VmContext, elements: &[Value]) -> ObjectRef {
    let proto = ctx.intrinsics().array_prototype.clone();
    let array = ObjectRef::new(ObjectKind::Array, Some(proto));
    {
        let mut data = array.data_mut();
        for (i, value) in elements.iter().enumerate() {
            data.properties
                .insert(PropertyKey::Index(i as u32), Property::data(value.clone()));
        }
        data.properties.insert(
            length_key(),
            Property::data_with_attrs(
                Value::number(elements.len() as f64),
                PropertyAttributes::new(true, false, false),
            ),
        );
    }
    array
}

/// Current `length` of an array exotic object, read from storage
pub fn array_length(array: &ObjectRef) -> u32 {
    array
        .own_property(&length_key())
        .and_then(|p| p.value().and_then(Value::as_number))
        .map_or(0, |n| n as u32)
}

fn length_is_writable(array: &ObjectRef) -> bool {
    array
        .own_property(&length_key())
        .is_some_and(|p| p.is_writable())
}

/// Array `[[DefineOwnProperty]]`
fn array_define_own_property(
    ctx: &mut VmContext,
    array: &ObjectRef,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> VmResult<bool> {
    if key.is_str("length") {
        return array_set_length(ctx, array, desc);
    }
    let Some(index) = key.as_index() else {
        return ordinary_define_own_property(ctx, array, key, desc);
    };

    let length = array_length(array);
    if index >= length && !length_is_writable(array) {
        return Ok(false);
    }
    if !ordinary_define_own_property(ctx, array, key, desc)? {
        return Ok(false);
    }
    if index >= length {
        let grown = PropertyDescriptor::value_only(Value::number(f64::from(index) + 1.0));
        ordinary_define_own_property(ctx, array, &length_key(), &grown)?;
    }
    Ok(true)
}

/// `ArraySetLength(A, Desc)`
fn array_set_length(
    ctx: &mut VmContext,
    array: &ObjectRef,
    desc: &PropertyDescriptor,
) -> VmResult<bool> {
    let key = length_key();
    let Some(value) = &desc.value else {
        return ordinary_define_own_property(ctx, array, &key, desc);
    };

    let new_len = conversion::to_uint32(ctx, value)?;
    let number_len = conversion::to_number(ctx, value)?;
    if f64::from(new_len) != number_len {
        return Err(VmError::range_error("Invalid array length"));
    }

    let mut new_len_desc = desc.clone();
    new_len_desc.value = Some(Value::number(f64::from(new_len)));

    let Some(old_len_desc) = ordinary_get_own_property(ctx, array, &key)? else {
        return Err(VmError::internal("array without length"));
    };
    let old_len = old_len_desc
        .value
        .as_ref()
        .and_then(Value::as_number)
        .map_or(0, |n| n as u32);

    if new_len >= old_len {
        return ordinary_define_own_property(ctx, array, &key, &new_len_desc);
    }
    if !old_len_desc.is_writable() {
        return Ok(false);
    }

    let new_writable = new_len_desc.writable != Some(false);
    if !new_writable {
        new_len_desc.writable = Some(true);
    }
    if !ordinary_define_own_property(ctx, array, &key, &new_len_desc)? {
        return Ok(false);
    }

    let doomed = array.data().properties.indices_from_descending(new_len);
    for index in doomed {
        if !ordinary_delete(ctx, array, &PropertyKey::Index(index))? {
            new_len_desc.value = Some(Value::number(f64::from(index) + 1.0));
            if !new_writable {
                new_len_desc.writable = Some(false);
            }
            ordinary_define_own_property(ctx, array, &key, &new_len_desc)?;
            return Ok(false);
        }
    }

    if !new_writable {
        let seal = PropertyDescriptor {
            writable: Some(false),
            ..Default::default()
        };
        ordinary_define_own_property(ctx, array, &key, &seal)?;
    }
    Ok(true)
}

/// Whether `n` is usable as an array length
pub fn is_valid_array_length(n: f64) -> bool {
    f64::from(number::to_uint32(n)) == n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;

    fn setup() -> VmContext {
        VmRuntime::new().create_context()
    }

    fn define(ctx: &mut VmContext, array: &ObjectRef, key: PropertyKey, value: Value) -> bool {
        array
            .internal_define_own_property(ctx, &key, &PropertyDescriptor::data(value, true, true, true))
            .unwrap()
    }

    #[test]
    fn test_index_define_grows_length() {
        let mut ctx = setup();
        let array = array_create(&ctx, 0, None).unwrap();
        assert!(define(&mut ctx, &array, PropertyKey::Index(4), Value::int32(1)));
        assert_eq!(array_length(&array), 5);
        assert!(define(&mut ctx, &array, PropertyKey::Index(1), Value::int32(1)));
        assert_eq!(array_length(&array), 5);
    }

    #[test]
    fn test_length_truncates() {
        let mut ctx = setup();
        let array = create_array_from_list(
            &ctx,
            &[Value::int32(1), Value::int32(2), Value::int32(3)],
        );
        let shrink = PropertyDescriptor::value_only(Value::int32(1));
        assert!(array.internal_define_own_property(&mut ctx, &length_key(), &shrink).unwrap());
        assert_eq!(array_length(&array), 1);
        assert!(array.own_property(&PropertyKey::Index(1)).is_none());
        assert!(array.own_property(&PropertyKey::Index(0)).is_some());
    }

    #[test]
    fn test_truncation_stops_at_non_configurable() {
        let mut ctx = setup();
        let array = create_array_from_list(&ctx, &vec![Value::int32(0); 4]);
        array
            .internal_define_own_property(
                &mut ctx,
                &PropertyKey::Index(1),
                &PropertyDescriptor {
                    configurable: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        let ok = array
            .internal_define_own_property(
                &mut ctx,
                &length_key(),
                &PropertyDescriptor::value_only(Value::int32(0)),
            )
            .unwrap();
        assert!(!ok);
        assert_eq!(array_length(&array), 2);
    }

    #[test]
    fn test_invalid_length_is_range_error() {
        let mut ctx = setup();
        let array = array_create(&ctx, 0, None).unwrap();
        let err = array
            .internal_define_own_property(
                &mut ctx,
                &length_key(),
                &PropertyDescriptor::value_only(Value::number(1.5)),
            )
            .unwrap_err();
        assert!(err.is_range_error());
        assert!(array_create(&ctx, 1 << 32, None).unwrap_err().is_range_error());
    }

    #[test]
    fn test_read_only_length_blocks_growth() {
        let mut ctx = setup();
        let array = array_create(&ctx, 2, None).unwrap();
        array
            .internal_define_own_property(
                &mut ctx,
                &length_key(),
                &PropertyDescriptor {
                    writable: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!define(&mut ctx, &array, PropertyKey::Index(2), Value::null()));
        assert!(define(&mut ctx, &array, PropertyKey::Index(1), Value::null()));
    }

    #[test]
    fn test_valid_lengths() {
        assert!(is_valid_array_length(0.0));
        assert!(is_valid_array_length(4294967295.0));
        assert!(!is_valid_array_length(4294967296.0));
        assert!(!is_valid_array_length(-1.0));
    }
}
