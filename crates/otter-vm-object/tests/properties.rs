//! Property-based tests for numeric conversions, element storage and key equality

use num_bigint::BigInt;
use otter_vm_object::array_buffer::{allocate_array_buffer, array_buffer_slice};
use otter_vm_object::number::{
    number_to_string, string_to_number, to_int8, to_int16, to_int32, to_uint8, to_uint8_clamp, to_uint16,
    to_uint32,
};
use otter_vm_object::typed_array::{typed_array_create_with_length, typed_array_set_element};
use otter_vm_object::value::{same_value, same_value_zero};
use otter_vm_object::{ElementKind, PropertyKey, Value, VmRuntime};
use proptest::prelude::*;

/// What a store of `n` into an element of `kind` reads back as
fn wrapped(kind: ElementKind, n: i64) -> Value {
    let x = n as f64;
    match kind {
        ElementKind::Int8 => Value::number(f64::from(to_int8(x))),
        ElementKind::Uint8 => Value::number(f64::from(to_uint8(x))),
        ElementKind::Uint8Clamped => Value::number(f64::from(to_uint8_clamp(x))),
        ElementKind::Int16 => Value::number(f64::from(to_int16(x))),
        ElementKind::Uint16 => Value::number(f64::from(to_uint16(x))),
        ElementKind::Int32 => Value::number(f64::from(to_int32(x))),
        ElementKind::Uint32 => Value::number(f64::from(to_uint32(x))),
        ElementKind::Float32 => Value::number(f64::from(x as f32)),
        ElementKind::Float64 => Value::number(x),
        ElementKind::BigInt64 => Value::bigint(BigInt::from(n)),
        ElementKind::BigUint64 => Value::bigint(BigInt::from(n as u64)),
    }
}

proptest! {
    #[test]
    fn prop_int32_wraps_like_twos_complement(n in -(1i64 << 53)..(1i64 << 53)) {
        prop_assert_eq!(to_int32(n as f64), n as i32);
    }

    #[test]
    fn prop_uint16_wraps_modulo(n in any::<i32>()) {
        prop_assert_eq!(to_uint16(f64::from(n)), n as u16);
    }

    #[test]
    fn prop_uint8_clamp_stays_in_range(n in any::<f64>()) {
        let clamped = to_uint8_clamp(n);
        if n.is_nan() || n <= 0.0 {
            prop_assert_eq!(clamped, 0);
        } else if n >= 255.0 {
            prop_assert_eq!(clamped, 255);
        } else {
            prop_assert!((f64::from(clamped) - n).abs() <= 0.5);
        }
    }

    #[test]
    fn prop_number_string_reparses(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
        let text = number_to_string(n);
        let units: Vec<u16> = text.encode_utf16().collect();
        let back = string_to_number(&units);
        // -0 prints as "0"
        prop_assert!(back == n, "{} -> {} -> {}", n, text, back);
    }

    #[test]
    fn prop_same_value_zero_differs_only_on_zero_sign(a in any::<f64>(), b in any::<f64>()) {
        let (va, vb) = (Value::number(a), Value::number(b));
        if same_value(&va, &vb) {
            prop_assert!(same_value_zero(&va, &vb));
        }
        if same_value_zero(&va, &vb) && !same_value(&va, &vb) {
            prop_assert!(a == 0.0 && b == 0.0);
        }
    }

    #[test]
    fn prop_index_keys_are_canonical(i in 0u32..u32::MAX) {
        let from_string = PropertyKey::string(i.to_string().as_str());
        let from_number = PropertyKey::from_number(f64::from(i));
        prop_assert_eq!(&from_string, &PropertyKey::index(i));
        prop_assert_eq!(from_string, from_number);
    }

    #[test]
    fn prop_element_store_wraps_per_kind(
        kind in prop::sample::select(ElementKind::ALL.to_vec()),
        n in -(1i64 << 53)..(1i64 << 53),
    ) {
        let mut ctx = VmRuntime::new().create_context();
        let array = typed_array_create_with_length(&ctx, kind, 1).unwrap();
        let stored = if kind.is_bigint() { Value::bigint(BigInt::from(n)) } else { Value::number(n as f64) };
        typed_array_set_element(&mut ctx, &array, 0.0, &stored).unwrap();
        let read = array.as_typed_array().unwrap().get_index(0).unwrap();
        prop_assert_eq!(read, wrapped(kind, n));
    }

    #[test]
    fn prop_slice_is_independent(
        (len, start) in (1usize..64).prop_flat_map(|len| (Just(len), 0..len)),
        byte in 1u8..=255,
    ) {
        let mut ctx = VmRuntime::new().create_context();
        let buffer = allocate_array_buffer(&ctx, len, None, None).unwrap();
        let copy = array_buffer_slice(&mut ctx, &buffer, &Value::number(start as f64), &Value::undefined()).unwrap();
        let source = buffer.as_array_buffer().unwrap();
        let sliced = copy.as_array_buffer().unwrap();
        prop_assert_eq!(sliced.byte_length(), len - start);

        prop_assert!(source.write_bytes(start, &[byte]));
        let mut first = [0u8; 1];
        prop_assert!(sliced.read_bytes(0, &mut first));
        prop_assert_eq!(first[0], 0);

        prop_assert!(sliced.write_bytes(0, &[byte ^ 0xff]));
        prop_assert!(source.read_bytes(start, &mut first));
        prop_assert_eq!(first[0], byte);
    }
}
