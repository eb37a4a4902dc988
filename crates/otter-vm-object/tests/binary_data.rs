//! ArrayBuffer, typed array and DataView integration tests

use otter_vm_object::array_buffer::{
    allocate_array_buffer, array_buffer_constructor, array_buffer_resize, detach_array_buffer,
};
use otter_vm_object::data_view::{data_view_byte_length, data_view_create, get_view_value, set_view_value};
use otter_vm_object::operations;
use otter_vm_object::typed_array::{
    typed_array_create_from_buffer, typed_array_create_from_list, typed_array_slice,
    typed_array_subarray,
};
use otter_vm_object::{ElementKind, ObjectRef, PropertyKey, Value, VmContext, VmRuntime};

fn setup() -> VmContext {
    // RUST_LOG=otter_vm_object=debug shows detach/resize events
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    VmRuntime::new().create_context()
}

fn element(ctx: &mut VmContext, array: &ObjectRef, index: u32) -> Value {
    operations::get(ctx, array, &PropertyKey::index(index)).unwrap()
}

fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().copied().map(Value::int32).collect()
}

#[test]
fn test_data_view_endianness() {
    let mut ctx = setup();
    let buffer = allocate_array_buffer(&ctx, 4, None, None).unwrap();
    let view = data_view_create(&mut ctx, &Value::object(buffer), &Value::undefined(), &Value::undefined()).unwrap();

    set_view_value(
        &mut ctx,
        &view,
        &Value::int32(0),
        &Value::boolean(true),
        ElementKind::Uint32,
        &Value::number(f64::from(0x1234_5678u32)),
    )
    .unwrap();

    let first = get_view_value(&mut ctx, &view, &Value::int32(0), &Value::undefined(), ElementKind::Uint8).unwrap();
    assert_eq!(first, Value::int32(0x78));
    // big-endian is the default
    let big = get_view_value(&mut ctx, &view, &Value::int32(0), &Value::undefined(), ElementKind::Uint16).unwrap();
    assert_eq!(big, Value::int32(0x7856));
}

#[test]
fn test_data_view_bounds_and_detach() {
    let mut ctx = setup();
    let buffer = allocate_array_buffer(&ctx, 4, None, None).unwrap();
    let view = data_view_create(&mut ctx, &Value::object(buffer.clone()), &Value::int32(1), &Value::undefined()).unwrap();
    assert_eq!(data_view_byte_length(&view).unwrap(), 3);

    let err = get_view_value(&mut ctx, &view, &Value::int32(0), &Value::undefined(), ElementKind::Uint32).unwrap_err();
    assert!(err.is_range_error());

    detach_array_buffer(&buffer).unwrap();
    let err = get_view_value(&mut ctx, &view, &Value::int32(0), &Value::undefined(), ElementKind::Uint8).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_typed_array_conversions_wrap_and_clamp() {
    let mut ctx = setup();
    let values = [Value::int32(300), Value::int32(-1), Value::number(1.5)];

    let u8s = typed_array_create_from_list(&mut ctx, ElementKind::Uint8, &values).unwrap();
    assert_eq!(element(&mut ctx, &u8s, 0), Value::int32(44));
    assert_eq!(element(&mut ctx, &u8s, 1), Value::int32(255));
    assert_eq!(element(&mut ctx, &u8s, 2), Value::int32(1));

    let clamped = typed_array_create_from_list(&mut ctx, ElementKind::Uint8Clamped, &values).unwrap();
    assert_eq!(element(&mut ctx, &clamped, 0), Value::int32(255));
    assert_eq!(element(&mut ctx, &clamped, 1), Value::int32(0));
    assert_eq!(element(&mut ctx, &clamped, 2), Value::int32(2));
}

#[test]
fn test_typed_array_ignores_out_of_range_writes() {
    let mut ctx = setup();
    let array = typed_array_create_from_list(&mut ctx, ElementKind::Int8, &ints(&[1, 2])).unwrap();
    assert!(operations::set(&mut ctx, &array, &PropertyKey::index(5), Value::int32(9), true).unwrap());
    assert_eq!(element(&mut ctx, &array, 5), Value::undefined());
    assert!(!operations::has_property(&mut ctx, &array, &PropertyKey::index(5)).unwrap());
    // "-0" is a canonical numeric string, so never an ordinary property
    assert!(operations::set(&mut ctx, &array, &"-0".into(), Value::int32(9), true).unwrap());
    assert!(!operations::has_own_property(&mut ctx, &array, &"-0".into()).unwrap());
}

#[test]
fn test_slice_copies_subarray_aliases() {
    let mut ctx = setup();
    let array = typed_array_create_from_list(&mut ctx, ElementKind::Int16, &ints(&[1, 2, 3, 4])).unwrap();

    let sliced = typed_array_slice(&mut ctx, &array, &Value::int32(1), &Value::int32(3)).unwrap();
    let sub = typed_array_subarray(&mut ctx, &array, &Value::int32(1), &Value::int32(3)).unwrap();

    operations::set(&mut ctx, &array, &PropertyKey::index(1), Value::int32(20), true).unwrap();
    assert_eq!(element(&mut ctx, &sliced, 0), Value::int32(2));
    assert_eq!(element(&mut ctx, &sub, 0), Value::int32(20));
}

#[test]
fn test_views_share_one_buffer() {
    let mut ctx = setup();
    let buffer = allocate_array_buffer(&ctx, 4, None, None).unwrap();
    let bytes = typed_array_create_from_buffer(
        &mut ctx,
        ElementKind::Uint8,
        &buffer,
        &Value::undefined(),
        &Value::undefined(),
    )
    .unwrap();
    let words = typed_array_create_from_buffer(
        &mut ctx,
        ElementKind::Uint32,
        &buffer,
        &Value::undefined(),
        &Value::undefined(),
    )
    .unwrap();

    operations::set(&mut ctx, &words, &PropertyKey::index(0), Value::number(f64::from(0x0102_0304u32)), true).unwrap();
    // typed arrays are little-endian
    assert_eq!(element(&mut ctx, &bytes, 0), Value::int32(4));
    assert_eq!(element(&mut ctx, &bytes, 3), Value::int32(1));
}

#[test]
fn test_misaligned_offset_rejected() {
    let mut ctx = setup();
    let buffer = allocate_array_buffer(&ctx, 8, None, None).unwrap();
    let err = typed_array_create_from_buffer(
        &mut ctx,
        ElementKind::Uint32,
        &buffer,
        &Value::int32(1),
        &Value::undefined(),
    )
    .unwrap_err();
    assert!(err.is_range_error());
}

#[test]
fn test_length_tracking_view_follows_resize() {
    let mut ctx = setup();
    let buffer = array_buffer_constructor(&mut ctx, &Value::int32(4), &Value::int32(16)).unwrap();
    let view = typed_array_create_from_buffer(
        &mut ctx,
        ElementKind::Uint8,
        &buffer,
        &Value::undefined(),
        &Value::undefined(),
    )
    .unwrap();
    let length = PropertyKey::intern("length");

    assert_eq!(operations::get(&mut ctx, &view, &length).unwrap(), Value::int32(4));
    array_buffer_resize(&mut ctx, &buffer, &Value::int32(10)).unwrap();
    assert_eq!(operations::get(&mut ctx, &view, &length).unwrap(), Value::int32(10));
    assert_eq!(element(&mut ctx, &view, 9), Value::int32(0));
}

#[test]
fn test_bigint_arrays_reject_numbers() {
    let mut ctx = setup();
    let err = typed_array_create_from_list(&mut ctx, ElementKind::BigInt64, &ints(&[1])).unwrap_err();
    assert!(err.is_type_error());
}
