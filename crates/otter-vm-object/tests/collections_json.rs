//! Map/Set and JSON integration tests

use otter_vm_object::array::create_array_from_list;
use otter_vm_object::json;
use otter_vm_object::map_data::{CollectionCursor, map_create, set_create};
use otter_vm_object::operations;
use otter_vm_object::{JsString, Property, PropertyKey, Value, VmContext, VmRuntime};

fn setup() -> VmContext {
    VmRuntime::new().create_context()
}

fn stringify(ctx: &mut VmContext, value: &Value) -> Option<String> {
    json::stringify(ctx, value, &Value::undefined(), &Value::undefined())
        .unwrap()
        .map(|s| s.to_std_string())
}

// ============================================================================
// Map / Set
// ============================================================================

#[test]
fn test_map_zero_keys_collapse() {
    let ctx = setup();
    let map = map_create(&ctx);
    let data = map.as_map().unwrap();
    data.set(Value::number(-0.0), Value::string("a"));
    data.set(Value::number(0.0), Value::string("b"));
    assert_eq!(data.size(), 1);

    let (key, value) = data.entries().remove(0);
    // the stored key is +0
    assert!(key.as_number().unwrap().is_sign_positive());
    assert_eq!(value, Value::string("b"));
}

#[test]
fn test_map_nan_and_object_keys() {
    let ctx = setup();
    let map = map_create(&ctx);
    let data = map.as_map().unwrap();
    data.set(Value::nan(), Value::int32(1));
    assert_eq!(data.get(&Value::number(f64::NAN)), Some(Value::int32(1)));

    let a = Value::object(ctx.new_object());
    let b = Value::object(ctx.new_object());
    data.set(a.clone(), Value::int32(2));
    assert!(data.has(&a));
    assert!(!data.has(&b));
    // strings compare by content
    data.set(Value::string("k"), Value::int32(3));
    assert_eq!(data.get(&Value::String(JsString::new("k"))), Some(Value::int32(3)));
}

#[test]
fn test_set_iteration_is_live() {
    let ctx = setup();
    let set = set_create(&ctx);
    let data = set.as_set().unwrap();
    for i in 0..3 {
        data.add(Value::int32(i));
    }

    let mut cursor = CollectionCursor::new();
    assert_eq!(cursor.next_value(data), Some(Value::int32(0)));
    data.delete(&Value::int32(1));
    data.add(Value::int32(3));
    let rest: Vec<Value> = std::iter::from_fn(|| cursor.next_value(data)).collect();
    assert_eq!(rest, vec![Value::int32(2), Value::int32(3)]);
    assert_eq!(cursor.next_value(data), None);
}

#[test]
fn test_size_getter_on_prototype() {
    let mut ctx = setup();
    let map = map_create(&ctx);
    map.as_map().unwrap().set(Value::int32(1), Value::int32(1));
    let size = operations::get(&mut ctx, &map, &"size".into()).unwrap();
    assert_eq!(size, Value::int32(1));

    // the getter rejects other receivers
    let plain = ctx.new_object();
    let proto = ctx.intrinsics().map_prototype.clone();
    let Some(Property::Accessor { get: Some(get), .. }) = proto.own_property(&"size".into()) else {
        panic!("size is not an accessor");
    };
    let err = ctx.call(&Value::object(get), &Value::object(plain), &[]).unwrap_err();
    assert!(err.is_type_error());
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_stringify_circular_is_type_error() {
    let mut ctx = setup();
    let obj = ctx.new_object();
    operations::create_data_property_or_throw(&mut ctx, &obj, &"self".into(), Value::object(obj.clone())).unwrap();
    let err = json::stringify(&mut ctx, &Value::object(obj), &Value::undefined(), &Value::undefined()).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_stringify_repeated_non_cyclic_reference() {
    let mut ctx = setup();
    let shared = Value::object(ctx.new_object());
    let array = create_array_from_list(&ctx, &[shared.clone(), shared]);
    assert_eq!(stringify(&mut ctx, &Value::object(array)).as_deref(), Some("[{},{}]"));
}

#[test]
fn test_stringify_function_replacer() {
    let mut ctx = setup();
    let value = json::parse_str(&mut ctx, r#"{"a":1,"b":"x","c":[2]}"#).unwrap();
    let replacer = ctx.new_function("replacer", 2, |_, _, args| {
        Ok(match &args[1] {
            Value::Number(n) => Value::number(n * 10.0),
            Value::String(_) => Value::undefined(),
            other => other.clone(),
        })
    });
    let out = json::stringify(&mut ctx, &value, &Value::object(replacer), &Value::undefined())
        .unwrap()
        .unwrap()
        .to_std_string();
    assert_eq!(out, r#"{"a":10,"c":[20]}"#);
}

#[test]
fn test_stringify_string_gap_truncated() {
    let mut ctx = setup();
    let value = json::parse_str(&mut ctx, "[1]").unwrap();
    let out = json::stringify(&mut ctx, &value, &Value::undefined(), &Value::string("abcdefghijkl"))
        .unwrap()
        .unwrap()
        .to_std_string();
    assert_eq!(out, "[\nabcdefghij1\n]");
}

#[test]
fn test_stringify_wrapper_objects_unwrap() {
    let mut ctx = setup();
    let number = otter_vm_object::conversion::to_object(&mut ctx, &Value::int32(3)).unwrap();
    let string = otter_vm_object::conversion::to_object(&mut ctx, &Value::string("s")).unwrap();
    let boolean = otter_vm_object::conversion::to_object(&mut ctx, &Value::boolean(false)).unwrap();
    let array = create_array_from_list(
        &ctx,
        &[Value::object(number), Value::object(string), Value::object(boolean)],
    );
    assert_eq!(stringify(&mut ctx, &Value::object(array)).as_deref(), Some(r#"[3,"s",false]"#));
}

#[test]
fn test_parse_syntax_error_reports_position() {
    let mut ctx = setup();
    let err = json::parse_str(&mut ctx, "[1, x]").unwrap_err();
    assert!(err.is_syntax_error());
    assert!(err.to_string().contains("position 4"), "{err}");
}

#[test]
fn test_parse_unicode_escapes() {
    let mut ctx = setup();
    let value = json::parse_str(&mut ctx, r#""A😀\ud800""#).unwrap();
    let units = value.as_string().unwrap().as_utf16().to_vec();
    assert_eq!(units, vec![0x41, 0xD83D, 0xDE00, 0xD800]);
}

#[test]
fn test_parse_then_stringify_preserves_order() {
    let mut ctx = setup();
    let text = r#"{"z":1,"10":2,"a":[true,null],"2":"s"}"#;
    let value = json::parse_str(&mut ctx, text).unwrap();
    // integer keys enumerate first, ascending
    assert_eq!(
        stringify(&mut ctx, &value).as_deref(),
        Some(r#"{"2":"s","10":2,"z":1,"a":[true,null]}"#)
    );
}

#[test]
fn test_parse_deep_nesting_is_bounded() {
    let runtime = VmRuntime::with_config(otter_vm_object::RuntimeConfig {
        max_stack_depth: 32,
        ..Default::default()
    });
    let mut ctx = runtime.create_context();
    let text = format!("{}{}", "[".repeat(100), "]".repeat(100));
    let err = json::parse_str(&mut ctx, &text).unwrap_err();
    assert!(matches!(err, otter_vm_object::VmError::StackOverflow));

    let shallow = json::parse_str(&mut ctx, "[[[]]]").unwrap();
    let inner = operations::get(&mut ctx, shallow.as_object().unwrap(), &PropertyKey::index(0)).unwrap();
    assert!(operations::is_array(&inner).unwrap());
}
