//! Abstract operations on objects
//!
//! Thin layers over the internal methods that add the throwing variants and
//! compound algorithms a built-in library needs. They always dispatch, so
//! every exotic kind (proxies included) is honoured.

use rustc_hash::FxHashSet;

use crate::context::VmContext;
use crate::conversion;
use crate::descriptor::PropertyDescriptor;
use crate::error::{VmError, VmResult};
use crate::object::ObjectRef;
use crate::property_key::PropertyKey;
use crate::symbol::WellKnownSymbol;
use crate::value::Value;

// ===== Property access =====

/// `Get(O, P)`
pub fn get(ctx: &mut VmContext, obj: &ObjectRef, key: &PropertyKey) -> VmResult<Value> {
    obj.internal_get(ctx, key, &Value::object(obj.clone()))
}

/// `GetV(V, P)`: property lookup on any value, primitives through their
/// wrapper's prototype chain with the primitive as receiver
pub fn get_v(ctx: &mut VmContext, value: &Value, key: &PropertyKey) -> VmResult<Value> {
    let obj = conversion::to_object(ctx, value)?;
    obj.internal_get(ctx, key, value)
}

/// `GetMethod(V, P)`: `None` for undefined or null
pub fn get_method(ctx: &mut VmContext, value: &Value, key: &PropertyKey) -> VmResult<Option<Value>> {
    let func = get_v(ctx, value, key)?;
    if func.is_nullish() {
        return Ok(None);
    }
    if !func.is_callable() {
        return Err(VmError::type_error(format!("{key} is not a function")));
    }
    Ok(Some(func))
}

/// `Set(O, P, V, Throw)`
pub fn set(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    throw: bool,
) -> VmResult<bool> {
    let success = obj.internal_set(ctx, key, value, &Value::object(obj.clone()))?;
    if !success && throw {
        return Err(VmError::type_error(format!(
            "Cannot assign to read only property '{key}' of object"
        )));
    }
    Ok(success)
}

/// `PutValue` for a property reference `base[key] = value`.
///
/// Primitive bases assign through their wrapper with the primitive as
/// receiver. A failed assignment throws only in strict mode.
pub fn put_value(ctx: &mut VmContext, base: &Value, key: &PropertyKey, value: Value) -> VmResult<()> {
    let obj = conversion::to_object(ctx, base)?;
    let success = obj.internal_set(ctx, key, value, base)?;
    if !success && ctx.is_strict() {
        return Err(VmError::type_error(format!(
            "Cannot assign to read only property '{key}' of {}",
            base.type_of()
        )));
    }
    Ok(())
}

/// `CreateDataProperty(O, P, V)`
pub fn create_data_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
) -> VmResult<bool> {
    let desc = PropertyDescriptor::data(value, true, true, true);
    obj.internal_define_own_property(ctx, key, &desc)
}

/// `CreateDataPropertyOrThrow(O, P, V)`
pub fn create_data_property_or_throw(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
) -> VmResult<()> {
    if !create_data_property(ctx, obj, key, value)? {
        return Err(VmError::type_error(format!("Cannot define property {key}")));
    }
    Ok(())
}

/// `DefinePropertyOrThrow(O, P, desc)`
pub fn define_property_or_throw(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> VmResult<()> {
    if !obj.internal_define_own_property(ctx, key, desc)? {
        return Err(VmError::type_error(format!("Cannot redefine property: {key}")));
    }
    Ok(())
}

/// `DeletePropertyOrThrow(O, P)`
pub fn delete_property_or_throw(ctx: &mut VmContext, obj: &ObjectRef, key: &PropertyKey) -> VmResult<()> {
    if !obj.internal_delete(ctx, key)? {
        return Err(VmError::type_error(format!("Cannot delete property '{key}'")));
    }
    Ok(())
}

/// `HasProperty(O, P)`
pub fn has_property(ctx: &mut VmContext, obj: &ObjectRef, key: &PropertyKey) -> VmResult<bool> {
    obj.internal_has_property(ctx, key)
}

/// `HasOwnProperty(O, P)`
pub fn has_own_property(ctx: &mut VmContext, obj: &ObjectRef, key: &PropertyKey) -> VmResult<bool> {
    Ok(obj.internal_get_own_property(ctx, key)?.is_some())
}

// ===== Invocation =====

fn describe_callee(value: &Value) -> String {
    match value {
        Value::Object(o) => format!("{o:?}"),
        Value::String(s) => format!("\"{s}\""),
        other => format!("{other:?}"),
    }
}

/// `Call(F, V, argumentsList)`
pub fn call(ctx: &mut VmContext, func: &Value, this: &Value, args: &[Value]) -> VmResult<Value> {
    match func {
        Value::Object(f) if f.is_callable() => f.internal_call(ctx, this, args),
        _ => Err(VmError::type_error(format!(
            "{} is not a function",
            describe_callee(func)
        ))),
    }
}

/// `Construct(F, argumentsList, newTarget)`; `new_target` defaults to `F`
pub fn construct(
    ctx: &mut VmContext,
    func: &Value,
    args: &[Value],
    new_target: Option<&ObjectRef>,
) -> VmResult<Value> {
    let Value::Object(f) = func else {
        return Err(VmError::type_error(format!(
            "{} is not a constructor",
            describe_callee(func)
        )));
    };
    let new_target = new_target.unwrap_or(f);
    if !f.is_constructor() || !new_target.is_constructor() {
        return Err(VmError::type_error(format!("{f:?} is not a constructor")));
    }
    f.internal_construct(ctx, args, new_target)
}

/// `Invoke(V, P, argumentsList)`
pub fn invoke(ctx: &mut VmContext, value: &Value, key: &PropertyKey, args: &[Value]) -> VmResult<Value> {
    let func = get_v(ctx, value, key)?;
    call(ctx, &func, value, args)
}

// ===== Array-likes =====

/// `LengthOfArrayLike(obj)`
pub fn length_of_array_like(ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<u64> {
    let length = get(ctx, obj, &PropertyKey::intern("length"))?;
    conversion::to_length(ctx, &length)
}

/// `CreateListFromArrayLike(obj)`
pub fn create_list_from_array_like(ctx: &mut VmContext, value: &Value) -> VmResult<Vec<Value>> {
    let Value::Object(obj) = value else {
        return Err(VmError::type_error("CreateListFromArrayLike called on non-object"));
    };
    let len = length_of_array_like(ctx, obj)?;
    if len > u64::from(u32::MAX) {
        return Err(VmError::range_error("Too many elements in array-like object"));
    }
    let mut list = Vec::with_capacity(len as usize);
    for i in 0..len {
        list.push(get(ctx, obj, &PropertyKey::from_number(i as f64))?);
    }
    Ok(list)
}

// ===== Integrity levels =====

/// Target of `SetIntegrityLevel` / `TestIntegrityLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityLevel {
    /// `Object.seal`
    Sealed,
    /// `Object.freeze`
    Frozen,
}

/// `SetIntegrityLevel(O, level)`
pub fn set_integrity_level(ctx: &mut VmContext, obj: &ObjectRef, level: IntegrityLevel) -> VmResult<bool> {
    if !obj.internal_prevent_extensions(ctx)? {
        return Ok(false);
    }
    let keys = obj.internal_own_property_keys(ctx)?;
    for key in keys {
        let desc = match level {
            IntegrityLevel::Sealed => PropertyDescriptor {
                configurable: Some(false),
                ..Default::default()
            },
            IntegrityLevel::Frozen => {
                let Some(current) = obj.internal_get_own_property(ctx, &key)? else {
                    continue;
                };
                if current.is_accessor_descriptor() {
                    PropertyDescriptor {
                        configurable: Some(false),
                        ..Default::default()
                    }
                } else {
                    PropertyDescriptor {
                        configurable: Some(false),
                        writable: Some(false),
                        ..Default::default()
                    }
                }
            }
        };
        define_property_or_throw(ctx, obj, &key, &desc)?;
    }
    Ok(true)
}

/// `TestIntegrityLevel(O, level)`
pub fn test_integrity_level(ctx: &mut VmContext, obj: &ObjectRef, level: IntegrityLevel) -> VmResult<bool> {
    if obj.internal_is_extensible(ctx)? {
        return Ok(false);
    }
    for key in obj.internal_own_property_keys(ctx)? {
        if let Some(current) = obj.internal_get_own_property(ctx, &key)? {
            if current.is_configurable() {
                return Ok(false);
            }
            if level == IntegrityLevel::Frozen && current.is_data_descriptor() && current.is_writable() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

// ===== Keys and enumeration =====

/// What `EnumerableOwnProperties` collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerableKind {
    /// `Object.keys`
    Key,
    /// `Object.values`
    Value,
    /// `Object.entries`
    KeyValue,
}

/// `EnumerableOwnProperties(O, kind)`; string keys only, in own-keys order
pub fn enumerable_own_properties(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    kind: EnumerableKind,
) -> VmResult<Vec<Value>> {
    let keys = obj.internal_own_property_keys(ctx)?;
    let mut properties = Vec::new();
    for key in keys.into_iter().filter(|k| !k.is_symbol()) {
        let Some(desc) = obj.internal_get_own_property(ctx, &key)? else {
            continue;
        };
        if !desc.is_enumerable() {
            continue;
        }
        let key_value = key.to_value();
        match kind {
            EnumerableKind::Key => properties.push(key_value),
            EnumerableKind::Value => properties.push(get(ctx, obj, &key)?),
            EnumerableKind::KeyValue => {
                let value = get(ctx, obj, &key)?;
                let entry = crate::array::create_array_from_list(ctx, &[key_value, value]);
                properties.push(Value::object(entry));
            }
        }
    }
    Ok(properties)
}

/// `Reflect.ownKeys(O)` as values
pub fn own_property_keys(ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<Vec<Value>> {
    Ok(obj
        .internal_own_property_keys(ctx)?
        .iter()
        .map(PropertyKey::to_value)
        .collect())
}

/// Lazy `for-in` key enumeration.
///
/// Walks the prototype chain one object at a time. A key is produced once,
/// only if it is enumerable on the object that first has it, and only if it
/// still exists when the cursor reaches it; keys deleted before they are
/// visited are skipped.
pub struct ForInIterator {
    object: Option<ObjectRef>,
    pending: std::vec::IntoIter<PropertyKey>,
    visited: FxHashSet<PropertyKey>,
    loaded: bool,
}

impl ForInIterator {
    /// Start enumerating `obj`
    pub fn new(obj: ObjectRef) -> Self {
        Self {
            object: Some(obj),
            pending: Vec::new().into_iter(),
            visited: FxHashSet::default(),
            loaded: false,
        }
    }

    /// Next enumerable key, or `None` when the chain is exhausted
    pub fn next_key(&mut self, ctx: &mut VmContext) -> VmResult<Option<PropertyKey>> {
        loop {
            let Some(obj) = self.object.clone() else {
                return Ok(None);
            };
            if !self.loaded {
                let keys: Vec<PropertyKey> = obj
                    .internal_own_property_keys(ctx)?
                    .into_iter()
                    .filter(|k| !k.is_symbol())
                    .collect();
                self.pending = keys.into_iter();
                self.loaded = true;
            }
            for key in self.pending.by_ref() {
                if self.visited.contains(&key) {
                    continue;
                }
                let Some(desc) = obj.internal_get_own_property(ctx, &key)? else {
                    continue;
                };
                self.visited.insert(key.clone());
                if desc.is_enumerable() {
                    return Ok(Some(key));
                }
            }
            self.object = obj.internal_get_prototype_of(ctx)?;
            self.loaded = false;
        }
    }
}

/// All `for-in` keys of `obj`, collected eagerly
pub fn for_in_keys(ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<Vec<PropertyKey>> {
    let mut iter = ForInIterator::new(obj.clone());
    let mut keys = Vec::new();
    while let Some(key) = iter.next_key(ctx)? {
        keys.push(key);
    }
    Ok(keys)
}

// ===== Prototypes and types =====

/// `Object.setPrototypeOf` semantics: TypeError when `[[SetPrototypeOf]]`
/// reports failure
pub fn set_prototype_of_or_throw(ctx: &mut VmContext, obj: &ObjectRef, proto: Option<ObjectRef>) -> VmResult<()> {
    if !obj.internal_set_prototype_of(ctx, proto)? {
        return Err(VmError::type_error(format!("Cannot set prototype of {obj:?}")));
    }
    Ok(())
}

/// `OrdinaryHasInstance(C, O)`
pub fn ordinary_has_instance(ctx: &mut VmContext, constructor: &Value, value: &Value) -> VmResult<bool> {
    let Value::Object(c) = constructor else {
        return Ok(false);
    };
    if !c.is_callable() {
        return Ok(false);
    }
    let Value::Object(obj) = value else {
        return Ok(false);
    };
    let proto = get(ctx, c, &PropertyKey::intern("prototype"))?;
    let Value::Object(proto) = proto else {
        return Err(VmError::type_error(
            "Function has non-object prototype in instanceof check",
        ));
    };
    let mut cursor = obj.internal_get_prototype_of(ctx)?;
    while let Some(current) = cursor {
        if current.ptr_eq(&proto) {
            return Ok(true);
        }
        cursor = current.internal_get_prototype_of(ctx)?;
    }
    Ok(false)
}

/// `InstanceofOperator(V, target)`
pub fn instance_of(ctx: &mut VmContext, value: &Value, target: &Value) -> VmResult<bool> {
    if !target.is_object() {
        return Err(VmError::type_error(
            "Right-hand side of 'instanceof' is not an object",
        ));
    }
    let key = PropertyKey::symbol(WellKnownSymbol::HasInstance.symbol());
    if let Some(handler) = get_method(ctx, target, &key)? {
        return Ok(call(ctx, &handler, target, &[value.clone()])?.to_boolean());
    }
    if !target.is_callable() {
        return Err(VmError::type_error(
            "Right-hand side of 'instanceof' is not callable",
        ));
    }
    ordinary_has_instance(ctx, target, value)
}

/// `IsArray(argument)`; sees through proxies
pub fn is_array(value: &Value) -> VmResult<bool> {
    let Value::Object(obj) = value else {
        return Ok(false);
    };
    let mut current = obj.clone();
    loop {
        if current.is_array_exotic() {
            return Ok(true);
        }
        let Some(proxy) = current.as_proxy() else {
            return Ok(false);
        };
        let (target, _) = proxy.target_and_handler("IsArray")?;
        current = target;
    }
}

/// `GetPrototypeFromConstructor(constructor, intrinsicDefaultProto)`
pub fn get_prototype_from_constructor(
    ctx: &mut VmContext,
    constructor: &ObjectRef,
    default: &ObjectRef,
) -> VmResult<ObjectRef> {
    match get(ctx, constructor, &PropertyKey::intern("prototype"))? {
        Value::Object(proto) => Ok(proto),
        _ => Ok(default.clone()),
    }
}
