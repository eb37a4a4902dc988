//! Arguments exotic objects
//!
//! Unmapped arguments objects are ordinary objects with a poisoned `callee`.
//! Mapped ones (sloppy functions with simple parameter lists) alias each
//! index below the parameter count to the parameter's binding cell, until
//! the index is deleted or redefined as an accessor or read-only property.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::context::VmContext;
use crate::descriptor::{Property, PropertyAttributes, PropertyDescriptor};
use crate::error::VmResult;
use crate::internal_methods::{InternalMethods, ORDINARY_METHODS};
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary;
use crate::property_key::PropertyKey;
use crate::string::JsString;
use crate::value::{BindingCell, Value};

pub(crate) static ARGUMENTS_METHODS: InternalMethods = InternalMethods {
    get_own_property: arguments_get_own_property,
    define_own_property: arguments_define_own_property,
    get: arguments_get,
    set: arguments_set,
    delete: arguments_delete,
    ..ORDINARY_METHODS
};

/// `[[ParameterMap]]`
#[derive(Debug, Default)]
pub struct ArgumentsData {
    /// Index `i` aliases `map[i]` while that entry is `Some`
    map: Option<Mutex<Vec<Option<BindingCell>>>>,
}

impl ArgumentsData {
    /// Whether this is a mapped arguments object
    pub fn is_mapped(&self) -> bool {
        self.map.is_some()
    }

    /// The binding aliased by `key`, if any
    pub fn mapped_binding(&self, key: &PropertyKey) -> Option<BindingCell> {
        let index = key.as_index()? as usize;
        self.map.as_ref()?.lock().get(index)?.clone()
    }

    fn unmap(&self, key: &PropertyKey) {
        if let (Some(map), Some(index)) = (&self.map, key.as_index())
            && let Some(slot) = map.lock().get_mut(index as usize)
        {
            *slot = None;
        }
    }

    /// Values of all live bindings
    pub fn binding_values(&self) -> Vec<Value> {
        self.map
            .as_ref()
            .map(|m| m.lock().iter().flatten().map(BindingCell::get).collect())
            .unwrap_or_default()
    }
}

fn parameter_map(obj: &ObjectRef) -> Option<&ArgumentsData> {
    obj.as_arguments().filter(|a| a.is_mapped())
}

fn populate(obj: &ObjectRef, args: &[Value]) {
    for (i, arg) in args.iter().enumerate() {
        obj.insert_property(PropertyKey::index(i as u32), Property::data(arg.clone()));
    }
    obj.insert_property(
        PropertyKey::intern("length"),
        Property::data_with_attrs(Value::number(args.len() as f64), PropertyAttributes::hidden()),
    );
}

/// `CreateUnmappedArgumentsObject(argumentsList)`
pub fn create_unmapped_arguments_object(ctx: &VmContext, args: &[Value]) -> ObjectRef {
    let intrinsics = ctx.intrinsics();
    let obj = ObjectRef::new(
        ObjectKind::Arguments(ArgumentsData::default()),
        Some(intrinsics.object_prototype.clone()),
    );
    populate(&obj, args);
    let thrower = intrinsics.throw_type_error.clone();
    obj.insert_property(
        PropertyKey::intern("callee"),
        Property::accessor(Some(thrower.clone()), Some(thrower), false, false),
    );
    obj
}

/// `CreateMappedArgumentsObject(func, formals, argumentsList, env)`
///
/// `parameters` lists the formal parameter names with their bindings in
/// declaration order. When a name repeats, only its last position is
/// mapped.
pub fn create_mapped_arguments_object(
    ctx: &VmContext,
    callee: &ObjectRef,
    parameters: &[(JsString, BindingCell)],
    args: &[Value],
) -> ObjectRef {
    let mut map = vec![None; args.len()];
    let mut mapped_names = FxHashSet::default();
    for (index, (name, binding)) in parameters.iter().enumerate().rev() {
        if mapped_names.insert(name.clone()) && index < args.len() {
            map[index] = Some(binding.clone());
        }
    }

    let obj = ObjectRef::new(
        ObjectKind::Arguments(ArgumentsData {
            map: Some(Mutex::new(map)),
        }),
        Some(ctx.intrinsics().object_prototype.clone()),
    );
    populate(&obj, args);
    obj.insert_property(
        PropertyKey::intern("callee"),
        Property::data_with_attrs(Value::object(callee.clone()), PropertyAttributes::hidden()),
    );
    obj
}

fn arguments_get_own_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
) -> VmResult<Option<PropertyDescriptor>> {
    let Some(mut desc) = ordinary::ordinary_get_own_property(ctx, obj, key)? else {
        return Ok(None);
    };
    if let Some(binding) = parameter_map(obj).and_then(|m| m.mapped_binding(key)) {
        desc.value = Some(binding.get());
    }
    Ok(Some(desc))
}

fn arguments_define_own_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> VmResult<bool> {
    let Some(map) = parameter_map(obj) else {
        return ordinary::ordinary_define_own_property(ctx, obj, key, desc);
    };
    let binding = map.mapped_binding(key);

    let mut new_desc = desc.clone();
    if let Some(binding) = &binding
        && desc.is_data_descriptor()
        && desc.value.is_none()
        && desc.writable == Some(false)
    {
        new_desc.value = Some(binding.get());
    }
    if !ordinary::ordinary_define_own_property(ctx, obj, key, &new_desc)? {
        return Ok(false);
    }

    if let Some(binding) = binding {
        if desc.is_accessor_descriptor() {
            map.unmap(key);
        } else {
            if let Some(value) = &desc.value {
                binding.set(value.clone());
            }
            if desc.writable == Some(false) {
                map.unmap(key);
            }
        }
    }
    Ok(true)
}

fn arguments_get(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    receiver: &Value,
) -> VmResult<Value> {
    match parameter_map(obj).and_then(|m| m.mapped_binding(key)) {
        Some(binding) => Ok(binding.get()),
        None => ordinary::ordinary_get(ctx, obj, key, receiver),
    }
}

fn arguments_set(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> VmResult<bool> {
    let same_receiver = receiver.as_object().is_some_and(|r| r.ptr_eq(obj));
    if same_receiver && let Some(binding) = parameter_map(obj).and_then(|m| m.mapped_binding(key)) {
        binding.set(value.clone());
    }
    ordinary::ordinary_set(ctx, obj, key, value, receiver)
}

fn arguments_delete(ctx: &mut VmContext, obj: &ObjectRef, key: &PropertyKey) -> VmResult<bool> {
    let deleted = ordinary::ordinary_delete(ctx, obj, key)?;
    if deleted && let Some(map) = parameter_map(obj) {
        map.unmap(key);
    }
    Ok(deleted)
}
