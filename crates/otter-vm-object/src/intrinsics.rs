//! Per-realm intrinsic objects
//!
//! Initialization runs in two stages:
//! 1. allocate every prototype with its `[[Prototype]]` link, so later
//!    steps can reference any of them;
//! 2. install the handful of built-in members this crate itself relies on
//!    (`Object.prototype.toString`, wrapper `valueOf`/`toString`, collection
//!    `size` getters, view accessors) with [`BuiltinBuilder`].
//!
//! Everything else on the prototypes belongs to the embedding.

use crate::conversion;
use crate::data_view::data_view_byte_length;
use crate::descriptor::{Property, PropertyAttributes};
use crate::element::ElementKind;
use crate::error::{VmError, VmResult};
use crate::function::{BuiltinBuilder, FunctionBuilder};
use crate::map_data::{this_map_data, this_set_data};
use crate::number::number_to_radix_string;
use crate::object::{InternalSlot, ObjectKind, ObjectRef};
use crate::property_key::PropertyKey;
use crate::string::JsString;
use crate::symbol::WellKnownSymbol;
use crate::typed_array::validate_typed_array;
use crate::value::Value;

/// Root prototypes and shared functions of one realm
#[derive(Clone)]
pub struct Intrinsics {
    // ===== Core =====
    /// `%Object.prototype%`; `[[Prototype]]` is null
    pub object_prototype: ObjectRef,
    /// `%Function.prototype%`
    pub function_prototype: ObjectRef,
    /// `%Array.prototype%` (itself an Array exotic object)
    pub array_prototype: ObjectRef,

    // ===== Primitive wrappers =====
    /// `%String.prototype%` (a String exotic object wrapping "")
    pub string_prototype: ObjectRef,
    /// `%Number.prototype%`
    pub number_prototype: ObjectRef,
    /// `%Boolean.prototype%`
    pub boolean_prototype: ObjectRef,
    /// `%Symbol.prototype%`
    pub symbol_prototype: ObjectRef,
    /// `%BigInt.prototype%`
    pub bigint_prototype: ObjectRef,

    // ===== Binary data =====
    /// `%ArrayBuffer.prototype%`
    pub array_buffer_prototype: ObjectRef,
    /// `%DataView.prototype%`
    pub data_view_prototype: ObjectRef,
    /// `%TypedArray.prototype%`, shared parent of the concrete prototypes
    pub typed_array_prototype: ObjectRef,
    /// Concrete typed array prototypes, indexed by [`ElementKind::ordinal`]
    pub typed_array_prototypes: [ObjectRef; 11],

    // ===== Keyed collections =====
    /// `%Map.prototype%`
    pub map_prototype: ObjectRef,
    /// `%Set.prototype%`
    pub set_prototype: ObjectRef,

    /// `%ThrowTypeError%`: frozen, non-extensible, always throws
    pub throw_type_error: ObjectRef,
}

impl Intrinsics {
    /// Allocate and populate a fresh set of intrinsics
    pub fn new() -> Self {
        // Stage 1: allocation
        let object_prototype = ObjectRef::ordinary(None);
        let proto = || Some(object_prototype.clone());

        let function_prototype = FunctionBuilder::new("", 0, |_, _, _| Ok(Value::undefined()))
            .prototype(object_prototype.clone())
            .build();
        let array_prototype = ObjectRef::new(ObjectKind::Array, proto());
        array_prototype.insert_property(
            PropertyKey::intern("length"),
            Property::data_with_attrs(
                Value::int32(0),
                PropertyAttributes::new(true, false, false),
            ),
        );

        let typed_array_prototype = ObjectRef::ordinary(proto());
        let typed_array_prototypes =
            ElementKind::ALL.map(|_| ObjectRef::ordinary(Some(typed_array_prototype.clone())));

        let throw_type_error = FunctionBuilder::new("", 0, |_, _, _| {
            Err(VmError::type_error(
                "'caller', 'callee', and 'arguments' properties may not be accessed on strict mode functions or the arguments objects for calls to them",
            ))
        })
        .prototype(function_prototype.clone())
        .build();

        let intrinsics = Self {
            string_prototype: ObjectRef::new(ObjectKind::String(JsString::empty()), proto()),
            number_prototype: ObjectRef::ordinary(proto()),
            boolean_prototype: ObjectRef::ordinary(proto()),
            symbol_prototype: ObjectRef::ordinary(proto()),
            bigint_prototype: ObjectRef::ordinary(proto()),
            array_buffer_prototype: ObjectRef::ordinary(proto()),
            data_view_prototype: ObjectRef::ordinary(proto()),
            map_prototype: ObjectRef::ordinary(proto()),
            set_prototype: ObjectRef::ordinary(proto()),
            typed_array_prototype,
            typed_array_prototypes,
            array_prototype,
            function_prototype,
            throw_type_error,
            object_prototype,
        };

        // Stage 2: members
        intrinsics.init_members();
        intrinsics.freeze_thrower();
        intrinsics
    }

    /// Prototype for typed arrays of `kind`
    pub fn typed_array_prototype_for(&self, kind: ElementKind) -> &ObjectRef {
        &self.typed_array_prototypes[kind.ordinal()]
    }

    fn init_members(&self) {
        let fn_proto = self.function_prototype.clone();

        BuiltinBuilder::new(&self.object_prototype, fn_proto.clone())
            .method("valueOf", 0, |ctx, this, _| {
                Ok(Value::object(conversion::to_object(ctx, this)?))
            })
            .method("toString", 0, |ctx, this, _| {
                let obj = match this {
                    Value::Undefined => return Ok(Value::string("[object Undefined]")),
                    Value::Null => return Ok(Value::string("[object Null]")),
                    _ => conversion::to_object(ctx, this)?,
                };
                let builtin_tag = if crate::operations::is_array(&Value::object(obj.clone()))? {
                    "Array"
                } else if matches!(obj.kind(), ObjectKind::Arguments(_)) {
                    "Arguments"
                } else if obj.is_callable() {
                    "Function"
                } else if obj.has_slot(InternalSlot::BooleanData) {
                    "Boolean"
                } else if obj.has_slot(InternalSlot::NumberData) {
                    "Number"
                } else if obj.as_string_exotic().is_some() {
                    "String"
                } else {
                    "Object"
                };
                let tag = match crate::operations::get(ctx, &obj, &to_string_tag())? {
                    Value::String(tag) => tag.to_std_string(),
                    _ => builtin_tag.to_string(),
                };
                Ok(Value::string(format!("[object {tag}]")))
            });

        self.init_wrapper_members(&fn_proto);

        BuiltinBuilder::new(&self.map_prototype, fn_proto.clone())
            .getter(PropertyKey::intern("size"), "size", |_, this, _| {
                Ok(Value::number(this_map_data(this, "size")?.size() as f64))
            })
            .value(
                to_string_tag(),
                Value::string("Map"),
                PropertyAttributes::new(false, false, true),
            );

        BuiltinBuilder::new(&self.set_prototype, fn_proto.clone())
            .getter(PropertyKey::intern("size"), "size", |_, this, _| {
                Ok(Value::number(this_set_data(this, "size")?.size() as f64))
            })
            .value(
                to_string_tag(),
                Value::string("Set"),
                PropertyAttributes::new(false, false, true),
            );

        BuiltinBuilder::new(&self.array_buffer_prototype, fn_proto.clone()).value(
            to_string_tag(),
            Value::string("ArrayBuffer"),
            PropertyAttributes::new(false, false, true),
        );

        BuiltinBuilder::new(&self.data_view_prototype, fn_proto.clone())
            .getter(PropertyKey::intern("byteLength"), "byteLength", |_, this, _| {
                let view = this
                    .as_object()
                    .ok_or_else(|| VmError::type_error("DataView.prototype.byteLength called on a non-object"))?;
                Ok(Value::number(data_view_byte_length(view)? as f64))
            })
            .value(
                to_string_tag(),
                Value::string("DataView"),
                PropertyAttributes::new(false, false, true),
            );

        BuiltinBuilder::new(&self.typed_array_prototype, fn_proto)
            .getter(PropertyKey::intern("length"), "length", |_, this, _| {
                // out-of-bounds views report 0 instead of throwing
                Ok(Value::number(
                    this_typed_array(this)?.as_typed_array().map_or(0, |ta| ta.length()) as f64,
                ))
            })
            .getter(PropertyKey::intern("byteLength"), "byteLength", |_, this, _| {
                Ok(Value::number(
                    this_typed_array(this)?.as_typed_array().map_or(0, |ta| ta.byte_length()) as f64,
                ))
            })
            .getter(PropertyKey::intern("byteOffset"), "byteOffset", |_, this, _| {
                let obj = this_typed_array(this)?;
                match validate_typed_array(obj) {
                    Ok((data, _)) => Ok(Value::number(data.byte_offset() as f64)),
                    Err(_) => Ok(Value::int32(0)),
                }
            })
            .getter(to_string_tag(), "[Symbol.toStringTag]", |_, this, _| {
                // undefined for anything that is not a typed array
                Ok(this
                    .as_object()
                    .and_then(|obj| obj.as_typed_array())
                    .map_or(Value::undefined(), |ta| Value::string(ta.kind().name())))
            });

        for (kind, proto) in ElementKind::ALL.iter().zip(&self.typed_array_prototypes) {
            proto.insert_property(
                PropertyKey::intern("BYTES_PER_ELEMENT"),
                Property::data_with_attrs(
                    Value::number(kind.element_size() as f64),
                    PropertyAttributes::frozen(),
                ),
            );
        }
    }

    /// `valueOf`/`toString` of the primitive wrapper prototypes, which
    /// `OrdinaryToPrimitive` relies on to unwrap wrapper objects
    fn init_wrapper_members(&self, fn_proto: &ObjectRef) {
        BuiltinBuilder::new(&self.number_prototype, fn_proto.clone())
            .method("valueOf", 0, |_, this, _| {
                Ok(Value::number(this_number_value(this, "Number.prototype.valueOf")?))
            })
            .method("toString", 1, |ctx, this, args| {
                let x = this_number_value(this, "Number.prototype.toString")?;
                let radix = match args.first() {
                    None | Some(Value::Undefined) => 10.0,
                    Some(radix) => conversion::to_integer_or_infinity(ctx, radix)?,
                };
                if !(2.0..=36.0).contains(&radix) {
                    return Err(VmError::range_error("toString() radix must be between 2 and 36"));
                }
                Ok(Value::string(number_to_radix_string(x, radix as u32)))
            });

        BuiltinBuilder::new(&self.string_prototype, fn_proto.clone())
            .method("valueOf", 0, |_, this, _| {
                Ok(Value::String(this_string_value(this, "String.prototype.valueOf")?))
            })
            .method("toString", 0, |_, this, _| {
                Ok(Value::String(this_string_value(this, "String.prototype.toString")?))
            });

        BuiltinBuilder::new(&self.boolean_prototype, fn_proto.clone())
            .method("valueOf", 0, |_, this, _| {
                this_primitive_value(this, InternalSlot::BooleanData, "Boolean.prototype.valueOf")
            })
            .method("toString", 0, |_, this, _| {
                let b = this_primitive_value(this, InternalSlot::BooleanData, "Boolean.prototype.toString")?;
                Ok(Value::string(if b.to_boolean() { "true" } else { "false" }))
            });

        BuiltinBuilder::new(&self.bigint_prototype, fn_proto.clone())
            .method("valueOf", 0, |_, this, _| {
                this_primitive_value(this, InternalSlot::BigIntData, "BigInt.prototype.valueOf")
            })
            .method("toString", 0, |ctx, this, args| {
                let Value::BigInt(b) =
                    this_primitive_value(this, InternalSlot::BigIntData, "BigInt.prototype.toString")?
                else {
                    return Err(VmError::internal("BigInt wrapper without a BigInt"));
                };
                let radix = match args.first() {
                    None | Some(Value::Undefined) => 10.0,
                    Some(radix) => conversion::to_integer_or_infinity(ctx, radix)?,
                };
                if !(2.0..=36.0).contains(&radix) {
                    return Err(VmError::range_error("toString() radix must be between 2 and 36"));
                }
                Ok(Value::string(b.to_str_radix(radix as u32)))
            })
            .value(
                to_string_tag(),
                Value::string("BigInt"),
                PropertyAttributes::new(false, false, true),
            );

        BuiltinBuilder::new(&self.symbol_prototype, fn_proto.clone())
            .method("valueOf", 0, |_, this, _| {
                this_primitive_value(this, InternalSlot::SymbolData, "Symbol.prototype.valueOf")
            })
            .method("toString", 0, |_, this, _| {
                let Value::Symbol(symbol) =
                    this_primitive_value(this, InternalSlot::SymbolData, "Symbol.prototype.toString")?
                else {
                    return Err(VmError::internal("Symbol wrapper without a Symbol"));
                };
                Ok(Value::String(symbol.descriptive_string()))
            })
            .symbol_method(
                WellKnownSymbol::ToPrimitive.symbol(),
                "[Symbol.toPrimitive]",
                1,
                PropertyAttributes::new(false, false, true),
                |_, this, _| {
                    this_primitive_value(this, InternalSlot::SymbolData, "Symbol.prototype [ @@toPrimitive ]")
                },
            )
            .value(
                to_string_tag(),
                Value::string("Symbol"),
                PropertyAttributes::new(false, false, true),
            );
    }

    fn freeze_thrower(&self) {
        let mut data = self.throw_type_error.data_mut();
        data.extensible = false;
        for key in data.properties.keys() {
            if let Some(property) = data.properties.get_mut(&key) {
                let attrs = property.attributes_mut();
                attrs.writable = false;
                attrs.configurable = false;
            }
        }
    }
}

impl Default for Intrinsics {
    fn default() -> Self {
        Self::new()
    }
}

fn to_string_tag() -> PropertyKey {
    PropertyKey::symbol(WellKnownSymbol::ToStringTag.symbol())
}

/// `thisBooleanValue` and friends: the primitive itself or the wrapper's slot
fn this_primitive_value(this: &Value, slot: InternalSlot, method: &str) -> VmResult<Value> {
    let value = match (this, slot) {
        (Value::Object(obj), slot) => obj.slot(slot),
        (Value::Boolean(_), InternalSlot::BooleanData)
        | (Value::Number(_), InternalSlot::NumberData)
        | (Value::Symbol(_), InternalSlot::SymbolData)
        | (Value::BigInt(_), InternalSlot::BigIntData) => Some(this.clone()),
        _ => None,
    };
    value.ok_or_else(|| VmError::type_error(format!("{method} called on incompatible receiver")))
}

fn this_number_value(this: &Value, method: &str) -> VmResult<f64> {
    this_primitive_value(this, InternalSlot::NumberData, method)?
        .as_number()
        .ok_or_else(|| VmError::type_error(format!("{method} called on incompatible receiver")))
}

fn this_string_value(this: &Value, method: &str) -> VmResult<JsString> {
    match this {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.as_string_exotic().cloned(),
        _ => None,
    }
    .ok_or_else(|| VmError::type_error(format!("{method} called on incompatible receiver")))
}

fn this_typed_array(this: &Value) -> Result<&ObjectRef, VmError> {
    this.as_object()
        .filter(|o| o.as_typed_array().is_some())
        .ok_or_else(|| VmError::type_error("this is not a typed array"))
}
