//! Type conversion abstract operations
//!
//! Everything here that can reach an object may run user code (`valueOf`,
//! `toString`, `Symbol.toPrimitive`), so every conversion takes the context
//! and returns a `VmResult`.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::context::VmContext;
use crate::error::{VmError, VmResult};
use crate::number::{
    self, MAX_SAFE_INTEGER, bigint_to_i64_wrapping, bigint_to_u64_wrapping, is_str_whitespace,
    number_to_string, string_to_number,
};
use crate::object::{InternalSlot, ObjectRef};
use crate::operations;
use crate::property_key::PropertyKey;
use crate::string::JsString;
use crate::string_object::string_create;
use crate::symbol::WellKnownSymbol;
use crate::value::Value;

/// Hint passed to `ToPrimitive`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// No hint (`"default"`)
    Default,
    /// `"number"`
    Number,
    /// `"string"`
    String,
}

impl PreferredType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

/// `ToPrimitive(input, preferredType)`
pub fn to_primitive(ctx: &mut VmContext, input: &Value, hint: PreferredType) -> VmResult<Value> {
    let Value::Object(obj) = input else {
        return Ok(input.clone());
    };
    let key = PropertyKey::symbol(WellKnownSymbol::ToPrimitive.symbol());
    if let Some(exotic) = operations::get_method(ctx, input, &key)? {
        let result = operations::call(ctx, &exotic, input, &[Value::string(hint.as_str())])?;
        if result.is_object() {
            return Err(VmError::type_error("Cannot convert object to primitive value"));
        }
        return Ok(result);
    }
    let hint = match hint {
        PreferredType::Default => PreferredType::Number,
        other => other,
    };
    ordinary_to_primitive(ctx, obj, hint)
}

/// `OrdinaryToPrimitive(O, hint)`
pub fn ordinary_to_primitive(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    hint: PreferredType,
) -> VmResult<Value> {
    let order = match hint {
        PreferredType::String => ["toString", "valueOf"],
        _ => ["valueOf", "toString"],
    };
    let this = Value::object(obj.clone());
    for name in order {
        let method = operations::get(ctx, obj, &PropertyKey::intern(name))?;
        if method.is_callable() {
            let result = operations::call(ctx, &method, &this, &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Err(VmError::type_error("Cannot convert object to primitive value"))
}

/// `ToNumber(argument)`
pub fn to_number(ctx: &mut VmContext, value: &Value) -> VmResult<f64> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Ok(*n),
        Value::String(s) => Ok(string_to_number(s.as_utf16())),
        Value::Symbol(_) => Err(VmError::type_error("Cannot convert a Symbol value to a number")),
        Value::BigInt(_) => Err(VmError::type_error("Cannot convert a BigInt value to a number")),
        Value::Object(_) => {
            let prim = to_primitive(ctx, value, PreferredType::Number)?;
            to_number(ctx, &prim)
        }
    }
}

/// `ToNumeric(value)`: a Number or BigInt value
pub fn to_numeric(ctx: &mut VmContext, value: &Value) -> VmResult<Value> {
    let prim = to_primitive(ctx, value, PreferredType::Number)?;
    if prim.is_bigint() {
        return Ok(prim);
    }
    Ok(Value::number(to_number(ctx, &prim)?))
}

/// `ToString(argument)`
pub fn to_string(ctx: &mut VmContext, value: &Value) -> VmResult<JsString> {
    match value {
        Value::Undefined => Ok(JsString::intern("undefined")),
        Value::Null => Ok(JsString::intern("null")),
        Value::Boolean(true) => Ok(JsString::intern("true")),
        Value::Boolean(false) => Ok(JsString::intern("false")),
        Value::Number(n) => Ok(JsString::from(number_to_string(*n))),
        Value::String(s) => Ok(s.clone()),
        Value::Symbol(_) => Err(VmError::type_error("Cannot convert a Symbol value to a string")),
        Value::BigInt(b) => Ok(JsString::from(b.to_str_radix(10))),
        Value::Object(_) => {
            let prim = to_primitive(ctx, value, PreferredType::String)?;
            to_string(ctx, &prim)
        }
    }
}

/// `ToPropertyKey(argument)`
pub fn to_property_key(ctx: &mut VmContext, value: &Value) -> VmResult<PropertyKey> {
    match value {
        Value::Symbol(s) => Ok(PropertyKey::symbol(s.clone())),
        Value::Number(n) => Ok(PropertyKey::from_number(*n)),
        Value::String(s) => Ok(PropertyKey::from_js_string(s.clone())),
        _ => {
            let prim = to_primitive(ctx, value, PreferredType::String)?;
            if let Value::Symbol(s) = prim {
                return Ok(PropertyKey::symbol(s));
            }
            Ok(PropertyKey::from_js_string(to_string(ctx, &prim)?))
        }
    }
}

/// `RequireObjectCoercible(argument)`
pub fn require_object_coercible(value: &Value) -> VmResult<()> {
    if value.is_nullish() {
        return Err(VmError::type_error(format!(
            "Cannot convert {} to object",
            nullish_name(value)
        )));
    }
    Ok(())
}

/// `ToObject(argument)`; primitives get a wrapper from the current realm
pub fn to_object(ctx: &mut VmContext, value: &Value) -> VmResult<ObjectRef> {
    require_object_coercible(value)?;
    let intrinsics = ctx.intrinsics();
    let (slot, proto) = match value {
        Value::Object(o) => return Ok(o.clone()),
        Value::String(s) => return Ok(string_create(ctx, s.clone(), None)),
        Value::Boolean(_) => (InternalSlot::BooleanData, &intrinsics.boolean_prototype),
        Value::Number(_) => (InternalSlot::NumberData, &intrinsics.number_prototype),
        Value::Symbol(_) => (InternalSlot::SymbolData, &intrinsics.symbol_prototype),
        Value::BigInt(_) => (InternalSlot::BigIntData, &intrinsics.bigint_prototype),
        Value::Undefined | Value::Null => {
            return Err(VmError::internal("nullish value passed the coercible check"));
        }
    };
    let wrapper = ObjectRef::ordinary(Some(proto.clone()));
    wrapper.set_slot(slot, value.clone());
    Ok(wrapper)
}

/// `ToIntegerOrInfinity(argument)`
pub fn to_integer_or_infinity(ctx: &mut VmContext, value: &Value) -> VmResult<f64> {
    Ok(number::to_integer_or_infinity(to_number(ctx, value)?))
}

/// `ToLength(argument)`: clamped to `[0, 2^53 - 1]`
pub fn to_length(ctx: &mut VmContext, value: &Value) -> VmResult<u64> {
    let len = to_integer_or_infinity(ctx, value)?;
    if len <= 0.0 {
        return Ok(0);
    }
    Ok(len.min(MAX_SAFE_INTEGER) as u64)
}

/// `ToIndex(value)`: RangeError outside `[0, 2^53 - 1]`
pub fn to_index(ctx: &mut VmContext, value: &Value) -> VmResult<usize> {
    let integer = to_integer_or_infinity(ctx, value)?;
    if !(0.0..=MAX_SAFE_INTEGER).contains(&integer) {
        return Err(VmError::range_error(format!(
            "Invalid index: {}",
            number_to_string(integer)
        )));
    }
    usize::try_from(integer as u64)
        .map_err(|_| VmError::range_error("Index exceeds the address space"))
}

/// `ToInt32(argument)`
pub fn to_int32(ctx: &mut VmContext, value: &Value) -> VmResult<i32> {
    Ok(number::to_int32(to_number(ctx, value)?))
}

/// `ToUint32(argument)`
pub fn to_uint32(ctx: &mut VmContext, value: &Value) -> VmResult<u32> {
    Ok(number::to_uint32(to_number(ctx, value)?))
}

/// `ToBigInt(argument)`
pub fn to_big_int(ctx: &mut VmContext, value: &Value) -> VmResult<BigInt> {
    let prim = to_primitive(ctx, value, PreferredType::Number)?;
    match &prim {
        Value::Undefined | Value::Null => Err(VmError::type_error(format!(
            "Cannot convert {} to a BigInt",
            nullish_name(&prim)
        ))),
        Value::Boolean(b) => Ok(BigInt::from(u8::from(*b))),
        Value::BigInt(b) => Ok(b.as_ref().clone()),
        Value::Number(n) => Err(VmError::type_error(format!(
            "Cannot convert {} to a BigInt",
            number_to_string(*n)
        ))),
        Value::String(s) => string_to_big_int(s.as_utf16()).ok_or_else(|| {
            VmError::syntax_error(format!("Cannot convert {s} to a BigInt"))
        }),
        Value::Symbol(_) => Err(VmError::type_error("Cannot convert a Symbol value to a BigInt")),
        Value::Object(_) => Err(VmError::internal("ToPrimitive returned an object")),
    }
}

/// `ToBigInt64(argument)`
pub fn to_big_int64(ctx: &mut VmContext, value: &Value) -> VmResult<i64> {
    Ok(bigint_to_i64_wrapping(&to_big_int(ctx, value)?))
}

/// `ToBigUint64(argument)`
pub fn to_big_uint64(ctx: &mut VmContext, value: &Value) -> VmResult<u64> {
    Ok(bigint_to_u64_wrapping(&to_big_int(ctx, value)?))
}

/// `StringToBigInt`: `None` when the text is not a `StringIntegerLiteral`
pub fn string_to_big_int(units: &[u16]) -> Option<BigInt> {
    let start = units.iter().position(|u| !is_str_whitespace(*u));
    let Some(start) = start else {
        return Some(BigInt::zero());
    };
    let end = units
        .iter()
        .rposition(|u| !is_str_whitespace(*u))
        .map_or(start, |i| i + 1);
    let text: String = char::decode_utf16(units[start..end].iter().copied())
        .collect::<Result<_, _>>()
        .ok()?;
    let bytes = text.as_bytes();

    if bytes.len() > 2 && bytes[0] == b'0' {
        let radix = match bytes[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let digits = &bytes[2..];
            if !digits.iter().all(|d| (*d as char).is_digit(radix)) {
                return None;
            }
            return BigInt::parse_bytes(digits, radix);
        }
    }

    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let magnitude = BigInt::parse_bytes(digits, 10)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Number value of a BigInt, rounding to the nearest double
pub fn big_int_to_number(b: &BigInt) -> f64 {
    b.to_f64().unwrap_or(f64::NAN)
}

fn nullish_name(value: &Value) -> &'static str {
    if value.is_null() { "null" } else { "undefined" }
}
