//! TypedArray implementation
//!
//! A typed array is a view over an ArrayBuffer object: kind, byte offset and
//! either a fixed element count or "length-tracking" over a resizable
//! buffer. Elements are never stored in the property table; numeric keys
//! read and write the shared bytes (little-endian), and an index outside
//! the view is simply absent. Non-numeric keys behave as on ordinary
//! objects.

use crate::array_buffer::{ArrayBufferRegion, allocate_array_buffer, relative_index};
use crate::context::VmContext;
use crate::conversion;
use crate::descriptor::PropertyDescriptor;
use crate::element::ElementKind;
use crate::error::{VmError, VmResult};
use crate::internal_methods::{InternalMethods, ORDINARY_METHODS};
use crate::number::{number_to_string, string_to_number};
use crate::object::{ObjectKind, ObjectRef};
use crate::operations;
use crate::ordinary;
use crate::property_key::PropertyKey;
use crate::value::{Value, same_value_zero, strict_equals};

pub(crate) static TYPED_ARRAY_METHODS: InternalMethods = InternalMethods {
    get_own_property: typed_array_get_own_property,
    define_own_property: typed_array_define_own_property,
    has_property: typed_array_has_property,
    get: typed_array_get,
    set: typed_array_set,
    delete: typed_array_delete,
    own_property_keys: typed_array_own_property_keys,
    ..ORDINARY_METHODS
};

/// Internal slots of a typed array
#[derive(Debug)]
pub struct TypedArrayData {
    buffer: ObjectRef,
    kind: ElementKind,
    byte_offset: usize,
    /// `None` when the view tracks the length of a resizable buffer
    array_length: Option<usize>,
}

impl TypedArrayData {
    /// Element kind
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// `[[ViewedArrayBuffer]]`
    pub fn buffer(&self) -> &ObjectRef {
        &self.buffer
    }

    /// `[[ByteOffset]]`
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Whether the view follows the buffer's length
    pub fn is_length_tracking(&self) -> bool {
        self.array_length.is_none()
    }

    fn region(&self) -> Option<&ArrayBufferRegion> {
        self.buffer.as_array_buffer()
    }

    /// Check if the underlying buffer is detached
    pub fn is_detached(&self) -> bool {
        self.region().is_none_or(ArrayBufferRegion::is_detached)
    }

    /// `IsTypedArrayOutOfBounds`; a detached buffer counts as out of bounds
    pub fn is_out_of_bounds(&self) -> bool {
        let Some(region) = self.region() else {
            return true;
        };
        if region.is_detached() {
            return true;
        }
        let buffer_length = region.byte_length();
        if self.byte_offset > buffer_length {
            return true;
        }
        match self.array_length {
            Some(len) => self.byte_offset + len * self.kind.element_size() > buffer_length,
            None => false,
        }
    }

    /// `TypedArrayLength`, 0 when out of bounds
    pub fn length(&self) -> usize {
        if self.is_out_of_bounds() {
            return 0;
        }
        match self.array_length {
            Some(len) => len,
            None => {
                let buffer_length = self.region().map_or(0, ArrayBufferRegion::byte_length);
                (buffer_length - self.byte_offset) / self.kind.element_size()
            }
        }
    }

    /// `TypedArrayByteLength`
    pub fn byte_length(&self) -> usize {
        self.length() * self.kind.element_size()
    }

    /// `IsValidIntegerIndex`
    pub fn is_valid_integer_index(&self, index: f64) -> bool {
        if self.is_detached() || index.fract() != 0.0 || index.is_infinite() {
            return false;
        }
        if index == 0.0 && index.is_sign_negative() {
            return false;
        }
        index >= 0.0 && index < self.length() as f64
    }

    /// Read element `index`; `None` when outside the view
    pub fn get_index(&self, index: usize) -> Option<Value> {
        if index >= self.length() {
            return None;
        }
        let size = self.kind.element_size();
        let mut bytes = [0u8; 8];
        let region = self.region()?;
        if !region.read_bytes(self.byte_offset + index * size, &mut bytes[..size]) {
            return None;
        }
        Some(self.kind.bits_to_value(self.kind.bytes_to_bits(&bytes, true)))
    }

    /// Write a converted bit pattern; false when outside the view
    pub fn set_index_bits(&self, index: usize, bits: u64) -> bool {
        if index >= self.length() {
            return false;
        }
        let size = self.kind.element_size();
        let bytes = self.kind.bits_to_bytes(bits, true);
        self.region()
            .is_some_and(|r| r.write_bytes(self.byte_offset + index * size, &bytes))
    }
}

/// `CanonicalNumericIndexString`: the numeric value of a key that spells a
/// number, including `"-0"`, `"1.5"` and `"Infinity"`.
pub fn canonical_numeric_index(key: &PropertyKey) -> Option<f64> {
    match key {
        PropertyKey::Index(i) => Some(f64::from(*i)),
        PropertyKey::String(s) => {
            if s.eq_str("-0") {
                return Some(-0.0);
            }
            let n = string_to_number(s.as_utf16());
            s.eq_str(&number_to_string(n)).then_some(n)
        }
        PropertyKey::Symbol(_) => None,
    }
}

fn data_of(obj: &ObjectRef) -> VmResult<&TypedArrayData> {
    obj.as_typed_array()
        .ok_or_else(|| VmError::internal("typed array operation on a non-typed-array"))
}

/// `TypedArraySetElement`: convert first, then write if still in range.
pub fn typed_array_set_element(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    index: f64,
    value: &Value,
) -> VmResult<()> {
    let data = data_of(obj)?;
    let bits = data.kind.value_to_bits(ctx, value)?;
    if data.is_valid_integer_index(index) {
        data.set_index_bits(index as usize, bits);
    }
    Ok(())
}

fn typed_array_get_element(obj: &ObjectRef, index: f64) -> VmResult<Value> {
    let data = data_of(obj)?;
    if !data.is_valid_integer_index(index) {
        return Ok(Value::undefined());
    }
    Ok(data.get_index(index as usize).unwrap_or_default())
}

fn typed_array_get_own_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
) -> VmResult<Option<PropertyDescriptor>> {
    let Some(index) = canonical_numeric_index(key) else {
        return ordinary::ordinary_get_own_property(ctx, obj, key);
    };
    let data = data_of(obj)?;
    if !data.is_valid_integer_index(index) {
        return Ok(None);
    }
    Ok(data
        .get_index(index as usize)
        .map(|value| PropertyDescriptor::data(value, true, true, true)))
}

fn typed_array_has_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
) -> VmResult<bool> {
    match canonical_numeric_index(key) {
        Some(index) => Ok(data_of(obj)?.is_valid_integer_index(index)),
        None => ordinary::ordinary_has_property(ctx, obj, key),
    }
}

fn typed_array_define_own_property(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> VmResult<bool> {
    let Some(index) = canonical_numeric_index(key) else {
        return ordinary::ordinary_define_own_property(ctx, obj, key, desc);
    };
    if !data_of(obj)?.is_valid_integer_index(index) {
        return Ok(false);
    }
    if desc.configurable == Some(false)
        || desc.enumerable == Some(false)
        || desc.is_accessor_descriptor()
        || desc.writable == Some(false)
    {
        return Ok(false);
    }
    if let Some(value) = &desc.value {
        typed_array_set_element(ctx, obj, index, value)?;
    }
    Ok(true)
}

fn typed_array_get(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    receiver: &Value,
) -> VmResult<Value> {
    match canonical_numeric_index(key) {
        Some(index) => typed_array_get_element(obj, index),
        None => ordinary::ordinary_get(ctx, obj, key, receiver),
    }
}

fn typed_array_set(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> VmResult<bool> {
    if let Some(index) = canonical_numeric_index(key) {
        if receiver.as_object().is_some_and(|r| r.ptr_eq(obj)) {
            typed_array_set_element(ctx, obj, index, &value)?;
            return Ok(true);
        }
        if !data_of(obj)?.is_valid_integer_index(index) {
            return Ok(true);
        }
    }
    ordinary::ordinary_set(ctx, obj, key, value, receiver)
}

fn typed_array_delete(ctx: &mut VmContext, obj: &ObjectRef, key: &PropertyKey) -> VmResult<bool> {
    match canonical_numeric_index(key) {
        Some(index) => Ok(!data_of(obj)?.is_valid_integer_index(index)),
        None => ordinary::ordinary_delete(ctx, obj, key),
    }
}

fn typed_array_own_property_keys(
    _ctx: &mut VmContext,
    obj: &ObjectRef,
) -> VmResult<Vec<PropertyKey>> {
    let length = data_of(obj)?.length() as u32;
    let mut keys: Vec<PropertyKey> = (0..length).map(PropertyKey::Index).collect();
    keys.extend(obj.data().properties.keys());
    Ok(keys)
}

// ===== Construction =====

fn make_typed_array(
    ctx: &VmContext,
    kind: ElementKind,
    buffer: ObjectRef,
    byte_offset: usize,
    array_length: Option<usize>,
) -> ObjectRef {
    let proto = ctx.intrinsics().typed_array_prototypes[kind.ordinal()].clone();
    ObjectRef::new(
        ObjectKind::TypedArray(TypedArrayData {
            buffer,
            kind,
            byte_offset,
            array_length,
        }),
        Some(proto),
    )
}

/// `new Ta(length)`
pub fn typed_array_create_with_length(
    ctx: &VmContext,
    kind: ElementKind,
    length: usize,
) -> VmResult<ObjectRef> {
    let byte_length = length
        .checked_mul(kind.element_size())
        .ok_or_else(|| VmError::range_error(format!("Invalid typed array length: {length}")))?;
    let buffer = allocate_array_buffer(ctx, byte_length, None, None)?;
    Ok(make_typed_array(ctx, kind, buffer, 0, Some(length)))
}

/// `new Ta(buffer, byteOffset, length)`
pub fn typed_array_create_from_buffer(
    ctx: &mut VmContext,
    kind: ElementKind,
    buffer: &ObjectRef,
    byte_offset: &Value,
    length: &Value,
) -> VmResult<ObjectRef> {
    let size = kind.element_size();
    let offset = conversion::to_index(ctx, byte_offset)?;
    if offset % size != 0 {
        return Err(VmError::range_error(format!(
            "start offset of {} should be a multiple of {size}",
            kind.name()
        )));
    }
    let new_length = if length.is_undefined() {
        None
    } else {
        Some(conversion::to_index(ctx, length)?)
    };

    let Some(region) = buffer.as_array_buffer() else {
        return Err(VmError::type_error("First argument must be an ArrayBuffer"));
    };
    if region.is_detached() {
        return Err(VmError::type_error("Cannot construct a typed array on a detached ArrayBuffer"));
    }
    let buffer_length = region.byte_length();

    let array_length = match new_length {
        None if region.is_resizable() => {
            if offset > buffer_length {
                return Err(VmError::range_error(format!(
                    "Start offset {offset} is outside the bounds of the buffer"
                )));
            }
            None
        }
        None => {
            if buffer_length % size != 0 {
                return Err(VmError::range_error(format!(
                    "byte length of {} should be a multiple of {size}",
                    kind.name()
                )));
            }
            let Some(byte_length) = buffer_length.checked_sub(offset) else {
                return Err(VmError::range_error(format!(
                    "Start offset {offset} is outside the bounds of the buffer"
                )));
            };
            Some(byte_length / size)
        }
        Some(len) => {
            let end = len
                .checked_mul(size)
                .and_then(|bytes| bytes.checked_add(offset));
            if end.is_none_or(|end| end > buffer_length) {
                return Err(VmError::range_error(format!("Invalid typed array length: {len}")));
            }
            Some(len)
        }
    };
    Ok(make_typed_array(ctx, kind, buffer.clone(), offset, array_length))
}

/// `new Ta([values])`
pub fn typed_array_create_from_list(
    ctx: &mut VmContext,
    kind: ElementKind,
    values: &[Value],
) -> VmResult<ObjectRef> {
    let array = typed_array_create_with_length(ctx, kind, values.len())?;
    for (i, value) in values.iter().enumerate() {
        typed_array_set_element(ctx, &array, i as f64, value)?;
    }
    Ok(array)
}

/// `new Ta(otherTypedArray)`; content types must match
pub fn typed_array_create_from_typed_array(
    ctx: &VmContext,
    kind: ElementKind,
    source: &ObjectRef,
) -> VmResult<ObjectRef> {
    let (src, length) = validate_typed_array(source)?;
    if src.kind.is_bigint() != kind.is_bigint() {
        return Err(VmError::type_error(format!(
            "Cannot mix BigInt and other types: {} from {}",
            kind.name(),
            src.kind.name()
        )));
    }
    let array = typed_array_create_with_length(ctx, kind, length)?;
    let target = data_of(&array)?;
    for i in 0..length {
        let Some(value) = src.get_index(i) else {
            break;
        };
        let bits = match &value {
            Value::BigInt(b) => kind.bigint_to_bits(b),
            other => kind.number_to_bits(other.as_number().unwrap_or(f64::NAN)),
        };
        target.set_index_bits(i, bits);
    }
    Ok(array)
}

/// The `%TypedArray%` constructor argument dispatch for `new Ta(...args)`
pub fn typed_array_constructor(
    ctx: &mut VmContext,
    kind: ElementKind,
    args: &[Value],
) -> VmResult<ObjectRef> {
    let first = args.first().cloned().unwrap_or_default();
    let Value::Object(obj) = &first else {
        let length = conversion::to_index(ctx, &first)?;
        return typed_array_create_with_length(ctx, kind, length);
    };
    if obj.as_array_buffer().is_some() {
        let offset = args.get(1).cloned().unwrap_or_default();
        let length = args.get(2).cloned().unwrap_or_default();
        return typed_array_create_from_buffer(ctx, kind, obj, &offset, &length);
    }
    if obj.as_typed_array().is_some() {
        return typed_array_create_from_typed_array(ctx, kind, obj);
    }
    let values = operations::create_list_from_array_like(ctx, &first)?;
    typed_array_create_from_list(ctx, kind, &values)
}

/// `ValidateTypedArray`: the view's data and current length, or a TypeError
/// when the object is not a typed array or is out of bounds.
pub fn validate_typed_array(obj: &ObjectRef) -> VmResult<(&TypedArrayData, usize)> {
    let Some(data) = obj.as_typed_array() else {
        return Err(VmError::type_error("this is not a typed array"));
    };
    if data.is_out_of_bounds() {
        return Err(VmError::type_error(
            "Cannot perform operation on an out of bounds or detached typed array",
        ));
    }
    Ok((data, data.length()))
}

// ===== %TypedArray%.prototype operations =====

fn relative_arg(ctx: &mut VmContext, value: &Value, len: usize, default: usize) -> VmResult<usize> {
    if value.is_undefined() {
        return Ok(default);
    }
    Ok(relative_index(conversion::to_integer_or_infinity(ctx, value)?, len))
}

/// `%TypedArray%.prototype.subarray(start, end)`; shares the buffer
pub fn typed_array_subarray(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    start: &Value,
    end: &Value,
) -> VmResult<ObjectRef> {
    let data = data_of(obj)
        .map_err(|_| VmError::type_error("this is not a typed array"))?;
    let src_length = data.length();
    let begin = relative_arg(ctx, start, src_length, 0)?;
    let size = data.kind.element_size();
    let byte_offset = data.byte_offset + begin * size;

    if data.is_length_tracking() && end.is_undefined() {
        return Ok(make_typed_array(ctx, data.kind, data.buffer.clone(), byte_offset, None));
    }
    let last = relative_arg(ctx, end, src_length, src_length)?;
    let new_length = last.saturating_sub(begin);
    let buffer = data.buffer.clone();
    typed_array_create_from_buffer(
        ctx,
        data.kind,
        &buffer,
        &Value::number(byte_offset as f64),
        &Value::number(new_length as f64),
    )
}

/// `%TypedArray%.prototype.slice(start, end)`; copies into a new buffer
pub fn typed_array_slice(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    start: &Value,
    end: &Value,
) -> VmResult<ObjectRef> {
    let (data, len) = validate_typed_array(obj)?;
    let kind = data.kind;
    let first = relative_arg(ctx, start, len, 0)?;
    let last = relative_arg(ctx, end, len, len)?;
    let count = last.saturating_sub(first);
    let result = typed_array_create_with_length(ctx, kind, count)?;
    if count == 0 {
        return Ok(result);
    }

    let (data, len) = validate_typed_array(obj)?;
    let target = data_of(&result)?;
    let end = last.min(len);
    for (n, k) in (first..end).enumerate() {
        if let Some(value) = data.get_index(k) {
            let bits = match &value {
                Value::BigInt(b) => kind.bigint_to_bits(b),
                other => kind.number_to_bits(other.as_number().unwrap_or(f64::NAN)),
            };
            target.set_index_bits(n, bits);
        }
    }
    Ok(result)
}

/// `%TypedArray%.prototype.fill(value, start, end)`
pub fn typed_array_fill(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    value: &Value,
    start: &Value,
    end: &Value,
) -> VmResult<()> {
    let (data, len) = validate_typed_array(obj)?;
    let bits = data.kind.value_to_bits(ctx, value)?;
    let first = relative_arg(ctx, start, len, 0)?;
    let last = relative_arg(ctx, end, len, len)?;
    let (data, len) = validate_typed_array(obj)?;
    for k in first..last.min(len) {
        data.set_index_bits(k, bits);
    }
    Ok(())
}

fn search_start(ctx: &mut VmContext, from_index: &Value, len: usize) -> VmResult<Option<usize>> {
    let n = conversion::to_integer_or_infinity(ctx, from_index)?;
    if n == f64::INFINITY {
        return Ok(None);
    }
    Ok(Some(relative_index(n, len)))
}

/// `%TypedArray%.prototype.includes(search, fromIndex)` using SameValueZero
pub fn typed_array_includes(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    search: &Value,
    from_index: &Value,
) -> VmResult<bool> {
    let (_, len) = validate_typed_array(obj)?;
    if len == 0 {
        return Ok(false);
    }
    let Some(start) = search_start(ctx, from_index, len)? else {
        return Ok(false);
    };
    let data = data_of(obj)?;
    for k in start..len {
        // a shrunk buffer reads as undefined
        let element = data.get_index(k).unwrap_or_default();
        if same_value_zero(&element, search) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `%TypedArray%.prototype.indexOf(search, fromIndex)` using strict equality
pub fn typed_array_index_of(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    search: &Value,
    from_index: &Value,
) -> VmResult<Option<usize>> {
    let (_, len) = validate_typed_array(obj)?;
    if len == 0 {
        return Ok(None);
    }
    let Some(start) = search_start(ctx, from_index, len)? else {
        return Ok(None);
    };
    let data = data_of(obj)?;
    for k in start..len {
        if let Some(element) = data.get_index(k)
            && strict_equals(&element, search)
        {
            return Ok(Some(k));
        }
    }
    Ok(None)
}

/// `%TypedArray%.prototype.reverse()`
pub fn typed_array_reverse(obj: &ObjectRef) -> VmResult<()> {
    let (data, len) = validate_typed_array(obj)?;
    let size = data.kind.element_size();
    let start = data.byte_offset;
    let end = start + len * size;
    data.region()
        .and_then(|r| {
            r.with_data_mut(|bytes| {
                let view = &mut bytes[start..end];
                let (mut lower, mut upper) = (0, len);
                while lower + 1 < upper {
                    upper -= 1;
                    for b in 0..size {
                        view.swap(lower * size + b, upper * size + b);
                    }
                    lower += 1;
                }
            })
        })
        .ok_or_else(|| VmError::type_error("Cannot reverse a detached typed array"))
}

/// `%TypedArray%.prototype.copyWithin(target, start, end)`
pub fn typed_array_copy_within(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    target: &Value,
    start: &Value,
    end: &Value,
) -> VmResult<()> {
    let (_, len) = validate_typed_array(obj)?;
    let to = relative_arg(ctx, target, len, 0)?;
    let from = relative_arg(ctx, start, len, 0)?;
    let last = relative_arg(ctx, end, len, len)?;
    let count = last.saturating_sub(from).min(len.saturating_sub(to));
    if count == 0 {
        return Ok(());
    }

    let (data, len) = validate_typed_array(obj)?;
    let size = data.kind.element_size();
    let view_bytes = len * size;
    let from_byte = from * size;
    let to_byte = to * size;
    let count_bytes = (count * size)
        .min(view_bytes.saturating_sub(from_byte))
        .min(view_bytes.saturating_sub(to_byte));
    let base = data.byte_offset;
    data.region()
        .and_then(|r| {
            r.with_data_mut(|bytes| {
                let src = base + from_byte;
                bytes.copy_within(src..src + count_bytes, base + to_byte);
            })
        })
        .ok_or_else(|| VmError::type_error("Cannot copy within a detached typed array"))
}

/// `%TypedArray%.prototype.set` for a list of values, starting at `offset`
pub fn typed_array_set_from_values(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    values: &[Value],
    offset: usize,
) -> VmResult<()> {
    let (_, len) = validate_typed_array(obj)?;
    if offset.checked_add(values.len()).is_none_or(|end| end > len) {
        return Err(VmError::range_error("offset is out of bounds"));
    }
    for (i, value) in values.iter().enumerate() {
        typed_array_set_element(ctx, obj, (offset + i) as f64, value)?;
    }
    Ok(())
}

/// `%TypedArray%.prototype.set(source, offset)` for any source
pub fn typed_array_set_from(
    ctx: &mut VmContext,
    obj: &ObjectRef,
    source: &Value,
    offset: &Value,
) -> VmResult<()> {
    let offset = conversion::to_integer_or_infinity(ctx, offset)?;
    if offset < 0.0 || offset.is_infinite() {
        return Err(VmError::range_error("offset is out of bounds"));
    }
    let values = match source.as_object() {
        Some(src_obj) if src_obj.as_typed_array().is_some() => {
            let (src, src_len) = validate_typed_array(src_obj)?;
            let (target, _) = validate_typed_array(obj)?;
            if src.kind.is_bigint() != target.kind.is_bigint() {
                return Err(VmError::type_error("Cannot mix BigInt and other types"));
            }
            (0..src_len).filter_map(|i| src.get_index(i)).collect::<Vec<_>>()
        }
        _ => {
            let source = conversion::to_object(ctx, source)?;
            operations::create_list_from_array_like(ctx, &Value::object(source))?
        }
    };
    typed_array_set_from_values(ctx, obj, &values, offset as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;

    fn setup() -> VmContext {
        VmRuntime::new().create_context()
    }

    fn elements(obj: &ObjectRef) -> Vec<Value> {
        let data = obj.as_typed_array().unwrap();
        (0..data.length()).map(|i| data.get_index(i).unwrap()).collect()
    }

    fn ints(values: &[i32]) -> Vec<Value> {
        values.iter().map(|v| Value::int32(*v)).collect()
    }

    #[test]
    fn test_get_set_through_keys() {
        let mut ctx = setup();
        let ta = typed_array_create_with_length(&ctx, ElementKind::Int32, 4).unwrap();
        let receiver = Value::object(ta.clone());
        assert!(ta.internal_set(&mut ctx, &PropertyKey::Index(1), Value::int32(42), &receiver).unwrap());
        assert_eq!(
            ta.internal_get(&mut ctx, &PropertyKey::Index(1), &receiver).unwrap(),
            Value::int32(42)
        );
    }

    #[test]
    fn test_out_of_range_index_is_silent() {
        let mut ctx = setup();
        let ta = typed_array_create_with_length(&ctx, ElementKind::Uint8, 2).unwrap();
        let receiver = Value::object(ta.clone());
        assert!(ta.internal_set(&mut ctx, &PropertyKey::Index(10), Value::int32(1), &receiver).unwrap());
        assert!(ta.internal_get(&mut ctx, &PropertyKey::Index(10), &receiver).unwrap().is_undefined());
        assert!(!ta.internal_has_property(&mut ctx, &PropertyKey::Index(10)).unwrap());
        assert!(ta.own_property(&PropertyKey::Index(10)).is_none());

        // "-0" and "1.5" are numeric keys, never ordinary properties
        let minus_zero = PropertyKey::string("-0");
        assert!(ta.internal_set(&mut ctx, &minus_zero, Value::int32(1), &receiver).unwrap());
        assert!(ta.internal_get(&mut ctx, &minus_zero, &receiver).unwrap().is_undefined());
        assert!(ta.own_property(&minus_zero).is_none());
    }

    #[test]
    fn test_non_numeric_keys_are_ordinary() {
        let mut ctx = setup();
        let ta = typed_array_create_with_length(&ctx, ElementKind::Uint8, 1).unwrap();
        let receiver = Value::object(ta.clone());
        let key = PropertyKey::string("foo");
        assert!(ta.internal_set(&mut ctx, &key, Value::int32(3), &receiver).unwrap());
        assert_eq!(ta.internal_get(&mut ctx, &key, &receiver).unwrap(), Value::int32(3));
        let keys = ta.internal_own_property_keys(&mut ctx).unwrap();
        assert_eq!(keys, vec![PropertyKey::Index(0), key]);
    }

    #[test]
    fn test_alignment_error() {
        let mut ctx = setup();
        let buffer = allocate_array_buffer(&ctx, 16, None, None).unwrap();
        let err = typed_array_create_from_buffer(
            &mut ctx,
            ElementKind::Int32,
            &buffer,
            &Value::int32(2),
            &Value::undefined(),
        )
        .unwrap_err();
        assert!(err.is_range_error());

        let err = typed_array_create_from_buffer(
            &mut ctx,
            ElementKind::Int32,
            &buffer,
            &Value::int32(8),
            &Value::int32(3),
        )
        .unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_views_alias() {
        let mut ctx = setup();
        let buffer = allocate_array_buffer(&ctx, 8, None, None).unwrap();
        let bytes = typed_array_create_from_buffer(&mut ctx, ElementKind::Uint8, &buffer, &Value::undefined(), &Value::undefined()).unwrap();
        let words = typed_array_create_from_buffer(&mut ctx, ElementKind::Uint16, &buffer, &Value::int32(2), &Value::int32(1)).unwrap();

        typed_array_set_element(&mut ctx, &words, 0.0, &Value::int32(0xBEEF)).unwrap();
        assert_eq!(elements(&bytes), ints(&[0, 0, 0xEF, 0xBE, 0, 0, 0, 0]));
    }

    #[test]
    fn test_detached_buffer_reads_undefined() {
        let mut ctx = setup();
        let ta = typed_array_create_from_list(&mut ctx, ElementKind::Float64, &ints(&[1, 2])).unwrap();
        ta.as_typed_array().unwrap().buffer().as_array_buffer().unwrap().detach();
        let receiver = Value::object(ta.clone());
        assert!(ta.internal_get(&mut ctx, &PropertyKey::Index(0), &receiver).unwrap().is_undefined());
        assert_eq!(ta.as_typed_array().unwrap().length(), 0);
        assert!(validate_typed_array(&ta).unwrap_err().is_type_error());
    }

    #[test]
    fn test_length_tracking() {
        let mut ctx = setup();
        let buffer = allocate_array_buffer(&ctx, 4, Some(16), None).unwrap();
        let ta = typed_array_create_from_buffer(&mut ctx, ElementKind::Uint16, &buffer, &Value::undefined(), &Value::undefined()).unwrap();
        assert_eq!(ta.as_typed_array().unwrap().length(), 2);
        buffer.as_array_buffer().unwrap().resize(10).unwrap();
        assert_eq!(ta.as_typed_array().unwrap().length(), 5);
    }

    #[test]
    fn test_bigint_content_type() {
        let mut ctx = setup();
        let err = typed_array_create_from_list(&mut ctx, ElementKind::BigInt64, &ints(&[1])).unwrap_err();
        assert!(err.is_type_error());

        let source = typed_array_create_from_list(&mut ctx, ElementKind::Int8, &ints(&[1])).unwrap();
        let err = typed_array_create_from_typed_array(&ctx, ElementKind::BigUint64, &source).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_subarray_shares_and_slice_copies() {
        let mut ctx = setup();
        let ta = typed_array_create_from_list(&mut ctx, ElementKind::Int16, &ints(&[1, 2, 3, 4])).unwrap();
        let sub = typed_array_subarray(&mut ctx, &ta, &Value::int32(1), &Value::int32(3)).unwrap();
        let copy = typed_array_slice(&mut ctx, &ta, &Value::int32(1), &Value::int32(3)).unwrap();
        assert_eq!(elements(&sub), ints(&[2, 3]));
        assert_eq!(elements(&copy), ints(&[2, 3]));

        typed_array_set_element(&mut ctx, &ta, 1.0, &Value::int32(9)).unwrap();
        assert_eq!(elements(&sub), ints(&[9, 3]));
        assert_eq!(elements(&copy), ints(&[2, 3]));
    }

    #[test]
    fn test_fill_reverse_copy_within() {
        let mut ctx = setup();
        let ta = typed_array_create_from_list(&mut ctx, ElementKind::Uint8, &ints(&[1, 2, 3, 4, 5])).unwrap();
        typed_array_copy_within(&mut ctx, &ta, &Value::int32(0), &Value::int32(3), &Value::undefined()).unwrap();
        assert_eq!(elements(&ta), ints(&[4, 5, 3, 4, 5]));
        typed_array_reverse(&ta).unwrap();
        assert_eq!(elements(&ta), ints(&[5, 4, 3, 5, 4]));
        typed_array_fill(&mut ctx, &ta, &Value::int32(257), &Value::int32(-2), &Value::undefined()).unwrap();
        assert_eq!(elements(&ta), ints(&[5, 4, 3, 1, 1]));
    }

    #[test]
    fn test_includes_vs_index_of_nan() {
        let mut ctx = setup();
        let ta = typed_array_create_from_list(&mut ctx, ElementKind::Float32, &[Value::nan(), Value::number(-0.0)]).unwrap();
        assert!(typed_array_includes(&mut ctx, &ta, &Value::nan(), &Value::undefined()).unwrap());
        assert_eq!(typed_array_index_of(&mut ctx, &ta, &Value::nan(), &Value::undefined()).unwrap(), None);
        assert_eq!(typed_array_index_of(&mut ctx, &ta, &Value::int32(0), &Value::undefined()).unwrap(), Some(1));
    }

    #[test]
    fn test_set_from_values_bounds() {
        let mut ctx = setup();
        let ta = typed_array_create_with_length(&ctx, ElementKind::Int8, 3).unwrap();
        typed_array_set_from_values(&mut ctx, &ta, &ints(&[7, 8]), 1).unwrap();
        assert_eq!(elements(&ta), ints(&[0, 7, 8]));
        let err = typed_array_set_from_values(&mut ctx, &ta, &ints(&[1, 2]), 2).unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_set_from_array_like_sources() {
        let mut ctx = setup();
        let ta = typed_array_create_with_length(&ctx, ElementKind::Uint8, 3).unwrap();
        let array = crate::array::create_array_from_list(&ctx, &ints(&[256, 7]));
        typed_array_set_from(&mut ctx, &ta, &Value::object(array), &Value::int32(1)).unwrap();
        assert_eq!(elements(&ta), ints(&[0, 0, 7]));

        let source = typed_array_create_from_list(&mut ctx, ElementKind::Int16, &ints(&[-1])).unwrap();
        typed_array_set_from(&mut ctx, &ta, &Value::object(source), &Value::undefined()).unwrap();
        assert_eq!(elements(&ta), ints(&[255, 0, 7]));

        let bigints = typed_array_create_with_length(&ctx, ElementKind::BigInt64, 1).unwrap();
        let err = typed_array_set_from(&mut ctx, &ta, &Value::object(bigints), &Value::undefined()).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_canonical_numeric_index() {
        assert_eq!(canonical_numeric_index(&PropertyKey::string("1.5")), Some(1.5));
        assert!(canonical_numeric_index(&PropertyKey::string("-0")).unwrap().is_sign_negative());
        assert_eq!(canonical_numeric_index(&PropertyKey::string("01")), None);
        assert_eq!(canonical_numeric_index(&PropertyKey::string("foo")), None);
        assert_eq!(canonical_numeric_index(&PropertyKey::string("Infinity")), Some(f64::INFINITY));
    }
}
