//! `JSON.stringify` and `JSON.parse`
//!
//! Both directions work on UTF-16 so lone surrogates survive: `stringify`
//! escapes them, `parse` accepts `\uD800` escapes as-is. Every nested
//! object or array costs one level of `ctx.enter`, which bounds recursion
//! by the configured stack depth.

use rustc_hash::FxHashSet;

use crate::array::create_array_from_list;
use crate::context::VmContext;
use crate::conversion;
use crate::descriptor::Property;
use crate::error::{VmError, VmResult};
use crate::number::number_to_string;
use crate::object::{InternalSlot, ObjectRef};
use crate::operations::{self, EnumerableKind};
use crate::property_key::PropertyKey;
use crate::string::JsString;
use crate::value::Value;

const MAX_GAP: usize = 10;

// ===========================================================================
// stringify
// ===========================================================================

struct Serializer {
    replacer: Option<Value>,
    property_list: Option<Vec<PropertyKey>>,
    gap: Vec<u16>,
    indent: Vec<u16>,
    /// Objects currently being serialized, innermost last
    stack: Vec<ObjectRef>,
    out: Vec<u16>,
}

fn push_ascii(out: &mut Vec<u16>, s: &str) {
    out.extend(s.encode_utf16());
}

fn push_hex_escape(out: &mut Vec<u16>, unit: u16) {
    push_ascii(out, &format!("\\u{unit:04x}"));
}

/// `QuoteJSONString(value)`
fn quote(out: &mut Vec<u16>, units: &[u16]) {
    out.push(u16::from(b'"'));
    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        match unit {
            0x08 => push_ascii(out, "\\b"),
            0x09 => push_ascii(out, "\\t"),
            0x0A => push_ascii(out, "\\n"),
            0x0C => push_ascii(out, "\\f"),
            0x0D => push_ascii(out, "\\r"),
            0x22 => push_ascii(out, "\\\""),
            0x5C => push_ascii(out, "\\\\"),
            u if u < 0x20 => push_hex_escape(out, u),
            0xD800..=0xDBFF => match units.get(i + 1) {
                Some(low @ 0xDC00..=0xDFFF) => {
                    out.push(unit);
                    out.push(*low);
                    i += 1;
                }
                _ => push_hex_escape(out, unit),
            },
            0xDC00..=0xDFFF => push_hex_escape(out, unit),
            u => out.push(u),
        }
        i += 1;
    }
    out.push(u16::from(b'"'));
}

impl Serializer {
    /// `SerializeJSONProperty(state, key, holder)`; false means undefined
    fn property(&mut self, ctx: &mut VmContext, key: &PropertyKey, holder: &ObjectRef) -> VmResult<bool> {
        let mut value = operations::get(ctx, holder, key)?;

        if value.is_object() || value.is_bigint() {
            let to_json = operations::get_v(ctx, &value, &PropertyKey::intern("toJSON"))?;
            if to_json.is_callable() {
                value = operations::call(ctx, &to_json, &value, &[key.to_value()])?;
            }
        }
        if let Some(replacer) = &self.replacer {
            let replacer = replacer.clone();
            let holder = Value::object(holder.clone());
            value = operations::call(ctx, &replacer, &holder, &[key.to_value(), value])?;
        }

        if let Value::Object(obj) = &value {
            if obj.has_slot(InternalSlot::NumberData) {
                value = Value::number(conversion::to_number(ctx, &value)?);
            } else if obj.as_string_exotic().is_some() {
                value = Value::String(conversion::to_string(ctx, &value)?);
            } else if let Some(inner) = obj
                .slot(InternalSlot::BooleanData)
                .or_else(|| obj.slot(InternalSlot::BigIntData))
            {
                value = inner;
            }
        }

        match &value {
            Value::Null => push_ascii(&mut self.out, "null"),
            Value::Boolean(true) => push_ascii(&mut self.out, "true"),
            Value::Boolean(false) => push_ascii(&mut self.out, "false"),
            Value::String(s) => quote(&mut self.out, s.as_utf16()),
            Value::Number(n) if n.is_finite() => push_ascii(&mut self.out, &number_to_string(*n)),
            Value::Number(_) => push_ascii(&mut self.out, "null"),
            Value::BigInt(_) => {
                return Err(VmError::type_error("Do not know how to serialize a BigInt"));
            }
            Value::Object(obj) if !obj.is_callable() => {
                let obj = obj.clone();
                ctx.enter(|ctx| {
                    if operations::is_array(&value)? {
                        self.array(ctx, &obj)
                    } else {
                        self.object(ctx, &obj)
                    }
                })?;
            }
            Value::Undefined | Value::Symbol(_) | Value::Object(_) => return Ok(false),
        }
        Ok(true)
    }

    fn enter_object(&mut self, obj: &ObjectRef) -> VmResult<Vec<u16>> {
        if self.stack.iter().any(|o| o.ptr_eq(obj)) {
            return Err(VmError::type_error("Converting circular structure to JSON"));
        }
        self.stack.push(obj.clone());
        let stepback = self.indent.clone();
        self.indent.extend_from_slice(&self.gap);
        Ok(stepback)
    }

    fn leave_object(&mut self, stepback: Vec<u16>) {
        self.stack.pop();
        self.indent = stepback;
    }

    fn separator(&mut self, first: bool) {
        if !first {
            self.out.push(u16::from(b','));
        }
        if !self.gap.is_empty() {
            self.out.push(u16::from(b'\n'));
            self.out.extend_from_slice(&self.indent);
        }
    }

    fn close(&mut self, stepback: &[u16], any: bool, bracket: u8) {
        if any && !self.gap.is_empty() {
            self.out.push(u16::from(b'\n'));
            self.out.extend_from_slice(stepback);
        }
        self.out.push(u16::from(bracket));
    }

    /// `SerializeJSONObject(state, value)`
    fn object(&mut self, ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<()> {
        let stepback = self.enter_object(obj)?;
        let keys = match &self.property_list {
            Some(list) => list.clone(),
            None => operations::enumerable_own_properties(ctx, obj, EnumerableKind::Key)?
                .iter()
                .filter_map(PropertyKey::from_value)
                .collect(),
        };

        self.out.push(u16::from(b'{'));
        let mut any = false;
        for key in &keys {
            let mark = self.out.len();
            self.separator(!any);
            if let Some(name) = key.to_js_string() {
                quote(&mut self.out, name.as_utf16());
            }
            self.out.push(u16::from(b':'));
            if !self.gap.is_empty() {
                self.out.push(u16::from(b' '));
            }
            if self.property(ctx, key, obj)? {
                any = true;
            } else {
                // undefined members are omitted entirely
                self.out.truncate(mark);
            }
        }
        self.close(&stepback, any, b'}');
        self.leave_object(stepback);
        Ok(())
    }

    /// `SerializeJSONArray(state, value)`
    fn array(&mut self, ctx: &mut VmContext, obj: &ObjectRef) -> VmResult<()> {
        let stepback = self.enter_object(obj)?;
        let len = operations::length_of_array_like(ctx, obj)?;

        self.out.push(u16::from(b'['));
        for index in 0..len {
            self.separator(index == 0);
            let key = PropertyKey::from_number(index as f64);
            if !self.property(ctx, &key, obj)? {
                push_ascii(&mut self.out, "null");
            }
        }
        self.close(&stepback, len > 0, b']');
        self.leave_object(stepback);
        Ok(())
    }
}

fn replacer_property_list(ctx: &mut VmContext, replacer: &ObjectRef) -> VmResult<Vec<PropertyKey>> {
    let len = operations::length_of_array_like(ctx, replacer)?;
    let mut seen = FxHashSet::default();
    let mut list = Vec::new();
    for k in 0..len {
        let v = operations::get(ctx, replacer, &PropertyKey::from_number(k as f64))?;
        let item = match &v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(JsString::from(number_to_string(*n))),
            Value::Object(o) if o.as_string_exotic().is_some() || o.has_slot(InternalSlot::NumberData) => {
                Some(conversion::to_string(ctx, &v)?)
            }
            _ => None,
        };
        if let Some(item) = item {
            let key = PropertyKey::from_js_string(item);
            if seen.insert(key.clone()) {
                list.push(key);
            }
        }
    }
    Ok(list)
}

fn gap_from_space(ctx: &mut VmContext, space: &Value) -> VmResult<Vec<u16>> {
    let mut space = space.clone();
    if let Value::Object(obj) = &space {
        if obj.has_slot(InternalSlot::NumberData) {
            space = Value::number(conversion::to_number(ctx, &space)?);
        } else if obj.as_string_exotic().is_some() {
            space = Value::String(conversion::to_string(ctx, &space)?);
        }
    }
    Ok(match &space {
        Value::Number(n) => {
            let count = crate::number::to_integer_or_infinity(*n).clamp(0.0, MAX_GAP as f64) as usize;
            vec![u16::from(b' '); count]
        }
        Value::String(s) => s.as_utf16().iter().take(MAX_GAP).copied().collect(),
        _ => Vec::new(),
    })
}

/// `JSON.stringify(value, replacer, space)`; `None` when the result is
/// undefined (for example a bare function or symbol)
pub fn stringify(
    ctx: &mut VmContext,
    value: &Value,
    replacer: &Value,
    space: &Value,
) -> VmResult<Option<JsString>> {
    let mut serializer = Serializer {
        replacer: None,
        property_list: None,
        gap: Vec::new(),
        indent: Vec::new(),
        stack: Vec::new(),
        out: Vec::new(),
    };
    if let Value::Object(r) = replacer {
        if r.is_callable() {
            serializer.replacer = Some(replacer.clone());
        } else if operations::is_array(replacer)? {
            serializer.property_list = Some(replacer_property_list(ctx, r)?);
        }
    }
    serializer.gap = gap_from_space(ctx, space)?;

    let wrapper = ctx.new_object();
    let empty = PropertyKey::String(JsString::empty());
    operations::create_data_property_or_throw(ctx, &wrapper, &empty, value.clone())?;
    if serializer.property(ctx, &empty, &wrapper)? {
        Ok(Some(JsString::from_utf16(serializer.out)))
    } else {
        Ok(None)
    }
}

// ===========================================================================
// parse
// ===========================================================================

struct Parser<'a> {
    units: &'a [u16],
    pos: usize,
}

fn is_json_whitespace(unit: u16) -> bool {
    matches!(unit, 0x09 | 0x0A | 0x0D | 0x20)
}

impl Parser<'_> {
    fn peek(&self) -> Option<u16> {
        self.units.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_json_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> VmError {
        match self.peek() {
            None => VmError::syntax_error("Unexpected end of JSON input"),
            Some(unit) => {
                let token = char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
                VmError::syntax_error(format!(
                    "Unexpected token '{token}' in JSON at position {}",
                    self.pos
                ))
            }
        }
    }

    fn expect(&mut self, unit: u8) -> VmResult<()> {
        if self.peek() == Some(u16::from(unit)) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn literal(&mut self, word: &str, value: Value) -> VmResult<Value> {
        for byte in word.bytes() {
            self.expect(byte)?;
        }
        Ok(value)
    }

    fn value(&mut self, ctx: &mut VmContext) -> VmResult<Value> {
        self.skip_whitespace();
        match self.peek().map(|u| u as u8 as char) {
            Some('{') => ctx.enter(|ctx| self.object(ctx)),
            Some('[') => ctx.enter(|ctx| self.array(ctx)),
            Some('"') => Ok(Value::String(self.string()?)),
            Some('t') => self.literal("true", Value::boolean(true)),
            Some('f') => self.literal("false", Value::boolean(false)),
            Some('n') => self.literal("null", Value::null()),
            Some('-' | '0'..='9') if self.peek().is_some_and(|u| u < 0x80) => self.number(),
            _ => Err(self.unexpected()),
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|u| (0x30..=0x39).contains(&u)) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn number(&mut self) -> VmResult<Value> {
        let start = self.pos;
        if self.peek() == Some(u16::from(b'-')) {
            self.pos += 1;
        }
        match self.peek() {
            Some(0x30) => self.pos += 1,
            Some(0x31..=0x39) => {
                self.digits();
            }
            _ => return Err(self.unexpected()),
        }
        if self.peek() == Some(u16::from(b'.')) {
            self.pos += 1;
            if self.digits() == 0 {
                return Err(self.unexpected());
            }
        }
        if matches!(self.peek(), Some(0x45 | 0x65)) {
            self.pos += 1;
            if matches!(self.peek(), Some(0x2B | 0x2D)) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return Err(self.unexpected());
            }
        }
        // every unit in range is ASCII
        let text: String = self.units[start..self.pos].iter().map(|u| *u as u8 as char).collect();
        text.parse::<f64>()
            .map(Value::number)
            .map_err(|_| VmError::syntax_error(format!("Invalid number in JSON at position {start}")))
    }

    fn hex4(&mut self) -> VmResult<u16> {
        let mut unit = 0u16;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|u| char::from_u32(u32::from(u)))
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.unexpected())?;
            unit = unit * 16 + digit as u16;
            self.pos += 1;
        }
        Ok(unit)
    }

    fn string(&mut self) -> VmResult<JsString> {
        self.expect(b'"')?;
        let mut out = Vec::new();
        loop {
            let Some(unit) = self.peek() else {
                return Err(VmError::syntax_error("Unterminated string in JSON"));
            };
            match unit {
                0x22 => {
                    self.pos += 1;
                    return Ok(JsString::from_utf16(out));
                }
                0x5C => {
                    self.pos += 1;
                    let escaped = match self.peek() {
                        Some(0x22) => 0x22,
                        Some(0x5C) => 0x5C,
                        Some(0x2F) => 0x2F,
                        Some(0x62) => 0x08,
                        Some(0x66) => 0x0C,
                        Some(0x6E) => 0x0A,
                        Some(0x72) => 0x0D,
                        Some(0x74) => 0x09,
                        Some(0x75) => {
                            self.pos += 1;
                            out.push(self.hex4()?);
                            continue;
                        }
                        _ => return Err(self.unexpected()),
                    };
                    self.pos += 1;
                    out.push(escaped);
                }
                u if u < 0x20 => {
                    return Err(VmError::syntax_error(format!(
                        "Bad control character in string literal in JSON at position {}",
                        self.pos
                    )));
                }
                u => {
                    self.pos += 1;
                    out.push(u);
                }
            }
        }
    }

    fn array(&mut self, ctx: &mut VmContext) -> VmResult<Value> {
        self.expect(b'[')?;
        let mut elements = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(u16::from(b']')) {
            self.pos += 1;
            return Ok(Value::object(create_array_from_list(ctx, &elements)));
        }
        loop {
            elements.push(self.value(ctx)?);
            self.skip_whitespace();
            match self.peek() {
                Some(0x2C) => self.pos += 1,
                Some(0x5D) => {
                    self.pos += 1;
                    return Ok(Value::object(create_array_from_list(ctx, &elements)));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn object(&mut self, ctx: &mut VmContext) -> VmResult<Value> {
        self.expect(b'{')?;
        let obj = ctx.new_object();
        self.skip_whitespace();
        if self.peek() == Some(u16::from(b'}')) {
            self.pos += 1;
            return Ok(Value::object(obj));
        }
        loop {
            self.skip_whitespace();
            let key = PropertyKey::from_js_string(self.string()?);
            self.skip_whitespace();
            self.expect(b':')?;
            let value = self.value(ctx)?;
            // a repeated key overwrites in place, keeping its first position
            operations::create_data_property(ctx, &obj, &key, value)?;
            self.skip_whitespace();
            match self.peek() {
                Some(0x2C) => self.pos += 1,
                Some(0x7D) => {
                    self.pos += 1;
                    return Ok(Value::object(obj));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }
}

/// `JSON.parse(text, reviver)`
pub fn parse(ctx: &mut VmContext, text: &Value, reviver: &Value) -> VmResult<Value> {
    let text = conversion::to_string(ctx, text)?;
    let mut parser = Parser {
        units: text.as_utf16(),
        pos: 0,
    };
    let value = parser.value(ctx)?;
    parser.skip_whitespace();
    if parser.pos < parser.units.len() {
        return Err(parser.unexpected());
    }

    if !reviver.is_callable() {
        return Ok(value);
    }
    let root = ctx.new_object();
    let empty = PropertyKey::String(JsString::empty());
    operations::create_data_property_or_throw(ctx, &root, &empty, value)?;
    internalize(ctx, &root, &empty, reviver)
}

/// Convenience for host code holding a Rust string
pub fn parse_str(ctx: &mut VmContext, text: &str) -> VmResult<Value> {
    parse(ctx, &Value::string(text), &Value::undefined())
}

/// `InternalizeJSONProperty(holder, name, reviver)`; children first
fn internalize(
    ctx: &mut VmContext,
    holder: &ObjectRef,
    name: &PropertyKey,
    reviver: &Value,
) -> VmResult<Value> {
    let value = operations::get(ctx, holder, name)?;
    if let Value::Object(obj) = &value {
        let keys: Vec<PropertyKey> = if operations::is_array(&value)? {
            let len = operations::length_of_array_like(ctx, obj)?;
            (0..len).map(|i| PropertyKey::from_number(i as f64)).collect()
        } else {
            operations::enumerable_own_properties(ctx, obj, EnumerableKind::Key)?
                .iter()
                .filter_map(PropertyKey::from_value)
                .collect()
        };
        for key in keys {
            let element = ctx.enter(|ctx| internalize(ctx, obj, &key, reviver))?;
            if element.is_undefined() {
                obj.internal_delete(ctx, &key)?;
            } else {
                operations::create_data_property(ctx, obj, &key, element)?;
            }
        }
    }
    operations::call(ctx, reviver, &Value::object(holder.clone()), &[name.to_value(), value])
}

// ===========================================================================
// serde interop
// ===========================================================================

/// Build a JS value tree from a `serde_json` value
pub fn from_serde(ctx: &VmContext, json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::null(),
        serde_json::Value::Bool(b) => Value::boolean(*b),
        serde_json::Value::Number(n) => Value::number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s.as_str()),
        serde_json::Value::Array(items) => {
            let elements: Vec<Value> = items.iter().map(|item| from_serde(ctx, item)).collect();
            Value::object(create_array_from_list(ctx, &elements))
        }
        serde_json::Value::Object(map) => {
            let obj = ctx.new_object();
            for (k, v) in map {
                obj.insert_property(PropertyKey::string(k.as_str()), Property::data(from_serde(ctx, v)));
            }
            Value::object(obj)
        }
    }
}

/// Convert a JS value tree to `serde_json`.
///
/// Structural only: `toJSON` is not consulted. Members JSON cannot hold
/// (undefined, functions, symbols) are dropped from objects and become
/// null in arrays, as `stringify` would.
pub fn to_serde(ctx: &mut VmContext, value: &Value) -> VmResult<serde_json::Value> {
    let mut stack = Vec::new();
    Ok(to_serde_inner(ctx, value, &mut stack)?.unwrap_or(serde_json::Value::Null))
}

fn to_serde_inner(
    ctx: &mut VmContext,
    value: &Value,
    stack: &mut Vec<ObjectRef>,
) -> VmResult<Option<serde_json::Value>> {
    Ok(Some(match value {
        Value::Undefined | Value::Symbol(_) => return Ok(None),
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_serde(*n),
        Value::String(s) => serde_json::Value::String(s.to_std_string()),
        Value::BigInt(_) => {
            return Err(VmError::type_error("Do not know how to serialize a BigInt"));
        }
        Value::Object(obj) if obj.is_callable() => return Ok(None),
        Value::Object(obj) => {
            if stack.iter().any(|o| o.ptr_eq(obj)) {
                return Err(VmError::type_error("Converting circular structure to JSON"));
            }
            stack.push(obj.clone());
            let result = ctx.enter(|ctx| {
                if operations::is_array(value)? {
                    let len = operations::length_of_array_like(ctx, obj)?;
                    let mut items = Vec::new();
                    for i in 0..len {
                        let element = operations::get(ctx, obj, &PropertyKey::from_number(i as f64))?;
                        items.push(to_serde_inner(ctx, &element, stack)?.unwrap_or(serde_json::Value::Null));
                    }
                    Ok(serde_json::Value::Array(items))
                } else {
                    let mut map = serde_json::Map::new();
                    for key in operations::enumerable_own_properties(ctx, obj, EnumerableKind::Key)? {
                        let Some(pk) = PropertyKey::from_value(&key) else {
                            continue;
                        };
                        let member = operations::get(ctx, obj, &pk)?;
                        if let Some(json) = to_serde_inner(ctx, &member, stack)? {
                            map.insert(pk.to_string(), json);
                        }
                    }
                    Ok(serde_json::Value::Object(map))
                }
            });
            stack.pop();
            result?
        }
    }))
}

fn number_to_serde(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;

    fn setup() -> VmContext {
        VmRuntime::new().create_context()
    }

    fn to_json(ctx: &mut VmContext, value: &Value) -> Option<String> {
        stringify(ctx, value, &Value::undefined(), &Value::undefined())
            .unwrap()
            .map(|s| s.to_std_string())
    }

    #[test]
    fn test_primitives() {
        let mut ctx = setup();
        assert_eq!(to_json(&mut ctx, &Value::null()).as_deref(), Some("null"));
        assert_eq!(to_json(&mut ctx, &Value::number(f64::NAN)).as_deref(), Some("null"));
        assert_eq!(to_json(&mut ctx, &Value::number(-0.0)).as_deref(), Some("0"));
        assert_eq!(to_json(&mut ctx, &Value::string("a\"\n")).as_deref(), Some("\"a\\\"\\n\""));
        assert_eq!(to_json(&mut ctx, &Value::undefined()), None);
    }

    #[test]
    fn test_lone_surrogate_escaped() {
        let mut ctx = setup();
        let s = Value::String(JsString::from_utf16(vec![0xD800, 0x61]));
        assert_eq!(to_json(&mut ctx, &s).as_deref(), Some("\"\\ud800a\""));
    }

    #[test]
    fn test_holes() {
        let mut ctx = setup();
        let f = Value::object(ctx.new_function("f", 0, |_, _, _| Ok(Value::undefined())));
        let obj = ctx.new_object();
        operations::create_data_property_or_throw(&mut ctx, &obj, &"a".into(), Value::undefined()).unwrap();
        operations::create_data_property_or_throw(&mut ctx, &obj, &"b".into(), f.clone()).unwrap();
        assert_eq!(to_json(&mut ctx, &Value::object(obj)).as_deref(), Some("{}"));

        let array = create_array_from_list(&ctx, &[Value::undefined(), f]);
        assert_eq!(to_json(&mut ctx, &Value::object(array)).as_deref(), Some("[null,null]"));
    }

    #[test]
    fn test_indentation() {
        let mut ctx = setup();
        let value = parse_str(&mut ctx, r#"{"a":[1,2],"b":{}}"#).unwrap();
        let out = stringify(&mut ctx, &value, &Value::undefined(), &Value::int32(2))
            .unwrap()
            .unwrap()
            .to_std_string();
        assert_eq!(out, "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {}\n}");
    }

    #[test]
    fn test_replacer_array_filters_and_orders() {
        let mut ctx = setup();
        let value = parse_str(&mut ctx, r#"{"a":1,"b":2,"c":3}"#).unwrap();
        let replacer = create_array_from_list(&ctx, &[Value::string("c"), Value::string("a"), Value::string("c")]);
        let out = stringify(&mut ctx, &value, &Value::object(replacer), &Value::undefined())
            .unwrap()
            .unwrap()
            .to_std_string();
        assert_eq!(out, r#"{"c":3,"a":1}"#);
    }

    #[test]
    fn test_to_json_called_with_key() {
        let mut ctx = setup();
        let inner = ctx.new_object();
        let to_json_fn = ctx.new_function("toJSON", 1, |_, _, args| {
            Ok(args.first().cloned().unwrap_or_default())
        });
        operations::create_data_property_or_throw(&mut ctx, &inner, &"toJSON".into(), Value::object(to_json_fn)).unwrap();
        let outer = ctx.new_object();
        operations::create_data_property_or_throw(&mut ctx, &outer, &"key".into(), Value::object(inner)).unwrap();
        assert_eq!(to_json(&mut ctx, &Value::object(outer)).as_deref(), Some(r#"{"key":"key"}"#));
    }

    #[test]
    fn test_bigint_rejected() {
        let mut ctx = setup();
        let err = stringify(
            &mut ctx,
            &Value::bigint(num_bigint::BigInt::from(1)),
            &Value::undefined(),
            &Value::undefined(),
        )
        .unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_parse_errors() {
        let mut ctx = setup();
        for text in ["", "{", "[1,]", "01", "\"\u{1}\"", "{'a':1}", "1 2", "\u{a0}1"] {
            let err = parse_str(&mut ctx, text).unwrap_err();
            assert!(err.is_syntax_error(), "{text:?} should fail");
        }
    }

    #[test]
    fn test_parse_duplicate_and_proto_keys() {
        let mut ctx = setup();
        let value = parse_str(&mut ctx, r#"{"a":1,"__proto__":null,"a":2}"#).unwrap();
        let obj = value.as_object().unwrap().clone();
        assert_eq!(operations::get(&mut ctx, &obj, &"a".into()).unwrap(), Value::int32(2));
        assert!(obj.own_property(&"__proto__".into()).is_some());
        assert!(obj.prototype().is_some());
        let keys = operations::own_property_keys(&mut ctx, &obj).unwrap();
        assert_eq!(keys, vec![Value::string("a"), Value::string("__proto__")]);
    }

    #[test]
    fn test_reviver_runs_bottom_up() {
        let mut ctx = setup();
        let order = std::sync::Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
        let log = order.clone();
        let reviver = ctx.new_function("reviver", 2, move |_, _, args| {
            let key = args[0].as_string().map(|s| s.to_std_string()).unwrap_or_default();
            let drop = key == "drop";
            log.lock().push(key);
            if drop {
                return Ok(Value::undefined());
            }
            Ok(args[1].clone())
        });
        let value = parse(
            &mut ctx,
            &Value::string(r#"{"a":{"b":1},"drop":2}"#),
            &Value::object(reviver),
        )
        .unwrap();

        assert_eq!(*order.lock(), vec!["b", "a", "drop", ""]);
        let obj = value.as_object().unwrap().clone();
        assert!(!operations::has_own_property(&mut ctx, &obj, &"drop".into()).unwrap());
        assert!(operations::has_own_property(&mut ctx, &obj, &"a".into()).unwrap());
    }

    #[test]
    fn test_serde_interop() {
        let mut ctx = setup();
        let json = serde_json::json!({"z": 1, "a": [true, null, "s"], "n": 1.5});
        let value = from_serde(&ctx, &json);
        assert_eq!(to_serde(&mut ctx, &value).unwrap(), json);
        let text = stringify(&mut ctx, &value, &Value::undefined(), &Value::undefined())
            .unwrap()
            .unwrap()
            .to_std_string();
        assert_eq!(text, r#"{"z":1,"a":[true,null,"s"],"n":1.5}"#);
    }
}
