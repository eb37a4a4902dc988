//! JavaScript values
//!
//! `Value` is a tagged union over every primitive plus an object reference.
//! Numbers are stored as `f64` with a single canonical NaN; `Value::number`
//! is the only constructor that should be used to build number values.

use crate::object::ObjectRef;
use crate::string::JsString;
use crate::symbol::Symbol;
use num_bigint::BigInt;
use num_traits::Zero;
use parking_lot::Mutex;
use std::sync::Arc;

/// The one NaN bit pattern values ever carry.
pub const CANONICAL_NAN_BITS: u64 = 0x7FF8_0000_0000_0000;

/// A JavaScript value
#[derive(Clone, Default)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// IEEE-754 double
    Number(f64),
    /// Immutable UTF-16 string
    String(JsString),
    /// Unique symbol
    Symbol(Symbol),
    /// Arbitrary precision integer
    BigInt(Arc<BigInt>),
    /// Object reference
    Object(ObjectRef),
}

/// Shared mutable binding.
///
/// Mapped arguments objects alias their indices to the function's
/// parameter bindings through these cells; the host environment holds the
/// other end.
#[derive(Clone)]
pub struct BindingCell(Arc<Mutex<Value>>);

impl BindingCell {
    /// Create a new binding cell with the given value
    pub fn new(value: Value) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    /// Get the current value from the cell
    pub fn get(&self) -> Value {
        self.0.lock().clone()
    }

    /// Set a new value in the cell
    pub fn set(&self, value: Value) {
        *self.0.lock() = value;
    }

    /// Whether two handles refer to one binding
    pub fn ptr_eq(&self, other: &BindingCell) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for BindingCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BindingCell({:?})", *self.0.lock())
    }
}

impl Value {
    // ===== Constructors =====

    /// Create undefined value
    #[inline]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// Create null value
    #[inline]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Create boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Create number value, canonicalizing NaN
    #[inline]
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Self::Number(f64::from_bits(CANONICAL_NAN_BITS))
        } else {
            Self::Number(n)
        }
    }

    /// Create number value from an int32
    #[inline]
    pub fn int32(n: i32) -> Self {
        Self::Number(n as f64)
    }

    /// Canonical NaN
    #[inline]
    pub fn nan() -> Self {
        Self::Number(f64::from_bits(CANONICAL_NAN_BITS))
    }

    /// Create string value
    pub fn string(s: impl Into<JsString>) -> Self {
        Self::String(s.into())
    }

    /// Create symbol value
    pub fn symbol(s: Symbol) -> Self {
        Self::Symbol(s)
    }

    /// Create bigint value
    pub fn bigint(b: BigInt) -> Self {
        Self::BigInt(Arc::new(b))
    }

    /// Create object value
    pub fn object(o: ObjectRef) -> Self {
        Self::Object(o)
    }

    // ===== Type checks =====

    /// Check if undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Check if null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if undefined or null
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Check if number
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Check if string
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Check if symbol
    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Check if bigint
    #[inline]
    pub fn is_bigint(&self) -> bool {
        matches!(self, Self::BigInt(_))
    }

    /// Check if object
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Check if callable (has `[[Call]]`)
    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(|o| o.is_callable())
    }

    /// Check if constructor (has `[[Construct]]`)
    pub fn is_constructor(&self) -> bool {
        self.as_object().is_some_and(|o| o.is_constructor())
    }

    // ===== Getters =====

    /// Get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as symbol
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get as bigint
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Self::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    // ===== Semantics =====

    /// `ToBoolean`
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => !n.is_nan() && *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Symbol(_) | Self::Object(_) => true,
            Self::BigInt(b) => !b.is_zero(),
        }
    }

    /// Get the type name (for typeof)
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::BigInt(_) => "bigint",
            Self::Object(o) if o.is_callable() => "function",
            Self::Object(_) => "object",
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Symbol(s) => write!(f, "{:?}", s),
            Self::BigInt(b) => write!(f, "{}n", b),
            Self::Object(o) => write!(f, "{:?}", o),
        }
    }
}

/// Strict equality (`===`): NaN is unequal to itself, `-0 === +0`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        strict_equals(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<JsString> for Value {
    fn from(s: JsString) -> Self {
        Self::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Self::Object(o)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Self::Symbol(s)
    }
}

fn same_non_number(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => x == y,
        _ => false,
    }
}

/// `IsStrictlyEqual`
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => same_non_number(a, b),
    }
}

/// `SameValue` (`Object.is`): NaN equals NaN, `-0` differs from `+0`.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            (x.is_nan() && y.is_nan()) || (x == y && x.is_sign_negative() == y.is_sign_negative())
        }
        _ => same_non_number(a, b),
    }
}

/// `SameValueZero`: NaN equals NaN, `-0` equals `+0`.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => (x.is_nan() && y.is_nan()) || x == y,
        _ => same_non_number(a, b),
    }
}
