//! Property keys
//!
//! A key is a string, a symbol, or a canonical array index. Strings that
//! spell an array index (`"0"`, `"42"`, but not `"042"` or `"4294967295"`)
//! are always stored as [`PropertyKey::Index`], so `o[1]`, `o["1"]` and
//! `o[-0]` all address the same slot.

use crate::number::{self, number_to_string, parse_array_index};
use crate::string::JsString;
use crate::symbol::Symbol;
use crate::value::Value;
use std::fmt;

/// A normalized property key
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Canonical array index in `[0, 2^32 - 2]`
    Index(u32),
    /// Any other string
    String(JsString),
    /// Symbol key
    Symbol(Symbol),
}

impl PropertyKey {
    /// Key from a string, canonicalizing array indices.
    pub fn string(s: impl Into<JsString>) -> Self {
        Self::from_js_string(s.into())
    }

    /// Key from an interned literal (`"length"`, `"prototype"`, ...).
    pub fn intern(s: &str) -> Self {
        Self::from_js_string(JsString::intern(s))
    }

    /// Key from a string, canonicalizing array indices.
    pub fn from_js_string(s: JsString) -> Self {
        match parse_array_index(s.as_utf16()) {
            Some(index) => Self::Index(index),
            None => Self::String(s),
        }
    }

    /// Key from a u32; 2^32 - 1 is not an index and becomes a string key.
    pub fn index(i: u32) -> Self {
        if i <= number::MAX_ARRAY_INDEX {
            Self::Index(i)
        } else {
            Self::String(JsString::new(&i.to_string()))
        }
    }

    /// Key from a number, as `ToPropertyKey(ToString(n))` would produce.
    pub fn from_number(n: f64) -> Self {
        match number::number_to_array_index(n) {
            Some(index) => Self::Index(index),
            None => Self::String(JsString::new(&number_to_string(n))),
        }
    }

    /// Symbol key
    pub fn symbol(s: Symbol) -> Self {
        Self::Symbol(s)
    }

    /// Array index, if this key is one
    pub fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// Symbol, if this key is one
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this key is a symbol
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Whether this key is a string (including array indices)
    pub fn is_string(&self) -> bool {
        !self.is_symbol()
    }

    /// Compare against a string literal
    pub fn is_str(&self, s: &str) -> bool {
        match self {
            Self::String(js) => js.eq_str(s),
            Self::Index(i) => itoa::Buffer::new().format(*i) == s,
            Self::Symbol(_) => false,
        }
    }

    /// String form of a string key; `None` for symbols.
    pub fn to_js_string(&self) -> Option<JsString> {
        match self {
            Self::Index(i) => {
                let mut buf = itoa::Buffer::new();
                Some(JsString::new(buf.format(*i)))
            }
            Self::String(s) => Some(s.clone()),
            Self::Symbol(_) => None,
        }
    }

    /// The key as a JS value (string or symbol), as `ownKeys` reports it.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Symbol(s) => Value::Symbol(s.clone()),
            _ => Value::String(self.to_js_string().unwrap_or_else(JsString::empty)),
        }
    }

    /// Key from a string or symbol value; `None` for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::from_js_string(s.clone())),
            Value::Symbol(s) => Some(Self::Symbol(s.clone())),
            _ => None,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        Self::index(i)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(s: Symbol) -> Self {
        Self::Symbol(s)
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Symbol(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::String(s) => write!(f, "{}", s),
            Self::Symbol(s) => write!(f, "{}", s.descriptive_string()),
        }
    }
}
