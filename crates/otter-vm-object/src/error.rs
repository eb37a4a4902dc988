//! VM error types

use crate::value::Value;
use thiserror::Error;

/// Errors raised by internal operations.
///
/// Every operation either completes normally or fails with exactly one of
/// these. Values thrown by host callbacks travel as [`VmError::Exception`]
/// and are never rewritten on the way out.
#[derive(Debug, Error)]
pub enum VmError {
    /// Type error (e.g., calling non-function, revoked proxy)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Reference error (unresolved binding)
    #[error("ReferenceError: {0}")]
    ReferenceError(String),

    /// Range error (e.g., invalid array length, out-of-bounds view access)
    #[error("RangeError: {0}")]
    RangeError(String),

    /// Syntax error (malformed JSON text)
    #[error("SyntaxError: {0}")]
    SyntaxError(String),

    /// Internal error
    #[error("InternalError: {0}")]
    InternalError(String),

    /// Stack overflow
    #[error("RangeError: Maximum call stack size exceeded")]
    StackOverflow,

    /// Value thrown by a callback
    #[error("Uncaught exception: {0}")]
    Exception(Box<ThrownValue>),
}

/// Abstract error kind, independent of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// TypeError
    Type,
    /// RangeError
    Range,
    /// ReferenceError
    Reference,
    /// SyntaxError
    Syntax,
    /// Engine bug or broken host contract
    Internal,
    /// A value thrown by user code
    Thrown,
}

/// A thrown JavaScript value
#[derive(Debug)]
pub struct ThrownValue {
    /// The thrown value
    pub value: Value,
    /// Display form captured at throw time
    pub message: String,
}

impl std::fmt::Display for ThrownValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl VmError {
    /// Create a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a reference error
    pub fn reference_error(msg: impl Into<String>) -> Self {
        Self::ReferenceError(msg.into())
    }

    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Create a syntax error
    pub fn syntax_error(msg: impl Into<String>) -> Self {
        Self::SyntaxError(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Create an exception from a thrown JS value
    pub fn exception(value: Value) -> Self {
        let message = match value.as_string() {
            Some(s) => s.to_std_string(),
            None => format!("{:?}", value),
        };
        Self::Exception(Box::new(ThrownValue { value, message }))
    }

    /// The abstract kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeError(_) => ErrorKind::Type,
            Self::RangeError(_) | Self::StackOverflow => ErrorKind::Range,
            Self::ReferenceError(_) => ErrorKind::Reference,
            Self::SyntaxError(_) => ErrorKind::Syntax,
            Self::InternalError(_) => ErrorKind::Internal,
            Self::Exception(_) => ErrorKind::Thrown,
        }
    }

    /// The thrown value, if this error carries one.
    pub fn thrown_value(&self) -> Option<&Value> {
        match self {
            Self::Exception(thrown) => Some(&thrown.value),
            _ => None,
        }
    }

    /// Whether this is a TypeError
    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }

    /// Whether this is a RangeError (including stack exhaustion)
    pub fn is_range_error(&self) -> bool {
        self.kind() == ErrorKind::Range
    }

    /// Whether this is a SyntaxError
    pub fn is_syntax_error(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }
}

/// Result type for VM operations
pub type VmResult<T> = std::result::Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            VmError::type_error("x is not a function").to_string(),
            "TypeError: x is not a function"
        );
        assert_eq!(
            VmError::StackOverflow.to_string(),
            "RangeError: Maximum call stack size exceeded"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(VmError::range_error("bad").kind(), ErrorKind::Range);
        assert_eq!(VmError::StackOverflow.kind(), ErrorKind::Range);
        assert!(VmError::syntax_error("Unexpected token").is_syntax_error());

        let err = VmError::exception(Value::string("boom"));
        assert_eq!(err.kind(), ErrorKind::Thrown);
        assert_eq!(err.to_string(), "Uncaught exception: boom");
        assert!(err.thrown_value().is_some());
    }
}
