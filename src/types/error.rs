//! # Type Errors
//!
//! Problems found by the [`TypeTable`](super::TypeTable). Shape errors come
//! from the validity judgment; redefinition errors from registering a type
//! group. None of them aborts anything: callers report them and carry on.

use lachs::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidType {
    #[error("Invalid type: array of array")]
    ArrayOfArray,
    #[error("Invalid type: function returning array")]
    ArrayReturn,
    #[error("Invalid type: ref of array")]
    RefOfArray,
    #[error("Undefined type: {0}")]
    UndefinedType(String),
    #[error("Redefining builtin type {0}")]
    RedefinedBuiltin(String),
    #[error("Redefining user type {name}, previous definition at {}:{}", .previous.start.0 + 1, .previous.start.1 + 1)]
    RedefinedType { name: String, previous: Span },
    #[error("Redefining constructor {name}, previous definition at {}:{}", .previous.start.0 + 1, .previous.start.1 + 1)]
    RedefinedConstructor { name: String, previous: Span },
}

impl InvalidType {
    /// Whether this is one of the three structural exclusions.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            InvalidType::ArrayOfArray | InvalidType::ArrayReturn | InvalidType::RefOfArray
        )
    }
}

/// An [`InvalidType`] tied to the source that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{}: {kind}", .span.start.0 + 1, .span.start.1 + 1)]
pub struct TypeError {
    pub kind: InvalidType,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: InvalidType, span: Span) -> Self {
        Self { kind, span }
    }
}

