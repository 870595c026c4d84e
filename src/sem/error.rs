use lachs::Span;
use thiserror::Error;

use crate::ast::location;
use crate::types::InvalidType;

/// Problems found while walking the program. All of them are recorded to
/// the diagnostic sink; none stops the walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("{}: Unknown identifier: {name}", location(.position))]
    UnknownIdentifier { name: String, position: Span },

    #[error("{}: Unknown constructor: {name}", location(.position))]
    UnknownConstructor { name: String, position: Span },

    #[error(
        "{}: Constructor {name} expects {expected} argument(s), found {found}",
        location(.position)
    )]
    ConstructorArity {
        name: String,
        expected: usize,
        found: usize,
        position: Span,
    },

    #[error("{}: Dimension {dimension} of {name} is out of range", location(.position))]
    DimensionOutOfRange {
        name: String,
        dimension: i64,
        position: Span,
    },

    #[error("{}: {kind} (type of {name})", location(.position))]
    InvalidType {
        kind: InvalidType,
        name: String,
        position: Span,
    },
}

impl SemanticError {
    pub fn position(&self) -> &Span {
        match self {
            SemanticError::UnknownIdentifier { position, .. }
            | SemanticError::UnknownConstructor { position, .. }
            | SemanticError::ConstructorArity { position, .. }
            | SemanticError::DimensionOutOfRange { position, .. }
            | SemanticError::InvalidType { position, .. } => position,
        }
    }
}
