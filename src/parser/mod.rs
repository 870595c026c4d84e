//! # Parser
//!
//! Combinator-based recursive descent over the token stream. Type
//! definitions are registered with the type table as soon as a group is
//! parsed, so a bad type definition is reported in source order together
//! with the syntax errors around it.

mod combinators;
mod grammar;
mod state;

pub use combinators::*;
pub use grammar::{expr, letdef, typedef};
pub use state::{MAX_NESTING, ParseError, ParseResult, ParseState, Parser, Report};

use crate::ast::Program;
use crate::diagnostics::DiagnosticSink;
use crate::lexer::Token;
use crate::types::TypeTable;

/// Everything the parser produces for one compilation unit.
#[derive(Debug)]
pub struct Parsed {
    /// `None` if any syntax error occurred.
    pub program: Option<Program>,
    /// Builtin types plus every type group registered while parsing.
    pub types: TypeTable,
    pub errors: Vec<ParseError>,
}

/// Parse `tokens`, reporting every syntax and type-definition error to
/// `sink` in the order it was found.
///
/// The parser recurses once per nesting level, up to [`MAX_NESTING`]
/// levels, on the calling thread's stack. [`crate::compile`] runs it on a
/// thread with a stack sized for that.
pub fn parse(tokens: Vec<Token>, sink: &mut dyn DiagnosticSink) -> Parsed {
    let mut state = ParseState::new(tokens);
    let program = grammar::parse(&mut state);

    let mut errors = vec![];
    for report in state.take_reports() {
        sink.error(format_args!("{report}"));
        if let Report::Syntax(err) = report {
            errors.push(err);
        }
    }
    tracing::debug!(
        syntax_errors = errors.len(),
        parsed = program.is_some(),
        "parse finished"
    );

    Parsed {
        program,
        types: state.into_types(),
        errors,
    }
}
