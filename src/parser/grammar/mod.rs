//! Grammar module for the Llama language
//!
//! This module contains all the parsing rules organized by category:
//! - `literal`: identifiers and constants
//! - `types`: type expressions
//! - `pattern`: patterns of `match` clauses
//! - `precedence`: the operator table
//! - `expression`: every expression form
//!
//! Definitions (let-groups and type-groups) and the program itself live
//! here, together with error recovery.

mod expression;
mod literal;
mod pattern;
mod precedence;
mod types;

use crate::ast::{
    ArrayVariableDef, ConstantDef, Constructor, Def, Definition, FunctionDef, LetDef, Param,
    Program, TDef, TypeDefGroup, VariableDef,
};
use crate::lexer::TokenKind;

use super::combinators::{BoxedParser, expect, optional};
use super::state::{ParseResult, ParseState, Parser};

pub use expression::expr;
use expression::expr_list;
use literal::{conid, genid, type_name};
use types::{starts_type, type_expr};

/// `: τ`
fn annotation() -> BoxedParser<Option<crate::types::Type>> {
    optional(expect(TokenKind::Colon) * type_expr())
}

/// `x` or `(x : τ)`
fn param() -> BoxedParser<Param> {
    BoxedParser::new(|state: &mut ParseState| {
        if state.at(TokenKind::Genid) {
            let (name, position) = genid().parse(state)?;
            return Ok(Param {
                id: state.fresh_id(),
                name,
                ty: None,
                position,
            });
        }

        let start = expect(TokenKind::LParen).label("parameter").parse(state)?.span;
        let (name, _) = genid().parse(state)?;
        let ty = (expect(TokenKind::Colon) * type_expr()).parse(state)?;
        let end = expect(TokenKind::RParen).parse(state)?.span;
        Ok(Param {
            id: state.fresh_id(),
            name,
            ty: Some(ty),
            position: start.merge(&end),
        })
    })
}

/// `mutable x [: τ]` or `mutable a [e1, .., en] [: τ]`
fn variable_def(state: &mut ParseState) -> ParseResult<Def> {
    let start = expect(TokenKind::Mutable).parse(state)?.span;
    let (name, _) = genid().parse(state)?;
    let dims = if state.at(TokenKind::LBracket) {
        Some((expect(TokenKind::LBracket) * expr_list() - expect(TokenKind::RBracket)).parse(state)?)
    } else {
        None
    };
    let ty = annotation().parse(state)?;
    let position = start.merge(&state.last_span());
    let id = state.fresh_id();

    Ok(match dims {
        Some(dims) => Def::ArrayVariable(ArrayVariableDef {
            id,
            name,
            dims,
            ty,
            position,
        }),
        None => Def::Variable(VariableDef {
            id,
            name,
            ty,
            position,
        }),
    })
}

/// `f p1 .. pn [: τ] = e`; without parameters this is a constant.
fn function_def(state: &mut ParseState) -> ParseResult<Def> {
    let (name, start) = genid().label("definition").parse(state)?;
    let mut params = vec![];
    while matches!(
        state.peek_kind(),
        Some(TokenKind::Genid | TokenKind::LParen)
    ) {
        params.push(param().parse(state)?);
    }
    let ty = annotation().parse(state)?;
    let body = (expect(TokenKind::Equals) * expr()).parse(state)?;
    let position = start.merge(body.position());
    let id = state.fresh_id();

    Ok(if params.is_empty() {
        Def::Constant(ConstantDef {
            id,
            name,
            ty,
            body,
            position,
        })
    } else {
        Def::Function(FunctionDef {
            id,
            name,
            params,
            ret: ty,
            body,
            position,
        })
    })
}

fn def() -> BoxedParser<Def> {
    BoxedParser::new(|state: &mut ParseState| {
        if state.at(TokenKind::Mutable) {
            variable_def(state)
        } else {
            function_def(state)
        }
    })
}

/// `let [rec] d1 and d2 ..`
pub fn letdef() -> BoxedParser<LetDef> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect(TokenKind::Let).parse(state)?.span;
        let is_rec = optional(expect(TokenKind::Rec)).parse(state)?.is_some();
        let mut defs = vec![def().parse(state)?];
        while state.at(TokenKind::And) {
            expect(TokenKind::And).parse(state)?;
            defs.push(def().parse(state)?);
        }
        let position = start.merge(&state.last_span());
        Ok(LetDef {
            id: state.fresh_id(),
            is_rec,
            defs,
            position,
        })
    })
}

/// `C [of τ1 .. τn]`
fn constructor() -> BoxedParser<Constructor> {
    BoxedParser::new(|state: &mut ParseState| {
        let (name, start) = conid().parse(state)?;
        let mut args = vec![];
        if state.at(TokenKind::Of) {
            expect(TokenKind::Of).parse(state)?;
            args.push(type_expr().parse(state)?);
            while state.peek_kind().is_some_and(starts_type) {
                args.push(type_expr().parse(state)?);
            }
        }
        let position = start.merge(&state.last_span());
        Ok(Constructor {
            id: state.fresh_id(),
            name,
            args,
            position,
        })
    })
}

/// `t = C1 | C2 ..`
fn tdef() -> BoxedParser<TDef> {
    BoxedParser::new(|state: &mut ParseState| {
        let (name, start) = type_name().parse(state)?;
        expect(TokenKind::Equals).parse(state)?;
        let mut constructors = vec![constructor().parse(state)?];
        while state.at(TokenKind::Pipe) {
            expect(TokenKind::Pipe).parse(state)?;
            constructors.push(constructor().parse(state)?);
        }
        let position = start.merge(&state.last_span());
        Ok(TDef {
            id: state.fresh_id(),
            name,
            constructors,
            position,
        })
    })
}

/// `type t1 = .. and t2 = ..`
///
/// The group is handed to the type table as soon as it is complete, so
/// later definitions can already refer to its types.
pub fn typedef() -> BoxedParser<TypeDefGroup> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect(TokenKind::Type).parse(state)?.span;
        let mut tdefs = vec![tdef().parse(state)?];
        while state.at(TokenKind::And) {
            expect(TokenKind::And).parse(state)?;
            tdefs.push(tdef().parse(state)?);
        }
        let group = TypeDefGroup {
            id: state.fresh_id(),
            tdefs,
            position: start.merge(&state.last_span()),
        };
        state.register_types(&group);
        Ok(group)
    })
}

fn definition() -> BoxedParser<Definition> {
    BoxedParser::new(|state: &mut ParseState| match state.peek_kind() {
        Some(TokenKind::Type) => typedef().parse(state).map(Definition::Types),
        Some(TokenKind::Let) => letdef().parse(state).map(Definition::Let),
        _ => {
            let err = state
                .error_here()
                .expected(TokenKind::Let.to_string())
                .expected(TokenKind::Type.to_string());
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Skip tokens until the next `let` or `type`, or end of input.
fn skip_to_next_definition(state: &mut ParseState) {
    while let Some(kind) = state.peek_kind() {
        if matches!(kind, TokenKind::Let | TokenKind::Type) {
            break;
        }
        state.advance();
    }
}

/// program := (letdef | typedef)*
///
/// With error recovery: a definition that fails to parse is reported at
/// the furthest point reached, and parsing resumes at the next `let` or
/// `type` after it.
pub fn program() -> BoxedParser<Vec<Definition>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut definitions = vec![];

        while state.has_next() {
            state.clear_furthest_error();
            let pos = state.position();
            match definition().parse(state) {
                Ok(def) => definitions.push(def),
                Err(err) => {
                    if state.get_furthest_error().is_none() {
                        state.record_error(err);
                    }
                    let furthest = state.commit_furthest_error().unwrap_or(pos);
                    state.restore(furthest.max(pos + 1));
                    skip_to_next_definition(state);
                }
            }
        }

        Ok(definitions)
    })
}

/// Parse a complete program from the token stream.
///
/// Any syntax error leaves the program unbuilt; the errors themselves are
/// kept in the state's reports.
pub fn parse(state: &mut ParseState) -> Option<Program> {
    let definitions = program().parse(state).ok()?;
    if state.syntax_errors() > 0 {
        return None;
    }
    Some(Program {
        definitions,
        node_count: state.node_count(),
    })
}
