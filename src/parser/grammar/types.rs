//! Type expressions
//!
//! ```text
//! type    := postfix ["->" type]
//! postfix := atom ("ref")*
//! atom    := "unit" | "int" | "char" | "bool" | "float" | genid
//!          | "(" type ")"
//!          | "array" ["[" "*" ("," "*")* "]"] "of" postfix
//! ```
//!
//! `ref` binds tightest, then `array of`, then the right-associative arrow.

use crate::lexer::TokenKind;
use crate::types::Type;

use crate::parser::combinators::{BoxedParser, expect};
use crate::parser::state::{ParseResult, ParseState, Parser};

use super::literal::genid;

/// Whether `kind` can begin a type.
pub fn starts_type(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Unit
            | TokenKind::Int
            | TokenKind::Char
            | TokenKind::Bool
            | TokenKind::Float
            | TokenKind::Genid
            | TokenKind::LParen
            | TokenKind::Array
    )
}

pub fn type_expr() -> BoxedParser<Type> {
    BoxedParser::new(|state: &mut ParseState| state.nested(arrow_type))
}

fn arrow_type(state: &mut ParseState) -> ParseResult<Type> {
    let from = postfix_type().parse(state)?;
    if state.at(TokenKind::Arrow) {
        expect(TokenKind::Arrow).parse(state)?;
        let to = type_expr().parse(state)?;
        return Ok(Type::func(from, to));
    }
    Ok(from)
}

fn postfix_type() -> BoxedParser<Type> {
    BoxedParser::new(|state: &mut ParseState| {
        let mut ty = atom().parse(state)?;
        while state.at(TokenKind::Ref) {
            expect(TokenKind::Ref).parse(state)?;
            ty = Type::reference(ty);
        }
        Ok(ty)
    })
}

fn atom() -> BoxedParser<Type> {
    BoxedParser::new(|state: &mut ParseState| {
        let ty = match state.peek_kind() {
            Some(TokenKind::Unit) => Type::Unit,
            Some(TokenKind::Int) => Type::Int,
            Some(TokenKind::Char) => Type::Char,
            Some(TokenKind::Bool) => Type::Bool,
            Some(TokenKind::Float) => Type::Float,
            Some(TokenKind::Genid) => {
                let (name, _) = genid().parse(state)?;
                return Ok(Type::builtin(&name).unwrap_or(Type::User(name)));
            }
            Some(TokenKind::LParen) => {
                let ty = (expect(TokenKind::LParen) * type_expr() - expect(TokenKind::RParen))
                    .parse(state)?;
                return Ok(ty);
            }
            Some(TokenKind::Array) => return array_type().parse(state),
            _ => {
                let err = state.error_here().expected("type");
                state.record_error(err.clone());
                return Err(err);
            }
        };
        state.advance();
        Ok(ty)
    })
}

/// `array [*, *] of τ`; without brackets the array has one dimension.
fn array_type() -> BoxedParser<Type> {
    BoxedParser::new(|state: &mut ParseState| state.nested(array_of))
}

fn array_of(state: &mut ParseState) -> ParseResult<Type> {
    expect(TokenKind::Array).parse(state)?;
    let mut dims = 1;
    if state.at(TokenKind::LBracket) {
        expect(TokenKind::LBracket).parse(state)?;
        expect(TokenKind::Times).parse(state)?;
        while state.at(TokenKind::Comma) {
            expect(TokenKind::Comma).parse(state)?;
            expect(TokenKind::Times).parse(state)?;
            dims += 1;
        }
        expect(TokenKind::RBracket).parse(state)?;
    }
    expect(TokenKind::Of).parse(state)?;
    let elem = postfix_type().parse(state)?;
    Ok(Type::array(elem, dims))
}
