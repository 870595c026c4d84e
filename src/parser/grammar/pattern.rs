//! Pattern parsers
//!
//! ```text
//! pattern        := Conid simple_pattern* | simple_pattern
//! simple_pattern := "(" pattern ")" | "true" | "false" | char
//!                 | ["+" | "-"] int | ["+." | "-."] float
//!                 | genid | Conid
//! ```

use lachs::Span;

use crate::ast::{ConstPattern, ConstValue, ConstructorPattern, GenidPattern, Pattern};
use crate::lexer::{Token, TokenKind};

use crate::parser::combinators::{BoxedParser, expect};
use crate::parser::state::{ParseResult, ParseState, Parser};

use super::literal::{conid, constant, decode, genid};

/// Whether `kind` can begin a simple pattern.
pub fn starts_simple_pattern(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LParen
            | TokenKind::True
            | TokenKind::False
            | TokenKind::CharLiteral
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::FPlus
            | TokenKind::FMinus
            | TokenKind::Genid
            | TokenKind::Conid
    )
}

pub fn pattern() -> BoxedParser<Pattern> {
    BoxedParser::new(|state: &mut ParseState| state.nested(constructor_pattern))
}

fn constructor_pattern(state: &mut ParseState) -> ParseResult<Pattern> {
    if !state.at(TokenKind::Conid) {
        return simple_pattern().parse(state);
    }
    let (name, start) = conid().parse(state)?;
    let mut args = vec![];
    while state.peek_kind().is_some_and(starts_simple_pattern) {
        args.push(simple_pattern().parse(state)?);
    }
    let position = start.merge(&state.last_span());
    Ok(Pattern::Constructor(ConstructorPattern {
        id: state.fresh_id(),
        name,
        args,
        position,
    }))
}

fn simple_pattern() -> BoxedParser<Pattern> {
    BoxedParser::new(|state: &mut ParseState| match state.peek_kind() {
        Some(TokenKind::LParen) => {
            (expect(TokenKind::LParen) * pattern() - expect(TokenKind::RParen)).parse(state)
        }
        Some(TokenKind::Genid) => {
            let (name, position) = genid().parse(state)?;
            Ok(Pattern::Genid(GenidPattern {
                id: state.fresh_id(),
                name,
                position,
            }))
        }
        Some(TokenKind::Conid) => {
            let (name, position) = conid().parse(state)?;
            Ok(Pattern::Constructor(ConstructorPattern {
                id: state.fresh_id(),
                name,
                args: vec![],
                position,
            }))
        }
        Some(TokenKind::Plus | TokenKind::Minus) => signed(state, TokenKind::IntLiteral),
        Some(TokenKind::FPlus | TokenKind::FMinus) => signed(state, TokenKind::FloatLiteral),
        Some(
            TokenKind::True
            | TokenKind::False
            | TokenKind::CharLiteral
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral,
        ) => {
            let (value, position) = constant().parse(state)?;
            Ok(const_pattern(state, value, position))
        }
        _ => {
            let err = state.error_here().expected("pattern");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// A sign followed by a numeric literal of kind `literal`, folded into one
/// constant.
fn signed(state: &mut ParseState, literal: TokenKind) -> ParseResult<Pattern> {
    let Some(sign) = state.advance() else {
        return Err(state.error_here().expected("sign"));
    };
    let negative = matches!(sign.kind, TokenKind::Minus | TokenKind::FMinus);

    let err = state.error_here();
    let number = expect(literal).parse(state)?;
    let spelled = if negative {
        format!("-{}", number.value)
    } else {
        number.value.clone()
    };
    let folded = Token::new(literal, spelled, number.span.clone());
    match decode(&folded) {
        Ok(value) => {
            let position = sign.span.merge(&number.span);
            Ok(const_pattern(state, value, position))
        }
        Err(note) => {
            let err = err.note(note);
            state.record_error(err.clone());
            Err(err)
        }
    }
}

fn const_pattern(state: &mut ParseState, value: ConstValue, position: Span) -> Pattern {
    Pattern::Const(ConstPattern {
        id: state.fresh_id(),
        value,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_pattern(source: &str) -> Pattern {
        let mut state = ParseState::new(lex(source).unwrap());
        pattern().parse(&mut state).unwrap()
    }

    #[test]
    fn test_constructor_with_arguments() {
        let Pattern::Constructor(p) = parse_pattern("Node x (Leaf) -3") else {
            panic!("expected constructor pattern");
        };
        assert_eq!(p.name, "Node");
        assert_eq!(p.args.len(), 3);
        assert!(matches!(&p.args[1], Pattern::Constructor(c) if c.args.is_empty()));
        assert!(matches!(
            &p.args[2],
            Pattern::Const(ConstPattern { value: ConstValue::Int(-3), .. })
        ));
    }

    #[test]
    fn test_signed_float() {
        let pat = parse_pattern("-. 2.5");
        assert!(matches!(
            pat,
            Pattern::Const(ConstPattern { value: ConstValue::Float(x), .. }) if x == -2.5
        ));
    }

    #[test]
    fn test_nested_constructor_needs_parens() {
        let Pattern::Constructor(p) = parse_pattern("Cons (Cons h t) rest") else {
            panic!("expected constructor pattern");
        };
        assert_eq!(p.args.len(), 2);
        let bound: Vec<_> = Pattern::Constructor(p)
            .bindings()
            .into_iter()
            .map(|b| b.name.clone())
            .collect();
        assert_eq!(bound, vec!["h", "t", "rest"]);
    }

    #[test]
    fn test_sign_requires_matching_literal() {
        let mut state = ParseState::new(lex("- 2.0").unwrap());
        assert!(pattern().parse(&mut state).is_err());
    }
}
