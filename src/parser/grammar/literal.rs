//! Literal parsers for the Llama language

use lachs::Span;

use crate::ast::ConstValue;
use crate::lexer::{Token, TokenKind, decode_char, decode_string};

use crate::parser::combinators::{BoxedParser, expect, expect_one_of};
use crate::parser::state::{ParseState, Parser};

/// Parse a lowercase identifier, returning its name and position
pub fn genid() -> BoxedParser<(String, Span)> {
    expect(TokenKind::Genid).label("identifier") >> |tok: Token| (tok.value, tok.span)
}

/// Parse an uppercase identifier (constructor name)
pub fn conid() -> BoxedParser<(String, Span)> {
    expect(TokenKind::Conid).label("constructor") >> |tok: Token| (tok.value, tok.span)
}

/// The name being defined by a type definition.
///
/// Builtin keywords are accepted here so that `type int = ..` reaches the
/// type table and is reported as a builtin redefinition.
pub fn type_name() -> BoxedParser<(String, Span)> {
    const NAMES: &[TokenKind] = &[
        TokenKind::Genid,
        TokenKind::Int,
        TokenKind::Bool,
        TokenKind::Char,
        TokenKind::Float,
        TokenKind::Unit,
    ];
    expect_one_of(NAMES, "type name") >> |tok: Token| (tok.value, tok.span)
}

/// Whether `kind` begins a literal constant.
pub fn starts_constant(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::True
            | TokenKind::False
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral
    )
}

/// Parse one literal token into its value.
///
/// A literal that the lexer accepted but that does not decode (an integer
/// out of range, an unknown escape) is a syntax error at that token.
pub fn constant() -> BoxedParser<(ConstValue, Span)> {
    BoxedParser::new(|state: &mut ParseState| {
        let err = state.error_here().expected("constant");
        let Some(kind) = state.peek_kind().filter(|kind| starts_constant(*kind)) else {
            state.record_error(err.clone());
            return Err(err);
        };
        let tok = expect(kind).parse(state)?;

        match decode(&tok) {
            Ok(value) => Ok((value, tok.span)),
            Err(note) => {
                let err = err.note(note);
                state.record_error(err.clone());
                Err(err)
            }
        }
    })
}

/// Decode the value of a literal token.
pub fn decode(tok: &Token) -> Result<ConstValue, &'static str> {
    match tok.kind {
        TokenKind::True => Ok(ConstValue::Bool(true)),
        TokenKind::False => Ok(ConstValue::Bool(false)),
        TokenKind::IntLiteral => tok
            .value
            .parse()
            .map(ConstValue::Int)
            .map_err(|_| "integer literal out of range"),
        TokenKind::FloatLiteral => tok
            .value
            .parse()
            .map(ConstValue::Float)
            .map_err(|_| "malformed float literal"),
        TokenKind::CharLiteral => decode_char(&tok.value)
            .map(ConstValue::Char)
            .ok_or("malformed character literal"),
        TokenKind::StringLiteral => decode_string(&tok.value)
            .map(ConstValue::String)
            .ok_or("malformed string literal"),
        _ => Err("not a literal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_literals() {
        let int = Token::at(TokenKind::IntLiteral, "42", 1, 1);
        assert_eq!(decode(&int), Ok(ConstValue::Int(42)));

        let float = Token::at(TokenKind::FloatLiteral, "2.5e1", 1, 1);
        assert_eq!(decode(&float), Ok(ConstValue::Float(25.0)));

        let chr = Token::at(TokenKind::CharLiteral, r"'\t'", 1, 1);
        assert_eq!(decode(&chr), Ok(ConstValue::Char('\t')));
    }

    #[test]
    fn test_integer_out_of_range() {
        let int = Token::at(TokenKind::IntLiteral, "99999999999999999999", 1, 1);
        assert_eq!(decode(&int), Err("integer literal out of range"));
    }

    #[test]
    fn test_constant_reports_bad_literal() {
        let mut state = ParseState::new(vec![Token::at(
            TokenKind::CharLiteral,
            r"'\q'",
            2,
            3,
        )]);
        let err = constant().parse(&mut state).unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
        assert_eq!(err.note.as_deref(), Some("malformed character literal"));
    }
}
