//! The handful of combinators the grammar is written with.
//!
//! `a * b` keeps what `b` produced, `a - b` keeps what `a` produced and
//! `a >> f` maps the result. Everything that needs more control than that
//! is a plain function over [`ParseState`].

use std::ops::{Mul, Shr, Sub};
use std::rc::Rc;

use crate::lexer::{Token, TokenKind};

use super::state::{ParseResult, ParseState, Parser};

type ParserFn<T> = Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>;

/// A type-erased, cheaply clonable parser.
pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }

    /// Run `self`, then `next`, and keep the first result.
    pub fn skip<U: 'static>(self, next: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let kept = self.parse(state)?;
            next.parse(state)?;
            Ok(kept)
        })
    }

    /// Run `self`, then `next`, and keep the second result.
    pub fn then<U: 'static>(self, next: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            self.parse(state)?;
            next.parse(state)
        })
    }

    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| self.parse(state).map(&f))
    }

    /// Replace whatever the inner parser expected with `name`.
    pub fn label(self, name: &'static str) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            self.parse(state).map_err(|mut err| {
                err.expected = vec![name.to_string()];
                state.record_error(err.clone());
                err
            })
        })
    }
}

impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.then(rhs)
    }
}

impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

/// One token satisfying `accepts`; otherwise an error expecting `expected`.
fn token_where<F: Fn(TokenKind) -> bool + 'static>(
    accepts: F,
    expected: String,
) -> BoxedParser<Token> {
    BoxedParser::new(move |state: &mut ParseState| {
        match state.peek_kind() {
            Some(kind) if accepts(kind) => {
                if let Some(token) = state.advance() {
                    return Ok(token);
                }
            }
            _ => {}
        }
        let err = state.error_here().expected(expected.clone());
        state.record_error(err.clone());
        Err(err)
    })
}

/// Consume one token of the given kind.
pub fn expect(kind: TokenKind) -> BoxedParser<Token> {
    token_where(move |found| found == kind, kind.to_string())
}

/// Consume one token of any of the given kinds.
pub fn expect_one_of(kinds: &'static [TokenKind], expected: &'static str) -> BoxedParser<Token> {
    token_where(move |found| kinds.contains(&found), expected.to_string())
}

/// Zero or one `parser`; a failure rewinds to where it started.
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.restore(start);
                Ok(None)
            }
        }
    })
}
