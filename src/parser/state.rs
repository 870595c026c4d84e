use std::fmt;

use lachs::Span;

use crate::ast::{NodeId, TypeDefGroup};
use crate::lexer::{Token, TokenKind};
use crate::types::{TypeError, TypeTable};

/// A malformed token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The offending token, `None` at end of input.
    pub found: Option<Token>,
    /// What would have been accepted instead.
    pub expected: Vec<String>,
    /// Extra detail, e.g. for a literal that does not decode.
    pub note: Option<String>,
    /// Index of the offending token in the stream.
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(index: usize, line: usize, column: usize) -> Self {
        Self {
            found: None,
            expected: vec![],
            note: None,
            index,
            line,
            column,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected.push(expected.into());
        self
    }

    pub fn found(mut self, token: Token) -> Self {
        self.found = Some(token);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn merge_expected(&mut self, other: &ParseError) {
        for expected in &other.expected {
            if !self.expected.contains(expected) {
                self.expected.push(expected.clone());
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(token) => write!(
                f,
                "{}:{}: syntax error on token {} '{}'",
                self.line,
                self.column,
                token.kind.name(),
                token.value
            )?,
            None => write!(
                f,
                "{}:{}: syntax error at end of input",
                self.line, self.column
            )?,
        }
        if let Some(note) = &self.note {
            write!(f, ": {note}")?;
        }
        if !self.expected.is_empty() {
            write!(f, " (expected {})", self.expected.join(" or "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest expression, type or pattern nesting the parser accepts.
pub const MAX_NESTING: usize = 256;

/// Something the parser has to report, in the order it was found.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Syntax(ParseError),
    Type(TypeError),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Syntax(err) => write!(f, "{err}"),
            Report::Type(err) => write!(f, "{err}"),
        }
    }
}

pub struct ParseState {
    tokens: Vec<Token>,
    index: usize,
    next_id: u32,
    furthest: Option<ParseError>,
    reports: Vec<Report>,
    types: TypeTable,
    depth: usize,
}

impl ParseState {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            next_id: 0,
            furthest: None,
            reports: vec![],
            types: TypeTable::new(),
            depth: 0,
        }
    }

    pub fn advance(&mut self) -> Option<Token> {
        if self.has_next() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    /// Kind of the token `offset` places ahead of the current one.
    pub fn peek_nth(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.index + offset).map(|token| token.kind)
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    /// Span of the most recently consumed token.
    pub fn last_span(&self) -> Span {
        self.index
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(Token::pos)
            .unwrap_or_default()
    }

    pub fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn node_count(&self) -> u32 {
        self.next_id
    }

    /// Run `parse` one nesting level down.
    ///
    /// Past [`MAX_NESTING`] levels this is a syntax error at the current
    /// token instead.
    pub fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            let err = self
                .error_here()
                .note(format!("nesting deeper than {MAX_NESTING} levels"));
            self.record_error(err.clone());
            return Err(err);
        }
        self.depth += 1;
        let result = parse(&mut *self);
        self.depth -= 1;
        result
    }

    /// An error positioned at the current token.
    pub fn error_here(&self) -> ParseError {
        match self.peek() {
            Some(token) => {
                ParseError::new(self.index, token.line, token.column).found(token.clone())
            }
            None => {
                let (line, column) = self
                    .tokens
                    .last()
                    .map(|last| (last.span.end.0 + 1, last.span.end.1 + 1))
                    .unwrap_or((1, 1));
                ParseError::new(self.index, line, column)
            }
        }
    }

    /// Remember `err` if it is at least as far into the input as any error
    /// recorded since the last commit.
    pub fn record_error(&mut self, err: ParseError) {
        match &mut self.furthest {
            Some(furthest) if furthest.index > err.index => {}
            Some(furthest) if furthest.index == err.index => {
                furthest.merge_expected(&err);
                if furthest.note.is_none() {
                    furthest.note = err.note;
                }
            }
            slot => *slot = Some(err),
        }
    }

    pub fn get_furthest_error(&self) -> Option<&ParseError> {
        self.furthest.as_ref()
    }

    pub fn clear_furthest_error(&mut self) {
        self.furthest = None;
    }

    /// Report the furthest recorded error and forget it.
    pub fn commit_furthest_error(&mut self) -> Option<usize> {
        let err = self.furthest.take()?;
        let index = err.index;
        self.collect_error(err);
        Some(index)
    }

    pub fn collect_error(&mut self, err: ParseError) {
        tracing::debug!(error = %err, "syntax error");
        self.reports.push(Report::Syntax(err));
    }

    pub fn syntax_errors(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| matches!(report, Report::Syntax(_)))
            .count()
    }

    /// Hand a complete type-definition group to the type table.
    pub fn register_types(&mut self, group: &TypeDefGroup) {
        if let Err(errors) = self.types.process(group) {
            self.reports.extend(errors.into_iter().map(Report::Type));
        }
    }

    pub fn take_reports(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }

    pub fn into_types(self) -> TypeTable {
        self.types
    }
}

pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<Token> {
        vec![
            Token::terminal(TokenKind::Let, 1, 1),
            Token::at(TokenKind::Genid, "x", 1, 5),
            Token::terminal(TokenKind::Equals, 1, 7),
        ]
    }

    #[test]
    fn test_furthest_error_wins() {
        let mut state = ParseState::new(tokens());
        state.advance();
        state.advance();
        let far = state.error_here().expected("'('");
        state.restore(0);
        let near = state.error_here().expected("'type'");
        state.record_error(far);
        state.record_error(near);
        assert_eq!(state.get_furthest_error().unwrap().index, 2);
    }

    #[test]
    fn test_same_index_merges_expected() {
        let mut state = ParseState::new(tokens());
        state.record_error(state.error_here().expected("'let'"));
        state.record_error(state.error_here().expected("'type'"));
        let err = state.get_furthest_error().unwrap();
        assert_eq!(err.expected, vec!["'let'", "'type'"]);
    }

    #[test]
    fn test_error_display() {
        let state = ParseState::new(tokens());
        let err = state.error_here();
        assert_eq!(err.to_string(), "1:1: syntax error on token LET 'let'");
    }

    #[test]
    fn test_end_of_input_position() {
        let mut state = ParseState::new(tokens());
        while state.advance().is_some() {}
        let err = state.error_here();
        assert!(err.found.is_none());
        assert_eq!((err.line, err.column), (1, 8));
    }

    #[test]
    fn test_nesting_limit() {
        fn descend(state: &mut ParseState, levels: usize) -> ParseResult<usize> {
            if levels == 0 {
                return Ok(0);
            }
            state.nested(|state| descend(state, levels - 1).map(|depth| depth + 1))
        }

        let mut state = ParseState::new(tokens());
        assert_eq!(descend(&mut state, MAX_NESTING), Ok(MAX_NESTING));
        assert_eq!(descend(&mut state, MAX_NESTING), Ok(MAX_NESTING));

        let err = descend(&mut state, MAX_NESTING + 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "1:1: syntax error on token LET 'let': nesting deeper than 256 levels"
        );
        assert!(state.get_furthest_error().is_some());
    }

    #[test]
    fn test_fresh_ids_are_dense() {
        let mut state = ParseState::new(vec![]);
        assert_eq!(state.fresh_id(), NodeId(0));
        assert_eq!(state.fresh_id(), NodeId(1));
        assert_eq!(state.node_count(), 2);
    }
}
