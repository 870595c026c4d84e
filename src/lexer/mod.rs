//! # Lexer
//!
//! Tokenization is generated by `lachs`: [`Lexeme`] lists every terminal and
//! literal class of the language. The parser never sees lachs tokens
//! directly; [`lex`] lowers them into plain [`Token`] records carrying
//! `(kind, value, line, column)`, so any token source producing the same
//! records can drive the parser.
//!
//! Comments are not part of the token grammar. [`strip_comments`] blanks
//! them out beforehand while keeping every newline, so positions reported
//! for the remaining tokens still match the original text.

use std::fmt;
use std::sync::LazyLock;

use lachs::Span;
use regex::Regex;

mod lexeme;

pub use lexeme::Lexeme;

/// The terminal set seen by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    And,
    Array,
    Begin,
    Bool,
    Char,
    Delete,
    Dim,
    Do,
    Done,
    Downto,
    Else,
    End,
    False,
    Float,
    For,
    If,
    In,
    Int,
    Let,
    Match,
    Mod,
    Mutable,
    New,
    Not,
    Of,
    Rec,
    Ref,
    Then,
    To,
    True,
    Type,
    Unit,
    While,
    With,
    Arrow,
    Equals,
    Pipe,
    Plus,
    Minus,
    Times,
    Divide,
    FPlus,
    FMinus,
    FTimes,
    FDivide,
    FPow,
    Bang,
    Semicolon,
    BAnd,
    BOr,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    NatEq,
    NatNeq,
    Assign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Genid,
    Conid,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
}

impl TokenKind {
    /// Source spelling of a terminal, `None` for literal classes.
    pub fn text(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::And => "and",
            TokenKind::Array => "array",
            TokenKind::Begin => "begin",
            TokenKind::Bool => "bool",
            TokenKind::Char => "char",
            TokenKind::Delete => "delete",
            TokenKind::Dim => "dim",
            TokenKind::Do => "do",
            TokenKind::Done => "done",
            TokenKind::Downto => "downto",
            TokenKind::Else => "else",
            TokenKind::End => "end",
            TokenKind::False => "false",
            TokenKind::Float => "float",
            TokenKind::For => "for",
            TokenKind::If => "if",
            TokenKind::In => "in",
            TokenKind::Int => "int",
            TokenKind::Let => "let",
            TokenKind::Match => "match",
            TokenKind::Mod => "mod",
            TokenKind::Mutable => "mutable",
            TokenKind::New => "new",
            TokenKind::Not => "not",
            TokenKind::Of => "of",
            TokenKind::Rec => "rec",
            TokenKind::Ref => "ref",
            TokenKind::Then => "then",
            TokenKind::To => "to",
            TokenKind::True => "true",
            TokenKind::Type => "type",
            TokenKind::Unit => "unit",
            TokenKind::While => "while",
            TokenKind::With => "with",
            TokenKind::Arrow => "->",
            TokenKind::Equals => "=",
            TokenKind::Pipe => "|",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Divide => "/",
            TokenKind::FPlus => "+.",
            TokenKind::FMinus => "-.",
            TokenKind::FTimes => "*.",
            TokenKind::FDivide => "/.",
            TokenKind::FPow => "**",
            TokenKind::Bang => "!",
            TokenKind::Semicolon => ";",
            TokenKind::BAnd => "&&",
            TokenKind::BOr => "||",
            TokenKind::Neq => "<>",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::NatEq => "==",
            TokenKind::NatNeq => "!=",
            TokenKind::Assign => ":=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Genid
            | TokenKind::Conid
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral => {
                return None;
            }
        };
        Some(text)
    }

    /// Upper-case terminal name used in syntax diagnostics (`LET`, `GENID`, ...).
    pub fn name(self) -> String {
        let debug = format!("{self:?}");
        let mut name = String::with_capacity(debug.len() + 4);
        for (i, c) in debug.chars().enumerate() {
            if i > 0 && c.is_uppercase() {
                name.push('_');
            }
            name.push(c.to_ascii_uppercase());
        }
        name
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "'{text}'"),
            None => f.write_str(&self.name().to_lowercase().replace('_', " ")),
        }
    }
}

/// One token as consumed by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            line: span.start.0 + 1,
            column: span.start.1 + 1,
            span,
        }
    }

    /// Token built without source text, positioned at `line:column`.
    pub fn at(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        let value = value.into();
        let start = (line.saturating_sub(1), column.saturating_sub(1));
        let end = (start.0, start.1 + value.chars().count());
        Self {
            kind,
            value,
            line,
            column,
            span: Span {
                start,
                end,
                source: String::new(),
            },
        }
    }

    /// Terminal token whose value is its own spelling.
    pub fn terminal(kind: TokenKind, line: usize, column: usize) -> Self {
        Self::at(kind, kind.text().unwrap_or_default(), line, column)
    }

    pub fn pos(&self) -> Span {
        self.span.clone()
    }
}

macro_rules! lower_lexeme {
    (
        $lexeme:expr;
        terminals: $($terminal:ident),* ;
        renamed: $($lachs:ident => $kind:ident),* ;
        literals: $($literal:ident),* $(;)?
    ) => {
        match $lexeme {
            $(Lexeme::$terminal(inner) => Token::new(
                TokenKind::$terminal,
                TokenKind::$terminal.text().unwrap_or_default(),
                inner.position,
            ),)*
            $(Lexeme::$lachs(inner) => Token::new(
                TokenKind::$kind,
                TokenKind::$kind.text().unwrap_or_default(),
                inner.position,
            ),)*
            $(Lexeme::$literal(inner) => Token::new(TokenKind::$literal, inner.value, inner.position),)*
        }
    };
}

impl From<Lexeme> for Token {
    fn from(lexeme: Lexeme) -> Self {
        lower_lexeme!(lexeme;
            terminals: And, Array, Begin, Bool, Char, Delete, Dim, Do, Done, Downto, Else, End,
                False, Float, For, If, In, Int, Let, Mod, Mutable, New, Not, Of, Rec, Ref,
                Then, To, True, Type, Unit, While, With, Arrow, Equals, Pipe, Plus, Minus, Times,
                Divide, FPlus, FMinus, FTimes, FDivide, FPow, Bang, Semicolon, BAnd, BOr, Neq, Lt,
                Gt, Le, Ge, NatEq, NatNeq, Assign, LParen, RParen, LBracket, RBracket, Comma,
                Colon;
            renamed: KwMatch => Match;
            literals: Genid, Conid, IntLiteral, FloatLiteral, CharLiteral, StringLiteral;
        )
    }
}

/// Strip comments and tokenize `source`.
pub fn lex(source: &str) -> anyhow::Result<Vec<Token>> {
    let stripped = strip_comments(source);
    let lexemes = Lexeme::lex(&stripped).map_err(|err| anyhow::anyhow!("{err}"))?;
    Ok(lexemes.into_iter().map(Token::from).collect())
}

/// Replace `-- line` and nestable `(* block *)` comments with spaces.
///
/// Newlines inside block comments are kept. Comment markers inside char and
/// string literals are left alone. An unterminated block comment runs to the
/// end of the input.
pub fn strip_comments(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if depth > 0 {
            match (c, next) {
                ('(', Some('*')) => {
                    depth += 1;
                    out.push_str("  ");
                    i += 2;
                }
                ('*', Some(')')) => {
                    depth -= 1;
                    out.push_str("  ");
                    i += 2;
                }
                ('\n', _) => {
                    out.push('\n');
                    i += 1;
                }
                _ => {
                    out.push(' ');
                    i += 1;
                }
            }
            continue;
        }

        match (c, next) {
            ('(', Some('*')) => {
                depth = 1;
                out.push_str("  ");
                i += 2;
            }
            ('-', Some('-')) => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(' ');
                    i += 1;
                }
            }
            ('"', _) | ('\'', _) if c == '"' || is_char_literal_start(&chars, i) => {
                let quote = c;
                out.push(c);
                i += 1;
                while i < chars.len() && chars[i] != quote && chars[i] != '\n' {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i]);
                        i += 1;
                    }
                    out.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() && chars[i] == quote {
                    out.push(quote);
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// A `'` opens a char literal unless it continues an identifier (`x'`).
fn is_char_literal_start(chars: &[char], i: usize) -> bool {
    match i.checked_sub(1).map(|prev| chars[prev]) {
        Some(prev) => !(prev.is_alphanumeric() || prev == '_' || prev == '\''),
        None => true,
    }
}

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(x[0-9a-fA-F]{2}|.)").unwrap_or_else(|err| unreachable!("escape regex: {err}"))
});

/// Decode the escapes of a quoted literal body (without the quotes).
fn decode_escapes(body: &str) -> Option<String> {
    let mut valid = true;
    let decoded = ESCAPE.replace_all(body, |caps: &regex::Captures| {
        let escape = &caps[1];
        let c = match escape {
            "n" => '\n',
            "t" => '\t',
            "r" => '\r',
            "0" => '\0',
            "\\" => '\\',
            "'" => '\'',
            "\"" => '"',
            hex if hex.starts_with('x') => u8::from_str_radix(&hex[1..], 16)
                .map(char::from)
                .unwrap_or_else(|_| {
                    valid = false;
                    '?'
                }),
            _ => {
                valid = false;
                '?'
            }
        };
        c.to_string()
    });
    valid.then(|| decoded.into_owned())
}

/// Decode a char literal token value such as `'a'` or `'\n'`.
pub fn decode_char(literal: &str) -> Option<char> {
    let body = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let decoded = decode_escapes(body)?;
    let mut chars = decoded.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Decode a string literal token value such as `"hi\n"`.
pub fn decode_string(literal: &str) -> Option<String> {
    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    decode_escapes(body)
}
