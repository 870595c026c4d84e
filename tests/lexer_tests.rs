use llamac::lexer::{TokenKind, lex};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .expect("lexing failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("let rec x in int"),
        vec![
            TokenKind::Let,
            TokenKind::Rec,
            TokenKind::Genid,
            TokenKind::In,
            TokenKind::Int,
        ]
    );
}

#[test]
fn match_keyword() {
    assert_eq!(
        kinds("match x with matched -> 1"),
        vec![
            TokenKind::Match,
            TokenKind::Genid,
            TokenKind::With,
            TokenKind::Genid,
            TokenKind::Arrow,
            TokenKind::IntLiteral,
        ]
    );
}

#[test]
fn constructors_are_conids() {
    let tokens = lex("Node leaf").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Conid);
    assert_eq!(tokens[0].value, "Node");
    assert_eq!(tokens[1].kind, TokenKind::Genid);
}

#[test]
fn float_operators() {
    assert_eq!(
        kinds("a +. b -. c *. d /. e ** f"),
        vec![
            TokenKind::Genid,
            TokenKind::FPlus,
            TokenKind::Genid,
            TokenKind::FMinus,
            TokenKind::Genid,
            TokenKind::FTimes,
            TokenKind::Genid,
            TokenKind::FDivide,
            TokenKind::Genid,
            TokenKind::FPow,
            TokenKind::Genid,
        ]
    );
}

#[test]
fn comparison_operators() {
    assert_eq!(
        kinds("< <= > >= = <> == != :="),
        vec![
            TokenKind::Lt,
            TokenKind::Le,
            TokenKind::Gt,
            TokenKind::Ge,
            TokenKind::Equals,
            TokenKind::Neq,
            TokenKind::NatEq,
            TokenKind::NatNeq,
            TokenKind::Assign,
        ]
    );
}

#[test]
fn literals() {
    let tokens = lex(r#"42 3.14 1.0e-3 'a' '\n' "hello\n""#).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::IntLiteral,
            TokenKind::FloatLiteral,
            TokenKind::FloatLiteral,
            TokenKind::CharLiteral,
            TokenKind::CharLiteral,
            TokenKind::StringLiteral,
        ]
    );
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[5].value, r#""hello\n""#);
}

#[test]
fn positions_are_one_based() {
    let tokens = lex("let x =\n  42").unwrap();
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
    assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
}

#[test]
fn array_type_tokens() {
    assert_eq!(
        kinds("array [*, *] of int ref"),
        vec![
            TokenKind::Array,
            TokenKind::LBracket,
            TokenKind::Times,
            TokenKind::Comma,
            TokenKind::Times,
            TokenKind::RBracket,
            TokenKind::Of,
            TokenKind::Int,
            TokenKind::Ref,
        ]
    );
}
