//! Expression parsers for the Llama language
//!
//! Binary and prefix operators are parsed by precedence climbing over the
//! table in [`super::precedence`]. Everything else is dispatched on the
//! first token.

use lachs::Span;

use crate::ast::{
    ArrayAccess, Binary, Clause, Const, ConstValue, Conid, ConstructorCall, Delete, Dim, Expression,
    For, FunctionCall, Genid, If, LetIn, Match, New, Unary, UnaryOp, While,
};
use crate::lexer::TokenKind;

use crate::parser::combinators::{BoxedParser, expect, expect_one_of};
use crate::parser::state::{ParseResult, ParseState, Parser};

use super::letdef;
use super::literal::{conid, constant, decode, genid, starts_constant};
use super::pattern::pattern;
use super::precedence::{self, Assoc, SEQUENCE};
use super::types::type_expr;

/// A full expression, `;` sequences included.
pub fn expr() -> BoxedParser<Expression> {
    expr_at(SEQUENCE)
}

/// An expression whose binary operators bind at least as tightly as `level`.
pub fn expr_at(level: usize) -> BoxedParser<Expression> {
    BoxedParser::new(move |state: &mut ParseState| parse_expr(state, level))
}

/// Whether `kind` can begin a simple expression, i.e. a function argument.
pub fn starts_simple_expr(kind: TokenKind) -> bool {
    starts_constant(kind)
        || matches!(
            kind,
            TokenKind::Genid | TokenKind::Conid | TokenKind::LParen | TokenKind::Bang
        )
}

fn parse_expr(state: &mut ParseState, min_level: usize) -> ParseResult<Expression> {
    state.nested(|state| climb(state, min_level))
}

fn climb(state: &mut ParseState, min_level: usize) -> ParseResult<Expression> {
    let mut left = parse_unary(state)?;
    let mut chained: Option<usize> = None;

    while let Some((op, level, assoc)) = state.peek_kind().and_then(precedence::binary) {
        if level < min_level {
            break;
        }
        if assoc == Assoc::NonAssoc && chained == Some(level) {
            let err = state
                .error_here()
                .note(format!("operator '{}' is not associative", op.symbol()));
            state.record_error(err.clone());
            return Err(err);
        }
        state.advance();

        let next_level = match assoc {
            Assoc::Right => level,
            Assoc::Left | Assoc::NonAssoc => level + 1,
        };
        let right = parse_expr(state, next_level)?;
        let position = left.position().merge(right.position());
        left = Expression::Binary(Binary {
            id: state.fresh_id(),
            op,
            left: Box::new(left),
            right: Box::new(right),
            position,
        });
        chained = (assoc == Assoc::NonAssoc).then_some(level);
    }

    Ok(left)
}

/// Prefix operators bind tighter than every binary operator.
fn parse_unary(state: &mut ParseState) -> ParseResult<Expression> {
    let Some(kind) = state.peek_kind() else {
        return primary(state);
    };

    if kind == TokenKind::Delete {
        let start = state.advance().map(|tok| tok.span).unwrap_or_default();
        let operand = state.nested(parse_unary)?;
        let position = start.merge(operand.position());
        return Ok(Expression::Delete(Delete {
            id: state.fresh_id(),
            expr: Box::new(operand),
            position,
        }));
    }

    match precedence::prefix(kind) {
        Some(op) => {
            let start = state.advance().map(|tok| tok.span).unwrap_or_default();
            if matches!(op, UnaryOp::Minus) {
                if let Some(min) = most_negative(state, &start) {
                    return Ok(min);
                }
            }
            let operand = state.nested(parse_unary)?;
            let position = start.merge(operand.position());
            Ok(Expression::Unary(Unary {
                id: state.fresh_id(),
                op,
                operand: Box::new(operand),
                position,
            }))
        }
        None => primary(state),
    }
}

/// `-9223372036854775808`: the digits alone are out of range, so the sign
/// that was just consumed becomes part of the constant.
fn most_negative(state: &mut ParseState, sign: &Span) -> Option<Expression> {
    let digits = state
        .peek()
        .filter(|tok| tok.kind == TokenKind::IntLiteral)?
        .value
        .clone();
    if digits.parse::<i64>().is_ok() {
        return None;
    }
    let value = format!("-{digits}").parse::<i64>().ok()?;
    let literal = state.advance()?;
    Some(Expression::Const(Const {
        id: state.fresh_id(),
        value: ConstValue::Int(value),
        position: sign.merge(&literal.span),
    }))
}

fn primary(state: &mut ParseState) -> ParseResult<Expression> {
    match state.peek_kind() {
        Some(TokenKind::Genid) if state.peek_nth(1) != Some(TokenKind::LBracket) => {
            identifier(state)
        }
        Some(TokenKind::Conid) => constructor(state),
        Some(TokenKind::Dim) => dim(state),
        Some(TokenKind::New) => new(state),
        Some(TokenKind::Begin) => {
            (expect(TokenKind::Begin) * expr() - expect(TokenKind::End)).parse(state)
        }
        Some(TokenKind::For) => for_loop(state),
        Some(TokenKind::While) => while_loop(state),
        Some(TokenKind::If) => if_then_else(state),
        Some(TokenKind::Match) => match_expr(state),
        Some(TokenKind::Let) => let_in(state),
        _ => simple_expr().parse(state),
    }
}

/// `f a1 .. an`, or a plain variable when no argument follows.
fn identifier(state: &mut ParseState) -> ParseResult<Expression> {
    let (name, start) = genid().parse(state)?;
    if !state.peek_kind().is_some_and(starts_simple_expr) {
        return Ok(Expression::Genid(Genid {
            id: state.fresh_id(),
            name,
            position: start,
        }));
    }
    let args = simple_args(state)?;
    let position = start.merge(&state.last_span());
    Ok(Expression::FunctionCall(FunctionCall {
        id: state.fresh_id(),
        name,
        args,
        position,
    }))
}

/// `C a1 .. an`, or a nullary constructor.
fn constructor(state: &mut ParseState) -> ParseResult<Expression> {
    let (name, start) = conid().parse(state)?;
    if !state.peek_kind().is_some_and(starts_simple_expr) {
        return Ok(Expression::Conid(Conid {
            id: state.fresh_id(),
            name,
            position: start,
        }));
    }
    let args = simple_args(state)?;
    let position = start.merge(&state.last_span());
    Ok(Expression::ConstructorCall(ConstructorCall {
        id: state.fresh_id(),
        name,
        args,
        position,
    }))
}

fn simple_args(state: &mut ParseState) -> ParseResult<Vec<Expression>> {
    let mut args = vec![];
    while state.peek_kind().is_some_and(starts_simple_expr) {
        args.push(simple_expr().parse(state)?);
    }
    Ok(args)
}

/// Operands that need no parentheses in argument position.
///
/// ```text
/// simple := genid "[" expr ("," expr)* "]" | genid | Conid | "!" simple
///         | "(" ")" | "(" expr ")" | constant
/// ```
pub fn simple_expr() -> BoxedParser<Expression> {
    BoxedParser::new(|state: &mut ParseState| match state.peek_kind() {
        Some(TokenKind::Genid) => {
            let (name, start) = genid().parse(state)?;
            if !state.at(TokenKind::LBracket) {
                return Ok(Expression::Genid(Genid {
                    id: state.fresh_id(),
                    name,
                    position: start,
                }));
            }
            let indices = (expect(TokenKind::LBracket) * expr_list() - expect(TokenKind::RBracket))
                .parse(state)?;
            let position = start.merge(&state.last_span());
            Ok(Expression::Array(ArrayAccess {
                id: state.fresh_id(),
                name,
                indices,
                position,
            }))
        }
        Some(TokenKind::Conid) => {
            let (name, position) = conid().parse(state)?;
            Ok(Expression::Conid(Conid {
                id: state.fresh_id(),
                name,
                position,
            }))
        }
        Some(TokenKind::Bang) => {
            let start = expect(TokenKind::Bang).parse(state)?.span;
            let operand = state.nested(|state| simple_expr().parse(state))?;
            let position = start.merge(operand.position());
            Ok(Expression::Unary(Unary {
                id: state.fresh_id(),
                op: UnaryOp::Deref,
                operand: Box::new(operand),
                position,
            }))
        }
        Some(TokenKind::LParen) => {
            let start = expect(TokenKind::LParen).parse(state)?.span;
            if state.at(TokenKind::RParen) {
                let end = expect(TokenKind::RParen).parse(state)?.span;
                return Ok(Expression::Const(Const {
                    id: state.fresh_id(),
                    value: ConstValue::Unit,
                    position: start.merge(&end),
                }));
            }
            (expr() - expect(TokenKind::RParen)).parse(state)
        }
        Some(kind) if starts_constant(kind) => {
            let (value, position) = constant().parse(state)?;
            Ok(Expression::Const(Const {
                id: state.fresh_id(),
                value,
                position,
            }))
        }
        _ => {
            let err = state.error_here().expected("expression");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// `e1, e2, ..`
pub fn expr_list() -> BoxedParser<Vec<Expression>> {
    BoxedParser::new(|state: &mut ParseState| {
        let mut items = vec![expr().parse(state)?];
        while state.at(TokenKind::Comma) {
            expect(TokenKind::Comma).parse(state)?;
            items.push(expr().parse(state)?);
        }
        Ok(items)
    })
}

/// `dim [n] a`; the dimension defaults to 1.
fn dim(state: &mut ParseState) -> ParseResult<Expression> {
    let start = expect(TokenKind::Dim).parse(state)?.span;
    let mut dimension = 1;
    if state.at(TokenKind::IntLiteral) {
        let err = state.error_here();
        let tok = expect(TokenKind::IntLiteral).parse(state)?;
        dimension = match decode(&tok) {
            Ok(ConstValue::Int(n)) => n,
            _ => {
                let err = err.note("integer literal out of range");
                state.record_error(err.clone());
                return Err(err);
            }
        };
    }
    let (name, end) = genid().parse(state)?;
    Ok(Expression::Dim(Dim {
        id: state.fresh_id(),
        dimension,
        name,
        position: start.merge(&end),
    }))
}

fn new(state: &mut ParseState) -> ParseResult<Expression> {
    let start = expect(TokenKind::New).parse(state)?.span;
    let ty = type_expr().parse(state)?;
    Ok(Expression::New(New {
        id: state.fresh_id(),
        ty,
        position: start.merge(&state.last_span()),
    }))
}

/// `for i = e1 (to | downto) e2 do e3 done`
fn for_loop(state: &mut ParseState) -> ParseResult<Expression> {
    let start = expect(TokenKind::For).parse(state)?.span;
    let (counter, _) = genid().parse(state)?;
    expect(TokenKind::Equals).parse(state)?;
    let from = expr().parse(state)?;
    let direction = expect_one_of(&[TokenKind::To, TokenKind::Downto], "'to' or 'downto'")
        .parse(state)?;
    let to = expr().parse(state)?;
    let body = (expect(TokenKind::Do) * expr()).parse(state)?;
    let end = expect(TokenKind::Done).parse(state)?.span;

    Ok(Expression::For(For {
        id: state.fresh_id(),
        counter,
        from: Box::new(from),
        to: Box::new(to),
        is_down: direction.kind == TokenKind::Downto,
        body: Box::new(body),
        position: start.merge(&end),
    }))
}

/// `while e1 do e2 done`
fn while_loop(state: &mut ParseState) -> ParseResult<Expression> {
    let start = expect(TokenKind::While).parse(state)?.span;
    let condition = expr().parse(state)?;
    let body = (expect(TokenKind::Do) * expr()).parse(state)?;
    let end = expect(TokenKind::Done).parse(state)?.span;

    Ok(Expression::While(While {
        id: state.fresh_id(),
        condition: Box::new(condition),
        body: Box::new(body),
        position: start.merge(&end),
    }))
}

/// `if c then e1 [else e2]`; a dangling `else` belongs to the nearest `if`.
fn if_then_else(state: &mut ParseState) -> ParseResult<Expression> {
    let start = expect(TokenKind::If).parse(state)?.span;
    let condition = expr().parse(state)?;
    let branch = precedence::branch_level();
    let then_expr = (expect(TokenKind::Then) * expr_at(branch)).parse(state)?;
    let else_expr = if state.at(TokenKind::Else) {
        Some(Box::new(
            (expect(TokenKind::Else) * expr_at(branch)).parse(state)?,
        ))
    } else {
        None
    };

    Ok(Expression::If(If {
        id: state.fresh_id(),
        condition: Box::new(condition),
        then_expr: Box::new(then_expr),
        else_expr,
        position: start.merge(&state.last_span()),
    }))
}

/// `match e with p1 -> e1 | p2 -> e2 .. end`
fn match_expr(state: &mut ParseState) -> ParseResult<Expression> {
    let start = expect(TokenKind::Match).parse(state)?.span;
    let scrutinee = expr().parse(state)?;
    expect(TokenKind::With).parse(state)?;

    let mut clauses = vec![clause(state)?];
    while state.at(TokenKind::Pipe) {
        expect(TokenKind::Pipe).parse(state)?;
        clauses.push(clause(state)?);
    }
    let end = expect(TokenKind::End).parse(state)?.span;

    Ok(Expression::Match(Match {
        id: state.fresh_id(),
        scrutinee: Box::new(scrutinee),
        clauses,
        position: start.merge(&end),
    }))
}

fn clause(state: &mut ParseState) -> ParseResult<Clause> {
    let pattern = pattern().parse(state)?;
    let expr = (expect(TokenKind::Arrow) * expr()).parse(state)?;
    let position = pattern.position().merge(expr.position());
    Ok(Clause {
        id: state.fresh_id(),
        pattern,
        expr,
        position,
    })
}

/// `let d1 and .. in e`; the body extends as far as possible.
fn let_in(state: &mut ParseState) -> ParseResult<Expression> {
    let letdef = letdef().parse(state)?;
    let body = (expect(TokenKind::In) * expr_at(precedence::let_body_level())).parse(state)?;
    let position = letdef.position.merge(body.position());
    Ok(Expression::LetIn(LetIn {
        id: state.fresh_id(),
        letdef,
        body: Box::new(body),
        position,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::lexer::lex;

    fn parse(source: &str) -> Expression {
        let mut state = ParseState::new(lex(source).unwrap());
        let expr = expr().parse(&mut state).unwrap();
        assert!(!state.has_next(), "unconsumed input in {source:?}");
        expr
    }

    fn binary(expr: &Expression) -> (&BinaryOp, &Expression, &Expression) {
        match expr {
            Expression::Binary(b) => (&b.op, &b.left, &b.right),
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let expr = parse("1 + 2 * 3");
        let (op, _, right) = binary(&expr);
        assert_eq!(*op, BinaryOp::Add);
        assert_eq!(*binary(right).0, BinaryOp::Mul);
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse("a ** b ** c");
        let (_, left, right) = binary(&expr);
        assert!(matches!(left, Expression::Genid(_)));
        assert_eq!(*binary(right).0, BinaryOp::Pow);
    }

    #[test]
    fn test_prefix_minus_binds_tightest() {
        let expr = parse("- a ** b");
        let (op, left, _) = binary(&expr);
        assert_eq!(*op, BinaryOp::Pow);
        assert!(matches!(left, Expression::Unary(u) if u.op == UnaryOp::Minus));
    }

    #[test]
    fn test_chained_comparison_is_rejected() {
        let mut state = ParseState::new(lex("a < b < c").unwrap());
        assert!(expr().parse(&mut state).is_err());
    }

    #[test]
    fn test_function_call_arguments_are_simple() {
        let Expression::FunctionCall(call) = parse("f x !r a[1, 2] (g y) ()") else {
            panic!("expected function call");
        };
        assert_eq!(call.name, "f");
        assert_eq!(call.args.len(), 5);
        assert!(matches!(&call.args[2], Expression::Array(a) if a.indices.len() == 2));
        assert!(matches!(&call.args[4], Expression::Const(c) if c.value == ConstValue::Unit));
    }

    #[test]
    fn test_binary_minus_after_call() {
        let expr = parse("f x - 1");
        let (op, left, _) = binary(&expr);
        assert_eq!(*op, BinaryOp::Sub);
        assert!(matches!(left, Expression::FunctionCall(_)));
    }

    #[test]
    fn test_if_branches() {
        let expr = parse("if c then x := 1 else y := 2; z");
        let (op, left, _) = binary(&expr);
        assert_eq!(*op, BinaryOp::Seq);
        let Expression::If(if_expr) = left else {
            panic!("expected if");
        };
        assert!(if_expr.else_expr.is_some());
    }

    #[test]
    fn test_let_in_body_swallows_sequence() {
        let Expression::LetIn(let_in) = parse("let x = 1 in x; x") else {
            panic!("expected let-in");
        };
        assert_eq!(*binary(&let_in.body).0, BinaryOp::Seq);
    }

    #[test]
    fn test_for_downto() {
        let Expression::For(for_expr) = parse("for i = 10 downto 1 do print_int i done") else {
            panic!("expected for");
        };
        assert!(for_expr.is_down);
        assert_eq!(for_expr.counter, "i");
    }

    #[test]
    fn test_match_clauses() {
        let Expression::Match(m) = parse("match t with Leaf -> 0 | Node x l r -> x end") else {
            panic!("expected match");
        };
        assert_eq!(m.clauses.len(), 2);
    }

    #[test]
    fn test_dim_and_new() {
        assert!(matches!(parse("dim 2 a"), Expression::Dim(d) if d.dimension == 2));
        assert!(matches!(parse("dim a"), Expression::Dim(d) if d.dimension == 1));
        assert!(matches!(parse("new int ref"), Expression::New(_)));
        assert!(matches!(parse("delete p"), Expression::Delete(_)));
    }

    #[test]
    fn test_most_negative_integer() {
        let Expression::Const(min) = parse("-9223372036854775808") else {
            panic!("expected a constant");
        };
        assert_eq!(min.value, ConstValue::Int(i64::MIN));

        assert!(matches!(parse("-42"), Expression::Unary(u) if u.op == UnaryOp::Minus));
    }

    #[test]
    fn test_too_negative_integer() {
        let mut state = ParseState::new(lex("-9223372036854775809").unwrap());
        let err = expr().parse(&mut state).unwrap_err();
        assert_eq!(err.note.as_deref(), Some("integer literal out of range"));
    }
}
