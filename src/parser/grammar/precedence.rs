//! Operator precedence and associativity, lowest binding power first.
//!
//! The expression parser never hard-codes a binding power; everything it
//! needs to know about operators is looked up here.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    NonAssoc,
}

#[derive(Debug, Clone, Copy)]
pub struct Level {
    pub assoc: Assoc,
    pub tokens: &'static [TokenKind],
}

const fn level(assoc: Assoc, tokens: &'static [TokenKind]) -> Level {
    Level { assoc, tokens }
}

pub const PRECEDENCE: [Level; 14] = [
    level(Assoc::Right, &[TokenKind::Arrow]),
    level(Assoc::NonAssoc, &[TokenKind::Of]),
    level(Assoc::NonAssoc, &[TokenKind::In]),
    level(Assoc::Left, &[TokenKind::Semicolon]),
    level(Assoc::NonAssoc, &[TokenKind::Then]),
    level(Assoc::NonAssoc, &[TokenKind::Else]),
    level(Assoc::NonAssoc, &[TokenKind::Assign]),
    level(Assoc::Left, &[TokenKind::BOr]),
    level(Assoc::Left, &[TokenKind::BAnd]),
    level(
        Assoc::NonAssoc,
        &[
            TokenKind::Lt,
            TokenKind::Le,
            TokenKind::Gt,
            TokenKind::Ge,
            TokenKind::Equals,
            TokenKind::Neq,
            TokenKind::NatEq,
            TokenKind::NatNeq,
        ],
    ),
    level(
        Assoc::Left,
        &[
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::FPlus,
            TokenKind::FMinus,
        ],
    ),
    level(
        Assoc::Left,
        &[
            TokenKind::Times,
            TokenKind::Divide,
            TokenKind::FTimes,
            TokenKind::FDivide,
            TokenKind::Mod,
        ],
    ),
    level(Assoc::Right, &[TokenKind::FPow]),
    level(
        Assoc::NonAssoc,
        &[
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::FPlus,
            TokenKind::FMinus,
            TokenKind::Not,
            TokenKind::Delete,
        ],
    ),
];

/// Level of the first binary operator, `;`.
pub const SEQUENCE: usize = 3;

/// Level of the prefix operators.
pub const PREFIX: usize = PRECEDENCE.len() - 1;

/// Level at which `kind` sits, searching from `from` upwards.
fn level_of(kind: TokenKind, from: usize) -> Option<usize> {
    (from..PRECEDENCE.len()).find(|&i| PRECEDENCE[i].tokens.contains(&kind))
}

/// Operands of an `if` branch bind tighter than `else`.
pub fn branch_level() -> usize {
    level_of(TokenKind::Else, 0).map_or(SEQUENCE, |else_level| else_level + 1)
}

/// The body of `let ... in` binds tighter than `in`.
pub fn let_body_level() -> usize {
    level_of(TokenKind::In, 0).map_or(SEQUENCE, |in_level| in_level + 1)
}

/// Binary operator spelled by `kind`, with its level and associativity.
pub fn binary(kind: TokenKind) -> Option<(BinaryOp, usize, Assoc)> {
    let op = binary_op(kind)?;
    let level = level_of(kind, SEQUENCE)?;
    Some((op, level, PRECEDENCE[level].assoc))
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Semicolon => BinaryOp::Seq,
        TokenKind::Assign => BinaryOp::Assign,
        TokenKind::BOr => BinaryOp::Or,
        TokenKind::BAnd => BinaryOp::And,
        TokenKind::Equals => BinaryOp::Eq,
        TokenKind::Neq => BinaryOp::Neq,
        TokenKind::NatEq => BinaryOp::NatEq,
        TokenKind::NatNeq => BinaryOp::NatNeq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Times => BinaryOp::Mul,
        TokenKind::Divide => BinaryOp::Div,
        TokenKind::Mod => BinaryOp::Mod,
        TokenKind::FPlus => BinaryOp::FAdd,
        TokenKind::FMinus => BinaryOp::FSub,
        TokenKind::FTimes => BinaryOp::FMul,
        TokenKind::FDivide => BinaryOp::FDiv,
        TokenKind::FPow => BinaryOp::Pow,
        _ => return None,
    })
}

/// Prefix operator spelled by `kind`. `delete` has its own node.
pub fn prefix(kind: TokenKind) -> Option<UnaryOp> {
    if !PRECEDENCE[PREFIX].tokens.contains(&kind) {
        return None;
    }
    match kind {
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Minus => Some(UnaryOp::Minus),
        TokenKind::FPlus => Some(UnaryOp::FPlus),
        TokenKind::FMinus => Some(UnaryOp::FMinus),
        TokenKind::Not => Some(UnaryOp::Not),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicative_binds_tighter_than_additive() {
        let (_, add, _) = binary(TokenKind::Plus).unwrap();
        let (_, mul, _) = binary(TokenKind::Times).unwrap();
        assert!(mul > add);
    }

    #[test]
    fn test_sequence_is_loosest_binary() {
        let (op, level, assoc) = binary(TokenKind::Semicolon).unwrap();
        assert_eq!(op, BinaryOp::Seq);
        assert_eq!(level, SEQUENCE);
        assert_eq!(assoc, Assoc::Left);
    }

    #[test]
    fn test_associativity() {
        assert_eq!(binary(TokenKind::FPow).unwrap().2, Assoc::Right);
        assert_eq!(binary(TokenKind::Assign).unwrap().2, Assoc::NonAssoc);
        assert_eq!(binary(TokenKind::Lt).unwrap().2, Assoc::NonAssoc);
        assert_eq!(binary(TokenKind::Minus).unwrap().2, Assoc::Left);
    }

    #[test]
    fn test_branches_sit_at_assignment() {
        let (_, assign, _) = binary(TokenKind::Assign).unwrap();
        assert_eq!(branch_level(), assign);
        assert_eq!(let_body_level(), SEQUENCE);
    }

    #[test]
    fn test_prefix_operators() {
        assert_eq!(prefix(TokenKind::Minus), Some(UnaryOp::Minus));
        assert_eq!(prefix(TokenKind::Not), Some(UnaryOp::Not));
        assert_eq!(prefix(TokenKind::Delete), None);
        assert_eq!(prefix(TokenKind::Bang), None);
        assert!(binary(TokenKind::Not).is_none());
    }
}
