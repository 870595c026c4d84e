use std::fmt;

use lachs::Span;

use super::NodeId;
use super::definition::LetDef;
use super::pattern::Pattern;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary(Binary),
    Unary(Unary),
    ConstructorCall(ConstructorCall),
    Array(ArrayAccess),
    Const(Const),
    Conid(Conid),
    Genid(Genid),
    Delete(Delete),
    Dim(Dim),
    For(For),
    FunctionCall(FunctionCall),
    LetIn(LetIn),
    If(If),
    Match(Match),
    New(New),
    While(While),
}

impl Expression {
    pub fn id(&self) -> NodeId {
        match self {
            Expression::Binary(e) => e.id,
            Expression::Unary(e) => e.id,
            Expression::ConstructorCall(e) => e.id,
            Expression::Array(e) => e.id,
            Expression::Const(e) => e.id,
            Expression::Conid(e) => e.id,
            Expression::Genid(e) => e.id,
            Expression::Delete(e) => e.id,
            Expression::Dim(e) => e.id,
            Expression::For(e) => e.id,
            Expression::FunctionCall(e) => e.id,
            Expression::LetIn(e) => e.id,
            Expression::If(e) => e.id,
            Expression::Match(e) => e.id,
            Expression::New(e) => e.id,
            Expression::While(e) => e.id,
        }
    }

    pub fn position(&self) -> &Span {
        match self {
            Expression::Binary(e) => &e.position,
            Expression::Unary(e) => &e.position,
            Expression::ConstructorCall(e) => &e.position,
            Expression::Array(e) => &e.position,
            Expression::Const(e) => &e.position,
            Expression::Conid(e) => &e.position,
            Expression::Genid(e) => &e.position,
            Expression::Delete(e) => &e.position,
            Expression::Dim(e) => &e.position,
            Expression::For(e) => &e.position,
            Expression::FunctionCall(e) => &e.position,
            Expression::LetIn(e) => &e.position,
            Expression::If(e) => &e.position,
            Expression::Match(e) => &e.position,
            Expression::New(e) => &e.position,
            Expression::While(e) => &e.position,
        }
    }
}

/// Binary operators, named after their source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `;`
    Seq,
    /// `:=`
    Assign,
    Or,
    And,
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `==`
    NatEq,
    /// `!=`
    NatNeq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    FAdd,
    FSub,
    FMul,
    FDiv,
    /// `**`
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Seq => ";",
            BinaryOp::Assign => ":=",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "<>",
            BinaryOp::NatEq => "==",
            BinaryOp::NatNeq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "mod",
            BinaryOp::FAdd => "+.",
            BinaryOp::FSub => "-.",
            BinaryOp::FMul => "*.",
            BinaryOp::FDiv => "/.",
            BinaryOp::Pow => "**",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    FPlus,
    FMinus,
    Not,
    /// `!`
    Deref,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::FPlus => "+.",
            UnaryOp::FMinus => "-.",
            UnaryOp::Not => "not",
            UnaryOp::Deref => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub id: NodeId,
    pub op: BinaryOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: Box<Expression>,
    pub position: Span,
}

/// `Con e1 .. en`, with at least one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorCall {
    pub id: NodeId,
    pub name: String,
    pub args: Vec<Expression>,
    pub position: Span,
}

/// `a[i1, .., in]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub id: NodeId,
    pub name: String,
    pub indices: Vec<Expression>,
    pub position: Span,
}

/// Decoded literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f64),
    String(String),
    Unit,
}

impl ConstValue {
    pub fn ty(&self) -> Type {
        match self {
            ConstValue::Bool(_) => Type::Bool,
            ConstValue::Char(_) => Type::Char,
            ConstValue::Int(_) => Type::Int,
            ConstValue::Float(_) => Type::Float,
            ConstValue::String(_) => Type::String,
            ConstValue::Unit => Type::Unit,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Char(c) => write!(f, "{c:?}"),
            ConstValue::Int(i) => write!(f, "{i}"),
            ConstValue::Float(x) => write!(f, "{x:?}"),
            ConstValue::String(s) => write!(f, "{s:?}"),
            ConstValue::Unit => f.write_str("()"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Const {
    pub id: NodeId,
    pub value: ConstValue,
    pub position: Span,
}

/// A constructor used without arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Conid {
    pub id: NodeId,
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Genid {
    pub id: NodeId,
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub id: NodeId,
    pub expr: Box<Expression>,
    pub position: Span,
}

/// `dim [k] a`; `k` defaults to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Dim {
    pub id: NodeId,
    pub dimension: i64,
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub id: NodeId,
    pub counter: String,
    pub from: Box<Expression>,
    pub to: Box<Expression>,
    pub is_down: bool,
    pub body: Box<Expression>,
    pub position: Span,
}

/// `f e1 .. en`, with at least one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub id: NodeId,
    pub name: String,
    pub args: Vec<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetIn {
    pub id: NodeId,
    pub letdef: LetDef,
    pub body: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub id: NodeId,
    pub condition: Box<Expression>,
    pub then_expr: Box<Expression>,
    pub else_expr: Option<Box<Expression>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: NodeId,
    pub scrutinee: Box<Expression>,
    pub clauses: Vec<Clause>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub id: NodeId,
    pub pattern: Pattern,
    pub expr: Expression,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct New {
    pub id: NodeId,
    pub ty: Type,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub id: NodeId,
    pub condition: Box<Expression>,
    pub body: Box<Expression>,
    pub position: Span,
}
