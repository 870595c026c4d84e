use lachs::Span;

use super::NodeId;
use super::expression::Expression;
use crate::types::Type;

/// `let [rec] d1 and d2 ...`
#[derive(Debug, Clone, PartialEq)]
pub struct LetDef {
    pub id: NodeId,
    pub is_rec: bool,
    pub defs: Vec<Def>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Def {
    Function(FunctionDef),
    Constant(ConstantDef),
    Variable(VariableDef),
    ArrayVariable(ArrayVariableDef),
}

impl Def {
    pub fn id(&self) -> NodeId {
        match self {
            Def::Function(def) => def.id,
            Def::Constant(def) => def.id,
            Def::Variable(def) => def.id,
            Def::ArrayVariable(def) => def.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Def::Function(def) => &def.name,
            Def::Constant(def) => &def.name,
            Def::Variable(def) => &def.name,
            Def::ArrayVariable(def) => &def.name,
        }
    }

    pub fn position(&self) -> &Span {
        match self {
            Def::Function(def) => &def.position,
            Def::Constant(def) => &def.position,
            Def::Variable(def) => &def.position,
            Def::ArrayVariable(def) => &def.position,
        }
    }
}

/// `f p1 .. pn [: τ] = e`, with at least one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub id: NodeId,
    pub name: String,
    pub params: Vec<Param>,
    /// Declared result type, left for inference when absent.
    pub ret: Option<Type>,
    pub body: Expression,
    pub position: Span,
}

/// `c [: τ] = e`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDef {
    pub id: NodeId,
    pub name: String,
    pub ty: Option<Type>,
    pub body: Expression,
    pub position: Span,
}

/// `mutable x [: τ]`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub id: NodeId,
    pub name: String,
    pub ty: Option<Type>,
    pub position: Span,
}

/// `mutable a [e1, .., en] [: τ]`; `ty` is the element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVariableDef {
    pub id: NodeId,
    pub name: String,
    pub dims: Vec<Expression>,
    pub ty: Option<Type>,
    pub position: Span,
}

/// `x` or `(x : τ)`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub name: String,
    pub ty: Option<Type>,
    pub position: Span,
}

/// `type t1 = ... and t2 = ...`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefGroup {
    pub id: NodeId,
    pub tdefs: Vec<TDef>,
    pub position: Span,
}

/// `t = C1 | C2 of τ1 τ2 | ...`
#[derive(Debug, Clone, PartialEq)]
pub struct TDef {
    pub id: NodeId,
    pub name: String,
    pub constructors: Vec<Constructor>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub id: NodeId,
    pub name: String,
    pub args: Vec<Type>,
    pub position: Span,
}
