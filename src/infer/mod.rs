//! # Inference Scaffold
//!
//! Constraint generation for type inference. Every expression node that needs
//! a type gets a [`TempType`]: a placeholder identified by a [`Tag`]. The
//! analyzer then records [`Constraint`]s between placeholders and concrete
//! types. Nothing here unifies anything; solving is delegated to a
//! [`Solver`], and the only solver shipped is [`Unsolved`], which leaves
//! every placeholder open.
//!
//! ## Tags
//!
//! Tags come from a [`TagAllocator`] owned by one compilation unit. They start
//! at 1 and strictly increase, so two units compiled on different threads
//! never share state.
//!
//! ## Concluding
//!
//! [`Inference::conclude`] runs the solver, writes each node's solved type
//! into its [`TypeSlots`] entry and then drains the deferred validations:
//! definitions whose type was not written in the source are validated once a
//! type is known. Validations whose type is still unknown are handed back as
//! outstanding [`Obligation`]s.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use lachs::Span;

use crate::ast::{NodeId, TypeSlots, location};
use crate::diagnostics::DiagnosticSink;
use crate::types::{Type, TypeKind, TypeTable};

/// Identity of a [`TempType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Monotonic source of [`Tag`]s for one compilation unit.
#[derive(Debug)]
pub struct TagAllocator {
    next: u32,
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl TagAllocator {
    pub fn new() -> Self {
        TagAllocator { next: 1 }
    }

    pub fn fresh(&mut self) -> Tag {
        let tag = Tag(self.next);
        self.next += 1;
        tag
    }

    /// Number of tags handed out so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

/// Placeholder for the not yet known type of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct TempType {
    pub tag: Tag,
    pub node: NodeId,
    /// Type written in the source for this node, if any.
    pub hint: Option<Type>,
    /// The node's own type, as opposed to an auxiliary placeholder such as
    /// the element type of an array access. Only primary temps are written
    /// back.
    pub primary: bool,
}

impl TempType {
    /// Copy the solved type of this temp into the node's slot.
    pub fn write_back(&self, solution: &Solution, slots: &mut TypeSlots) -> bool {
        match solution.get(self.tag) {
            Some(ty) if self.primary => slots.set(self.node, ty.clone()),
            _ => false,
        }
    }
}

/// A type shape whose leaves may be placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Bool,
    Char,
    Float,
    Int,
    Unit,
    String,
    Array(Box<Term>, usize),
    Func(Box<Term>, Box<Term>),
    Ref(Box<Term>),
    User(String),
    Temp(Tag),
}

impl Term {
    pub fn func(from: impl Into<Term>, to: impl Into<Term>) -> Self {
        Term::Func(Box::new(from.into()), Box::new(to.into()))
    }

    pub fn curried(params: Vec<Term>, result: impl Into<Term>) -> Self {
        params
            .into_iter()
            .rev()
            .fold(result.into(), |acc, param| Term::func(param, acc))
    }

    pub fn array(elem: impl Into<Term>, dims: usize) -> Self {
        Term::Array(Box::new(elem.into()), dims)
    }

    pub fn reference(inner: impl Into<Term>) -> Self {
        Term::Ref(Box::new(inner.into()))
    }

    /// Outermost shape, `None` for a bare placeholder.
    pub fn kind(&self) -> Option<TypeKind> {
        match self {
            Term::Bool => Some(TypeKind::Bool),
            Term::Char => Some(TypeKind::Char),
            Term::Float => Some(TypeKind::Float),
            Term::Int => Some(TypeKind::Int),
            Term::Unit => Some(TypeKind::Unit),
            Term::String => Some(TypeKind::String),
            Term::Array(..) => Some(TypeKind::Array),
            Term::Func(..) => Some(TypeKind::Function),
            Term::Ref(_) => Some(TypeKind::Ref),
            Term::User(_) => Some(TypeKind::User),
            Term::Temp(_) => None,
        }
    }

    /// The concrete type, if no placeholder occurs inside.
    pub fn to_type(&self) -> Option<Type> {
        Some(match self {
            Term::Bool => Type::Bool,
            Term::Char => Type::Char,
            Term::Float => Type::Float,
            Term::Int => Type::Int,
            Term::Unit => Type::Unit,
            Term::String => Type::String,
            Term::Array(elem, dims) => Type::array(elem.to_type()?, *dims),
            Term::Func(from, to) => Type::func(from.to_type()?, to.to_type()?),
            Term::Ref(inner) => Type::reference(inner.to_type()?),
            Term::User(name) => Type::user(name),
            Term::Temp(_) => return None,
        })
    }

    /// Every placeholder mentioned, left to right.
    pub fn temps(&self) -> Vec<Tag> {
        match self {
            Term::Array(elem, _) | Term::Ref(elem) => elem.temps(),
            Term::Func(from, to) => {
                let mut tags = from.temps();
                tags.extend(to.temps());
                tags
            }
            Term::Temp(tag) => vec![*tag],
            _ => vec![],
        }
    }
}

impl From<Tag> for Term {
    fn from(tag: Tag) -> Self {
        Term::Temp(tag)
    }
}

impl From<&Type> for Term {
    fn from(ty: &Type) -> Self {
        match ty {
            Type::Bool => Term::Bool,
            Type::Char => Term::Char,
            Type::Float => Term::Float,
            Type::Int => Term::Int,
            Type::Unit => Term::Unit,
            Type::String => Term::String,
            Type::Array(elem, dims) => Term::array(elem.as_ref(), *dims),
            Type::Func(from, to) => Term::func(from.as_ref(), to.as_ref()),
            Type::Ref(inner) => Term::reference(inner.as_ref()),
            Type::User(name) => Term::User(name.clone()),
        }
    }
}

impl From<Type> for Term {
    fn from(ty: Type) -> Self {
        Term::from(&ty)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operand = |term: &Term| match term {
            Term::Func(..) | Term::Array(..) => format!("({term})"),
            _ => term.to_string(),
        };
        match self {
            Term::Array(elem, 1) => write!(f, "array of {}", operand(elem.as_ref())),
            Term::Array(elem, dims) => {
                let stars = vec!["*"; *dims].join(", ");
                write!(f, "array [{stars}] of {}", operand(elem.as_ref()))
            }
            Term::Func(from, to) => match from.as_ref() {
                Term::Func(..) => write!(f, "({from}) -> {to}"),
                _ => write!(f, "{from} -> {to}"),
            },
            Term::Ref(inner) => write!(f, "{} ref", operand(inner.as_ref())),
            Term::Temp(tag) => write!(f, "{tag}"),
            other => match other.to_type() {
                Some(ty) => write!(f, "{ty}"),
                None => Ok(()),
            },
        }
    }
}

/// An obligation between placeholders, recorded for a later solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `target` must equal `ty`.
    Spec { target: Tag, ty: Term },
    /// `target` must have one of the listed shapes.
    Set {
        target: Tag,
        kinds: BTreeSet<TypeKind>,
    },
    /// `target` must not have any of the listed shapes.
    NegSet {
        target: Tag,
        kinds: BTreeSet<TypeKind>,
    },
    /// `a` and `b` must be the same type.
    AsTypeOf { a: Tag, b: Tag },
}

impl Constraint {
    /// Every placeholder this constraint mentions.
    pub fn temps(&self) -> Vec<Tag> {
        match self {
            Constraint::Spec { target, ty } => {
                let mut tags = vec![*target];
                tags.extend(ty.temps());
                tags
            }
            Constraint::Set { target, .. } | Constraint::NegSet { target, .. } => vec![*target],
            Constraint::AsTypeOf { a, b } => vec![*a, *b],
        }
    }
}

fn join_kinds(kinds: &BTreeSet<TypeKind>) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Spec { target, ty } => write!(f, "{target} = {ty}"),
            Constraint::Set { target, kinds } => {
                write!(f, "{target} in {{{}}}", join_kinds(kinds))
            }
            Constraint::NegSet { target, kinds } => {
                write!(f, "{target} not in {{{}}}", join_kinds(kinds))
            }
            Constraint::AsTypeOf { a, b } => write!(f, "{a} ~ {b}"),
        }
    }
}

/// Solved types, by tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    types: HashMap<Tag, Type>,
}

impl Solution {
    pub fn insert(&mut self, tag: Tag, ty: Type) {
        self.types.insert(tag, ty);
    }

    pub fn get(&self, tag: Tag) -> Option<&Type> {
        self.types.get(&tag)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Turns recorded constraints into types.
pub trait Solver {
    fn solve(&self, constraints: &[Constraint], temps: &[TempType]) -> Solution;
}

/// Solves nothing: every placeholder stays open.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsolved;

impl Solver for Unsolved {
    fn solve(&self, _constraints: &[Constraint], _temps: &[TempType]) -> Solution {
        Solution::default()
    }
}

/// A definition whose type must be validated once it is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Obligation {
    pub node: NodeId,
    pub name: String,
    pub position: Span,
}

/// What inference leaves behind.
#[derive(Debug, Clone, Default)]
pub struct Conclusion {
    pub constraints: Vec<Constraint>,
    pub temps: Vec<TempType>,
    /// Validations that could not run because the type stayed unknown.
    pub outstanding: Vec<Obligation>,
}

/// Collects temps and constraints for one compilation unit.
#[derive(Debug)]
pub struct Inference {
    tags: TagAllocator,
    temps: Vec<TempType>,
    constraints: Vec<Constraint>,
    primary: HashMap<NodeId, Tag>,
    pending: Vec<Obligation>,
}

impl Inference {
    pub fn new(tags: TagAllocator) -> Self {
        Inference {
            tags,
            temps: vec![],
            constraints: vec![],
            primary: HashMap::new(),
            pending: vec![],
        }
    }

    /// The primary temp of `node`, created on first use.
    ///
    /// A hint is recorded on the temp and also constrains it.
    pub fn temp_for(&mut self, node: NodeId, hint: Option<Type>) -> Tag {
        if let Some(&tag) = self.primary.get(&node) {
            return tag;
        }
        let tag = self.push_temp(node, hint, true);
        self.primary.insert(node, tag);
        tag
    }

    /// An auxiliary temp introduced while analyzing `node`.
    pub fn aux(&mut self, node: NodeId, hint: Option<Type>) -> Tag {
        self.push_temp(node, hint, false)
    }

    fn push_temp(&mut self, node: NodeId, hint: Option<Type>, primary: bool) -> Tag {
        let tag = self.tags.fresh();
        if let Some(hint) = &hint {
            self.spec(tag, hint);
        }
        self.temps.push(TempType {
            tag,
            node,
            hint,
            primary,
        });
        tag
    }

    pub fn temp_of(&self, node: NodeId) -> Option<Tag> {
        self.primary.get(&node).copied()
    }

    pub fn spec(&mut self, target: Tag, ty: impl Into<Term>) {
        self.push(Constraint::Spec {
            target,
            ty: ty.into(),
        });
    }

    pub fn set(&mut self, target: Tag, kinds: impl IntoIterator<Item = TypeKind>) {
        self.push(Constraint::Set {
            target,
            kinds: kinds.into_iter().collect(),
        });
    }

    pub fn neg_set(&mut self, target: Tag, kinds: impl IntoIterator<Item = TypeKind>) {
        self.push(Constraint::NegSet {
            target,
            kinds: kinds.into_iter().collect(),
        });
    }

    pub fn as_type_of(&mut self, a: Tag, b: Tag) {
        self.push(Constraint::AsTypeOf { a, b });
    }

    fn push(&mut self, constraint: Constraint) {
        tracing::trace!(%constraint, "constraint");
        self.constraints.push(constraint);
    }

    /// Validate the type of `obligation.node` once inference concludes.
    pub fn defer(&mut self, obligation: Obligation) {
        self.pending.push(obligation);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn temps(&self) -> &[TempType] {
        &self.temps
    }

    /// Solve, write back and drain the deferred validations.
    pub fn conclude(
        self,
        solver: &dyn Solver,
        slots: &mut TypeSlots,
        table: &TypeTable,
        sink: &mut dyn DiagnosticSink,
    ) -> Conclusion {
        let solution = solver.solve(&self.constraints, &self.temps);

        let written = self
            .temps
            .iter()
            .filter(|temp| temp.write_back(&solution, slots))
            .count();
        tracing::debug!(
            temps = self.temps.len(),
            constraints = self.constraints.len(),
            written,
            "inference concluded"
        );

        let mut outstanding = vec![];
        for obligation in self.pending {
            match slots.get(obligation.node) {
                Some(ty) => {
                    if let Err(err) = table.validate(ty) {
                        sink.error(format_args!(
                            "{}: {} (type of {})",
                            location(&obligation.position),
                            err,
                            obligation.name
                        ));
                    }
                }
                None => {
                    tracing::debug!(
                        name = %obligation.name,
                        node = %obligation.node,
                        "type still unknown, validation outstanding"
                    );
                    outstanding.push(obligation);
                }
            }
        }

        Conclusion {
            constraints: self.constraints,
            temps: self.temps,
            outstanding,
        }
    }
}
