//! # Abstract Syntax Tree
//!
//! The tree produced by the parser. It is immutable once built: every node
//! carries a [`NodeId`] that is dense within one [`Program`], and everything
//! later phases learn about a node (most importantly its type) is stored in
//! side tables indexed by that id, e.g. [`TypeSlots`].
//!
//! ## Layout
//!
//! - [`definition`]: let-groups, the four definition forms, parameters and
//!   type-definition groups
//! - [`expression`]: every expression form
//! - [`pattern`]: patterns of `match` clauses

use lachs::Span;

use crate::types::Type;

pub mod definition;
pub mod expression;
pub mod pattern;

pub use definition::*;
pub use expression::*;
pub use pattern::*;

/// Identity of one node inside a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub definitions: Vec<Definition>,
    /// Upper bound (exclusive) of every [`NodeId`] in this program.
    pub node_count: u32,
}

impl Program {
    pub fn node_count(&self) -> usize {
        self.node_count as usize
    }

    pub fn let_defs(&self) -> impl Iterator<Item = &LetDef> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Let(letdef) => Some(letdef),
            Definition::Types(_) => None,
        })
    }

    pub fn type_groups(&self) -> impl Iterator<Item = &TypeDefGroup> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Types(group) => Some(group),
            Definition::Let(_) => None,
        })
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Let(LetDef),
    Types(TypeDefGroup),
}

/// The inferred type of every node, indexed by [`NodeId`].
///
/// A slot starts out empty and is written at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSlots {
    slots: Vec<Option<Type>>,
}

impl TypeSlots {
    pub fn new(node_count: usize) -> Self {
        Self {
            slots: vec![None; node_count],
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Fill the slot of `id`. Returns `false` if it was already written.
    pub fn set(&mut self, id: NodeId, ty: Type) -> bool {
        if id.index() >= self.slots.len() {
            self.slots.resize(id.index() + 1, None);
        }
        match &mut self.slots[id.index()] {
            Some(_) => false,
            slot => {
                *slot = Some(ty);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots that have been written.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// 1-based `line:column` of the start of `span`.
pub fn location(span: &Span) -> String {
    format!("{}:{}", span.start.0 + 1, span.start.1 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_written_once() {
        let mut slots = TypeSlots::new(3);
        assert!(slots.get(NodeId(1)).is_none());
        assert!(slots.set(NodeId(1), Type::Int));
        assert!(!slots.set(NodeId(1), Type::Bool));
        assert_eq!(slots.get(NodeId(1)), Some(&Type::Int));
        assert_eq!(slots.filled(), 1);
    }

    #[test]
    fn test_slots_grow() {
        let mut slots = TypeSlots::new(0);
        assert!(slots.set(NodeId(4), Type::Unit));
        assert_eq!(slots.len(), 5);
    }

    #[test]
    fn test_location_is_one_based() {
        let span = Span {
            start: (0, 4),
            end: (0, 6),
            source: String::new(),
        };
        assert_eq!(location(&span), "1:5");
    }
}
