//! # Patterns
//!
//! Patterns appear only in `match` clauses:
//!
//! ```text
//! match t with
//!   Leaf         -> 0
//! | Node n l r   -> n + size l + size r
//! | -1           -> ...
//! ```
//!
//! A parenthesized pattern is represented by the inner pattern. Signed
//! literals (`-1`, `-.2.5`) are folded into a single [`ConstPattern`].

use lachs::Span;

use super::NodeId;
use super::expression::ConstValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `Con p1 .. pn`; `args` is empty for a bare constructor.
    Constructor(ConstructorPattern),
    Const(ConstPattern),
    /// Binds the matched value to a name.
    Genid(GenidPattern),
}

impl Pattern {
    pub fn id(&self) -> NodeId {
        match self {
            Pattern::Constructor(p) => p.id,
            Pattern::Const(p) => p.id,
            Pattern::Genid(p) => p.id,
        }
    }

    pub fn position(&self) -> &Span {
        match self {
            Pattern::Constructor(p) => &p.position,
            Pattern::Const(p) => &p.position,
            Pattern::Genid(p) => &p.position,
        }
    }

    /// Every name bound by this pattern, left to right.
    pub fn bindings(&self) -> Vec<&GenidPattern> {
        let mut out = Vec::new();
        self.collect_bindings(&mut out);
        out
    }

    fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a GenidPattern>) {
        match self {
            Pattern::Constructor(p) => p.args.iter().for_each(|arg| arg.collect_bindings(out)),
            Pattern::Const(_) => {}
            Pattern::Genid(p) => out.push(p),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorPattern {
    pub id: NodeId,
    pub name: String,
    pub args: Vec<Pattern>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstPattern {
    pub id: NodeId,
    pub value: ConstValue,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenidPattern {
    pub id: NodeId,
    pub name: String,
    pub position: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genid(id: u32, name: &str) -> Pattern {
        Pattern::Genid(GenidPattern {
            id: NodeId(id),
            name: name.to_string(),
            position: Span::default(),
        })
    }

    #[test]
    fn test_bindings_in_order() {
        let pattern = Pattern::Constructor(ConstructorPattern {
            id: NodeId(0),
            name: "Node".to_string(),
            args: vec![
                genid(1, "n"),
                Pattern::Const(ConstPattern {
                    id: NodeId(2),
                    value: ConstValue::Int(0),
                    position: Span::default(),
                }),
                Pattern::Constructor(ConstructorPattern {
                    id: NodeId(3),
                    name: "Pair".to_string(),
                    args: vec![genid(4, "l"), genid(5, "r")],
                    position: Span::default(),
                }),
            ],
            position: Span::default(),
        });

        let names: Vec<&str> = pattern
            .bindings()
            .iter()
            .map(|binding| binding.name.as_str())
            .collect();
        assert_eq!(names, vec!["n", "l", "r"]);
    }
}
