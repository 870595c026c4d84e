//! Constraint rules for expressions and patterns.

use lachs::Span;

use super::{Analyzer, SemanticError, non_ref_kinds};
use crate::ast::{BinaryOp, Expression, NodeId, Pattern, UnaryOp};
use crate::infer::{Tag, Term};
use crate::symbols::{Symbol, SymbolKind};
use crate::types::{ConstructorInfo, Type, TypeKind};

impl Analyzer<'_> {
    /// Analyze `expr` and return its primary temp.
    pub(super) fn expression(&mut self, expr: &Expression) -> Tag {
        let t = self.inference.temp_for(expr.id(), None);

        match expr {
            Expression::Const(c) => self.inference.spec(t, c.value.ty()),
            Expression::Genid(genid) => {
                if let Some(s) = self.symbol_temp(&genid.name, genid.id, &genid.position) {
                    self.inference.as_type_of(t, s);
                }
            }
            Expression::Conid(conid) => {
                if let Some(info) = self.constructor(&conid.name, &conid.position) {
                    self.check_arity(&info, 0, &conid.position);
                    self.inference.spec(t, Type::user(&info.owner));
                }
            }
            Expression::ConstructorCall(call) => {
                let args: Vec<Tag> = call.args.iter().map(|arg| self.expression(arg)).collect();
                if let Some(info) = self.constructor(&call.name, &call.position) {
                    self.check_arity(&info, args.len(), &call.position);
                    self.inference.spec(t, Type::user(&info.owner));
                    for (arg, ty) in args.iter().zip(&info.args) {
                        self.inference.spec(*arg, ty);
                    }
                }
            }
            Expression::FunctionCall(call) => {
                let args: Vec<Term> = call
                    .args
                    .iter()
                    .map(|arg| Term::from(self.expression(arg)))
                    .collect();
                if let Some(f) = self.symbol_temp(&call.name, call.id, &call.position) {
                    self.inference.spec(f, Term::curried(args, t));
                }
            }
            Expression::Array(access) => {
                for index in &access.indices {
                    let i = self.expression(index);
                    self.inference.spec(i, Type::Int);
                }
                let elem = self.inference.aux(access.id, None);
                if let Some(a) = self.symbol_temp(&access.name, access.id, &access.position) {
                    self.inference
                        .spec(a, Term::array(elem, access.indices.len()));
                }
                self.inference.spec(t, Term::reference(elem));
            }
            Expression::Dim(dim) => {
                if dim.dimension < 1 {
                    self.report(SemanticError::DimensionOutOfRange {
                        name: dim.name.clone(),
                        dimension: dim.dimension,
                        position: dim.position.clone(),
                    });
                }
                if let Some(a) = self.symbol_temp(&dim.name, dim.id, &dim.position) {
                    self.inference.set(a, [TypeKind::Array]);
                }
                self.inference.spec(t, Type::Int);
            }
            Expression::Binary(binary) => {
                let l = self.expression(&binary.left);
                let r = self.expression(&binary.right);
                self.binary(binary.op, t, l, r);
            }
            Expression::Unary(unary) => {
                let o = self.expression(&unary.operand);
                self.unary(unary.op, t, o);
            }
            Expression::Delete(delete) => {
                let e = self.expression(&delete.expr);
                let inner = self.inference.aux(delete.id, None);
                self.inference.spec(e, Term::reference(inner));
                self.inference.spec(t, Type::Unit);
            }
            Expression::New(new) => {
                let ty = Type::reference(new.ty.clone());
                self.validate(&ty, "new", &new.position);
                self.inference.spec(t, ty);
            }
            Expression::For(for_expr) => {
                let from = self.expression(&for_expr.from);
                let to = self.expression(&for_expr.to);
                self.inference.spec(from, Type::Int);
                self.inference.spec(to, Type::Int);

                self.symbols.open_scope();
                let counter = self.inference.aux(for_expr.id, Some(Type::Int));
                let symbol = Symbol::new(
                    &for_expr.counter,
                    SymbolKind::Variable,
                    for_expr.position.clone(),
                )
                .with_type(Some(Type::Int))
                .with_temp(counter);
                self.insert(symbol);
                let body = self.expression(&for_expr.body);
                self.symbols.close_scope();

                self.inference.spec(body, Type::Unit);
                self.inference.spec(t, Type::Unit);
            }
            Expression::While(while_expr) => {
                let condition = self.expression(&while_expr.condition);
                let body = self.expression(&while_expr.body);
                self.inference.spec(condition, Type::Bool);
                self.inference.spec(body, Type::Unit);
                self.inference.spec(t, Type::Unit);
            }
            Expression::If(if_expr) => {
                let condition = self.expression(&if_expr.condition);
                self.inference.spec(condition, Type::Bool);
                let then = self.expression(&if_expr.then_expr);
                match &if_expr.else_expr {
                    Some(else_expr) => {
                        let otherwise = self.expression(else_expr);
                        self.inference.as_type_of(then, otherwise);
                        self.inference.as_type_of(t, then);
                    }
                    None => {
                        self.inference.spec(then, Type::Unit);
                        self.inference.spec(t, Type::Unit);
                    }
                }
            }
            Expression::LetIn(let_in) => {
                self.letdef(&let_in.letdef);
                let body = self.expression(&let_in.body);
                self.symbols.close_scope();
                self.inference.as_type_of(t, body);
            }
            Expression::Match(match_expr) => {
                let scrutinee = self.expression(&match_expr.scrutinee);
                for clause in &match_expr.clauses {
                    self.symbols.open_scope();
                    let p = self.pattern(&clause.pattern);
                    self.inference.as_type_of(p, scrutinee);
                    let body = self.expression(&clause.expr);
                    self.inference.as_type_of(t, body);
                    self.symbols.close_scope();
                }
            }
        }

        t
    }

    fn binary(&mut self, op: BinaryOp, t: Tag, l: Tag, r: Tag) {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.all_of(Type::Int, [l, r, t]);
            }
            BinaryOp::FAdd | BinaryOp::FSub | BinaryOp::FMul | BinaryOp::FDiv | BinaryOp::Pow => {
                self.all_of(Type::Float, [l, r, t]);
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                self.inference
                    .set(l, [TypeKind::Int, TypeKind::Float, TypeKind::Char]);
                self.inference.as_type_of(l, r);
                self.inference.spec(t, Type::Bool);
            }
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::NatEq | BinaryOp::NatNeq => {
                self.inference
                    .neg_set(l, [TypeKind::Array, TypeKind::Function]);
                self.inference.as_type_of(l, r);
                self.inference.spec(t, Type::Bool);
            }
            BinaryOp::And | BinaryOp::Or => self.all_of(Type::Bool, [l, r, t]),
            BinaryOp::Seq => self.inference.as_type_of(t, r),
            BinaryOp::Assign => {
                self.inference.spec(l, Term::reference(r));
                self.inference.spec(t, Type::Unit);
            }
        }
    }

    fn unary(&mut self, op: UnaryOp, t: Tag, o: Tag) {
        match op {
            UnaryOp::Plus | UnaryOp::Minus => {
                self.inference.spec(t, Type::Int);
                self.inference.as_type_of(t, o);
            }
            UnaryOp::FPlus | UnaryOp::FMinus => {
                self.inference.spec(t, Type::Float);
                self.inference.as_type_of(t, o);
            }
            UnaryOp::Not => self.all_of(Type::Bool, [o, t]),
            UnaryOp::Deref => {
                self.inference.neg_set(o, non_ref_kinds());
                self.inference.spec(o, Term::reference(t));
            }
        }
    }

    fn all_of<const N: usize>(&mut self, ty: Type, tags: [Tag; N]) {
        for tag in tags {
            self.inference.spec(tag, &ty);
        }
    }

    /// Analyze a pattern, binding its variables in the current scope.
    fn pattern(&mut self, pattern: &Pattern) -> Tag {
        let p = self.inference.temp_for(pattern.id(), None);
        match pattern {
            Pattern::Const(c) => self.inference.spec(p, c.value.ty()),
            Pattern::Genid(genid) => {
                let symbol = Symbol::new(&genid.name, SymbolKind::Variable, genid.position.clone())
                    .with_temp(p);
                self.insert(symbol);
            }
            Pattern::Constructor(constructor) => {
                let args: Vec<Tag> = constructor
                    .args
                    .iter()
                    .map(|arg| self.pattern(arg))
                    .collect();
                if let Some(info) = self.constructor(&constructor.name, &constructor.position) {
                    self.check_arity(&info, args.len(), &constructor.position);
                    self.inference.spec(p, Type::user(&info.owner));
                    for (arg, ty) in args.iter().zip(&info.args) {
                        self.inference.spec(*arg, ty);
                    }
                }
            }
        }
        p
    }

    /// The temp to constrain for a use of `name` at `node`.
    ///
    /// Library symbols have no temp of their own; each use gets a fresh one
    /// fixed to the declared signature.
    fn symbol_temp(&mut self, name: &str, node: NodeId, position: &Span) -> Option<Tag> {
        let Some(symbol) = self.symbols.lookup(name) else {
            self.report(SemanticError::UnknownIdentifier {
                name: name.to_string(),
                position: position.clone(),
            });
            return None;
        };
        match (symbol.temp, symbol.ty.clone()) {
            (Some(temp), _) => Some(temp),
            (None, Some(ty)) => Some(self.inference.aux(node, Some(ty))),
            (None, None) => None,
        }
    }

    fn constructor(&mut self, name: &str, position: &Span) -> Option<ConstructorInfo> {
        let info = self.types.constructor_within(name, &self.groups).cloned();
        if info.is_none() {
            self.report(SemanticError::UnknownConstructor {
                name: name.to_string(),
                position: position.clone(),
            });
        }
        info
    }

    fn check_arity(&mut self, info: &ConstructorInfo, found: usize, position: &Span) {
        if info.args.len() != found {
            self.report(SemanticError::ConstructorArity {
                name: info.name.clone(),
                expected: info.args.len(),
                found,
                position: position.clone(),
            });
        }
    }
}
