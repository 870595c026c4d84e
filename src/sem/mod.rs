//! # Semantic Analyzer
//!
//! One depth-first walk over a parsed [`Program`]. The walk
//!
//! - manages scopes in the [`SymbolTable`] and reports unknown and
//!   duplicate names,
//! - hands type-definition groups to the [`TypeTable`] and validates every
//!   type written in the source,
//! - asks the [`Inference`] scaffold for a temp per node and records the
//!   constraints each construct imposes.
//!
//! Nothing is thrown: every problem goes to the [`DiagnosticSink`] and the
//! walk carries on with the next sibling.
//!
//! ## Let-groups
//!
//! `let rec` inserts all of its bindings before any body is analyzed, so
//! bindings may refer to themselves and to each other. A plain `let` hides
//! its scope while the bodies are analyzed and only then inserts the
//! bindings: in `let x = x` the right-hand `x` is an outer `x` or nothing.
//!
//! Top-level let-groups stay in scope for the rest of the program; a
//! `let ... in` group goes out of scope after its body.
//!
//! ## Types
//!
//! The type table is filled while parsing, but a user type and its
//! constructors only count as defined from their `type` group onwards.

mod error;
mod expression;

pub use error::SemanticError;

use std::collections::HashSet;
use std::fmt::Display;

use lachs::Span;

use crate::ast::{
    Def, Definition, FunctionDef, LetDef, NodeId, Program, TypeDefGroup, TypeSlots, location,
};
use crate::diagnostics::DiagnosticSink;
use crate::infer::{
    Constraint, Inference, Obligation, Solver, Tag, TagAllocator, TempType, Term, Unsolved,
};
use crate::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::types::{InvalidType, Type, TypeKind, TypeTable};

/// What analysis leaves behind for later phases.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Solved type of every node, where one is known.
    pub slots: TypeSlots,
    pub constraints: Vec<Constraint>,
    pub temps: Vec<TempType>,
    /// Deferred validations whose type stayed unknown.
    pub outstanding: Vec<Obligation>,
}

pub struct Analyzer<'a> {
    symbols: SymbolTable,
    types: &'a mut TypeTable,
    /// Type groups walked past so far; later ones are not yet defined.
    groups: HashSet<NodeId>,
    inference: Inference,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        types: &'a mut TypeTable,
        tags: TagAllocator,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Analyzer {
            symbols: SymbolTable::new(),
            types,
            groups: HashSet::new(),
            inference: Inference::new(tags),
            sink,
        }
    }

    /// Analyze `program` and conclude inference without a solver.
    pub fn analyze(self, program: &Program) -> Analysis {
        self.analyze_with(program, &Unsolved)
    }

    pub fn analyze_with(mut self, program: &Program, solver: &dyn Solver) -> Analysis {
        let base = self.symbols.depth();
        for definition in &program.definitions {
            match definition {
                Definition::Let(letdef) => self.letdef(letdef),
                Definition::Types(group) => self.typedef(group),
            }
        }
        while self.symbols.depth() > base {
            self.symbols.close_scope();
        }

        let mut slots = TypeSlots::new(program.node_count());
        let conclusion = self
            .inference
            .conclude(solver, &mut slots, self.types, self.sink);

        Analysis {
            slots,
            constraints: conclusion.constraints,
            temps: conclusion.temps,
            outstanding: conclusion.outstanding,
        }
    }

    fn report(&mut self, err: impl Display) {
        self.sink.error(format_args!("{err}"));
    }

    fn insert(&mut self, symbol: Symbol) {
        if let Err(err) = self.symbols.insert_symbol(symbol) {
            self.report(err);
        }
    }

    fn typedef(&mut self, group: &TypeDefGroup) {
        if let Err(errors) = self.types.process(group) {
            for err in errors {
                self.report(err);
            }
        }
        self.groups.insert(group.id);
    }

    /// Opens the group's scope and leaves it open; the caller closes it.
    fn letdef(&mut self, letdef: &LetDef) {
        self.symbols.open_scope();
        if letdef.is_rec {
            self.insert_bindings(letdef);
        } else {
            self.symbols.current_mut().set_visible(false);
        }

        for def in &letdef.defs {
            self.def(def);
        }

        if !letdef.is_rec {
            self.symbols.current_mut().set_visible(true);
            self.insert_bindings(letdef);
        }
    }

    fn insert_bindings(&mut self, letdef: &LetDef) {
        for def in &letdef.defs {
            let kind = match def {
                Def::Function(_) => SymbolKind::Function,
                Def::Constant(_) => SymbolKind::Constant,
                Def::Variable(_) | Def::ArrayVariable(_) => SymbolKind::Variable,
            };
            let temp = self.binding_temp(def);
            let symbol = Symbol::new(def.name(), kind, def.position().clone())
                .with_type(declared_type(def))
                .with_temp(temp);
            self.insert(symbol);
        }
    }

    /// The temp standing for a binding, hinted by whatever type the source
    /// gives it.
    fn binding_temp(&mut self, def: &Def) -> Tag {
        self.inference.temp_for(def.id(), declared_type(def))
    }

    fn def(&mut self, def: &Def) {
        match def {
            Def::Function(function) => self.function_def(function),
            Def::Constant(constant) => {
                if let Some(ty) = &constant.ty {
                    self.validate(ty, &constant.name, &constant.position);
                }
                let c = self.binding_temp(def);
                let body = self.expression(&constant.body);
                self.inference.as_type_of(c, body);
            }
            Def::Variable(variable) => {
                self.binding_temp(def);
                match &variable.ty {
                    Some(ty) => self.validate(
                        &Type::reference(ty.clone()),
                        &variable.name,
                        &variable.position,
                    ),
                    None => self.inference.defer(Obligation {
                        node: variable.id,
                        name: variable.name.clone(),
                        position: variable.position.clone(),
                    }),
                }
            }
            Def::ArrayVariable(array) => {
                for dim in &array.dims {
                    let d = self.expression(dim);
                    self.inference.spec(d, Type::Int);
                }
                self.binding_temp(def);
                match &array.ty {
                    Some(ty) => self.validate(
                        &Type::array(ty.clone(), array.dims.len()),
                        &array.name,
                        &array.position,
                    ),
                    None => self.inference.defer(Obligation {
                        node: array.id,
                        name: array.name.clone(),
                        position: array.position.clone(),
                    }),
                }
            }
        }
    }

    fn function_def(&mut self, function: &FunctionDef) {
        for param in &function.params {
            if let Some(ty) = &param.ty {
                self.validate(ty, &param.name, &param.position);
            }
        }
        if let Some(ret) = &function.ret {
            if ret.is_array() {
                self.report(SemanticError::InvalidType {
                    kind: InvalidType::ArrayReturn,
                    name: function.name.clone(),
                    position: function.position.clone(),
                });
            } else {
                self.validate(ret, &function.name, &function.position);
            }
        }

        let f = self.inference.temp_for(function.id, function_type(function));

        self.symbols.open_scope();
        let mut params = vec![];
        for param in &function.params {
            let p = self.inference.temp_for(param.id, param.ty.clone());
            if param.name == function.name {
                self.sink.warning(format_args!(
                    "{}: Parameter {} has the same name as its function",
                    location(&param.position),
                    param.name
                ));
            }
            let symbol = Symbol::new(&param.name, SymbolKind::Parameter, param.position.clone())
                .with_type(param.ty.clone())
                .with_temp(p);
            self.insert(symbol);
            params.push(Term::from(p));
        }

        let body = self.expression(&function.body);
        if let Some(ret) = &function.ret {
            self.inference.spec(body, ret);
        }
        self.inference.spec(f, Term::curried(params, body));
        self.symbols.close_scope();
    }

    fn validate(&mut self, ty: &Type, name: &str, position: &Span) {
        if let Err(kind) = self.types.validate_within(ty, &self.groups) {
            self.report(SemanticError::InvalidType {
                kind,
                name: name.to_string(),
                position: position.clone(),
            });
        }
    }
}

/// The type a binding has according to the source alone.
fn declared_type(def: &Def) -> Option<Type> {
    match def {
        Def::Function(function) => function_type(function),
        Def::Constant(constant) => constant.ty.clone(),
        Def::Variable(variable) => variable.ty.clone().map(Type::reference),
        Def::ArrayVariable(array) => array
            .ty
            .clone()
            .map(|ty| Type::array(ty, array.dims.len())),
    }
}

/// `τ1 -> .. -> τn -> τ`, if every parameter and the result are annotated.
fn function_type(function: &FunctionDef) -> Option<Type> {
    let ret = function.ret.clone()?;
    let params = function
        .params
        .iter()
        .map(|param| param.ty.clone())
        .collect::<Option<Vec<_>>>()?;
    Some(Type::curried(params, ret))
}

/// Every kind except `ref`.
fn non_ref_kinds() -> impl Iterator<Item = TypeKind> {
    TypeKind::ALL.into_iter().filter(|kind| *kind != TypeKind::Ref)
}

/// Analyze `program` with a fresh symbol table and tag allocator.
pub fn analyze(
    program: &Program,
    types: &mut TypeTable,
    sink: &mut dyn DiagnosticSink,
) -> Analysis {
    Analyzer::new(types, TagAllocator::new(), sink).analyze(program)
}
