//! # Symbol Table
//!
//! A stack of lexical scopes mapping names to their declarations. The
//! bottom scope holds the runtime library and is never closed.
//!
//! Scopes can be hidden. A hidden scope keeps its symbols but lookups skip
//! it, which is how a non-recursive `let` keeps its own bindings out of
//! reach while its right-hand sides are analyzed.

use std::collections::HashMap;

use lachs::Span;
use thiserror::Error;

use crate::ast::location;
use crate::infer::Tag;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Constant,
    Library,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type, if any.
    pub ty: Option<Type>,
    /// TempType standing for this symbol's type during inference.
    pub temp: Option<Tag>,
    pub position: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, position: Span) -> Self {
        Symbol {
            name: name.into(),
            kind,
            ty: None,
            temp: None,
            position,
        }
    }

    pub fn with_type(mut self, ty: Option<Type>) -> Self {
        self.ty = ty;
        self
    }

    pub fn with_temp(mut self, temp: Tag) -> Self {
        self.temp = Some(temp);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("{}: Duplicate identifier: {name}, previous definition at {}", location(.position), location(.previous))]
    Redefinition {
        name: String,
        position: Span,
        previous: Span,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
    visible: bool,
    nesting: usize,
}

impl Scope {
    fn new(nesting: usize) -> Self {
        Scope {
            symbols: vec![],
            index: HashMap::new(),
            visible: true,
            nesting,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    /// Symbols in insertion order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Depth of this scope; the library scope is 0.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    fn insert(&mut self, symbol: Symbol) {
        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table holding only the library scope.
    pub fn new() -> Self {
        let mut library = Scope::new(0);
        for (name, ty) in library_signatures() {
            library.insert(Symbol::new(name, SymbolKind::Library, Span::default()).with_type(Some(ty)));
        }
        SymbolTable {
            scopes: vec![library],
        }
    }

    /// Push a new, visible scope and return it.
    pub fn open_scope(&mut self) -> &mut Scope {
        let nesting = self.scopes.len();
        tracing::trace!(nesting, "open scope");
        self.scopes.push(Scope::new(nesting));
        self.current_mut()
    }

    /// Pop the innermost scope. The library scope is never removed.
    pub fn close_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() <= 1 {
            tracing::warn!("refusing to close the library scope");
            return None;
        }
        let scope = self.scopes.pop();
        tracing::trace!(nesting = self.scopes.len(), "close scope");
        scope
    }

    pub fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Number of open scopes, the library scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Insert into the innermost scope.
    ///
    /// A name already bound in that scope is a redefinition: the earlier
    /// symbol stays and `symbol` is dropped. Shadowing an outer scope is fine.
    pub fn insert_symbol(&mut self, symbol: Symbol) -> Result<(), SymbolError> {
        let scope = self.current_mut();
        if let Some(existing) = scope.get(&symbol.name) {
            return Err(SymbolError::Redefinition {
                name: symbol.name,
                position: symbol.position,
                previous: existing.position.clone(),
            });
        }
        scope.insert(symbol);
        Ok(())
    }

    /// Innermost visible binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .filter(|scope| scope.visible)
            .find_map(|scope| scope.get(name))
    }
}

/// The runtime library available to every program.
pub fn library_signatures() -> Vec<(&'static str, Type)> {
    let unary = |from: Type, to: Type| Type::func(from, to);
    let float_fn = || unary(Type::Float, Type::Float);

    vec![
        ("print_int", unary(Type::Int, Type::Unit)),
        ("print_bool", unary(Type::Bool, Type::Unit)),
        ("print_char", unary(Type::Char, Type::Unit)),
        ("print_float", unary(Type::Float, Type::Unit)),
        ("print_string", unary(Type::String, Type::Unit)),
        ("read_int", unary(Type::Unit, Type::Int)),
        ("read_bool", unary(Type::Unit, Type::Bool)),
        ("read_char", unary(Type::Unit, Type::Char)),
        ("read_float", unary(Type::Unit, Type::Float)),
        ("read_string", unary(Type::Unit, Type::String)),
        ("abs", unary(Type::Int, Type::Int)),
        ("fabs", float_fn()),
        ("sqrt", float_fn()),
        ("sin", float_fn()),
        ("cos", float_fn()),
        ("tan", float_fn()),
        ("atan", float_fn()),
        ("exp", float_fn()),
        ("ln", float_fn()),
        ("pi", unary(Type::Unit, Type::Float)),
        ("incr", unary(Type::reference(Type::Int), Type::Unit)),
        ("decr", unary(Type::reference(Type::Int), Type::Unit)),
        ("float_of_int", unary(Type::Int, Type::Float)),
        ("int_of_float", unary(Type::Float, Type::Int)),
        ("round", unary(Type::Float, Type::Int)),
        ("int_of_char", unary(Type::Char, Type::Int)),
        ("char_of_int", unary(Type::Int, Type::Char)),
    ]
}
