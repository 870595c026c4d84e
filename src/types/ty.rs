use std::fmt;

/// A source-level type.
///
/// Builtins are plain values. `User` is a nominal reference resolved through
/// the [`TypeTable`](super::TypeTable); nothing here checks that it exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Char,
    Float,
    Int,
    Unit,
    String,
    Array(Box<Type>, usize),
    Func(Box<Type>, Box<Type>),
    Ref(Box<Type>),
    User(String),
}

/// Shape of a type without its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Bool,
    Char,
    Float,
    Int,
    Unit,
    String,
    Array,
    Function,
    Ref,
    User,
}

impl TypeKind {
    pub const ALL: [TypeKind; 10] = [
        TypeKind::Bool,
        TypeKind::Char,
        TypeKind::Float,
        TypeKind::Int,
        TypeKind::Unit,
        TypeKind::String,
        TypeKind::Array,
        TypeKind::Function,
        TypeKind::Ref,
        TypeKind::User,
    ];
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TypeKind::Bool => "bool",
            TypeKind::Char => "char",
            TypeKind::Float => "float",
            TypeKind::Int => "int",
            TypeKind::Unit => "unit",
            TypeKind::String => "string",
            TypeKind::Array => "array",
            TypeKind::Function => "function",
            TypeKind::Ref => "ref",
            TypeKind::User => "user",
        };
        f.write_str(name)
    }
}

impl Type {
    /// The builtin types, in the order they are registered.
    pub const BUILTINS: [Type; 6] = [
        Type::Bool,
        Type::Char,
        Type::Float,
        Type::Int,
        Type::Unit,
        Type::String,
    ];

    pub fn func(from: Type, to: Type) -> Self {
        Type::Func(Box::new(from), Box::new(to))
    }

    /// Curried function type `params[0] -> ... -> result`.
    pub fn curried(params: impl IntoIterator<Item = Type>, result: Type) -> Self {
        let params: Vec<Type> = params.into_iter().collect();
        params
            .into_iter()
            .rev()
            .fold(result, |acc, param| Type::func(param, acc))
    }

    pub fn array(elem: Type, dims: usize) -> Self {
        Type::Array(Box::new(elem), dims)
    }

    pub fn reference(inner: Type) -> Self {
        Type::Ref(Box::new(inner))
    }

    pub fn user(name: impl Into<String>) -> Self {
        Type::User(name.into())
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Bool => TypeKind::Bool,
            Type::Char => TypeKind::Char,
            Type::Float => TypeKind::Float,
            Type::Int => TypeKind::Int,
            Type::Unit => TypeKind::Unit,
            Type::String => TypeKind::String,
            Type::Array(..) => TypeKind::Array,
            Type::Func(..) => TypeKind::Function,
            Type::Ref(_) => TypeKind::Ref,
            Type::User(_) => TypeKind::User,
        }
    }

    /// The builtin registered under `name`, if any.
    pub fn builtin(name: &str) -> Option<Type> {
        Type::BUILTINS
            .into_iter()
            .find(|builtin| builtin.name() == Some(name))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(..))
    }

    pub fn is_builtin(&self) -> bool {
        Type::BUILTINS.contains(self)
    }

    /// Name under which a builtin or user type is registered.
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Bool => Some("bool"),
            Type::Char => Some("char"),
            Type::Float => Some("float"),
            Type::Int => Some("int"),
            Type::Unit => Some("unit"),
            Type::String => Some("string"),
            Type::User(name) => Some(name),
            Type::Array(..) | Type::Func(..) | Type::Ref(_) => None,
        }
    }

    pub fn pretty(&self) -> String {
        match self {
            Type::Array(elem, dims) => {
                let elem = elem.pretty_operand();
                if *dims == 1 {
                    format!("array of {elem}")
                } else {
                    let stars = vec!["*"; *dims].join(", ");
                    format!("array [{stars}] of {elem}")
                }
            }
            Type::Func(from, to) => {
                let from = if matches!(**from, Type::Func(..)) {
                    format!("({})", from.pretty())
                } else {
                    from.pretty()
                };
                format!("{} -> {}", from, to.pretty())
            }
            Type::Ref(inner) => format!("{} ref", inner.pretty_operand()),
            other => other.name().unwrap_or_default().to_string(),
        }
    }

    fn pretty_operand(&self) -> String {
        match self {
            Type::Func(..) | Type::Array(..) => format!("({})", self.pretty()),
            _ => self.pretty(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
