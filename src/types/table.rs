//! # Type Table
//!
//! Registry of every type and data constructor known to one compilation
//! unit. The builtins are present from the start. User types arrive one
//! `type ... and ...` group at a time through [`TypeTable::process`].
//!
//! Registering a group happens in two phases so that constructors may refer
//! to any type of their own group:
//!
//! 1. every type name of the group is inserted with no constructors;
//! 2. constructors are inserted type by type, in declaration order, and
//!    their argument types are validated against the now complete registry.
//!
//! Constructor names live in one program-wide namespace.

use std::collections::{HashMap, HashSet};

use lachs::Span;

use super::error::{InvalidType, TypeError};
use super::ty::Type;
use crate::ast::{Constructor, NodeId, TDef, TypeDefGroup};

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub name: String,
    /// Defining node and its position; `None` for builtins.
    pub definition: Option<(NodeId, Span)>,
    /// The `type ... and ...` group that introduced this type.
    pub group: Option<NodeId>,
    /// Constructor names in declaration order.
    pub constructors: Vec<String>,
}

impl TypeInfo {
    pub fn is_builtin(&self) -> bool {
        self.definition.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorInfo {
    pub name: String,
    /// Name of the user type this constructor builds.
    pub owner: String,
    pub args: Vec<Type>,
    pub node: NodeId,
    pub group: NodeId,
    pub position: Span,
}

impl ConstructorInfo {
    /// `args[0] -> ... -> owner`
    pub fn signature(&self) -> Type {
        Type::curried(self.args.iter().cloned(), Type::user(&self.owner))
    }
}

#[derive(Debug, Clone)]
pub struct TypeTable {
    types: HashMap<String, TypeInfo>,
    constructors: HashMap<String, ConstructorInfo>,
    processed: HashSet<NodeId>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let types = Type::BUILTINS
            .iter()
            .filter_map(Type::name)
            .map(|name| {
                (
                    name.to_string(),
                    TypeInfo {
                        name: name.to_string(),
                        definition: None,
                        group: None,
                        constructors: vec![],
                    },
                )
            })
            .collect();

        TypeTable {
            types,
            constructors: HashMap::new(),
            processed: HashSet::new(),
        }
    }

    /// Check that `ty` is well formed.
    ///
    /// Shape exclusions are checked before the components, so the outermost
    /// violation is the one reported.
    pub fn validate(&self, ty: &Type) -> Result<(), InvalidType> {
        self.check(ty, &|_: &TypeInfo| true)
    }

    /// Like [`TypeTable::validate`], but a user type only counts as defined
    /// once its group is among `groups`.
    pub fn validate_within(&self, ty: &Type, groups: &HashSet<NodeId>) -> Result<(), InvalidType> {
        self.check(ty, &|info: &TypeInfo| info.group.is_none_or(|group| groups.contains(&group)))
    }

    fn check(&self, ty: &Type, defined: &dyn Fn(&TypeInfo) -> bool) -> Result<(), InvalidType> {
        match ty {
            Type::Bool | Type::Char | Type::Float | Type::Int | Type::Unit | Type::String => Ok(()),
            Type::Array(elem, _) => {
                if elem.is_array() {
                    return Err(InvalidType::ArrayOfArray);
                }
                self.check(elem, defined)
            }
            Type::Func(from, to) => {
                if to.is_array() {
                    return Err(InvalidType::ArrayReturn);
                }
                self.check(from, defined)?;
                self.check(to, defined)
            }
            Type::Ref(inner) => {
                if inner.is_array() {
                    return Err(InvalidType::RefOfArray);
                }
                self.check(inner, defined)
            }
            Type::User(name) => match self.types.get(name) {
                Some(info) if defined(info) => Ok(()),
                _ => Err(InvalidType::UndefinedType(name.clone())),
            },
        }
    }

    /// Register a type-definition group.
    ///
    /// Every problem is collected, in declaration order; a redefined type or
    /// constructor keeps its first definition. Processing the same group a
    /// second time is a no-op.
    pub fn process(&mut self, group: &TypeDefGroup) -> Result<(), Vec<TypeError>> {
        if !self.processed.insert(group.id) {
            return Ok(());
        }

        let mut errors = vec![];

        let mut registered = vec![];
        for tdef in &group.tdefs {
            match self.insert_type(group.id, tdef) {
                Ok(()) => registered.push(tdef),
                Err(err) => errors.push(err),
            }
        }

        for tdef in registered {
            for constructor in &tdef.constructors {
                self.insert_constructor(group.id, tdef, constructor, &mut errors);
            }
        }

        tracing::debug!(
            group = %group.id,
            types = group.tdefs.len(),
            errors = errors.len(),
            "registered type group"
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn insert_type(&mut self, group: NodeId, tdef: &TDef) -> Result<(), TypeError> {
        if let Some(existing) = self.types.get(&tdef.name) {
            let kind = match &existing.definition {
                None => InvalidType::RedefinedBuiltin(tdef.name.clone()),
                Some((_, previous)) => InvalidType::RedefinedType {
                    name: tdef.name.clone(),
                    previous: previous.clone(),
                },
            };
            return Err(TypeError::new(kind, tdef.position.clone()));
        }

        self.types.insert(
            tdef.name.clone(),
            TypeInfo {
                name: tdef.name.clone(),
                definition: Some((tdef.id, tdef.position.clone())),
                group: Some(group),
                constructors: vec![],
            },
        );
        Ok(())
    }

    fn insert_constructor(
        &mut self,
        group: NodeId,
        owner: &TDef,
        constructor: &Constructor,
        errors: &mut Vec<TypeError>,
    ) {
        if let Some(existing) = self.constructors.get(&constructor.name) {
            errors.push(TypeError::new(
                InvalidType::RedefinedConstructor {
                    name: constructor.name.clone(),
                    previous: existing.position.clone(),
                },
                constructor.position.clone(),
            ));
            return;
        }

        if let Some(info) = self.types.get_mut(&owner.name) {
            info.constructors.push(constructor.name.clone());
        }
        self.constructors.insert(
            constructor.name.clone(),
            ConstructorInfo {
                name: constructor.name.clone(),
                owner: owner.name.clone(),
                args: constructor.args.clone(),
                node: constructor.id,
                group,
                position: constructor.position.clone(),
            },
        );

        for arg in &constructor.args {
            if let Err(kind) = self.validate(arg) {
                errors.push(TypeError::new(kind, constructor.position.clone()));
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    pub fn constructor(&self, name: &str) -> Option<&ConstructorInfo> {
        self.constructors.get(name)
    }

    /// A constructor whose group is among `groups`.
    pub fn constructor_within(
        &self,
        name: &str,
        groups: &HashSet<NodeId>,
    ) -> Option<&ConstructorInfo> {
        self.constructor(name).filter(|info| groups.contains(&info.group))
    }

    /// Constructors of `type_name` in declaration order.
    pub fn constructors_of(&self, type_name: &str) -> Vec<&ConstructorInfo> {
        self.types
            .get(type_name)
            .map(|info| {
                info.constructors
                    .iter()
                    .filter_map(|name| self.constructors.get(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names of all user-defined types, sorted.
    pub fn user_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .values()
            .filter(|info| !info.is_builtin())
            .map(|info| info.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constructor(id: u32, name: &str, args: Vec<Type>) -> Constructor {
        Constructor {
            id: NodeId(id),
            name: name.to_string(),
            args,
            position: Span::default(),
        }
    }

    fn tdef(id: u32, name: &str, constructors: Vec<Constructor>) -> TDef {
        TDef {
            id: NodeId(id),
            name: name.to_string(),
            constructors,
            position: Span::default(),
        }
    }

    fn group(id: u32, tdefs: Vec<TDef>) -> TypeDefGroup {
        TypeDefGroup {
            id: NodeId(id),
            tdefs,
            position: Span::default(),
        }
    }

    #[test]
    fn test_builtins_always_valid() {
        let table = TypeTable::new();
        for builtin in Type::BUILTINS {
            assert_eq!(table.validate(&builtin), Ok(()));
            assert!(table.lookup(builtin.name().unwrap()).unwrap().is_builtin());
        }
    }

    #[test]
    fn test_outermost_violation_wins() {
        let table = TypeTable::new();
        let ty = Type::reference(Type::array(Type::array(Type::Int, 1), 1));
        assert_eq!(table.validate(&ty), Err(InvalidType::RefOfArray));
    }

    #[test]
    fn test_nested_violation_found() {
        let table = TypeTable::new();
        let ty = Type::func(Type::Int, Type::reference(Type::array(Type::Int, 2)));
        assert_eq!(table.validate(&ty), Err(InvalidType::RefOfArray));
    }

    #[test]
    fn test_process_is_idempotent() {
        let mut table = TypeTable::new();
        let g = group(0, vec![tdef(1, "color", vec![constructor(2, "Red", vec![])])]);
        assert!(table.process(&g).is_ok());
        assert!(table.process(&g).is_ok());
        assert_eq!(table.constructors_of("color").len(), 1);
    }

    #[test]
    fn test_redefined_type_keeps_constructors_of_first() {
        let mut table = TypeTable::new();
        let g = group(
            0,
            vec![
                tdef(1, "t", vec![constructor(2, "A", vec![])]),
                tdef(3, "t", vec![constructor(4, "B", vec![])]),
            ],
        );
        let errors = table.process(&g).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, InvalidType::RedefinedType { .. }));
        assert!(table.constructor("B").is_none());
        assert_eq!(table.constructors_of("t")[0].name, "A");
    }

    #[test]
    fn test_validate_within_groups() {
        let mut table = TypeTable::new();
        let g = group(5, vec![tdef(1, "color", vec![constructor(2, "Red", vec![])])]);
        table.process(&g).unwrap();

        let color = Type::reference(Type::user("color"));
        let mut groups = HashSet::new();
        assert_eq!(
            table.validate_within(&color, &groups),
            Err(InvalidType::UndefinedType("color".to_string()))
        );
        assert!(table.constructor_within("Red", &groups).is_none());
        assert_eq!(table.validate_within(&Type::Int, &groups), Ok(()));

        groups.insert(NodeId(5));
        assert_eq!(table.validate_within(&color, &groups), Ok(()));
        assert_eq!(table.constructor_within("Red", &groups).unwrap().owner, "color");
        assert_eq!(table.validate(&color), Ok(()));
    }

    #[test]
    fn test_signature() {
        let mut table = TypeTable::new();
        let g = group(
            0,
            vec![tdef(
                1,
                "pair",
                vec![constructor(2, "Pair", vec![Type::Int, Type::Char])],
            )],
        );
        table.process(&g).unwrap();
        let info = table.constructor("Pair").unwrap();
        assert_eq!(info.signature().to_string(), "int -> char -> pair");
        assert_eq!(table.user_types(), vec!["pair"]);
    }
}
