use std::fmt;

use llamac::diagnostics::DiagnosticSink;
use llamac::lexer::lex;
use llamac::parser::parse;
use llamac::types::{InvalidType, Type, TypeTable};
use llamac::{CompileOptions, compile};

/// Sink that keeps every error message.
#[derive(Default)]
struct Recorder {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl DiagnosticSink for Recorder {
    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.errors.push(args.to_string());
    }

    fn warning(&mut self, args: fmt::Arguments<'_>) {
        self.warnings.push(args.to_string());
    }

    fn errors(&self) -> usize {
        self.errors.len()
    }

    fn warnings(&self) -> usize {
        self.warnings.len()
    }

    fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }
}

fn types_of(source: &str) -> (TypeTable, Recorder) {
    let mut sink = Recorder::default();
    let parsed = parse(lex(source).unwrap(), &mut sink);
    (parsed.types, sink)
}

fn compile_errors(source: &str) -> Vec<String> {
    let mut sink = Recorder::default();
    compile(source, &CompileOptions::default(), &mut sink).unwrap();
    sink.errors
}

#[test]
fn builtins_are_registered() {
    let table = TypeTable::new();
    for name in ["bool", "char", "float", "int", "unit", "string"] {
        assert!(table.lookup(name).unwrap().is_builtin(), "{name}");
    }
    assert!(table.user_types().is_empty());
}

#[test]
fn user_type_with_constructors() {
    let (table, sink) = types_of("type tree = Leaf | Node of int tree tree");
    assert!(sink.errors.is_empty());
    assert_eq!(table.user_types(), vec!["tree"]);

    let node = table.constructor("Node").unwrap();
    assert_eq!(node.owner, "tree");
    assert_eq!(
        node.signature(),
        Type::curried(
            [Type::Int, Type::user("tree"), Type::user("tree")],
            Type::user("tree")
        )
    );

    let names: Vec<_> = table
        .constructors_of("tree")
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Leaf", "Node"]);
}

#[test]
fn mutually_recursive_group() {
    let (table, sink) = types_of("type expr = Num of int | Add of term term and term = Term of expr");
    assert!(sink.errors.is_empty(), "{:?}", sink.errors);
    assert!(table.contains("expr"));
    assert!(table.contains("term"));
    assert_eq!(table.constructor("Term").unwrap().args, vec![Type::user("expr")]);
}

#[test]
fn redefining_a_builtin_is_rejected() {
    let (table, sink) = types_of("type string = Empty | Cons of char string");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].ends_with("Redefining builtin type string"));
    assert!(table.lookup("string").unwrap().is_builtin());
    assert!(table.constructor("Empty").is_none());
}

#[test]
fn redefining_a_keyword_builtin_is_rejected() {
    for name in ["int", "bool", "char", "float", "unit"] {
        let source = format!("type {name} = Con");
        let errors = compile_errors(&source);
        assert_eq!(
            errors,
            vec![format!("1:6: Redefining builtin type {name}")],
            "{source}"
        );
    }

    let (table, sink) = types_of("type int = Zero | Succ of int");
    assert_eq!(sink.errors.len(), 1);
    assert!(table.lookup("int").unwrap().is_builtin());
    assert!(table.constructor("Succ").is_none());
}

#[test]
fn keyword_builtin_redefinition_still_parses() {
    let mut sink = Recorder::default();
    let compilation = compile("type int = IntCon\nlet x = 1", &CompileOptions::default(), &mut sink)
        .unwrap();
    assert!(compilation.program.is_some());
    assert_eq!(sink.errors.len(), 1);
}

#[test]
fn redefining_a_user_type_keeps_the_first() {
    let (table, sink) = types_of("type t = A\ntype t = B");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].contains("Redefining user type t, previous definition at 1:"));
    assert!(table.constructor("A").is_some());
    assert!(table.constructor("B").is_none());
}

#[test]
fn constructor_redefined_within_a_type() {
    let (table, sink) = types_of("type t = A | A of int");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].contains("Redefining constructor A"));
    assert!(table.constructor("A").unwrap().args.is_empty());
}

#[test]
fn constructor_redefined_across_types() {
    let (table, sink) = types_of("type t = A\ntype u = A of bool");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].starts_with("2:"));
    assert_eq!(table.constructor("A").unwrap().owner, "t");
}

#[test]
fn constructor_argument_must_be_valid() {
    let (_, sink) = types_of("type t = A of undefined | B of array of array of int");
    assert_eq!(sink.errors.len(), 2);
    assert!(sink.errors[0].ends_with("Undefined type: undefined"));
    assert!(sink.errors[1].ends_with("Invalid type: array of array"));
}

#[test]
fn validity_judgment() {
    let table = TypeTable::new();
    let int_array = Type::array(Type::Int, 2);

    assert_eq!(table.validate(&int_array), Ok(()));
    assert_eq!(
        table.validate(&Type::array(int_array.clone(), 1)),
        Err(InvalidType::ArrayOfArray)
    );
    assert_eq!(
        table.validate(&Type::reference(int_array.clone())),
        Err(InvalidType::RefOfArray)
    );
    assert_eq!(
        table.validate(&Type::func(Type::Int, int_array.clone())),
        Err(InvalidType::ArrayReturn)
    );
    assert_eq!(
        table.validate(&Type::func(int_array, Type::Int)),
        Ok(())
    );
    assert_eq!(
        table.validate(&Type::reference(Type::user("nope"))),
        Err(InvalidType::UndefinedType("nope".to_string()))
    );
}

#[test]
fn array_of_array_variable() {
    let errors = compile_errors("let mutable a [3] : array of int");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Invalid type: array of array (type of a)"));
}

#[test]
fn ref_of_array_variable() {
    let errors = compile_errors("let mutable r : array of int");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Invalid type: ref of array (type of r)"));
}

#[test]
fn function_returning_array() {
    let errors = compile_errors("let rec f (n : int) : array of int = f n");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Invalid type: function returning array (type of f)"));
}

#[test]
fn array_parameters_are_fine() {
    let errors = compile_errors("let sum (a : array of int) (n : int) : int = a[n - 1]");
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn types_may_not_be_used_before_their_definition() {
    let errors = compile_errors("let x : color = 1\ntype color = Red | Green");
    assert_eq!(errors, vec!["1:5: Undefined type: color (type of x)"]);

    let errors = compile_errors("let mutable v : color\ntype color = Red");
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].ends_with("Undefined type: color (type of v)"));

    let errors = compile_errors("let f (x : shape) = 1\ntype shape = Sq");
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].ends_with("Undefined type: shape (type of x)"));

    let errors = compile_errors("let r = new shape\ntype shape = Sq");
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].ends_with("Undefined type: shape (type of new)"));
}

#[test]
fn constructors_may_not_be_used_before_their_type() {
    let errors = compile_errors("let x = Red\ntype color = Red | Green\nlet y = Green");
    assert_eq!(errors, vec!["1:9: Unknown constructor: Red"]);
}

#[test]
fn types_are_usable_after_their_definition() {
    let source = "type color = Red | Green\n\
                  let x : color = Red\n\
                  let f (c : color) : color = c\n\
                  let r = new color";
    let errors = compile_errors(source);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn undefined_annotation() {
    let errors = compile_errors("let x : shape = 1");
    assert_eq!(errors, vec!["1:5: Undefined type: shape (type of x)"]);
}
