use std::fmt;

use llamac::diagnostics::{DiagnosticSink, LoggerMock};
use llamac::{CompileOptions, compile};

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

fn check(source: &str) -> Recorder {
    let mut sink = Recorder::default();
    let compilation = compile(source, &CompileOptions::default(), &mut sink).unwrap();
    assert!(
        compilation.program.is_some(),
        "syntax errors: {:?}",
        sink.errors
    );
    sink
}

fn assert_clean(source: &str) {
    let sink = check(source);
    assert!(sink.errors.is_empty(), "errors: {:?}", sink.errors);
    assert!(sink.warnings.is_empty(), "warnings: {:?}", sink.warnings);
}

#[test]
fn recursive_function_sees_itself() {
    assert_clean("let rec f x = f x");
}

#[test]
fn plain_let_does_not_see_itself() {
    let sink = check("let x = x");
    assert_eq!(sink.errors, vec!["1:9: Unknown identifier: x"]);

    let sink = check("let f n = f n");
    assert_eq!(sink.errors, vec!["1:11: Unknown identifier: f"]);
}

#[test]
fn plain_let_sees_the_outer_binding() {
    assert_clean("let x = 1\nlet x = x + 1");
}

#[test]
fn mutual_recursion() {
    assert_clean(
        "let rec even n = if n = 0 then true else odd (n - 1)\n\
         and odd n = if n = 0 then false else even (n - 1)",
    );
}

#[test]
fn simultaneous_let_does_not_see_siblings() {
    let sink = check("let a = 1 and b = a");
    assert_eq!(sink.errors, vec!["1:19: Unknown identifier: a"]);
}

#[test]
fn duplicate_in_one_group() {
    let sink = check("let x = 1 and x = 2");
    assert_eq!(sink.errors.len(), 1);
    assert!(
        sink.errors[0].starts_with("1:15: Duplicate identifier: x, previous definition at 1:5"),
        "{}",
        sink.errors[0]
    );
}

#[test]
fn parameter_named_like_its_function() {
    let sink = check("let f f = f + 1");
    assert!(sink.errors.is_empty(), "{:?}", sink.errors);
    assert_eq!(
        sink.warnings,
        vec!["1:7: Parameter f has the same name as its function"]
    );
}

#[test]
fn duplicate_parameters() {
    let sink = check("let f x x = x");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].contains("Duplicate identifier: x"));
}

#[test]
fn library_functions_are_in_scope() {
    assert_clean("let main = print_string \"hi\"; print_int (abs (-3)); print_float (sqrt 2.0)");
}

#[test]
fn library_can_be_shadowed() {
    assert_clean("let print_int x = x\nlet y = print_int 3");
}

#[test]
fn let_in_scope_ends_after_body() {
    let sink = check("let a = let b = 1 in b + 1\nlet c = b");
    assert_eq!(sink.errors, vec!["2:9: Unknown identifier: b"]);
}

#[test]
fn for_counter_is_local_to_the_loop() {
    let sink = check("let f n = for i = 1 to n do print_int i done; i");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].ends_with("Unknown identifier: i"));
}

#[test]
fn loop_bounds_do_not_see_the_counter() {
    let sink = check("let f n = for i = i to n do () done");
    assert_eq!(sink.errors.len(), 1);
}

#[test]
fn match_clause_bindings_are_per_clause() {
    let source = "type tree = Leaf | Node of int tree tree\n\
                  let f t = match t with Node n l r -> n | Leaf -> n end";
    let sink = check(source);
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].starts_with("2:50: Unknown identifier: n"), "{:?}", sink.errors);
}

#[test]
fn unknown_constructor() {
    let sink = check("let x = Foo 1");
    assert_eq!(sink.errors, vec!["1:9: Unknown constructor: Foo"]);

    let sink = check("let f x = match x with Bar -> 1 end");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].ends_with("Unknown constructor: Bar"));
}

#[test]
fn constructor_arity() {
    let source = "type t = A of int | B\n\
                  let x = A 1 2\n\
                  let y = A\n\
                  let z = B 3\n\
                  let ok = A 1";
    let sink = check(source);
    assert_eq!(sink.errors.len(), 3, "{:?}", sink.errors);
    assert!(sink.errors[0].contains("Constructor A expects 1 argument(s), found 2"));
    assert!(sink.errors[1].contains("Constructor A expects 1 argument(s), found 0"));
    assert!(sink.errors[2].contains("Constructor B expects 0 argument(s), found 1"));
}

#[test]
fn pattern_arity() {
    let source = "type t = A of int | B\n\
                  let f x = match x with A -> 1 | B y -> y end";
    let sink = check(source);
    assert_eq!(sink.errors.len(), 2, "{:?}", sink.errors);
}

#[test]
fn dim_must_be_positive() {
    let sink = check("let mutable a [3, 4] : int\nlet d = dim 0 a");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].contains("Dimension 0 of a is out of range"));
}

#[test]
fn new_of_array_is_invalid() {
    let sink = check("let p = new array of int");
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].contains("Invalid type: ref of array (type of new)"));
}

#[test]
fn diagnostics_keep_going() {
    let source = "let a = x\nlet b = y\nlet c = Z";
    let sink = check(source);
    assert_eq!(sink.errors.len(), 3);
    assert!(sink.errors[0].starts_with("1:"));
    assert!(sink.errors[1].starts_with("2:"));
    assert!(sink.errors[2].starts_with("3:"));
}

#[test]
fn complete_program() {
    let source = r#"
        type tree = Leaf | Node of int tree tree

        let rec insert t x =
          match t with
            Leaf -> Node x Leaf Leaf
          | Node y l r ->
              if x < y then Node y (insert l x) r
              else Node y l (insert r x)
          end

        let rec sum t =
          match t with
            Leaf -> 0
          | Node y l r -> y + sum l + sum r
          end

        let mutable counter : int
        let mutable table [10] : int

        let main =
          let rec build t i =
            if i = 0 then t else build (insert t (i * 7 mod 10)) (i - 1)
          in
          counter := 0;
          for i = 0 to 9 do
            table[i] := i * i;
            incr counter
          done;
          print_int (sum (build Leaf 10));
          print_string "\n"
    "#;
    assert_clean(source);
}

#[test]
fn success_depends_only_on_errors() {
    let mut sink = LoggerMock::new();
    compile("let f f = 1", &CompileOptions::default(), &mut sink).unwrap();
    assert!(sink.success());
    assert!(!sink.perfect_success());
}

#[test]
fn most_negative_integer_is_an_int() {
    assert_clean("let low : int = -9223372036854775808\nlet high : int = 9223372036854775807");
}
