//! S-expression rendering of the AST
//!
//! One definition per line, every compound node in parentheses with its
//! operator first:
//!
//! ```text
//! (let (fun f (x (y : int)) (+ x (* y 2))))
//! (type (tree (Leaf) (Node int tree tree)))
//! ```
//!
//! Used by `--dump-ast` and by tests that check the shape of a parse.

use std::fmt::{self, Display, Write};

use crate::ast::{
    ConstPattern, Def, Definition, Expression, GenidPattern, LetDef, Param, Pattern, Program,
    TypeDefGroup,
};

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for definition in &self.definitions {
            match definition {
                Definition::Let(letdef) => writeln!(f, "{}", sexpr_letdef(letdef))?,
                Definition::Types(group) => writeln!(f, "{}", sexpr_types(group))?,
            }
        }
        Ok(())
    }
}

/// Render one expression, e.g. `(+ 1 (* 2 3))`.
pub fn sexpr(expr: &Expression) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

pub fn sexpr_letdef(letdef: &LetDef) -> String {
    let mut out = String::new();
    write_letdef(&mut out, letdef);
    out
}

pub fn sexpr_types(group: &TypeDefGroup) -> String {
    let mut out = String::from("(type");
    for tdef in &group.tdefs {
        let _ = write!(out, " ({}", tdef.name);
        for constructor in &tdef.constructors {
            out.push_str(" (");
            out.push_str(&constructor.name);
            for arg in &constructor.args {
                let _ = write!(out, " {}", operand_type(arg));
            }
            out.push(')');
        }
        out.push(')');
    }
    out.push(')');
    out
}

/// Types with spaces are parenthesized so that arguments stay apart.
fn operand_type(ty: &crate::types::Type) -> String {
    let rendered = ty.to_string();
    if rendered.contains(' ') {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn write_letdef(out: &mut String, letdef: &LetDef) {
    out.push_str(if letdef.is_rec { "(let rec" } else { "(let" });
    for def in &letdef.defs {
        out.push(' ');
        write_def(out, def);
    }
    out.push(')');
}

fn write_def(out: &mut String, def: &Def) {
    match def {
        Def::Function(function) => {
            let _ = write!(out, "(fun {} (", function.name);
            for (i, param) in function.params.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_param(out, param);
            }
            out.push(')');
            if let Some(ret) = &function.ret {
                let _ = write!(out, " : {}", operand_type(ret));
            }
            out.push(' ');
            write_expr(out, &function.body);
            out.push(')');
        }
        Def::Constant(constant) => {
            let _ = write!(out, "(const {}", constant.name);
            if let Some(ty) = &constant.ty {
                let _ = write!(out, " : {}", operand_type(ty));
            }
            out.push(' ');
            write_expr(out, &constant.body);
            out.push(')');
        }
        Def::Variable(variable) => {
            let _ = write!(out, "(mutable {}", variable.name);
            if let Some(ty) = &variable.ty {
                let _ = write!(out, " : {}", operand_type(ty));
            }
            out.push(')');
        }
        Def::ArrayVariable(array) => {
            let _ = write!(out, "(mutable {} [", array.name);
            write_list(out, &array.dims);
            out.push(']');
            if let Some(ty) = &array.ty {
                let _ = write!(out, " : {}", operand_type(ty));
            }
            out.push(')');
        }
    }
}

fn write_param(out: &mut String, param: &Param) {
    match &param.ty {
        Some(ty) => {
            let _ = write!(out, "({} : {})", param.name, ty);
        }
        None => out.push_str(&param.name),
    }
}

fn write_list(out: &mut String, exprs: &[Expression]) {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_expr(out, expr);
    }
}

/// `(head e1 e2 ..)`
fn write_call(out: &mut String, head: &str, args: &[Expression]) {
    let _ = write!(out, "({head}");
    for arg in args {
        out.push(' ');
        write_expr(out, arg);
    }
    out.push(')');
}

fn write_expr(out: &mut String, expr: &Expression) {
    match expr {
        Expression::Const(c) => {
            let _ = write!(out, "{}", c.value);
        }
        Expression::Genid(genid) => out.push_str(&genid.name),
        Expression::Conid(conid) => out.push_str(&conid.name),
        Expression::Binary(binary) => {
            let _ = write!(out, "({} ", binary.op.symbol());
            write_expr(out, &binary.left);
            out.push(' ');
            write_expr(out, &binary.right);
            out.push(')');
        }
        Expression::Unary(unary) => {
            let _ = write!(out, "({} ", unary.op.symbol());
            write_expr(out, &unary.operand);
            out.push(')');
        }
        Expression::FunctionCall(call) => write_call(out, &call.name, &call.args),
        Expression::ConstructorCall(call) => write_call(out, &call.name, &call.args),
        Expression::Array(access) => {
            let _ = write!(out, "([] {}", access.name);
            for index in &access.indices {
                out.push(' ');
                write_expr(out, index);
            }
            out.push(')');
        }
        Expression::Delete(delete) => {
            out.push_str("(delete ");
            write_expr(out, &delete.expr);
            out.push(')');
        }
        Expression::Dim(dim) => {
            let _ = write!(out, "(dim {} {})", dim.dimension, dim.name);
        }
        Expression::New(new) => {
            let _ = write!(out, "(new {})", operand_type(&new.ty));
        }
        Expression::For(for_expr) => {
            let _ = write!(out, "(for {} ", for_expr.counter);
            write_expr(out, &for_expr.from);
            out.push_str(if for_expr.is_down { " downto " } else { " to " });
            write_expr(out, &for_expr.to);
            out.push(' ');
            write_expr(out, &for_expr.body);
            out.push(')');
        }
        Expression::While(while_expr) => {
            out.push_str("(while ");
            write_expr(out, &while_expr.condition);
            out.push(' ');
            write_expr(out, &while_expr.body);
            out.push(')');
        }
        Expression::If(if_expr) => {
            out.push_str("(if ");
            write_expr(out, &if_expr.condition);
            out.push(' ');
            write_expr(out, &if_expr.then_expr);
            if let Some(else_expr) = &if_expr.else_expr {
                out.push(' ');
                write_expr(out, else_expr);
            }
            out.push(')');
        }
        Expression::LetIn(let_in) => {
            out.push_str("(let-in ");
            write_letdef(out, &let_in.letdef);
            out.push(' ');
            write_expr(out, &let_in.body);
            out.push(')');
        }
        Expression::Match(match_expr) => {
            out.push_str("(match ");
            write_expr(out, &match_expr.scrutinee);
            for clause in &match_expr.clauses {
                out.push_str(" (");
                write_pattern(out, &clause.pattern);
                out.push(' ');
                write_expr(out, &clause.expr);
                out.push(')');
            }
            out.push(')');
        }
    }
}

fn write_pattern(out: &mut String, pattern: &Pattern) {
    match pattern {
        Pattern::Const(ConstPattern { value, .. }) => {
            let _ = write!(out, "{value}");
        }
        Pattern::Genid(GenidPattern { name, .. }) => out.push_str(name),
        Pattern::Constructor(constructor) if constructor.args.is_empty() => {
            out.push_str(&constructor.name)
        }
        Pattern::Constructor(constructor) => {
            let _ = write!(out, "({}", constructor.name);
            for arg in &constructor.args {
                out.push(' ');
                write_pattern(out, arg);
            }
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::LoggerMock;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn render(source: &str) -> String {
        let parsed = parse(lex(source).unwrap(), &mut LoggerMock::new());
        parsed.program.unwrap().to_string()
    }

    #[test]
    fn test_render_function() {
        assert_eq!(
            render("let f x (y : int) = x + y * 2"),
            "(let (fun f (x (y : int)) (+ x (* y 2))))\n"
        );
    }

    #[test]
    fn test_render_types() {
        assert_eq!(
            render("type tree = Leaf | Node of int tree tree"),
            "(type (tree (Leaf) (Node int tree tree)))\n"
        );
    }

    #[test]
    fn test_render_match() {
        assert_eq!(
            render("let g t = match t with Leaf -> 0 | Node n l r -> n end"),
            "(let (fun g (t) (match t (Leaf 0) ((Node n l r) n))))\n"
        );
    }

    #[test]
    fn test_render_variables() {
        assert_eq!(
            render("let mutable a [3, n] : float and mutable x"),
            "(let (mutable a [3 n] : float) (mutable x))\n"
        );
    }
}
