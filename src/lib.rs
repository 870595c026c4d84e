//! # llamac - front end for the Llama language
//!
//! Llama is a strict, ML-family language with `let rec`, algebraic data
//! types, references, mutable arrays and `match`. This crate turns Llama
//! source into an AST, checks it, and records the type constraints a
//! solver would need.
//!
//! ## Pipeline
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Lexer] → Token Stream
//!     ↓
//! [Parser] → AST (ast::Program) + Type Table
//!     ↓
//! [Semantic Analyzer] → scopes, type validation, constraints
//!     ↓
//! [Inference] → TypeSlots (written back where solvable)
//! ```
//!
//! Every phase reports through a [`diagnostics::DiagnosticSink`]; a unit
//! compiled successfully iff the sink recorded no errors.
//!
//! ## Module Structure
//!
//! - [`lexer`] - Tokenization using lachs
//! - [`ast`] - Abstract syntax tree with per-node ids
//! - [`parser`] - Combinator-based grammar with precedence climbing
//! - [`types`] - Type model and the type table
//! - [`symbols`] - Scoped symbol table with the runtime library
//! - [`infer`] - Temps, constraints and the solver seam
//! - [`sem`] - The semantic analyzer
//! - [`fmt`] - S-expression rendering of the AST
//! - [`driver`] - One compilation unit end to end
//!
//! ## Example
//!
//! ```llama
//! type tree = Leaf | Node of int tree tree
//!
//! let rec size t =
//!   match t with
//!     Leaf -> 0
//!   | Node n l r -> 1 + size l + size r
//!   end
//! ```

pub mod ast;
pub mod diagnostics;
pub mod driver;
pub mod fmt;
pub mod infer;
pub mod lexer;
pub mod parser;
pub mod sem;
pub mod symbols;
pub mod types;

pub use driver::{CompileOptions, Compilation, compile};
