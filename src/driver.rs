//! One compilation unit, end to end: lex, parse, analyze.
//!
//! Parsing and analysis run on a thread of their own with a
//! [`STACK_SIZE`] stack, since both recurse once per nesting level of the
//! source. Diagnostics are buffered there and replayed into the caller's
//! sink in the order they were found.

use anyhow::Context;

use crate::ast::Program;
use crate::diagnostics::{Buffer, DiagnosticSink};
use crate::infer::TagAllocator;
use crate::lexer::{Token, lex};
use crate::parser::parse;
use crate::sem::{Analysis, Analyzer};
use crate::types::TypeTable;

/// Stack of the compiler thread.
pub const STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name used when reporting diagnostics.
    pub file_name: String,
    /// Skip semantic analysis.
    pub stop_after_parse: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            file_name: "<stdin>".to_string(),
            stop_after_parse: false,
        }
    }
}

#[derive(Debug)]
pub struct Compilation {
    /// `None` if the source did not parse.
    pub program: Option<Program>,
    /// `None` if analysis did not run.
    pub analysis: Option<Analysis>,
    pub types: TypeTable,
}

/// Compile `source`, reporting every diagnostic to `sink`.
///
/// Only a lexing failure, or failing to start the compiler thread, is an
/// `Err`; everything else is reported to the sink, and the unit succeeded
/// iff `sink.success()` afterwards.
pub fn compile(
    source: &str,
    options: &CompileOptions,
    sink: &mut dyn DiagnosticSink,
) -> anyhow::Result<Compilation> {
    let tokens = lex(source)
        .map_err(|err| err.context(format!("failed to tokenize {}", options.file_name)))?;
    tracing::debug!(file = %options.file_name, tokens = tokens.len(), "lexed");

    let (compilation, diagnostics) = on_compiler_thread(tokens, options)?;
    diagnostics.replay(sink);

    tracing::debug!(
        file = %options.file_name,
        errors = sink.errors(),
        warnings = sink.warnings(),
        "compiled"
    );

    Ok(compilation)
}

fn front_end(tokens: Vec<Token>, options: &CompileOptions) -> (Compilation, Buffer) {
    let mut diagnostics = Buffer::new();
    let parsed = parse(tokens, &mut diagnostics);
    let mut types = parsed.types;

    let analysis = match &parsed.program {
        Some(program) if !options.stop_after_parse => {
            let analyzer = Analyzer::new(&mut types, TagAllocator::new(), &mut diagnostics);
            Some(analyzer.analyze(program))
        }
        _ => None,
    };

    let compilation = Compilation {
        program: parsed.program,
        analysis,
        types,
    };
    (compilation, diagnostics)
}

/// Run [`front_end`] on a scoped thread with a [`STACK_SIZE`] stack. A
/// panic on that thread resumes on this one.
fn on_compiler_thread(
    tokens: Vec<Token>,
    options: &CompileOptions,
) -> anyhow::Result<(Compilation, Buffer)> {
    std::thread::scope(|scope| -> anyhow::Result<(Compilation, Buffer)> {
        let handle = std::thread::Builder::new()
            .name("llamac".to_string())
            .stack_size(STACK_SIZE)
            .spawn_scoped(scope, move || front_end(tokens, options))
            .context("failed to start the compiler thread")?;
        match handle.join() {
            Ok(output) => Ok(output),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::LoggerMock;

    #[test]
    fn test_compile_clean_program() {
        let mut sink = LoggerMock::new();
        let out = compile(
            "let rec fact n = if n = 0 then 1 else n * fact (n - 1)",
            &CompileOptions::default(),
            &mut sink,
        )
        .unwrap();
        assert!(sink.perfect_success());
        assert!(out.program.is_some());
        assert!(out.analysis.is_some());
    }

    #[test]
    fn test_stop_after_parse() {
        let mut sink = LoggerMock::new();
        let options = CompileOptions {
            stop_after_parse: true,
            ..CompileOptions::default()
        };
        let out = compile("let x = y", &options, &mut sink).unwrap();
        assert!(out.analysis.is_none());
        assert!(sink.success());
    }

    #[test]
    fn test_diagnostics_reach_the_caller_in_order() {
        let mut buffer = Buffer::new();
        compile(
            "let a = x\nlet f f = 1\nlet b = y",
            &CompileOptions::default(),
            &mut buffer,
        )
        .unwrap();
        let messages: Vec<&str> = buffer
            .records()
            .iter()
            .map(|(_, message)| message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "1:9: Unknown identifier: x",
                "2:7: Parameter f has the same name as its function",
                "3:9: Unknown identifier: y",
            ]
        );
    }

    #[test]
    fn test_syntax_error_skips_analysis() {
        let mut sink = LoggerMock::new();
        let out = compile("let x = in", &CompileOptions::default(), &mut sink).unwrap();
        assert!(out.program.is_none());
        assert!(out.analysis.is_none());
        assert_eq!(sink.errors(), 1);
    }
}
