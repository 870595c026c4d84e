use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use llamac::diagnostics::{DiagnosticSink, Logger, LoggerMock};
use llamac::{CompileOptions, compile};

/// Parse and analyze a Llama program
#[derive(Parser)]
#[command(name = "llamac")]
#[command(version = "0.1.0")]
#[command(about = "Llama compiler front end", long_about = None)]
struct Args {
    /// Source file; `-` or nothing reads standard input
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the parsed program as s-expressions
    #[arg(long)]
    dump_ast: bool,

    /// Print every recorded type constraint
    #[arg(long)]
    dump_constraints: bool,

    /// Stop after parsing
    #[arg(long)]
    parse_only: bool,

    /// Count diagnostics without printing them
    #[arg(long)]
    quiet: bool,
}

fn read_source(file: Option<&PathBuf>) -> anyhow::Result<(String, String)> {
    match file {
        Some(path) if path.as_os_str() != "-" => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((path.display().to_string(), source))
        }
        _ => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read standard input")?;
            Ok(("<stdin>".to_string(), source))
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    let (file_name, source) = read_source(args.file.as_ref())?;

    let mut sink: Box<dyn DiagnosticSink> = if args.quiet {
        Box::new(LoggerMock::new())
    } else {
        Box::new(Logger::new(&file_name))
    };

    let options = CompileOptions {
        file_name,
        stop_after_parse: args.parse_only,
    };
    let compilation = compile(&source, &options, sink.as_mut())?;

    if args.dump_ast {
        if let Some(program) = &compilation.program {
            print!("{program}");
        }
    }
    if args.dump_constraints {
        if let Some(analysis) = &compilation.analysis {
            for constraint in &analysis.constraints {
                println!("{constraint}");
            }
        }
    }

    tracing::info!(
        errors = sink.errors(),
        warnings = sink.warnings(),
        "{}",
        options.file_name
    );
    Ok(sink.success())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("LLAMA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
