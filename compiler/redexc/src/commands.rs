//! Subcommand implementations for the `redexc` binary.
//!
//! Each command reports to stdout/stderr and returns the process exit code.

use std::io::IsTerminal;
use std::process::ExitCode;

use redex_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use redex_diagnostic::{Diagnostic, ErrorCode, ErrorDocs};
use redex_eval::InterpreterConfig;

use crate::runner::Outcome;
use crate::{compile_source, run_assertions, CompileOptions, Compiled, Config};

fn read_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(error) => {
            eprintln!("error: cannot read `{path}`: {error}");
            None
        }
    }
}

fn report(path: &str, source: &str, diagnostic: &Diagnostic) {
    let is_tty = std::io::stderr().is_terminal();
    let mut emitter =
        TerminalEmitter::with_color_mode(std::io::stderr(), ColorMode::Auto, is_tty).with_source(path, source);
    emitter.emit(diagnostic);
    emitter.flush();
}

/// Read and compile `path`, rendering the diagnostic on failure.
fn compile_file(path: &str, options: &CompileOptions) -> Option<Compiled> {
    let source = read_file(path)?;
    match compile_source(&source, options) {
        Ok(compiled) => Some(compiled),
        Err(diagnostic) => {
            report(path, &source, &diagnostic);
            None
        }
    }
}

/// `redexc check <file>`: compile only.
pub fn check_file(config: &Config) -> ExitCode {
    let path = config.input.as_deref().unwrap_or_default();
    let Some(compiled) = compile_file(path, &CompileOptions::default()) else {
        return ExitCode::FAILURE;
    };
    if config.verbose {
        println!(
            "{path}: ok ({} entries, {} statements)",
            compiled.entries().len(),
            compiled.module().body.len()
        );
    }
    ExitCode::SUCCESS
}

/// `redexc emit <file>`: print the generated IR.
pub fn emit_file(config: &Config) -> ExitCode {
    let path = config.input.as_deref().unwrap_or_default();
    let options = CompileOptions { emit_prints: true };
    let Some(compiled) = compile_file(path, &options) else {
        return ExitCode::FAILURE;
    };
    print!("{}", compiled.module());
    ExitCode::SUCCESS
}

/// `redexc run <file>`: compile, then run every entry point.
pub fn run_file(config: &Config) -> ExitCode {
    let path = config.input.as_deref().unwrap_or_default();
    let options = CompileOptions { emit_prints: true };
    let Some(compiled) = compile_file(path, &options) else {
        return ExitCode::FAILURE;
    };
    for source in &compiled.module().foreign_sources {
        tracing::warn!(source = %source, "foreign sources are not loaded; foreign calls will fail");
    }

    let summary = match run_assertions(&compiled, config.filter.as_deref(), InterpreterConfig::default()) {
        Ok(summary) => summary,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    for result in &summary.results {
        match &result.outcome {
            Outcome::Passed if config.verbose => println!("  PASS {}", result.description),
            Outcome::Passed => {}
            Outcome::Failed(message) => {
                println!("  FAIL {}", result.description);
                println!("       {message}");
            }
        }
    }
    println!(
        "{} passed, {} failed, {} filtered out",
        summary.passed, summary.failed, summary.filtered_out
    );
    if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// `redexc explain <code>`: print the documentation for an error code.
pub fn explain_error(config: &Config) -> ExitCode {
    let text = config.input.as_deref().unwrap_or_default();
    let Some(code) = ErrorCode::parse(text) else {
        eprintln!("Unknown error code: {text}");
        eprintln!();
        eprintln!("Codes have the format EXXXX where X is a digit.");
        eprintln!("Examples: E1001, E2003, E3002");
        return ExitCode::FAILURE;
    };
    if let Some(doc) = ErrorDocs::get(code) {
        println!("{doc}");
        ExitCode::SUCCESS
    } else {
        eprintln!("No documentation available for {code}");
        ExitCode::FAILURE
    }
}
