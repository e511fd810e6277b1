//! Redex compiler CLI.

use std::process::ExitCode;

use redexc::{check_file, emit_file, explain_error, init_tracing, run_file, Command, Config};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.trace_tree);

    match config.command {
        Command::Help => {
            print_usage();
            ExitCode::SUCCESS
        }
        Command::Check => check_file(&config),
        Command::Run => run_file(&config),
        Command::Emit => emit_file(&config),
        Command::Explain => explain_error(&config),
    }
}

fn print_usage() {
    println!("Redex compiler");
    println!();
    println!("Usage: redexc <command> [options]");
    println!();
    println!("Commands:");
    println!("  check <file>     Compile a specification and report errors");
    println!("  run <file>       Compile and run its assertion forms");
    println!("  emit <file>      Print the generated code");
    println!("  explain <code>   Explain an error code (e.g. E2003)");
    println!("  help             Show this message");
    println!();
    println!("Options:");
    println!("  --filter=<text>  Only run entries whose form contains <text>");
    println!("  -v, --verbose    Report passing entries too");
    println!("  --trace-tree     Render logs as a span tree (filter with RUST_LOG)");
}
