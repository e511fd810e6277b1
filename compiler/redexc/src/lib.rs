//! Redex compiler driver.
//!
//! Ties the pipeline together: source text is read into forms
//! (`redex_parse`), compiled to the statement IR (`redex_codegen`), and the
//! assertion forms are executed by the interpreter (`redex_eval`).
//!
//! - [`compile_source`]: parse and compile one specification
//! - [`run_assertions`]: execute its entry points and collect a [`TestSummary`]
//! - [`Config`]: command-line configuration
//! - [`init_tracing`]: install the log subscriber

mod commands;
mod compile;
mod config;
mod runner;
mod tracing_setup;

pub use commands::{check_file, emit_file, explain_error, run_file};
pub use compile::{compile_source, Compiled};
pub use config::{Command, Config};
pub use redex_codegen::CompileOptions;
pub use runner::{run_assertions, AssertionResult, Outcome, TestSummary};
pub use tracing_setup::init_tracing;
