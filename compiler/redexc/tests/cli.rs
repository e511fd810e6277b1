#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

//! The `redexc` binary: exit codes and reporting.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

const ARITH: &str = "
(define-language Arith
  (e ::= (+ e e) n)
  (n ::= number))
";

fn source_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn redexc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_redexc"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn check_accepts_a_valid_file() {
    let file = source_file(&format!("{ARITH}(redex-match Arith n_1 5)"));
    let output = redexc(&["check", file.path().to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn check_renders_diagnostics_against_the_source() {
    let file = source_file("(redex-match Nope x 1)");
    let path = file.path().to_str().unwrap().to_owned();
    let output = redexc(&["check", &path]);
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("E2004"), "{text}");
    assert!(text.contains(&format!("{path}:1:")), "{text}");
}

#[test]
fn run_reports_failures_and_exits_nonzero() {
    let file = source_file(&format!(
        "{ARITH}
         (redex-match-assert-equal Arith n_1 5 (((n_1 5))))
         (redex-match-assert-equal Arith n_1 5 (((n_1 6))))"
    ));
    let output = redexc(&["run", file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("FAIL redex-match-assert-equal Arith n_1 5"), "{text}");
    assert!(text.contains("1 passed, 1 failed, 0 filtered out"), "{text}");
}

#[test]
fn run_filter_selects_entries() {
    let file = source_file(&format!(
        "{ARITH}
         (redex-match-assert-equal Arith n_1 5 (((n_1 5))))
         (term-let-assert-equal Arith ((n_1 1)) n_1 2)"
    ));
    let output = redexc(&["run", file.path().to_str().unwrap(), "--filter=redex-match"]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("1 passed, 0 failed, 1 filtered out"));
}

#[test]
fn run_prints_redex_match_results() {
    let file = source_file(&format!("{ARITH}(redex-match Arith (n_1 ...) (1 2))"));
    let output = redexc(&["run", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("(((n_1 (1 2))))"), "{}", stdout(&output));
}

#[test]
fn emit_prints_generated_functions() {
    let file = source_file(&format!("{ARITH}(redex-match Arith n_1 5)"));
    let output = redexc(&["emit", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("redex_match_"), "{text}");
    assert!(text.contains("matches_Arith_"), "{text}");
}

#[test]
fn explain_prints_documentation() {
    let output = redexc(&["explain", "E2003"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("E2003"));

    let output = redexc(&["explain", "nonsense"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn bad_arguments_print_usage() {
    let output = redexc(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown command `frobnicate`"));
    assert!(stdout(&output).contains("Usage: redexc"));
}
