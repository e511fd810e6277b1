#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;
use redex_eval::{buffer_handler, silent_handler};

use super::*;
use crate::{compile_source, CompileOptions};

const SOURCE: &str = "
(define-language Nums (n ::= number))
(redex-match-assert-equal Nums n_1 5 (((n_1 5))))
(redex-match-assert-equal Nums n_1 5 (((n_1 6))))
(redex-match Nums (n_1 ...) (1 2))
";

fn quiet() -> InterpreterConfig {
    InterpreterConfig {
        print: silent_handler(),
        ..InterpreterConfig::default()
    }
}

#[test]
fn counts_passes_and_failures() {
    let compiled = compile_source(SOURCE, &CompileOptions::default()).unwrap();
    let summary = run_assertions(&compiled, None, quiet()).unwrap();
    assert_eq!((summary.passed, summary.failed, summary.total()), (2, 1, 3));
    assert!(summary.has_failures());
    let outcomes: Vec<bool> = summary.results.iter().map(|r| r.outcome.is_passed()).collect();
    assert_eq!(outcomes, vec![true, false, true]);
    assert_eq!(summary.results[2].kind, EntryKind::Match);
}

#[test]
fn failure_messages_show_both_sides() {
    let compiled = compile_source(SOURCE, &CompileOptions::default()).unwrap();
    let summary = run_assertions(&compiled, None, quiet()).unwrap();
    let failures: Vec<(&str, &str)> = summary.failures().collect();
    assert_eq!(failures.len(), 1);
    let (description, message) = failures[0];
    assert!(description.starts_with("redex-match-assert-equal Nums n_1 5"), "{description}");
    assert!(message.contains("expected"), "{message}");
    assert!(message.contains("n_1"), "{message}");
}

#[test]
fn filter_selects_by_description() {
    let compiled = compile_source(SOURCE, &CompileOptions::default()).unwrap();
    let summary = run_assertions(&compiled, Some("redex-match Nums"), quiet()).unwrap();
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.filtered_out, 2);
    assert!(!summary.has_failures());
}

#[test]
fn match_entries_print_when_enabled() {
    let compiled = compile_source(SOURCE, &CompileOptions { emit_prints: true }).unwrap();
    let print = buffer_handler();
    let config = InterpreterConfig {
        print: print.clone(),
        ..InterpreterConfig::default()
    };
    run_assertions(&compiled, Some("redex-match Nums"), config).unwrap();
    let output = print.get_output();
    assert!(output.contains("n_1"), "{output}");
    assert!(output.contains("(1 2)"), "{output}");
}
