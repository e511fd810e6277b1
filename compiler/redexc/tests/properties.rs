#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

//! Behavioral properties of compiled matchers, exercised end to end:
//! source text is compiled, loaded into the interpreter and run.

mod common;

use common::{binds, compile, Session, ARITH};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use redex_diagnostic::ErrorCode;
use redex_ir::{Form, Pattern, RepeatMode};
use redex_patterns::holes::solve;
use redex_patterns::Language;
use redexc::{compile_source, run_assertions, CompileOptions};
use rustc_hash::FxHashMap;

// ── Constraint checks ───────────────────────────────────────────────

#[test]
fn repeated_variable_requires_equal_terms() {
    let mut session = Session::new(
        "(redex-match Arith (n_1 n_1) (5 5))
         (redex-match Arith (n_1 n_1) (5 6))",
    );
    assert_eq!(session.matches(0), vec![binds(&[("n_1", "5")])]);
    assert_eq!(session.matches(1), Vec::<common::Bindings>::new());
}

proptest! {
    #[test]
    fn repeated_variable_matches_iff_equal(a in 0i64..1000, b in 0i64..1000) {
        let mut session = Session::new(&format!("(redex-match Arith (n_1 n_1) ({a} {b}))"));
        let found = session.matches(0);
        if a == b {
            prop_assert_eq!(found, vec![binds(&[("n_1", &a.to_string())])]);
        } else {
            prop_assert!(found.is_empty());
        }
    }
}

// ── In-hole ─────────────────────────────────────────────────────────

#[test]
fn in_hole_finds_every_numeric_leaf() {
    let mut session = Session::new("(redex-match Arith (in-hole E_1 n_1) (+ 1 (+ 2 3)))");
    let mut expected = vec![
        binds(&[("E_1", "(+ hole (+ 2 3))"), ("n_1", "1")]),
        binds(&[("E_1", "(+ 1 (+ hole 3))"), ("n_1", "2")]),
        binds(&[("E_1", "(+ 1 (+ 2 hole))"), ("n_1", "3")]),
    ];
    expected.sort();
    assert_eq!(session.matches(0), expected);
}

#[test]
fn in_hole_context_must_have_one_hole() {
    let source = format!("{ARITH}(redex-match Arith (in-hole e_1 n_1) (+ 1 2))");
    let error = compile_source(&source, &CompileOptions::default()).unwrap_err();
    assert_eq!(error.code, ErrorCode::E2007);
}

#[test]
fn recursive_sequence_grammar_can_frame_a_hole() {
    let mut session = Session::new(
        "(define-language Tree (t ::= (t ...)))
         (redex-match Tree (in-hole (t_1 hole) number_1) (() 5))",
    );
    assert_eq!(session.matches(0), vec![binds(&[("number_1", "5"), ("t_1", "()")])]);
}

// ── Ellipses ────────────────────────────────────────────────────────

#[test]
fn trailing_element_is_required() {
    let mut session = Session::new(
        "(redex-match Arith (n_1 ... n_2) (1 2 3))
         (redex-match Arith (n_1 ... n_2) ())",
    );
    assert_eq!(session.matches(0), vec![binds(&[("n_1", "(1 2)"), ("n_2", "3")])]);
    assert!(session.matches(1).is_empty());
}

#[test]
fn overlapping_repeats_try_every_split() {
    let mut session = Session::new("(redex-match Arith (e_1 ... e_2 ...) (1 2))");
    let mut expected = vec![
        binds(&[("e_1", "()"), ("e_2", "(1 2)")]),
        binds(&[("e_1", "(1)"), ("e_2", "(2)")]),
        binds(&[("e_1", "(1 2)"), ("e_2", "()")]),
    ];
    expected.sort();
    assert_eq!(session.matches(0), expected);
}

#[test]
fn nested_ellipses_bind_nested_sequences() {
    let mut session = Session::new("(redex-match Arith ((n_1 ...) ...) ((1 2) () (3)))");
    assert_eq!(session.matches(0), vec![binds(&[("n_1", "((1 2) () (3))")])]);
}

#[test]
fn mismatched_ellipsis_depths_are_rejected() {
    let source = format!("{ARITH}(redex-match Arith ((n_1 ...) ... n_1 ...) ())");
    let error = compile_source(&source, &CompileOptions::default()).unwrap_err();
    assert_eq!(error.code, ErrorCode::E3001);
    assert!(error.message.contains("n_1"), "{}", error.message);
}

// ── Early rejection ─────────────────────────────────────────────────

#[test]
fn short_sequences_are_rejected_before_element_matchers_run() {
    let mut session = Session::new(
        "(redex-match Arith (a b c) (x y))
         (redex-match Arith (a b c) (a b c))",
    );
    assert!(session.matches(0).is_empty());
    assert_eq!(session.interpreter.stats().count_prefix("match_literal"), 0);

    session.interpreter.reset_stats();
    assert_eq!(session.matches(1), vec![Vec::new()]);
    assert_eq!(session.interpreter.stats().count_prefix("match_literal"), 3);
}

// ── Determinism classification ──────────────────────────────────────

const MIXED: &str = "
(define-language Mixed
  (e ::= (+ e e) n)
  (n ::= number)
  (x ::= variable-not-otherwise-mentioned))
";

fn repeat_modes(pattern: &str) -> Vec<RepeatMode> {
    let spec = redex_parse::parse_spec(MIXED).unwrap();
    let Form::DefineLanguage(def) = &spec.forms[0] else {
        panic!("expected a language");
    };
    let mut language = Language::new(def).unwrap();
    let prepared = language.prepare(&redex_parse::parse_pattern(pattern).unwrap()).unwrap();
    let Pattern::Sequence(items) = prepared.pattern else {
        panic!("expected a sequence");
    };
    items
        .iter()
        .filter_map(|item| match item {
            Pattern::Repeat { mode, .. } => Some(*mode),
            _ => None,
        })
        .collect()
}

#[test]
fn disjoint_repeats_are_greedy() {
    assert_eq!(
        repeat_modes("(number ... x ...)"),
        vec![RepeatMode::Deterministic, RepeatMode::Deterministic]
    );
}

#[test]
fn overlapping_repeats_stay_exhaustive() {
    assert_eq!(
        repeat_modes("(e_1 ... e_2 ...)"),
        vec![RepeatMode::NonDeterministic, RepeatMode::Deterministic]
    );
}

#[test]
fn greedy_repeats_still_find_the_match() {
    let source = format!(
        "{MIXED}(redex-match-assert-equal Mixed (n_1 ... x_1 ...) (1 2 a b) (((n_1 (1 2)) (x_1 (a b)))))"
    );
    let compiled = compile_source(&source, &CompileOptions::default()).unwrap();
    let summary = run_assertions(&compiled, None, common::quiet()).unwrap();
    assert_eq!(summary.failures().collect::<Vec<_>>(), Vec::new());
    assert_eq!(summary.passed, 1);
}

// ── Hole solver ─────────────────────────────────────────────────────

/// Alternatives that never alias another non-terminal, so any
/// combination is free of alias cycles.
const ALTERNATIVES: [&str; 8] = [
    "hole",
    "number",
    "(f A)",
    "(g B C)",
    "(A ...)",
    "(hole B)",
    "(h C hole)",
    "x",
];

fn grammar_source(rules: &[Vec<usize>]) -> String {
    let mut source = String::from("(define-language G");
    for (name, alternatives) in ["A", "B", "C"].iter().zip(rules) {
        source.push_str(&format!(" ({name} ::="));
        for &index in alternatives {
            source.push(' ');
            source.push_str(ALTERNATIVES[index]);
        }
        source.push(')');
    }
    source.push(')');
    source
}

proptest! {
    #[test]
    fn hole_solver_is_idempotent(
        rules in prop::collection::vec(prop::collection::vec(0usize..ALTERNATIVES.len(), 1..4), 3)
    ) {
        let source = grammar_source(&rules);
        let spec = redex_parse::parse_spec(&source).unwrap();
        let Form::DefineLanguage(def) = &spec.forms[0] else {
            panic!("expected a language");
        };
        let language = Language::new(def).unwrap();

        let order: Vec<_> = language.non_terminals().iter().map(|nt| nt.name.clone()).collect();
        let alternatives: FxHashMap<_, Vec<Pattern>> = language
            .non_terminals()
            .iter()
            .map(|nt| (nt.name.clone(), nt.alternatives.iter().map(|p| p.pattern.clone()).collect()))
            .collect();
        let first = solve(&order, &alternatives);
        let second = solve(&order, &alternatives);
        prop_assert_eq!(&first, &second);
        for nt in language.non_terminals() {
            prop_assert_eq!(first[&nt.name], nt.holes);
        }
    }
}

// ── Round trip ──────────────────────────────────────────────────────

fn seq(items: &[i64]) -> String {
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(" "))
}

proptest! {
    #[test]
    fn constructed_terms_match_back_to_their_bindings(
        ns in prop::collection::vec(0i64..100, 0..5),
        a in 0i64..100,
        b in 0i64..100,
    ) {
        let e = format!("(+ {a} {b})");
        let built = format!("({e} {})", ns.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "));
        let built = built.replace(" )", ")");
        let ns = seq(&ns);
        let compiled = compile(&format!(
            "(term-let-assert-equal Arith (((n_1 ...) {ns}) (e_1 {e})) (e_1 n_1 ...) {built})
             (redex-match-assert-equal Arith (e_1 n_1 ...) {built} (((e_1 {e}) (n_1 {ns}))))"
        ));
        let summary = run_assertions(&compiled, None, common::quiet()).unwrap();
        prop_assert_eq!(summary.failures().collect::<Vec<_>>(), Vec::<(&str, &str)>::new());
        prop_assert_eq!(summary.passed, 2);
    }
}
