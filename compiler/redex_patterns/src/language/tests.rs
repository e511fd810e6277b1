#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;
use redex_ir::{Form, RepeatMode};
use redex_parse::{parse_pattern, parse_spec};

use super::*;

fn language(source: &str) -> Result<Language, Diagnostic> {
    let spec = parse_spec(source).unwrap();
    let Some(Form::DefineLanguage(def)) = spec.forms.into_iter().next() else {
        panic!("expected a define-language form");
    };
    Language::new(&def)
}

fn arith() -> Language {
    language(
        "(define-language Arith
           (e ::= (+ e e) n)
           (n ::= number)
           (E ::= hole (+ E e) (+ e E)))",
    )
    .unwrap()
}

fn prepare(language: &mut Language, source: &str) -> Result<PreparedPattern, Diagnostic> {
    language.prepare(&parse_pattern(source).unwrap())
}

#[test]
fn grammar_is_indexed_in_order() {
    let language = arith();
    let names: Vec<&str> = language.non_terminals().iter().map(|nt| nt.name.as_str()).collect();
    assert_eq!(names, vec!["e", "n", "E"]);
    assert_eq!(language.name().as_str(), "Arith");
    assert_eq!(language.non_terminal("E").unwrap().holes, Some(HoleRange::ONE));
    assert_eq!(language.non_terminal("e").unwrap().holes, Some(HoleRange::ZERO));
    assert!(language.non_terminal("x").is_none());
    assert!(language.mentioned().contains("+"));
}

#[test]
fn productions_do_not_constrain_repeated_names() {
    let language = arith();
    let plus = &language.non_terminal("e").unwrap().alternatives[0];
    assert!(plus.synthetic.is_empty());
    assert_eq!(plus.pattern.to_string(), "(+ e#0 e#1)");
}

#[test]
fn duplicate_non_terminal_is_rejected() {
    let error = language("(define-language L (e ::= 1) (e ::= 2))").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2001);
    assert_eq!(error.labels.len(), 2);
}

#[test]
fn underscore_in_non_terminal_is_rejected() {
    let error = language("(define-language L (e_1 ::= 1))").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2002);
}

#[test]
fn self_alias_is_a_cycle() {
    let error = language("(define-language L (x ::= x))").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2003);
    assert!(error.message.contains("x -> x"), "{}", error.message);
}

#[test]
fn mutual_alias_cycle_reports_the_path() {
    let error = language("(define-language L (x ::= 1 y) (y ::= x))").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2003);
    assert!(error.message.contains("x -> y -> x"), "{}", error.message);
}

#[test]
fn recursion_through_sequences_is_not_a_cycle() {
    assert!(language("(define-language L (x ::= (s x) 0))").is_ok());
}

#[test]
fn bad_underscore_in_production_is_rejected() {
    let error = language("(define-language L (e ::= foo_1))").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2005);
    assert!(error.primary_span().is_some());
}

#[test]
fn prepare_runs_the_whole_pipeline() {
    let mut language = arith();
    let prepared = prepare(&mut language, "(n_1 ... n_1 ...)").unwrap();
    assert_eq!(
        prepared.pattern.to_string(),
        "(n_1 ... n_1#0 ... #check(n_1 n_1#0))"
    );
    assert_eq!(prepared.synthetic, vec![Symbol::new("n_1#0")]);
    assert_eq!(prepared.depths["n_1"], 1);
    assert_eq!(prepared.depths["n_1#0"], 1);
    let Pattern::Sequence(items) = &prepared.pattern else {
        panic!("expected a sequence");
    };
    assert!(matches!(items[0], Pattern::Repeat { mode: RepeatMode::NonDeterministic, .. }));
    assert!(matches!(items[1], Pattern::Repeat { mode: RepeatMode::Deterministic, .. }));
}

#[test]
fn prepare_records_mentioned_variables() {
    let mut language = arith();
    assert!(!language.mentioned().contains("lambda"));
    prepare(&mut language, "(lambda e)").unwrap();
    assert!(language.mentioned().contains("lambda"));
}

#[test]
fn prepare_rejects_depth_mismatch() {
    let mut language = arith();
    let error = prepare(&mut language, "((n_1 ...) ... n_1 ...)").unwrap_err();
    assert_eq!(error.code, ErrorCode::E3001);
}

#[test]
fn in_hole_context_needs_exactly_one_hole() {
    let mut language = arith();
    assert!(prepare(&mut language, "(in-hole E_1 n_1)").is_ok());
    let error = prepare(&mut language, "(in-hole e_1 n_1)").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2007);
    assert!(error.message.contains("(0, 0)"), "{}", error.message);
    let error = prepare(&mut language, "(in-hole (E E) n)").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2007);
}

#[test]
fn in_hole_inside_a_production_is_validated() {
    let error = language("(define-language L (e ::= 1) (P ::= (in-hole e 1)))").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2007);
}

#[test]
fn unproductive_context_is_rejected() {
    let mut language = language("(define-language L (C ::= (s C)))").unwrap();
    let error = prepare(&mut language, "(in-hole C 1)").unwrap_err();
    assert!(error.message.contains("no finite term"), "{}", error.message);
}

#[test]
fn context_through_a_recursive_repeat_is_accepted() {
    let mut language = language("(define-language T (t ::= (t ...)))").unwrap();
    assert_eq!(language.non_terminal("t").unwrap().holes, Some(HoleRange::ZERO));
    assert!(prepare(&mut language, "(in-hole (t_1 hole) number_1)").is_ok());
}
