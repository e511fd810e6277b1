#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;
use redex_parse::parse_spec;

use super::*;

const ARITH: &str = "
(define-language Arith
  (e ::= (+ e e) n)
  (n ::= number)
  (E ::= hole (+ E e) (+ e E)))
";

fn compile(source: &str) -> Result<Program, Diagnostic> {
    compile_spec(&parse_spec(source).unwrap(), &CompileOptions::default())
}

fn compile_ok(rest: &str) -> Program {
    compile(&format!("{ARITH}{rest}")).unwrap()
}

#[test]
fn relations_and_metafunctions_are_registered() {
    let program = compile_ok(
        "(define-reduction-relation red Arith
           (--> (in-hole E (+ n_1 n_2)) (in-hole E 0) add))
         (define-metafunction Arith
           double : e -> e
           [(double e_1) (+ e_1 e_1)])",
    );
    let reduce = &program.relations[&Symbol::new("red")];
    assert!(reduce.as_str().starts_with("reduce_red_"));
    let double = &program.metafunctions[&Symbol::new("double")];
    assert!(double.as_str().starts_with("mf_double_"));
    assert!(program.module.function(reduce.as_str()).is_some());
    assert!(program.module.function(double.as_str()).is_some());
    assert!(program.entries.is_empty());
}

#[test]
fn assertion_forms_become_entries_in_order() {
    let program = compile_ok(
        "(redex-match Arith n_1 5)
         (redex-match-assert-equal Arith n_1 5 (((n_1 5))))
         (term-let-assert-equal Arith ((n_1 5)) (+ n_1 n_1) (+ 5 5))",
    );
    let kinds: Vec<EntryKind> = program.entries.iter().map(|entry| entry.kind).collect();
    assert_eq!(kinds, vec![EntryKind::Match, EntryKind::Assertion, EntryKind::Assertion]);
    assert_eq!(program.entries[0].description, "redex-match Arith n_1 5");
    for entry in &program.entries {
        assert!(program.module.function(entry.function.as_str()).is_some());
    }
}

#[test]
fn prints_are_opt_in() {
    let source = format!("{ARITH}(redex-match Arith n_1 5)");
    let spec = parse_spec(&source).unwrap();
    let quiet = compile_spec(&spec, &CompileOptions::default()).unwrap();
    let loud = compile_spec(&spec, &CompileOptions { emit_prints: true }).unwrap();
    assert!(!quiet.module.to_string().contains("print("));
    assert!(loud.module.to_string().contains("print("));
}

#[test]
fn literals_are_hoisted_before_functions() {
    let program = compile_ok("(redex-match Arith n_1 5)");
    let first = program.module.body.first().unwrap();
    assert!(matches!(first, Stmt::Assign { .. }), "{first}");
}

#[test]
fn foreign_sources_are_collected() {
    let program = compile_ok("(require-foreign-source \"helpers.py\")");
    assert_eq!(program.module.foreign_sources, vec!["helpers.py".to_owned()]);
}

#[test]
fn metafunctions_raise_when_no_clause_matches() {
    let program = compile_ok("(define-metafunction Arith inc : n -> n [(inc 0) 1])");
    let name = program.metafunctions[&Symbol::new("inc")].clone();
    let text = program.module.function(name.as_str()).unwrap().to_string();
    assert!(text.contains("inc: no clauses matched for "), "{text}");
    assert!(text.contains("inc: arguments not in domain: "));
    assert!(text.contains("inc: result not in codomain: "));
}

#[test]
fn unknown_language_is_rejected() {
    let error = compile("(redex-match Nope x 1)").unwrap_err();
    assert_eq!(error.code, ErrorCode::E2004);
    assert!(error.primary_span().is_some());
}

#[test]
fn unknown_relation_is_rejected() {
    let error = compile(&format!("{ARITH}(apply-reduction-relation-assert-equal red 1 ())")).unwrap_err();
    assert_eq!(error.code, ErrorCode::E3004);
}

#[test]
fn duplicate_definitions_are_rejected() {
    let error = compile(&format!("{ARITH}{ARITH}")).unwrap_err();
    assert_eq!(error.code, ErrorCode::E2008);
    assert_eq!(error.labels.len(), 2);
}

#[test]
fn template_errors_point_at_the_form() {
    let error = compile(&format!(
        "{ARITH}(define-reduction-relation red Arith (--> (n_1 ...) n_1))"
    ))
    .unwrap_err();
    assert_eq!(error.code, ErrorCode::E3002);
    assert!(error.primary_span().is_some());
}

#[test]
fn pattern_errors_point_at_the_case() {
    let error = compile(&format!(
        "{ARITH}(define-reduction-relation red Arith (--> ((n_1 ...) ... n_1 ...) 0))"
    ))
    .unwrap_err();
    assert_eq!(error.code, ErrorCode::E3001);
    assert!(error.primary_span().is_some());
}

#[test]
fn term_let_rejects_symbols_bound_twice() {
    let error = compile(&format!(
        "{ARITH}(term-let-assert-equal Arith ((n_1 1) (n_1 2)) n_1 1)"
    ))
    .unwrap_err();
    assert_eq!(error.code, ErrorCode::E3001);
}
