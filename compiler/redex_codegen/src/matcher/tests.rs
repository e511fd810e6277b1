#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;
use redex_ir::code::Stmt;
use redex_ir::Form;
use redex_parse::{parse_pattern, parse_spec};

use super::*;
use crate::context::CompileOptions;

fn arith() -> Language {
    let spec = parse_spec(
        "(define-language Arith
           (e ::= (+ e e) n)
           (n ::= number)
           (E ::= hole (+ E e) (+ e E)))",
    )
    .unwrap();
    let Some(Form::DefineLanguage(def)) = spec.forms.into_iter().next() else {
        panic!("expected a define-language form");
    };
    Language::new(&def).unwrap()
}

struct Compiled {
    entry: Symbol,
    statements: Vec<Stmt>,
}

impl Compiled {
    fn text(&self) -> String {
        self.statements.iter().map(ToString::to_string).collect()
    }

    fn function(&self, name: &str) -> String {
        self.statements
            .iter()
            .find(|stmt| matches!(stmt, Stmt::FunctionDef { name: defined, .. } if defined.as_str() == name))
            .map(ToString::to_string)
            .unwrap()
    }

    fn functions_named(&self, kind: &str) -> Vec<String> {
        self.statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::FunctionDef { name, .. } if name.as_str().starts_with(kind) => {
                    Some(name.as_str().to_owned())
                }
                _ => None,
            })
            .collect()
    }
}

fn compile(source: &str) -> Compiled {
    let mut language = arith();
    let prepared = language.prepare(&parse_pattern(source).unwrap()).unwrap();
    let mut ctx = CompilationContext::new(CompileOptions::default());
    let entry = MatcherGen::new(&mut ctx, &language).top_level(&prepared).unwrap();
    Compiled {
        entry,
        statements: ctx.into_statements(),
    }
}

#[test]
fn top_level_wraps_the_term_and_starts_empty() {
    let compiled = compile("n_1");
    assert!(compiled.entry.as_str().starts_with("matches_Arith_"));
    let text = compiled.function(compiled.entry.as_str());
    assert!(text.contains("terms = wrap_term(t)"));
    assert!(text.contains("m = new_match()"));
    assert!(text.contains("(terms, 0, 1, m)"));
}

#[test]
fn each_distinct_pattern_compiles_once() {
    let mut language = arith();
    let prepared = language.prepare(&parse_pattern("(n n)").unwrap()).unwrap();
    let mut ctx = CompilationContext::new(CompileOptions::default());
    let mut gen = MatcherGen::new(&mut ctx, &language);
    let first = gen.matcher(&prepared.pattern).unwrap();
    let second = gen.matcher(&prepared.pattern).unwrap();
    assert_eq!(first, second);
    let statements = ctx.into_statements();
    let sequences = statements
        .iter()
        .filter(|stmt| matches!(stmt, Stmt::FunctionDef { name, .. } if name.as_str().starts_with("match_sequence")))
        .count();
    assert_eq!(sequences, 1);
}

#[test]
fn non_terminals_share_one_predicate() {
    let compiled = compile("(e_1 e_2 E)");
    let predicates = compiled.functions_named("isa_Arith_e_");
    assert_eq!(predicates.len(), 1);
    assert_eq!(compiled.functions_named("isa_Arith_E_").len(), 1);
    assert_eq!(compiled.functions_named("isa_Arith_n_").len(), 1);
}

#[test]
fn predicates_return_on_first_success() {
    let compiled = compile("e");
    let name = compiled.functions_named("isa_Arith_e_").remove(0);
    let text = compiled.function(&name);
    assert!(text.contains("return True"));
    assert!(text.trim_end().ends_with("return False"));
}

#[test]
fn literal_leaves_compare_against_hoisted_constants() {
    let compiled = compile("(+ 1 n)");
    let text = compiled.text();
    assert!(text.contains("read_term(\"+\")"));
    assert!(text.contains("read_term(\"1\")"));
    assert!(text.contains("term_eq("));
    assert!(text.contains("is_number("));
}

#[test]
fn fixed_sequences_require_exact_length() {
    let compiled = compile("(n n n)");
    let name = compiled.functions_named("match_sequence").remove(0);
    let text = compiled.function(&name);
    assert!(text.contains(" == 3"), "{text}");
}

#[test]
fn open_sequences_require_minimum_length() {
    let compiled = compile("(n_1 ... n_2)");
    let name = compiled.functions_named("match_sequence").remove(0);
    let text = compiled.function(&name);
    assert!(text.contains(" >= 1"), "{text}");
}

#[test]
fn repeats_open_and_close_depth_for_their_symbols() {
    let compiled = compile("((n_1 e_1) ...)");
    let name = compiled.functions_named("match_repeat").remove(0);
    let text = compiled.function(&name);
    assert_eq!(text.matches("match_increase_depth(").count(), 2);
    assert_eq!(text.matches("match_decrease_depth(").count(), 2);
}

#[test]
fn exhaustive_repeats_use_a_work_queue() {
    // `e ...` followed by `e` may split anywhere.
    let compiled = compile("(e_1 ... e_2)");
    let name = compiled.functions_named("match_repeat").remove(0);
    let text = compiled.function(&name);
    assert!(text.contains("list_get("), "{text}");
    assert!(text.contains("while "));
}

#[test]
fn greedy_repeats_keep_one_frontier() {
    // Numbers cannot be `+`, so the split is forced.
    let compiled = compile("(n_1 ... +)");
    let name = compiled.functions_named("match_repeat").remove(0);
    let text = compiled.function(&name);
    assert!(!text.contains("list_get("), "{text}");
    assert!(text.contains("while "));
}

#[test]
fn repeated_symbols_are_checked_and_removed() {
    let compiled = compile("(n_1 n_1)");
    let top = compiled.function(compiled.entry.as_str());
    assert!(top.contains("match_remove("), "{top}");
    assert!(top.contains("\"n_1#0\""));
    let sequence = compiled.functions_named("match_sequence").remove(0);
    assert!(compiled.function(&sequence).contains("match_compare("));
}

#[test]
fn in_hole_searches_subterms() {
    let compiled = compile("(in-hole E n_1)");
    let name = compiled.functions_named("match_in_hole").remove(0);
    let text = compiled.function(&name);
    assert!(text.contains("subterm_paths("));
    assert!(text.contains("replace_at_path("));
    assert_eq!(text.matches("match_merge(").count(), 2);
    assert!(compiled.text().contains("read_term(\"hole\")"));
}

#[test]
fn variable_not_otherwise_mentioned_excludes_the_mentioned_set() {
    let compiled = compile("variable-not-otherwise-mentioned");
    let text = compiled.text();
    assert!(text.contains("read_term(\"(+)\")"), "{text}");
    assert!(text.contains("seq_contains("));
    assert!(text.contains("== False"));
}

#[test]
fn anonymous_hole_does_not_bind() {
    let compiled = compile("hole");
    let name = compiled.functions_named("match_builtin_hole").remove(0);
    let text = compiled.function(&name);
    assert!(text.contains("is_hole("));
    assert!(!text.contains("match_add("));
}

#[test]
fn unresolved_patterns_are_internal_errors() {
    let language = arith();
    let mut ctx = CompilationContext::new(CompileOptions::default());
    let error = MatcherGen::new(&mut ctx, &language)
        .matcher(&Pattern::unresolved("x"))
        .unwrap_err();
    assert_eq!(error.code, redex_diagnostic::ErrorCode::E9001);
}
