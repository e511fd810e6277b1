#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use redex_ir::code::Module;
use redex_parse::parse_template;
use rustc_hash::FxHashSet;

use super::*;
use crate::annotate::annotate;
use crate::context::CompileOptions;

fn compile(source: &str, depths: &[(&str, usize)]) -> (Symbol, String) {
    let depths = depths
        .iter()
        .map(|(symbol, depth)| (Symbol::new(symbol), *depth))
        .collect();
    let names: FxHashSet<Symbol> = [Symbol::new("subst")].into_iter().collect();
    let annotated = annotate(&parse_template(source).unwrap(), &depths, &names).unwrap();
    let metafunctions: FxHashMap<Symbol, Symbol> =
        [(Symbol::new("subst"), Symbol::new("mf_subst_0"))].into_iter().collect();
    let mut ctx = CompilationContext::new(CompileOptions::default());
    let name = compile_template(&mut ctx, &metafunctions, &annotated).unwrap();
    let module = Module {
        foreign_sources: Vec::new(),
        body: ctx.into_statements(),
    };
    (name, module.to_string())
}

fn count(text: &str, needle: &str) -> usize {
    text.matches(needle).count()
}

#[test]
fn variables_are_read_once() {
    let (name, text) = compile("(+ e_1 e_1)", &[("e_1", 0)]);
    assert!(name.as_str().starts_with("term_"));
    assert!(text.contains(&format!("def {name}(m):")), "{text}");
    assert_eq!(count(&text, "match_get("), 1, "{text}");
    assert_eq!(count(&text, "make_sequence("), 1, "{text}");
}

#[test]
fn literals_are_hoisted() {
    let (_, text) = compile("(+ 1 2)", &[]);
    assert_eq!(count(&text, "read_term("), 3, "{text}");
    assert_eq!(count(&text, "match_get("), 0, "{text}");
}

#[test]
fn ellipses_loop_over_their_driver() {
    let (_, text) = compile("((+ n_1 0) ...)", &[("n_1", 1)]);
    assert_eq!(count(&text, "seq_len("), 1, "{text}");
    assert_eq!(count(&text, "seq_get("), 1, "{text}");
    assert_eq!(count(&text, "check_ellipsis_counts("), 0, "{text}");
    assert!(text.contains("for "), "{text}");
}

#[test]
fn co_iterated_drivers_are_checked() {
    let (_, text) = compile("((n_1 n_2) ...)", &[("n_1", 1), ("n_2", 1)]);
    assert_eq!(count(&text, "seq_get("), 2, "{text}");
    assert_eq!(count(&text, "check_ellipsis_counts("), 1, "{text}");
}

#[test]
fn depth_zero_variables_are_not_drivers() {
    let (_, text) = compile("((n_1 n_2) ...)", &[("n_1", 1), ("n_2", 0)]);
    assert_eq!(count(&text, "seq_get("), 1, "{text}");
    assert_eq!(count(&text, "check_ellipsis_counts("), 0, "{text}");
}

#[test]
fn in_hole_plugs() {
    let (_, text) = compile("(in-hole E_1 n_1)", &[("E_1", 0), ("n_1", 0)]);
    assert_eq!(count(&text, "plug("), 1, "{text}");
}

#[test]
fn metafunction_applications_call_the_generated_function() {
    let (_, text) = compile("(subst e_1 x)", &[("e_1", 0)]);
    assert_eq!(count(&text, "mf_subst_0("), 1, "{text}");
    assert_eq!(count(&text, "make_sequence("), 1, "{text}");
}

#[test]
fn foreign_splices_extend_the_enclosing_sequence() {
    let (_, text) = compile("(0 (foreign-splice twice n_1) (foreign-call add n_1 n_1))", &[("n_1", 0)]);
    assert_eq!(count(&text, "twice("), 1, "{text}");
    assert_eq!(count(&text, "add("), 1, "{text}");
    assert_eq!(count(&text, "seq_children("), 1, "{text}");
}
