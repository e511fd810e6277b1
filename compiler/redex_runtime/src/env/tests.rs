#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;
use redex_parse::parse_term;

use super::*;

fn sym(name: &str) -> Symbol {
    Symbol::new(name)
}

fn term(source: &str) -> Term {
    parse_term(source).unwrap()
}

#[test]
fn scalar_binding() {
    let mut env = MatchEnv::new();
    env.add(&sym("n"), Term::Integer(3));
    assert_eq!(env.get(&sym("n")), Term::Integer(3));
    assert_eq!(env.len(), 1);
}

#[test]
fn one_ellipsis_collects_a_list() {
    let n = sym("n_1");
    let mut env = MatchEnv::new();
    env.increase_depth(&n);
    for value in 1..=3 {
        env.add(&n, Term::Integer(value));
    }
    env.decrease_depth(&n);
    assert_eq!(env.get(&n), term("(1 2 3)"));
}

#[test]
fn zero_repetitions_bind_the_empty_sequence() {
    let n = sym("n_1");
    let mut env = MatchEnv::new();
    env.increase_depth(&n);
    env.decrease_depth(&n);
    assert_eq!(env.get(&n), Term::empty_sequence());
}

#[test]
fn nested_ellipses_build_nested_lists() {
    let n = sym("n_1");
    let mut env = MatchEnv::new();
    env.increase_depth(&n);
    for group in [vec![1, 2], vec![], vec![3]] {
        env.increase_depth(&n);
        assert!(env.lookup(&n).is_none(), "an inner level is open");
        for value in group {
            env.add(&n, Term::Integer(value));
        }
        env.decrease_depth(&n);
    }
    env.decrease_depth(&n);
    assert_eq!(env.get(&n), term("((1 2) () (3))"));
}

#[test]
fn forks_are_independent() {
    let n = sym("n");
    let mut base = MatchEnv::new();
    base.increase_depth(&n);
    base.add(&n, Term::Integer(1));
    let mut fork = base.clone();
    fork.add(&n, Term::Integer(2));
    base.decrease_depth(&n);
    fork.decrease_depth(&n);
    assert_eq!(base.get(&n), term("(1)"));
    assert_eq!(fork.get(&n), term("(1 2)"));
}

#[test]
fn compare_sees_partial_lists() {
    let (a, b) = (sym("e_1"), sym("e_1#0"));
    let mut env = MatchEnv::new();
    env.increase_depth(&a);
    env.increase_depth(&b);
    env.add(&a, Term::Integer(5));
    env.add(&b, Term::Integer(5));
    assert!(env.compare(&a, &b));
    env.add(&a, Term::Integer(6));
    env.add(&b, Term::Integer(7));
    assert!(!env.compare(&a, &b));
    assert!(!env.compare(&a, &sym("missing")));
}

#[test]
fn merge_adds_into_open_levels() {
    let (e, n) = (sym("E"), sym("n"));
    let mut outer = MatchEnv::new();
    outer.increase_depth(&e);
    outer.increase_depth(&n);
    for value in [1, 2] {
        let mut inner = MatchEnv::new();
        inner.add(&e, Term::Hole);
        inner.add(&n, Term::Integer(value));
        outer.merge(&inner);
    }
    outer.decrease_depth(&e);
    outer.decrease_depth(&n);
    assert_eq!(outer.get(&e), term("(hole hole)"));
    assert_eq!(outer.get(&n), term("(1 2)"));
}

#[test]
fn remove_and_display() {
    let mut env = MatchEnv::new();
    env.add(&sym("n_1"), Term::Integer(5));
    env.add(&sym("n_1#0"), Term::Integer(5));
    env.add(&sym("e"), term("(+ 1 2)"));
    env.remove(&sym("n_1#0"));
    assert!(!env.contains(&sym("n_1#0")));
    assert_eq!(env.to_string(), "((e (+ 1 2)) (n_1 5))");
    let bindings: Vec<(String, String)> = env
        .to_bindings()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(
        bindings,
        vec![
            ("e".to_string(), "(+ 1 2)".to_string()),
            ("n_1".to_string(), "5".to_string()),
        ]
    );
}

#[test]
#[should_panic(expected = "already bound")]
fn double_scalar_bind_panics() {
    let mut env = MatchEnv::new();
    env.add(&sym("n"), Term::Integer(1));
    env.add(&sym("n"), Term::Integer(2));
}

#[test]
#[should_panic(expected = "not bound to a finished value")]
fn reading_an_open_binding_panics() {
    let n = sym("n");
    let mut env = MatchEnv::new();
    env.increase_depth(&n);
    env.increase_depth(&n);
    let _ = env.get(&n);
}
