#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn plus(a: Term, b: Term) -> Term {
    Term::sequence([Term::variable("+"), a, b])
}

#[test]
fn display_round_trips_familiar_syntax() {
    let term = Term::sequence([
        Term::variable("f"),
        Term::Integer(-3),
        Term::float(2.0),
        Term::float(0.5),
        Term::string("a\"b"),
        Term::Boolean(true),
        Term::Hole,
        Term::empty_sequence(),
    ]);
    assert_eq!(term.to_string(), r#"(f -3 2.0 0.5 "a\"b" #t hole ())"#);
}

#[test]
fn replace_at_rebuilds_only_the_path() {
    let right = plus(Term::Integer(2), Term::Integer(3));
    let term = plus(Term::Integer(1), right.clone());

    let replaced = term.replace_at(&[2, 1], Term::Hole).unwrap();
    assert_eq!(replaced.to_string(), "(+ 1 (+ hole 3))");
    // the original is untouched
    assert_eq!(term.to_string(), "(+ 1 (+ 2 3))");

    // siblings off the path are shared, not copied
    let replaced_left = term.replace_at(&[1], Term::Hole).unwrap();
    let (Some(old), Some(new)) = (term.as_sequence(), replaced_left.as_sequence()) else {
        panic!("expected sequences");
    };
    let (Term::Sequence(a), Term::Sequence(b)) = (&old[2], &new[2]) else {
        panic!("expected nested sequences");
    };
    assert!(Rc::ptr_eq(a, b));
}

#[test]
fn replace_at_rejects_invalid_paths() {
    let term = plus(Term::Integer(1), Term::Integer(2));
    assert!(term.replace_at(&[5], Term::Hole).is_none());
    assert!(term.replace_at(&[1, 0], Term::Hole).is_none());
    assert_eq!(term.replace_at(&[], Term::Hole), Some(Term::Hole));
}

#[test]
fn subterms_are_pre_order_with_paths() {
    let term = plus(Term::Integer(1), plus(Term::Integer(2), Term::Integer(3)));
    let paths: Vec<Vec<usize>> = term.subterms().into_iter().map(|(_, p)| p).collect();
    assert_eq!(
        paths,
        vec![
            vec![],
            vec![0],
            vec![1],
            vec![2],
            vec![2, 0],
            vec![2, 1],
            vec![2, 2],
        ]
    );
    for (sub, path) in term.subterms() {
        assert_eq!(term.subterm_at(&path), Some(&sub));
    }
}

#[test]
fn plug_fills_first_hole() {
    let context = plus(Term::Integer(1), plus(Term::Hole, Term::Integer(3)));
    let plugged = context.plug(Term::Integer(2));
    assert_eq!(
        plugged.map(|t| t.to_string()),
        Some("(+ 1 (+ 2 3))".to_string())
    );
    assert!(Term::Integer(4).plug(Term::Integer(2)).is_none());
}

#[test]
fn kinds_and_numeric_predicates() {
    assert_eq!(Term::Integer(1).kind(), TermKind::Integer);
    assert!(Term::Integer(0).is_natural());
    assert!(!Term::Integer(-1).is_natural());
    assert!(Term::float(1.5).is_number());
    assert!(!Term::string("1").is_number());
    assert_eq!(TermKind::Sequence.name(), "sequence");
}

fn arb_term() -> impl Strategy<Value = Term> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Term::Integer),
        any::<bool>().prop_map(Term::Boolean),
        "[a-z]{1,3}".prop_map(|s| Term::variable(&s)),
        Just(Term::Hole),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Term::sequence)
    })
}

proptest! {
    #[test]
    fn replacing_a_subterm_with_itself_is_identity(term in arb_term()) {
        for (sub, path) in term.subterms() {
            prop_assert_eq!(term.replace_at(&path, sub), Some(term.clone()));
        }
    }
}
