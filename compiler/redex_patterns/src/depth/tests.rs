#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::Grammar;

fn depths(source: &str) -> Result<DepthMap, Diagnostic> {
    let mut grammar = Grammar::new(&[("e", &["number"]), ("E", &["hole"])]);
    check_depths(&grammar.pattern(source))
}

fn sorted(map: &DepthMap) -> Vec<(String, usize)> {
    let mut out: Vec<_> = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    out.sort();
    out
}

#[test]
fn records_nesting() {
    let map = depths("(e_1 (e_2 ...) ((number ...) ...))").unwrap();
    assert_eq!(
        sorted(&map),
        vec![
            ("e_1".to_string(), 0),
            ("e_2".to_string(), 1),
            ("number".to_string(), 2),
        ]
    );
}

#[test]
fn literals_and_anonymous_holes_bind_nothing() {
    let map = depths("(+ hole (variable-except x) 3)").unwrap();
    assert!(map.is_empty());
}

#[test]
fn in_hole_sides_share_the_counter() {
    let map = depths("((in-hole E_1 e_1) ...)").unwrap();
    assert_eq!(map["E_1"], 1);
    assert_eq!(map["e_1"], 1);
}

#[test]
fn agreeing_repeats_are_accepted() {
    let map = depths("((e_1 ...) e_1 ...)").unwrap();
    assert_eq!(map["e_1"], 1);
}

#[test]
fn mismatched_depths_are_rejected() {
    let error = depths("((e_1 ...) ... e_1 ...)").unwrap_err();
    assert_eq!(error.code, ErrorCode::E3001);
    assert!(error.message.contains("depth 2"), "{}", error.message);
    assert!(error.message.contains("depth 1"), "{}", error.message);
}
