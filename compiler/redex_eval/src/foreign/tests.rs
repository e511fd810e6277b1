#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn registered_functions_are_callable() {
    let mut registry = ForeignRegistry::new();
    registry.register("first", |args| args.first().cloned().ok_or_else(|| "no arguments".to_owned()));
    assert!(registry.contains("first"));
    let function = registry.get(&Symbol::new("first")).unwrap();
    assert_eq!(function(&[Term::Integer(1), Term::Integer(2)]), Ok(Term::Integer(1)));
    assert_eq!(function(&[]), Err("no arguments".to_owned()));
}

#[test]
fn debug_lists_names_in_order() {
    let mut registry = ForeignRegistry::new();
    registry
        .register("b", |_| Ok(Term::Hole))
        .register("a", |_| Ok(Term::Hole));
    assert_eq!(format!("{registry:?}"), "ForeignRegistry { functions: [\"a\", \"b\"] }");
}
