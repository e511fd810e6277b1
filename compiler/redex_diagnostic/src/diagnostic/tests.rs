use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_builder_collects_context() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("non-terminal `e` defined twice")
        .with_label(Span::new(20, 30), "second definition")
        .with_secondary_label(Span::new(2, 12), "first definition")
        .with_note("each non-terminal has exactly one definition")
        .with_suggestion("merge the alternatives into one clause");

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(20, 30)));
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.notes.len(), 1);
    assert_eq!(diag.suggestions.len(), 1);
}

#[test]
fn test_display_header() {
    let diag = Diagnostic::error(ErrorCode::E3001).with_message("depth mismatch");
    assert_eq!(diag.to_string(), "error[E3001]: depth mismatch");
}

#[test]
fn test_or_label_keeps_existing_primary() {
    let labelled = Diagnostic::error(ErrorCode::E2007)
        .with_label(Span::new(1, 2), "here")
        .or_label(Span::new(5, 9), "form");
    assert_eq!(labelled.primary_span(), Some(Span::new(1, 2)));

    let unlabelled = Diagnostic::error(ErrorCode::E2007).or_label(Span::new(5, 9), "form");
    assert_eq!(unlabelled.primary_span(), Some(Span::new(5, 9)));
}

#[test]
fn test_internal_is_e9001() {
    let diag = Diagnostic::internal("broken invariant");
    assert_eq!(diag.code, ErrorCode::E9001);
    assert_eq!(diag.notes, vec!["this is a bug in the compiler".to_owned()]);
}
