//! Constructors for syntax diagnostics (E1xxx).

use redex_diagnostic::{Diagnostic, ErrorCode};
use redex_ir::Span;

pub(crate) fn unexpected_close(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message("unexpected closing delimiter")
        .with_label(span, "nothing to close here")
}

pub(crate) fn unclosed_delimiter(open: Span, eof: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message("unclosed delimiter")
        .with_label(eof, "input ends here")
        .with_secondary_label(open, "opened here")
}

pub(crate) fn mismatched_delimiter(open: Span, close: Span, expected: char) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("mismatched closing delimiter, expected `{expected}`"))
        .with_label(close, "wrong delimiter")
        .with_secondary_label(open, "opened here")
}

pub(crate) fn invalid_literal(span: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1003)
        .with_message(message)
        .with_label(span, "invalid literal")
}

pub(crate) fn unknown_form(span: Span, head: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1004)
        .with_message(format!("unknown form `{head}`"))
        .with_label(span, "not a top-level form")
        .with_suggestion(
            "top-level forms are define-language, define-reduction-relation, \
             define-metafunction, redex-match, redex-match-assert-equal, \
             term-let-assert-equal, apply-reduction-relation-assert-equal \
             and require-foreign-source",
        )
}

pub(crate) fn malformed(span: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1005)
        .with_message(message)
        .with_label(span, "malformed")
}

pub(crate) fn misplaced_ellipsis(span: Span, reason: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1006)
        .with_message(format!("misplaced ellipsis: {reason}"))
        .with_label(span, "this `...`")
}

pub(crate) fn keyword_shape(span: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1007)
        .with_message(message)
        .with_label(span, "here")
}
