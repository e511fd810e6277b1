#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use redex_ir::Span;

use super::*;
use crate::ErrorCode;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message("non-terminal cycle: x -> y -> x")
        .with_label(Span::new(22, 31), "cycle starts here")
        .with_note("aliases must eventually reach a non-alias alternative")
        .with_suggestion("add a concrete alternative to `x`")
}

fn render(emitter: TerminalEmitter<&mut Vec<u8>>, diagnostic: &Diagnostic) {
    let mut emitter = emitter;
    emitter.emit(diagnostic);
    emitter.flush();
}

#[test]
fn test_plain_output_without_source() {
    let mut output = Vec::new();
    render(
        TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, true),
        &sample_diagnostic(),
    );
    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("error[E2003]: non-terminal cycle"));
    assert!(text.contains("--> 22..31: cycle starts here"));
    assert!(text.contains("= note: aliases"));
    assert!(text.contains("= help: add a concrete"));
    assert!(!text.contains("\x1b["));
}

#[test]
fn test_source_snippet_with_caret() {
    let source = "(define-language L\n  (x ::= y) (y ::= x))\n";
    let mut output = Vec::new();
    render(
        TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false)
            .with_source("cycle.redex", source),
        &sample_diagnostic(),
    );
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("--> cycle.redex:2:4"));
    assert!(text.contains("2 |   (x ::= y) (y ::= x))"));
    assert!(text.contains("   ^^^^^^^^^ cycle starts here"));
}

#[test]
fn test_colors_follow_mode() {
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
    assert!(ColorMode::Auto.should_use_colors(true));

    let mut output = Vec::new();
    render(
        TerminalEmitter::with_color_mode(&mut output, ColorMode::Always, false),
        &sample_diagnostic(),
    );
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("\x1b[1;31merror"));
}
