//! Reader and form parser for Redex specification files.
//!
//! Parsing happens in three stages:
//! - [`lexer`]: `logos` tokenizer producing atoms and delimiters
//! - [`reader`]: tokens to spanned S-expressions
//! - form parsing: S-expressions to the typed [`Spec`] AST, with patterns,
//!   templates and terms converted along the way
//!
//! The parser guarantees syntactic well-formedness only. Grammar and
//! ellipsis consistency are checked later.

mod error;
mod forms;
pub mod lexer;
pub mod reader;
mod syntax;

use redex_diagnostic::{Diagnostic, ErrorCode};
use redex_ir::{Pattern, Span, Spec, Template, Term};

pub use forms::form_of;
pub use reader::{Atom, SExp, SExpKind};
pub use syntax::{pattern_items, pattern_of, template_items, template_of, term_of};

/// Parse a whole specification file.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn parse_spec(source: &str) -> Result<Spec, Diagnostic> {
    let sexps = read(source)?;
    let forms = sexps.iter().map(form_of).collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(forms = forms.len(), "parsed specification");
    Ok(Spec { forms })
}

/// Parse a single term, e.g. a hoisted literal.
pub fn parse_term(source: &str) -> Result<Term, Diagnostic> {
    single(source).map(|sexp| term_of(&sexp))
}

/// Parse a single unresolved pattern.
pub fn parse_pattern(source: &str) -> Result<Pattern, Diagnostic> {
    pattern_of(&single(source)?)
}

/// Parse a single template.
pub fn parse_template(source: &str) -> Result<Template, Diagnostic> {
    template_of(&single(source)?)
}

fn read(source: &str) -> Result<Vec<SExp>, Diagnostic> {
    let tokens = lexer::tokenize(source)?;
    reader::read_all(source, &tokens)
}

fn single(source: &str) -> Result<SExp, Diagnostic> {
    let mut sexps = read(source)?;
    if sexps.len() != 1 {
        let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
        return Err(Diagnostic::error(ErrorCode::E1005)
            .with_message(format!("expected one expression, found {}", sexps.len()))
            .with_label(Span::new(0, end), "input"));
    }
    Ok(sexps.remove(0))
}
