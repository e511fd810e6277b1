//! Non-terminal resolution.
//!
//! Turns every [`Pattern::Unresolved`] leaf into a non-terminal reference,
//! a built-in, or a literal variable. Literal variables are recorded in the
//! language's mentioned-variables set, which `variable-not-otherwise-mentioned`
//! excludes at match time.

use std::collections::BTreeSet;

use redex_diagnostic::{Diagnostic, ErrorCode};
use redex_ir::{BuiltIn, BuiltInKind, Literal, Pattern, Symbol};
use redex_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;

/// Resolve every bare symbol of `pattern`.
///
/// `non_terminals` is the set of names the grammar defines. Every symbol
/// that becomes a literal variable is added to `mentioned`.
pub fn resolve(
    pattern: &Pattern,
    non_terminals: &FxHashSet<Symbol>,
    mentioned: &mut BTreeSet<Symbol>,
) -> Result<Pattern, Diagnostic> {
    ensure_sufficient_stack(|| match pattern {
        Pattern::Unresolved(raw) => resolve_symbol(raw, non_terminals, mentioned),
        Pattern::Sequence(items) => Ok(Pattern::Sequence(
            items
                .iter()
                .map(|item| resolve(item, non_terminals, mentioned))
                .collect::<Result<_, _>>()?,
        )),
        Pattern::Repeat { inner, mode } => Ok(Pattern::Repeat {
            inner: Box::new(resolve(inner, non_terminals, mentioned)?),
            mode: *mode,
        }),
        Pattern::InHole {
            context,
            contents,
            checks,
        } => Ok(Pattern::InHole {
            context: Box::new(resolve(context, non_terminals, mentioned)?),
            contents: Box::new(resolve(contents, non_terminals, mentioned)?),
            checks: checks.clone(),
        }),
        Pattern::Literal(Literal::Variable(name)) => {
            mentioned.insert(name.clone());
            Ok(pattern.clone())
        }
        Pattern::Literal(_)
        | Pattern::NonTerminal { .. }
        | Pattern::BuiltIn(_)
        | Pattern::Check(_) => Ok(pattern.clone()),
    })
}

fn resolve_symbol(
    raw: &Symbol,
    non_terminals: &FxHashSet<Symbol>,
    mentioned: &mut BTreeSet<Symbol>,
) -> Result<Pattern, Diagnostic> {
    let prefix = raw.prefix();

    if non_terminals.contains(prefix) {
        return Ok(Pattern::NonTerminal {
            prefix: Symbol::new(prefix),
            symbol: raw.clone(),
        });
    }

    if prefix == "in-hole" {
        return Err(bare_keyword(raw, "(in-hole context contents)"));
    }

    if let Some(kind) = BuiltInKind::from_keyword(prefix) {
        if kind.requires_arguments() {
            return Err(bare_keyword(raw, "(variable-except x ...)"));
        }
        return Ok(Pattern::BuiltIn(BuiltIn::new(kind, raw.clone())));
    }

    if raw.has_suffix() {
        return Err(Diagnostic::error(ErrorCode::E2005)
            .with_message(format!(
                "before underscore must be a non-terminal or built-in pattern, found `{prefix}` in `{raw}`"
            ))
            .with_note(format!(
                "`{raw}` is not a literal variable because it contains an underscore"
            )));
    }

    mentioned.insert(raw.clone());
    Ok(Pattern::Literal(Literal::Variable(raw.clone())))
}

fn bare_keyword(raw: &Symbol, shape: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2006)
        .with_message(format!("reserved keyword `{raw}` used as a bare pattern"))
        .with_suggestion(format!("write `{shape}`"))
}
