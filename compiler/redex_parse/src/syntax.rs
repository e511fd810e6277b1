//! Conversion of S-expressions into terms, patterns and templates.
//!
//! All three share the sequence convention that `x ...` repeats the element
//! before the ellipsis. Terms have no ellipses; there `...` is an ordinary
//! variable.

use redex_diagnostic::Diagnostic;
use redex_ir::{BuiltIn, InsertMode, Literal, Pattern, Symbol, Template, Term};
use redex_stack::ensure_sufficient_stack;

use crate::error;
use crate::reader::{Atom, SExp, SExpKind};

const ELLIPSIS: &str = "...";

// ── Terms ───────────────────────────────────────────────────────────

/// Read a term. The symbol `hole` is the hole term.
pub fn term_of(sexp: &SExp) -> Term {
    ensure_sufficient_stack(|| match &sexp.kind {
        SExpKind::Atom(atom) => atom_term(atom),
        SExpKind::List(items) => Term::sequence(items.iter().map(term_of)),
    })
}

fn atom_term(atom: &Atom) -> Term {
    match atom {
        Atom::Integer(n) => Term::Integer(*n),
        Atom::Float(x) => Term::float(*x),
        Atom::String(s) => Term::string(s),
        Atom::Boolean(b) => Term::Boolean(*b),
        Atom::Symbol(s) if s == "hole" => Term::Hole,
        Atom::Symbol(s) => Term::variable(s),
    }
}

// ── Patterns ────────────────────────────────────────────────────────

/// Read a pattern. Symbols stay unresolved.
pub fn pattern_of(sexp: &SExp) -> Result<Pattern, Diagnostic> {
    ensure_sufficient_stack(|| match &sexp.kind {
        SExpKind::Atom(Atom::Symbol(s)) if s == ELLIPSIS => Err(error::misplaced_ellipsis(
            sexp.span,
            "an ellipsis must follow the pattern it repeats",
        )),
        SExpKind::Atom(Atom::Symbol(s)) => Ok(Pattern::Unresolved(Symbol::new(s))),
        SExpKind::Atom(atom) => Ok(Pattern::Literal(atom_literal(atom))),
        SExpKind::List(items) => match sexp.head_symbol() {
            Some("in-hole") => {
                let [_, context, contents] = items.as_slice() else {
                    return Err(error::keyword_shape(
                        sexp.span,
                        "`in-hole` takes a context pattern and a contents pattern",
                    ));
                };
                Ok(Pattern::in_hole(pattern_of(context)?, pattern_of(contents)?))
            }
            Some("variable-except") => {
                let excluded = items[1..]
                    .iter()
                    .map(|item| item.as_symbol().map(Symbol::new))
                    .collect::<Option<Vec<_>>>()
                    .filter(|excluded| !excluded.is_empty());
                match excluded {
                    Some(excluded) => Ok(Pattern::BuiltIn(BuiltIn::variable_except(excluded))),
                    None => Err(error::keyword_shape(
                        sexp.span,
                        "`variable-except` takes one or more symbols",
                    )),
                }
            }
            _ => Ok(Pattern::Sequence(pattern_items(items)?)),
        },
    })
}

/// Read the elements of a pattern sequence, folding ellipses into repeats.
pub fn pattern_items(items: &[SExp]) -> Result<Vec<Pattern>, Diagnostic> {
    fold_ellipses(items, pattern_of, Pattern::repeat)
}

fn atom_literal(atom: &Atom) -> Literal {
    match atom {
        Atom::Integer(n) => Literal::Integer(*n),
        Atom::Float(x) => Literal::Float(redex_ir::Float::new(*x)),
        Atom::String(s) => Literal::String(s.as_str().into()),
        Atom::Boolean(b) => Literal::Boolean(*b),
        Atom::Symbol(s) => Literal::Variable(Symbol::new(s)),
    }
}

// ── Templates ───────────────────────────────────────────────────────

/// Read a template. Symbols stay undecided until annotation.
pub fn template_of(sexp: &SExp) -> Result<Template, Diagnostic> {
    ensure_sufficient_stack(|| match &sexp.kind {
        SExpKind::Atom(Atom::Symbol(s)) if s == ELLIPSIS => Err(error::misplaced_ellipsis(
            sexp.span,
            "an ellipsis must follow the template it repeats",
        )),
        SExpKind::Atom(Atom::Symbol(s)) if s == "hole" => Ok(Template::Literal(Term::Hole)),
        SExpKind::Atom(Atom::Symbol(s)) => Ok(Template::Symbol(Symbol::new(s))),
        SExpKind::Atom(atom) => Ok(Template::Literal(atom_term(atom))),
        SExpKind::List(items) => match sexp.head_symbol() {
            Some("in-hole") => {
                let [_, context, contents] = items.as_slice() else {
                    return Err(error::keyword_shape(
                        sexp.span,
                        "`in-hole` takes a context template and a contents template",
                    ));
                };
                Ok(Template::InHole {
                    context: Box::new(template_of(context)?),
                    contents: Box::new(template_of(contents)?),
                })
            }
            Some(head @ ("foreign-call" | "foreign-splice")) => {
                let mode = if head == "foreign-call" {
                    InsertMode::Append
                } else {
                    InsertMode::Extend
                };
                let Some(function) = items.get(1).and_then(SExp::as_symbol) else {
                    return Err(error::keyword_shape(
                        sexp.span,
                        format!("`{head}` needs a function name"),
                    ));
                };
                Ok(Template::ForeignCall {
                    function: Symbol::new(function),
                    args: template_items(&items[2..])?,
                    mode,
                })
            }
            _ => Ok(Template::Sequence(template_items(items)?)),
        },
    })
}

pub fn template_items(items: &[SExp]) -> Result<Vec<Template>, Diagnostic> {
    fold_ellipses(items, template_of, |inner| Template::Repeat(Box::new(inner)))
}

// ── Shared ──────────────────────────────────────────────────────────

/// Convert sequence elements, wrapping the element before each `...`.
fn fold_ellipses<T>(
    items: &[SExp],
    convert: impl Fn(&SExp) -> Result<T, Diagnostic>,
    repeat: impl Fn(T) -> T,
) -> Result<Vec<T>, Diagnostic> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    let mut last_was_ellipsis = false;
    for item in items {
        if item.is_symbol(ELLIPSIS) {
            if last_was_ellipsis {
                return Err(error::misplaced_ellipsis(
                    item.span,
                    "an ellipsis cannot follow another ellipsis",
                ));
            }
            let Some(previous) = out.pop() else {
                return Err(error::misplaced_ellipsis(
                    item.span,
                    "an ellipsis must follow the element it repeats",
                ));
            };
            out.push(repeat(previous));
            last_was_ellipsis = true;
        } else {
            out.push(convert(item)?);
            last_was_ellipsis = false;
        }
    }
    Ok(out)
}
