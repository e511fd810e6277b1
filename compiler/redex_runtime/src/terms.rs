//! Term helpers called from generated code.
//!
//! Paths cross the IR boundary as sequence terms of integers, so every
//! path helper converts with [`path_of_term`] and [`path_to_term`].

use std::collections::BTreeMap;

use redex_ir::{Symbol, Term, TermKind};
use rustc_hash::FxHashSet;

use crate::{MatchEnv, RuntimeError, RuntimeResult};

/// Children of a sequence term.
pub fn children(term: &Term) -> RuntimeResult<&[Term]> {
    term.as_sequence().ok_or_else(|| RuntimeError::WrongKind {
        expected: TermKind::Sequence,
        term: term.clone(),
    })
}

pub fn child(term: &Term, index: usize) -> RuntimeResult<Term> {
    let items = children(term)?;
    items.get(index).cloned().ok_or(RuntimeError::IndexOutOfBounds {
        index,
        len: items.len(),
    })
}

/// Whether `sequence` has a child equal to `needle`.
pub fn contains(sequence: &Term, needle: &Term) -> RuntimeResult<bool> {
    Ok(children(sequence)?.contains(needle))
}

pub fn path_to_term(path: &[usize]) -> Term {
    Term::sequence(
        path.iter()
            .map(|&index| Term::Integer(i64::try_from(index).unwrap_or(i64::MAX))),
    )
}

pub fn path_of_term(path: &Term) -> RuntimeResult<Vec<usize>> {
    children(path)?
        .iter()
        .map(|step| match step {
            Term::Integer(n) => usize::try_from(*n).map_err(|_| RuntimeError::WrongKind {
                expected: TermKind::Integer,
                term: step.clone(),
            }),
            other => Err(RuntimeError::WrongKind {
                expected: TermKind::Integer,
                term: other.clone(),
            }),
        })
        .collect()
}

/// Every subterm paired with its path, root first.
pub fn subterm_paths(term: &Term) -> Vec<(Term, Term)> {
    term.subterms()
        .into_iter()
        .map(|(subterm, path)| (subterm, path_to_term(&path)))
        .collect()
}

/// `term` with the subterm at `path` replaced; only the path is rebuilt.
pub fn replace_at_path(term: &Term, path: &Term, replacement: Term) -> RuntimeResult<Term> {
    let path = path_of_term(path)?;
    term.replace_at(&path, replacement)
        .ok_or_else(|| RuntimeError::InvalidPath {
            term: term.clone(),
            path,
        })
}

/// Fill the first hole of `context` (pre-order) with `contents`.
pub fn plug(context: &Term, contents: Term) -> RuntimeResult<Term> {
    context.plug(contents).ok_or_else(|| RuntimeError::NoHole {
        term: context.clone(),
    })
}

/// Fail unless `sequence` has exactly `expected` children.
///
/// Guards template ellipses that iterate several bound lists together.
pub fn check_ellipsis_counts(sequence: &Term, expected: usize) -> RuntimeResult<()> {
    let found = children(sequence)?.len();
    if found == expected {
        Ok(())
    } else {
        Err(RuntimeError::InconsistentEllipsisCounts { expected, found })
    }
}

/// Order-insensitive comparison of result terms.
pub fn term_sets_equal(left: &[Term], right: &[Term]) -> bool {
    let left: FxHashSet<&Term> = left.iter().collect();
    let right: FxHashSet<&Term> = right.iter().collect();
    left == right
}

/// Order-insensitive comparison of finished matches.
pub fn match_sets_equal(left: &[MatchEnv], right: &[MatchEnv]) -> bool {
    let bindings = |matches: &[MatchEnv]| -> FxHashSet<BTreeMap<Symbol, Term>> {
        matches.iter().map(MatchEnv::to_bindings).collect()
    };
    bindings(left) == bindings(right)
}

pub fn terms_to_string(terms: &[Term]) -> String {
    let parts: Vec<String> = terms.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(" "))
}

pub fn matches_to_string(matches: &[MatchEnv]) -> String {
    let parts: Vec<String> = matches.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(" "))
}
