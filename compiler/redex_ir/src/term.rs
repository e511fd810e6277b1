//! Immutable term trees.
//!
//! Terms are the data that patterns match against and that templates
//! construct. They are never mutated: [`Term::replace_at`] rebuilds only the
//! ancestors on a [`TermPath`] and shares every other subtree.
//!
//! # Sharing
//!
//! `Sequence` children live behind an `Rc<[Term]>`, so cloning a term is O(1)
//! and a rebuilt term shares all untouched siblings with the original.

use std::fmt;
use std::rc::Rc;

use crate::Symbol;

/// A float stored as its bit pattern so terms can be `Eq + Hash`.
///
/// Equality is bitwise: `0.0` and `-0.0` differ, identical NaNs are equal.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Float(u64);

impl Float {
    pub fn new(value: f64) -> Self {
        Float(value.to_bits())
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl fmt::Debug for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value();
        if value.is_finite() && value.fract() == 0.0 {
            write!(f, "{value:.1}")
        } else {
            write!(f, "{value}")
        }
    }
}

/// Coarse classification of a term, used in diagnostics and runtime errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TermKind {
    Variable,
    Integer,
    Float,
    String,
    Boolean,
    Hole,
    Sequence,
}

impl TermKind {
    pub fn name(self) -> &'static str {
        match self {
            TermKind::Variable => "variable",
            TermKind::Integer => "integer",
            TermKind::Float => "float",
            TermKind::String => "string",
            TermKind::Boolean => "boolean",
            TermKind::Hole => "hole",
            TermKind::Sequence => "sequence",
        }
    }
}

/// Immutable term value. Equality is structural.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(Symbol),
    Integer(i64),
    Float(Float),
    String(Rc<str>),
    Boolean(bool),
    Hole,
    Sequence(Rc<[Term]>),
}

/// Child-index path from a root term to one of its subterms.
///
/// The empty path addresses the root.
pub type TermPath = Vec<usize>;

impl Term {
    /// Build a sequence term from its children.
    pub fn sequence(children: impl IntoIterator<Item = Term>) -> Term {
        Term::Sequence(children.into_iter().collect())
    }

    /// The empty sequence `()`.
    pub fn empty_sequence() -> Term {
        Term::Sequence(Rc::from(Vec::new()))
    }

    pub fn variable(name: &str) -> Term {
        Term::Variable(Symbol::new(name))
    }

    pub fn string(text: &str) -> Term {
        Term::String(Rc::from(text))
    }

    pub fn float(value: f64) -> Term {
        Term::Float(Float::new(value))
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Variable(_) => TermKind::Variable,
            Term::Integer(_) => TermKind::Integer,
            Term::Float(_) => TermKind::Float,
            Term::String(_) => TermKind::String,
            Term::Boolean(_) => TermKind::Boolean,
            Term::Hole => TermKind::Hole,
            Term::Sequence(_) => TermKind::Sequence,
        }
    }

    /// Children of a sequence term, or `None` for atoms.
    pub fn as_sequence(&self) -> Option<&[Term]> {
        match self {
            Term::Sequence(children) => Some(children),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Term::Integer(_) | Term::Float(_))
    }

    pub fn is_natural(&self) -> bool {
        matches!(self, Term::Integer(n) if *n >= 0)
    }

    /// The subterm addressed by `path`, if the path is valid.
    pub fn subterm_at(&self, path: &[usize]) -> Option<&Term> {
        let mut current = self;
        for &index in path {
            current = current.as_sequence()?.get(index)?;
        }
        Some(current)
    }

    /// Rebuild this term with the subterm at `path` replaced.
    ///
    /// Only the ancestors on the path are reconstructed; every sibling is
    /// shared with `self`. Returns `None` if the path does not address a
    /// subterm.
    #[must_use]
    pub fn replace_at(&self, path: &[usize], replacement: Term) -> Option<Term> {
        let Some((&index, rest)) = path.split_first() else {
            return Some(replacement);
        };
        let children = self.as_sequence()?;
        let rebuilt = children.get(index)?.replace_at(rest, replacement)?;
        let mut copy: Vec<Term> = children.to_vec();
        copy[index] = rebuilt;
        Some(Term::Sequence(Rc::from(copy)))
    }

    /// Every subterm with its path, in pre-order (the root first).
    pub fn subterms(&self) -> Vec<(Term, TermPath)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_subterms(self, &mut path, &mut out);
        out
    }

    /// Path of the first `Hole` in pre-order.
    pub fn find_hole(&self) -> Option<TermPath> {
        fn go(term: &Term, path: &mut TermPath) -> bool {
            match term {
                Term::Hole => true,
                Term::Sequence(children) => {
                    for (index, child) in children.iter().enumerate() {
                        path.push(index);
                        if go(child, path) {
                            return true;
                        }
                        path.pop();
                    }
                    false
                }
                _ => false,
            }
        }
        let mut path = Vec::new();
        go(self, &mut path).then_some(path)
    }

    /// Replace the first hole of `self` with `contents`.
    ///
    /// Returns `None` when `self` contains no hole.
    #[must_use]
    pub fn plug(&self, contents: Term) -> Option<Term> {
        let path = self.find_hole()?;
        self.replace_at(&path, contents)
    }
}

fn collect_subterms(term: &Term, path: &mut TermPath, out: &mut Vec<(Term, TermPath)>) {
    out.push((term.clone(), path.clone()));
    if let Term::Sequence(children) = term {
        for (index, child) in children.iter().enumerate() {
            path.push(index);
            collect_subterms(child, path, out);
            path.pop();
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "{name}"),
            Term::Integer(n) => write!(f, "{n}"),
            Term::Float(x) => write!(f, "{x}"),
            Term::String(s) => write_quoted(f, s),
            Term::Boolean(true) => f.write_str("#t"),
            Term::Boolean(false) => f.write_str("#f"),
            Term::Hole => f.write_str("hole"),
            Term::Sequence(children) => {
                f.write_str("(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Write `text` as a double-quoted string literal with escapes.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in text.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests;
