//! The binding environment.
//!
//! Each bound symbol maps to a stack of levels. The bottom level is the
//! symbol's final value; every open ellipsis pushes a level that collects
//! one term per repetition, and closing it appends the collected list to
//! the level below as a single sequence term.
//!
//! Environments fork on every backtracking branch, so both the map and the
//! per-level lists are persistent (`im`): a clone is O(1) and a fork only
//! copies what it later changes.

use std::collections::BTreeMap;
use std::fmt;

use im::{HashMap, Vector};
use redex_ir::{Symbol, Term};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Level {
    /// A value bound outside any open ellipsis.
    Scalar(Term),
    /// Terms collected by an open ellipsis.
    Open(Vector<Term>),
}

impl Level {
    fn to_term(&self) -> Term {
        match self {
            Level::Scalar(term) => term.clone(),
            Level::Open(items) => Term::sequence(items.iter().cloned()),
        }
    }
}

/// Bindings of one (partial) match.
///
/// # Panics
///
/// The depth operations assert the bookkeeping invariants: misuse means
/// generated code is wrong, not that a match failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchEnv {
    bindings: HashMap<Symbol, Vec<Level>>,
}

impl MatchEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Bind `term`: appended to the innermost open ellipsis, or the
    /// symbol's value when none is open.
    pub fn add(&mut self, symbol: &Symbol, term: Term) {
        let levels = self.bindings.entry(symbol.clone()).or_insert_with(Vec::new);
        match levels.last_mut() {
            None => levels.push(Level::Scalar(term)),
            Some(Level::Open(items)) => items.push_back(term),
            Some(Level::Scalar(previous)) => {
                panic!("`{symbol}` is already bound to `{previous}`; cannot bind `{term}`")
            }
        }
    }

    /// Open a new ellipsis level for `symbol`.
    pub fn increase_depth(&mut self, symbol: &Symbol) {
        let levels = self.bindings.entry(symbol.clone()).or_insert_with(Vec::new);
        if let Some(Level::Scalar(previous)) = levels.last() {
            panic!("cannot open an ellipsis for `{symbol}`, already bound to `{previous}`");
        }
        levels.push(Level::Open(Vector::new()));
    }

    /// Close the innermost ellipsis level of `symbol`.
    ///
    /// The outermost level stays open as the final value, so closing it is
    /// a no-op.
    pub fn decrease_depth(&mut self, symbol: &Symbol) {
        let Some(levels) = self.bindings.get_mut(symbol) else {
            panic!("cannot close an ellipsis for unbound `{symbol}`");
        };
        if levels.len() <= 1 {
            return;
        }
        let closed = match levels.pop() {
            Some(level) => level.to_term(),
            None => return,
        };
        match levels.last_mut() {
            Some(Level::Open(items)) => items.push_back(closed),
            _ => panic!("ellipsis levels of `{symbol}` are out of order"),
        }
    }

    /// The final value of `symbol`.
    ///
    /// # Panics
    ///
    /// Panics when `symbol` is unbound or still has open inner levels.
    pub fn get(&self, symbol: &Symbol) -> Term {
        match self.lookup(symbol) {
            Some(term) => term,
            None => panic!("`{symbol}` is not bound to a finished value"),
        }
    }

    /// The final value of `symbol`, if it is closed down to one level.
    pub fn lookup(&self, symbol: &Symbol) -> Option<Term> {
        match self.bindings.get(symbol).map(Vec::as_slice) {
            Some([level]) => Some(level.to_term()),
            _ => None,
        }
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.bindings.contains_key(symbol)
    }

    pub fn remove(&mut self, symbol: &Symbol) {
        self.bindings.remove(symbol);
    }

    /// Whether the current innermost values of two symbols are equal.
    ///
    /// Inside an ellipsis this compares everything collected so far.
    pub fn compare(&self, left: &Symbol, right: &Symbol) -> bool {
        let top = |symbol: &Symbol| {
            self.bindings
                .get(symbol)
                .and_then(|levels| levels.last())
                .map(Level::to_term)
        };
        match (top(left), top(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Add every finished binding of `other` to `self`.
    ///
    /// Used by `in-hole`, whose context and contents are matched in fresh
    /// environments and bind disjoint symbols.
    pub fn merge(&mut self, other: &MatchEnv) {
        for (symbol, levels) in &other.bindings {
            match levels.as_slice() {
                [level] => self.add(symbol, level.to_term()),
                _ => panic!("cannot merge `{symbol}` with open ellipsis levels"),
            }
        }
    }

    /// Finished bindings, sorted by symbol.
    ///
    /// # Panics
    ///
    /// Panics if any binding still has open inner levels.
    pub fn to_bindings(&self) -> BTreeMap<Symbol, Term> {
        self.bindings
            .keys()
            .map(|symbol| (symbol.clone(), self.get(symbol)))
            .collect()
    }
}

impl fmt::Display for MatchEnv {
    /// `((e_1 (+ 1 2)) (n 3))`, sorted by symbol.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols: Vec<&Symbol> = self.bindings.keys().collect();
        symbols.sort();
        f.write_str("(")?;
        for (index, symbol) in symbols.into_iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            match self.lookup(symbol) {
                Some(term) => write!(f, "({symbol} {term})")?,
                None => write!(f, "({symbol} <open>)")?,
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests;
