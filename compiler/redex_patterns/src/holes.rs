//! Hole-reachability solver.
//!
//! Computes, for every non-terminal, how many holes a term it matches can
//! contain, as a `(min, max)` range over [`HoleCount`]. Non-terminals may be
//! mutually recursive, so the solver iterates to a fixpoint. A value of
//! `None` means "not yet known"; it is distinct from the range `(0, 0)` so
//! that a cycle cannot converge early on a guessed value.

use std::fmt;

use redex_ir::{BuiltInKind, Pattern, Symbol};
use redex_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

/// Saturating hole count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HoleCount {
    Zero,
    One,
    Many,
}

impl HoleCount {
    fn saturating_add(self, other: HoleCount) -> HoleCount {
        match (self, other) {
            (HoleCount::Zero, x) | (x, HoleCount::Zero) => x,
            _ => HoleCount::Many,
        }
    }
}

impl fmt::Display for HoleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HoleCount::Zero => "0",
            HoleCount::One => "1",
            HoleCount::Many => "many",
        })
    }
}

/// Inclusive range of hole counts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HoleRange {
    pub min: HoleCount,
    pub max: HoleCount,
}

impl HoleRange {
    pub const ZERO: HoleRange = HoleRange::exactly(HoleCount::Zero);
    pub const ONE: HoleRange = HoleRange::exactly(HoleCount::One);

    pub const fn exactly(count: HoleCount) -> Self {
        HoleRange {
            min: count,
            max: count,
        }
    }

    /// Smallest range containing both.
    #[must_use]
    pub fn hull(self, other: HoleRange) -> HoleRange {
        HoleRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Holes of two terms side by side.
    #[must_use]
    pub fn sum(self, other: HoleRange) -> HoleRange {
        HoleRange {
            min: self.min.saturating_add(other.min),
            max: self.max.saturating_add(other.max),
        }
    }

    /// Holes of zero or more repetitions.
    #[must_use]
    pub fn repeated(self) -> HoleRange {
        HoleRange {
            min: HoleCount::Zero,
            max: if self.max == HoleCount::Zero {
                HoleCount::Zero
            } else {
                HoleCount::Many
            },
        }
    }
}

impl fmt::Display for HoleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.min, self.max)
    }
}

/// Per-non-terminal hole ranges. `None` marks a non-terminal that can never
/// produce a finite term.
pub type HoleTable = FxHashMap<Symbol, Option<HoleRange>>;

/// Solve hole ranges for every non-terminal.
///
/// `order` fixes the visiting order so runs are reproducible.
pub fn solve(order: &[Symbol], alternatives: &FxHashMap<Symbol, Vec<Pattern>>) -> HoleTable {
    let mut table: HoleTable = order.iter().map(|name| (name.clone(), None)).collect();
    let mut rounds = 0usize;
    loop {
        rounds += 1;
        let mut changed = false;
        for name in order {
            let value = alternatives
                .get(name)
                .into_iter()
                .flatten()
                .filter_map(|alternative| holes_of(alternative, &table))
                .reduce(HoleRange::hull);
            if table.get(name).copied().flatten() != value {
                tracing::trace!(non_terminal = %name, ?value, "hole range widened");
                table.insert(name.clone(), value);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    tracing::debug!(rounds, "hole ranges converged");
    table
}

/// Hole range of a resolved pattern under the current table.
pub fn holes_of(pattern: &Pattern, table: &HoleTable) -> Option<HoleRange> {
    ensure_sufficient_stack(|| match pattern {
        Pattern::BuiltIn(builtin) if builtin.kind == BuiltInKind::Hole => Some(HoleRange::ONE),
        Pattern::Literal(_) | Pattern::BuiltIn(_) | Pattern::Unresolved(_) => Some(HoleRange::ZERO),
        Pattern::NonTerminal { prefix, .. } => table.get(prefix).copied().flatten(),
        Pattern::Sequence(items) => items
            .iter()
            .filter(|item| !matches!(item, Pattern::Check(_)))
            .try_fold(HoleRange::ZERO, |acc, item| Some(acc.sum(holes_of(item, table)?))),
        // Zero repetitions always produce a finite term.
        Pattern::Repeat { inner, .. } => {
            Some(holes_of(inner, table).map_or(HoleRange::ZERO, HoleRange::repeated))
        }
        // The context's single hole is filled by the contents.
        Pattern::InHole { contents, .. } => holes_of(contents, table),
        Pattern::Check(_) => Some(HoleRange::ZERO),
    })
}
