//! Grammar fixtures shared by the pass tests.

#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use std::collections::BTreeSet;

use redex_ir::{Pattern, Symbol};
use redex_parse::parse_pattern;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::resolve::resolve;

/// A resolved grammar built from `(name, [alternative source, ...])` pairs.
pub(crate) struct Grammar {
    pub order: Vec<Symbol>,
    pub names: FxHashSet<Symbol>,
    pub mentioned: BTreeSet<Symbol>,
    pub alternatives: FxHashMap<Symbol, Vec<Pattern>>,
}

impl Grammar {
    pub fn new(rules: &[(&str, &[&str])]) -> Self {
        let order: Vec<Symbol> = rules.iter().map(|(name, _)| Symbol::new(name)).collect();
        let names: FxHashSet<Symbol> = order.iter().cloned().collect();
        let mut mentioned = BTreeSet::new();
        let mut alternatives = FxHashMap::default();
        for (name, sources) in rules {
            let resolved = sources
                .iter()
                .map(|source| resolve(&parse_pattern(source).unwrap(), &names, &mut mentioned).unwrap())
                .collect();
            alternatives.insert(Symbol::new(name), resolved);
        }
        Grammar {
            order,
            names,
            mentioned,
            alternatives,
        }
    }

    /// Parse and resolve a pattern against this grammar.
    pub fn pattern(&mut self, source: &str) -> Pattern {
        resolve(&parse_pattern(source).unwrap(), &self.names, &mut self.mentioned).unwrap()
    }
}
