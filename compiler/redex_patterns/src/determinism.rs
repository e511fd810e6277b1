//! Repeat-mode classification.
//!
//! A `Repeat` may match greedily when no element it could consume can also
//! start whatever follows it. Concretely: its inner pattern must be provably
//! different from every later sibling up to and including the first
//! fixed-width one. A repeat with nothing fixed after it is greedy as well,
//! since the enclosing sequence must end where it stops, unless its inner
//! pattern is an `in-hole`.

use std::collections::BTreeSet;

use redex_ir::{Pattern, RepeatMode, Symbol};
use redex_stack::ensure_sufficient_stack;

use crate::closure::Closures;

/// Rewrite every `Repeat` in `pattern` with its classified mode.
pub fn classify(pattern: &Pattern, closures: &Closures, mentioned: &BTreeSet<Symbol>) -> Pattern {
    ensure_sufficient_stack(|| match pattern {
        Pattern::Sequence(items) => {
            let items: Vec<Pattern> = items
                .iter()
                .map(|item| classify(item, closures, mentioned))
                .collect();
            let modes: Vec<Option<RepeatMode>> = (0..items.len())
                .map(|index| repeat_mode(&items, index, closures, mentioned))
                .collect();
            Pattern::Sequence(
                items
                    .into_iter()
                    .zip(modes)
                    .map(|(item, mode)| match (item, mode) {
                        (Pattern::Repeat { inner, .. }, Some(mode)) => Pattern::Repeat { inner, mode },
                        (item, _) => item,
                    })
                    .collect(),
            )
        }
        Pattern::Repeat { inner, mode } => Pattern::Repeat {
            inner: Box::new(classify(inner, closures, mentioned)),
            mode: *mode,
        },
        Pattern::InHole {
            context,
            contents,
            checks,
        } => Pattern::InHole {
            context: Box::new(classify(context, closures, mentioned)),
            contents: Box::new(classify(contents, closures, mentioned)),
            checks: checks.clone(),
        },
        leaf => leaf.clone(),
    })
}

fn repeat_mode(
    items: &[Pattern],
    index: usize,
    closures: &Closures,
    mentioned: &BTreeSet<Symbol>,
) -> Option<RepeatMode> {
    let Pattern::Repeat { inner, .. } = &items[index] else {
        return None;
    };
    for follower in &items[index + 1..] {
        let candidate = match follower {
            Pattern::Check(_) => continue,
            Pattern::Repeat { inner, .. } => inner.as_ref(),
            fixed => fixed,
        };
        if !closures.provably_different(inner, candidate, mentioned) {
            return Some(RepeatMode::NonDeterministic);
        }
        if follower.is_fixed_width() {
            return Some(RepeatMode::Deterministic);
        }
    }
    if matches!(inner.as_ref(), Pattern::InHole { .. }) {
        Some(RepeatMode::NonDeterministic)
    } else {
        Some(RepeatMode::Deterministic)
    }
}
