//! Constraint-check insertion.
//!
//! A symbol bound more than once in a pattern forces all its occurrences to
//! match equal terms. Every occurrence after the first is renamed to a fresh
//! synthetic symbol (`e_1#0`, `e_1#1`, ...) and a [`ConstraintCheck`] is placed
//! at the lowest node that contains both the occurrence and its predecessor:
//! right after the later child in a sequence, or in the `checks` list of an
//! `in-hole`. By the time that position runs, both sides are bound.
//!
//! Consecutive occurrences chain: the third occurrence is checked against
//! the second's synthetic name, so only two names are ever live per check.

use std::fmt;

use redex_ir::{ConstraintCheck, Pattern, Symbol};
use redex_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

/// Monotonic generator of synthetic `name#k` symbols, one counter per base.
#[derive(Clone, Debug, Default)]
pub struct FreshNames {
    counters: FxHashMap<Symbol, usize>,
}

impl FreshNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self, base: &Symbol) -> Symbol {
        let counter = self.counters.entry(base.clone()).or_insert(0);
        let name = Symbol::from(format!("{base}#{counter}"));
        *counter += 1;
        name
    }
}

/// One step from a pattern node to a child.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Step {
    Item(usize),
    RepeatInner,
    HoleContext,
    HoleContents,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Item(index) => write!(f, "{index}"),
            Step::RepeatInner => f.write_str("..."),
            Step::HoleContext => f.write_str("context"),
            Step::HoleContents => f.write_str("contents"),
        }
    }
}

type Path = Vec<Step>;

/// A pattern with its constraint checks made explicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constrained {
    pub pattern: Pattern,
    /// `(synthetic, original)` for every renamed occurrence.
    pub synthetic: Vec<(Symbol, Symbol)>,
}

/// Rename repeated occurrences and insert equality checks.
pub fn insert_checks(pattern: &Pattern, fresh: &mut FreshNames) -> Constrained {
    let mut occurrences: Vec<(Symbol, Vec<Path>)> = Vec::new();
    collect_occurrences(pattern, &mut Vec::new(), &mut occurrences);

    let mut plan = Plan::default();
    let mut synthetic = Vec::new();
    for (symbol, paths) in occurrences {
        let mut previous_name = symbol.clone();
        for pair in paths.windows(2) {
            let [earlier, later] = pair else { continue };
            let name = fresh.fresh(&symbol);
            let (lca, next) = split_at_common_prefix(earlier, later);
            tracing::trace!(
                %symbol,
                %name,
                scope = %display_path(&lca),
                "inserting constraint check"
            );
            plan.renames.insert(later.clone(), name.clone());
            let index = match next {
                Some(Step::Item(index)) => Some(index),
                _ => None,
            };
            plan.checks.entry(lca).or_default().push((
                index,
                ConstraintCheck {
                    left: previous_name,
                    right: name.clone(),
                },
            ));
            synthetic.push((name.clone(), symbol.clone()));
            previous_name = name;
        }
    }

    Constrained {
        pattern: plan.rebuild(pattern, &mut Vec::new()),
        synthetic,
    }
}

/// Rename every bound occurrence to its own fresh symbol.
///
/// Grammar productions bind nothing a user can observe, and two
/// occurrences of `e` in `(+ e e)` do not constrain each other.
pub fn anonymize(pattern: &Pattern, fresh: &mut FreshNames) -> Pattern {
    ensure_sufficient_stack(|| match pattern {
        Pattern::NonTerminal { prefix, symbol } => Pattern::NonTerminal {
            prefix: prefix.clone(),
            symbol: fresh.fresh(symbol),
        },
        Pattern::BuiltIn(builtin) if builtin.kind.is_bindable() => {
            let mut renamed = builtin.clone();
            renamed.symbol = fresh.fresh(&builtin.symbol);
            Pattern::BuiltIn(renamed)
        }
        Pattern::Sequence(items) => {
            Pattern::Sequence(items.iter().map(|item| anonymize(item, fresh)).collect())
        }
        Pattern::Repeat { inner, mode } => Pattern::Repeat {
            inner: Box::new(anonymize(inner, fresh)),
            mode: *mode,
        },
        Pattern::InHole {
            context,
            contents,
            checks,
        } => Pattern::InHole {
            context: Box::new(anonymize(context, fresh)),
            contents: Box::new(anonymize(contents, fresh)),
            checks: checks.clone(),
        },
        other => other.clone(),
    })
}

fn collect_occurrences(pattern: &Pattern, path: &mut Path, out: &mut Vec<(Symbol, Vec<Path>)>) {
    ensure_sufficient_stack(|| match pattern {
        Pattern::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(Step::Item(index));
                collect_occurrences(item, path, out);
                path.pop();
            }
        }
        Pattern::Repeat { inner, .. } => {
            path.push(Step::RepeatInner);
            collect_occurrences(inner, path, out);
            path.pop();
        }
        Pattern::InHole {
            context, contents, ..
        } => {
            path.push(Step::HoleContext);
            collect_occurrences(context, path, out);
            path.pop();
            path.push(Step::HoleContents);
            collect_occurrences(contents, path, out);
            path.pop();
        }
        leaf => {
            if let Some(symbol) = leaf.binding_symbol() {
                match out.iter_mut().find(|(seen, _)| seen == symbol) {
                    Some((_, paths)) => paths.push(path.clone()),
                    None => out.push((symbol.clone(), vec![path.clone()])),
                }
            }
        }
    });
}

/// The common prefix of two paths, and the step the later path takes next.
fn split_at_common_prefix(earlier: &[Step], later: &[Step]) -> (Path, Option<Step>) {
    let shared = earlier
        .iter()
        .zip(later)
        .take_while(|(a, b)| a == b)
        .count();
    (later[..shared].to_vec(), later.get(shared).copied())
}

fn display_path(path: &[Step]) -> String {
    let parts: Vec<String> = path.iter().map(ToString::to_string).collect();
    format!("/{}", parts.join("/"))
}

#[derive(Default)]
struct Plan {
    renames: FxHashMap<Path, Symbol>,
    /// Checks keyed by scope node; the index is the sequence child they follow.
    checks: FxHashMap<Path, Vec<(Option<usize>, ConstraintCheck)>>,
}

impl Plan {
    fn rebuild(&self, pattern: &Pattern, path: &mut Path) -> Pattern {
        ensure_sufficient_stack(|| match pattern {
            Pattern::Sequence(items) => {
                let pending = self.checks.get(path.as_slice());
                let mut rebuilt = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(Step::Item(index));
                    rebuilt.push(self.rebuild(item, path));
                    path.pop();
                    for (_, check) in pending
                        .into_iter()
                        .flatten()
                        .filter(|(after, _)| *after == Some(index))
                    {
                        rebuilt.push(Pattern::Check(check.clone()));
                    }
                }
                Pattern::Sequence(rebuilt)
            }
            Pattern::Repeat { inner, mode } => {
                path.push(Step::RepeatInner);
                let inner = self.rebuild(inner, path);
                path.pop();
                Pattern::Repeat {
                    inner: Box::new(inner),
                    mode: *mode,
                }
            }
            Pattern::InHole {
                context,
                contents,
                checks,
            } => {
                path.push(Step::HoleContext);
                let context = self.rebuild(context, path);
                path.pop();
                path.push(Step::HoleContents);
                let contents = self.rebuild(contents, path);
                path.pop();
                let mut checks = checks.clone();
                checks.extend(
                    self.checks
                        .get(path.as_slice())
                        .into_iter()
                        .flatten()
                        .map(|(_, check)| check.clone()),
                );
                Pattern::InHole {
                    context: Box::new(context),
                    contents: Box::new(contents),
                    checks,
                }
            }
            leaf => match self.renames.get(path.as_slice()) {
                Some(name) => rename_leaf(leaf, name),
                None => leaf.clone(),
            },
        })
    }
}

fn rename_leaf(leaf: &Pattern, name: &Symbol) -> Pattern {
    match leaf {
        Pattern::NonTerminal { prefix, .. } => Pattern::NonTerminal {
            prefix: prefix.clone(),
            symbol: name.clone(),
        },
        Pattern::BuiltIn(builtin) => {
            let mut renamed = builtin.clone();
            renamed.symbol = name.clone();
            Pattern::BuiltIn(renamed)
        }
        other => other.clone(),
    }
}
