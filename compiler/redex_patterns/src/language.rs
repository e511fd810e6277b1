//! Languages: validated grammars plus the pattern preprocessing pipeline.

use std::collections::BTreeSet;

use redex_diagnostic::{Diagnostic, ErrorCode};
use redex_ir::{DefineLanguage, Pattern, Span, Symbol};
use redex_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::closure::Closures;
use crate::constraints::{anonymize, insert_checks, FreshNames};
use crate::depth::{check_depths, DepthMap};
use crate::determinism::classify;
use crate::holes::{holes_of, solve, HoleRange, HoleTable};
use crate::resolve::resolve;

/// A pattern after every preprocessing pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedPattern {
    pub pattern: Pattern,
    /// Ellipsis depth of every bound symbol, synthetic ones included.
    pub depths: DepthMap,
    /// Constraint symbols to drop from a finished match.
    pub synthetic: Vec<Symbol>,
}

/// A grammar rule with its preprocessed alternatives.
#[derive(Clone, Debug)]
pub struct NonTerminal {
    pub name: Symbol,
    pub alternatives: Vec<PreparedPattern>,
    /// `None` when the rule can never produce a finite term.
    pub holes: Option<HoleRange>,
    pub span: Span,
}

/// A validated language definition.
///
/// Owns the per-language state every later pattern is prepared against:
/// the mentioned-variables set, non-terminal closures and hole ranges, and
/// the fresh-name counter.
#[derive(Debug)]
pub struct Language {
    name: Symbol,
    non_terminals: Vec<NonTerminal>,
    index: FxHashMap<Symbol, usize>,
    names: FxHashSet<Symbol>,
    mentioned: BTreeSet<Symbol>,
    closures: Closures,
    holes: HoleTable,
    fresh: FreshNames,
}

impl Language {
    /// Validate and preprocess a `define-language` form.
    #[tracing::instrument(level = "debug", skip_all, fields(language = %def.name))]
    pub fn new(def: &DefineLanguage) -> Result<Language, Diagnostic> {
        let mut index: FxHashMap<Symbol, usize> = FxHashMap::default();
        for (position, rule) in def.non_terminals.iter().enumerate() {
            if rule.name.has_suffix() {
                return Err(Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "non-terminal name `{}` contains an underscore",
                        rule.name
                    ))
                    .with_label(rule.span, "defined here"));
            }
            if let Some(&first) = index.get(&rule.name) {
                let first_span = def.non_terminals[first].span;
                return Err(Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!("non-terminal `{}` is defined more than once", rule.name))
                    .with_label(rule.span, "redefined here")
                    .with_secondary_label(first_span, "first defined here"));
            }
            index.insert(rule.name.clone(), position);
        }

        let names: FxHashSet<Symbol> = index.keys().cloned().collect();
        let order: Vec<Symbol> = def.non_terminals.iter().map(|rule| rule.name.clone()).collect();
        let mut mentioned = BTreeSet::new();
        let mut alternatives: FxHashMap<Symbol, Vec<Pattern>> = FxHashMap::default();
        for rule in &def.non_terminals {
            let resolved = rule
                .alternatives
                .iter()
                .map(|alternative| resolve(alternative, &names, &mut mentioned))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| error.or_label(rule.span, "in this non-terminal"))?;
            alternatives.insert(rule.name.clone(), resolved);
        }

        if let Some(cycle) = find_alias_cycle(&order, &alternatives) {
            let path: Vec<&str> = cycle.iter().map(Symbol::as_str).collect();
            let span = index.get(&cycle[0]).map_or(def.span, |&i| def.non_terminals[i].span);
            return Err(Diagnostic::error(ErrorCode::E2003)
                .with_message(format!("non-terminal cycle: {}", path.join(" -> ")))
                .with_label(span, "cycle starts here")
                .with_note("a non-terminal cannot be defined only in terms of itself"));
        }

        let closures = Closures::compute(&alternatives);
        let holes = solve(&order, &alternatives);
        tracing::debug!(
            non_terminals = order.len(),
            mentioned = mentioned.len(),
            "grammar resolved"
        );

        let mut language = Language {
            name: def.name.clone(),
            non_terminals: Vec::with_capacity(order.len()),
            index,
            names,
            mentioned,
            closures,
            holes,
            fresh: FreshNames::new(),
        };

        for rule in &def.non_terminals {
            let mut prepared = Vec::new();
            for alternative in alternatives.remove(&rule.name).into_iter().flatten() {
                let anonymous = anonymize(&alternative, &mut language.fresh);
                let pattern = language
                    .finish(anonymous)
                    .map_err(|error| error.or_label(rule.span, "in this non-terminal"))?;
                prepared.push(pattern);
            }
            language.non_terminals.push(NonTerminal {
                name: rule.name.clone(),
                alternatives: prepared,
                holes: language.holes.get(&rule.name).copied().flatten(),
                span: rule.span,
            });
        }

        Ok(language)
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    /// Non-terminals in definition order.
    pub fn non_terminals(&self) -> &[NonTerminal] {
        &self.non_terminals
    }

    pub fn non_terminal(&self, name: &str) -> Option<&NonTerminal> {
        self.index.get(name).map(|&i| &self.non_terminals[i])
    }

    /// Literal variables recorded by resolution so far, sorted.
    pub fn mentioned(&self) -> &BTreeSet<Symbol> {
        &self.mentioned
    }

    pub fn closures(&self) -> &Closures {
        &self.closures
    }

    /// Run the full preprocessing pipeline on a user pattern.
    ///
    /// Resolution may record new literal variables in the mentioned set.
    pub fn prepare(&mut self, pattern: &Pattern) -> Result<PreparedPattern, Diagnostic> {
        let resolved = resolve(pattern, &self.names, &mut self.mentioned)?;
        let depths = check_depths(&resolved)?;
        let constrained = insert_checks(&resolved, &mut self.fresh);
        let mut prepared = self.finish(constrained.pattern)?;
        debug_assert!(depths.iter().all(|(symbol, depth)| prepared.depths.get(symbol) == Some(depth)));
        prepared.synthetic = constrained
            .synthetic
            .into_iter()
            .map(|(synthetic, _)| synthetic)
            .collect();
        tracing::trace!(pattern = %prepared.pattern, "pattern prepared");
        Ok(prepared)
    }

    /// Shared tail of the pipeline: depths, determinism, in-hole validation.
    fn finish(&self, pattern: Pattern) -> Result<PreparedPattern, Diagnostic> {
        let depths = check_depths(&pattern)?;
        let pattern = classify(&pattern, &self.closures, &self.mentioned);
        self.validate_in_holes(&pattern)?;
        Ok(PreparedPattern {
            pattern,
            depths,
            synthetic: Vec::new(),
        })
    }

    /// Every `in-hole` context must match terms with exactly one hole.
    fn validate_in_holes(&self, pattern: &Pattern) -> Result<(), Diagnostic> {
        ensure_sufficient_stack(|| match pattern {
            Pattern::Sequence(items) => items.iter().try_for_each(|item| self.validate_in_holes(item)),
            Pattern::Repeat { inner, .. } => self.validate_in_holes(inner),
            Pattern::InHole {
                context, contents, ..
            } => {
                let range = holes_of(context, &self.holes);
                if range != Some(HoleRange::ONE) {
                    let found = range.map_or_else(|| "no finite term".to_string(), |r| r.to_string());
                    return Err(Diagnostic::error(ErrorCode::E2007)
                        .with_message(format!(
                            "in-hole context `{context}` must match exactly one hole, found {found}"
                        ))
                        .with_suggestion(
                            "use an evaluation-context non-terminal such as `E ::= hole (f E)`",
                        ));
                }
                self.validate_in_holes(context)?;
                self.validate_in_holes(contents)
            }
            _ => Ok(()),
        })
    }
}

/// First cycle among alias alternatives (`x ::= y`), as a closed path.
fn find_alias_cycle(
    order: &[Symbol],
    alternatives: &FxHashMap<Symbol, Vec<Pattern>>,
) -> Option<Vec<Symbol>> {
    fn visit(
        name: &Symbol,
        alternatives: &FxHashMap<Symbol, Vec<Pattern>>,
        stack: &mut Vec<Symbol>,
        done: &mut FxHashSet<Symbol>,
    ) -> Option<Vec<Symbol>> {
        if let Some(start) = stack.iter().position(|seen| seen == name) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(name.clone());
            return Some(cycle);
        }
        if done.contains(name) {
            return None;
        }
        stack.push(name.clone());
        for alternative in alternatives.get(name).into_iter().flatten() {
            if let Pattern::NonTerminal { prefix, .. } = alternative {
                if let Some(cycle) = visit(prefix, alternatives, stack, done) {
                    return Some(cycle);
                }
            }
        }
        stack.pop();
        done.insert(name.clone());
        None
    }

    let mut done = FxHashSet::default();
    order
        .iter()
        .find_map(|name| visit(name, alternatives, &mut Vec::new(), &mut done))
}

#[cfg(test)]
mod tests;
