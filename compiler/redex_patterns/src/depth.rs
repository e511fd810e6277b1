//! Ellipsis-depth checking.
//!
//! Every occurrence of a bound symbol in one pattern must sit under the
//! same number of ellipses; the resulting `symbol -> depth` map drives both
//! binding bookkeeping in generated matchers and template annotation.

use redex_diagnostic::{Diagnostic, ErrorCode};
use redex_ir::{Pattern, Symbol};
use redex_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

pub type DepthMap = FxHashMap<Symbol, usize>;

/// Ellipsis depth of every bound symbol in `pattern`.
pub fn check_depths(pattern: &Pattern) -> Result<DepthMap, Diagnostic> {
    let mut depths = DepthMap::default();
    record(pattern, 0, &mut depths)?;
    Ok(depths)
}

fn record(pattern: &Pattern, depth: usize, depths: &mut DepthMap) -> Result<(), Diagnostic> {
    ensure_sufficient_stack(|| {
        match pattern {
            Pattern::Sequence(items) => {
                for item in items {
                    record(item, depth, depths)?;
                }
            }
            Pattern::Repeat { inner, .. } => record(inner, depth + 1, depths)?,
            Pattern::InHole {
                context, contents, ..
            } => {
                record(context, depth, depths)?;
                record(contents, depth, depths)?;
            }
            leaf => {
                if let Some(symbol) = leaf.binding_symbol() {
                    match depths.get(symbol) {
                        Some(&previous) if previous != depth => {
                            return Err(mismatch(symbol, previous, depth));
                        }
                        Some(_) => {}
                        None => {
                            depths.insert(symbol.clone(), depth);
                        }
                    }
                }
            }
        }
        Ok(())
    })
}

fn mismatch(symbol: &Symbol, first: usize, second: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message(format!(
            "`{symbol}` is matched at ellipsis depth {first} and at depth {second}"
        ))
        .with_note("every occurrence of a pattern variable must be under the same number of ellipses")
}

#[cfg(test)]
mod tests;
