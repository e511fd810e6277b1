//! Entry-point execution.
//!
//! Every entry of a compiled program is a zero-argument function. Running
//! one either returns (pass) or raises (fail); raised messages become the
//! failure text.

use redex_codegen::{Entry, EntryKind};
use redex_eval::{EvalResult, InterpreterConfig};
use redex_ir::Span;

use crate::Compiled;

/// Outcome of a single entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Result of running one entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionResult {
    pub description: String,
    pub kind: EntryKind,
    pub span: Span,
    pub outcome: Outcome,
}

/// Results of one run, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub results: Vec<AssertionResult>,
    pub passed: usize,
    pub failed: usize,
    /// Entries excluded by the filter.
    pub filtered_out: usize,
}

impl TestSummary {
    fn add(&mut self, result: AssertionResult) {
        match result.outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Failed entries with their messages.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|result| match &result.outcome {
            Outcome::Failed(message) => Some((result.description.as_str(), message.as_str())),
            Outcome::Passed => None,
        })
    }
}

/// Run every entry whose description contains `filter`.
///
/// `redex-match` entries pass when they evaluate without raising; their
/// printed output goes to the configured print handler. An error while
/// loading the module (before any entry runs) is returned as `Err`.
#[tracing::instrument(level = "debug", skip_all, fields(entries = compiled.entries().len()))]
pub fn run_assertions(
    compiled: &Compiled,
    filter: Option<&str>,
    config: InterpreterConfig,
) -> EvalResult<TestSummary> {
    let mut interpreter = compiled.interpreter(config)?;
    let mut summary = TestSummary::default();
    for entry in compiled.entries() {
        if !selected(entry, filter) {
            summary.filtered_out += 1;
            continue;
        }
        let outcome = match interpreter.call(entry.function.as_str(), Vec::new()) {
            Ok(_) => Outcome::Passed,
            Err(error) => Outcome::Failed(error.to_string()),
        };
        tracing::debug!(entry = %entry.function, passed = outcome.is_passed(), "entry finished");
        summary.add(AssertionResult {
            description: entry.description.clone(),
            kind: entry.kind,
            span: entry.span,
            outcome,
        });
    }
    Ok(summary)
}

fn selected(entry: &Entry, filter: Option<&str>) -> bool {
    filter.map_or(true, |text| entry.description.contains(text))
}

#[cfg(test)]
mod tests;
