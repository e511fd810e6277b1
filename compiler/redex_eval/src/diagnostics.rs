//! Call tracking for the interpreter.
//!
//! - `CallStack`: live frames with a depth limit, so runaway recursion in
//!   generated code becomes an error instead of exhausting memory
//! - `CallStats`: how many times each function was entered, used by tests
//!   to observe which matchers ran

use redex_ir::Symbol;
use rustc_hash::FxHashMap;

use crate::errors::EvalError;

/// Live call stack with an optional depth limit.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<Symbol>,
    max_depth: Option<usize>,
}

impl CallStack {
    pub fn new(max_depth: Option<usize>) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, checking the depth limit. The frame is not pushed on
    /// overflow.
    pub fn push(&mut self, function: Symbol) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(EvalError::StackOverflow(max));
            }
        }
        self.frames.push(function);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(!self.frames.is_empty(), "CallStack::pop on empty stack");
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Function names, innermost last.
    pub fn frames(&self) -> &[Symbol] {
        &self.frames
    }
}

/// Per-function entry counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallStats {
    calls: FxHashMap<Symbol, usize>,
}

impl CallStats {
    pub(crate) fn record(&mut self, function: &Symbol) {
        *self.calls.entry(function.clone()).or_insert(0) += 1;
    }

    /// Calls of exactly `function`.
    pub fn count(&self, function: &str) -> usize {
        self.calls.get(&Symbol::new(function)).copied().unwrap_or(0)
    }

    /// Calls of every function whose name starts with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls
            .iter()
            .filter(|(name, _)| name.as_str().starts_with(prefix))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.calls.values().sum()
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

#[cfg(test)]
mod tests;
