//! Host functions reachable from `foreign-call` and `foreign-splice`.
//!
//! A `require-foreign-source` form only records a path; the embedding
//! program decides what that source provides by registering closures here
//! under the names templates call.

use std::fmt;
use std::rc::Rc;

use redex_ir::{Symbol, Term};
use rustc_hash::FxHashMap;

/// A host function over terms. An `Err` message becomes an evaluation error.
pub type ForeignFn = Rc<dyn Fn(&[Term]) -> Result<Term, String>>;

#[derive(Clone, Default)]
pub struct ForeignRegistry {
    functions: FxHashMap<Symbol, ForeignFn>,
}

impl ForeignRegistry {
    pub fn new() -> Self {
        ForeignRegistry::default()
    }

    /// Register `function` under `name`, replacing any previous one.
    pub fn register(
        &mut self,
        name: &str,
        function: impl Fn(&[Term]) -> Result<Term, String> + 'static,
    ) -> &mut Self {
        self.functions.insert(Symbol::new(name), Rc::new(function));
        self
    }

    pub fn get(&self, name: &Symbol) -> Option<&ForeignFn> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&Symbol::new(name))
    }
}

impl fmt::Debug for ForeignRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(Symbol::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ForeignRegistry").field("functions", &names).finish()
    }
}

#[cfg(test)]
mod tests;
