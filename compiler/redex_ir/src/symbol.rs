//! Reference-counted symbol names.
//!
//! A [`Symbol`] is the exact string used as a binding key (the
//! *bound-symbol*, e.g. `n_1`). Its *prefix* is the part before the first
//! underscore (`n`), which names the grammar rule or built-in pattern kind.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

/// Interned-by-sharing identifier.
///
/// Cloning is O(1). Equality, ordering and hashing are by string content, so
/// a `Symbol` can be looked up in maps keyed by `&str`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Create a symbol from its text.
    pub fn new(text: &str) -> Self {
        Symbol(Rc::from(text))
    }

    /// The symbol's text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The text before the first `_`, or the whole symbol when there is none.
    pub fn prefix(&self) -> &str {
        match self.0.find('_') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Whether the symbol carries a `_suffix`.
    pub fn has_suffix(&self) -> bool {
        self.0.contains('_')
    }

    /// Whether this is a synthetic constraint symbol (`sym#k`).
    pub fn is_synthetic(&self) -> bool {
        self.0.contains('#')
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::new(text)
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Symbol(Rc::from(text))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.0)
    }
}
