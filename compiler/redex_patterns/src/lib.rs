//! Redex Patterns - grammar validation and pattern preprocessing.
//!
//! A [`Language`] is built from a `define-language` form and then prepares
//! every pattern written against it. Preprocessing runs, in order:
//!
//! 1. [`resolve`]: bare symbols become non-terminals, built-ins or literals
//! 2. [`depth`]: ellipsis depths per bound symbol (E3001 on disagreement)
//! 3. [`constraints`]: repeated symbols are renamed and checked for equality
//! 4. [`determinism`]: each repeat is marked greedy or exhaustive
//! 5. in-hole validation against the [`holes`] solver (E2007)
//!
//! The output, a [`PreparedPattern`], is what code generation consumes.

pub mod closure;
pub mod constraints;
pub mod depth;
pub mod determinism;
pub mod holes;
mod language;
pub mod resolve;

#[cfg(test)]
mod test_support;

pub use closure::{Closures, Shape};
pub use constraints::FreshNames;
pub use depth::DepthMap;
pub use holes::{HoleCount, HoleRange};
pub use language::{Language, NonTerminal, PreparedPattern};
