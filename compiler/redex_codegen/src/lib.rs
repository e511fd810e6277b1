//! Redex Codegen - compiles prepared patterns and templates to the
//! statement IR.
//!
//! - [`context`]: the per-run [`CompilationContext`] (memo tables, hoisted
//!   literals, fresh names)
//! - [`matcher`]: one matching function per distinct pattern, plus
//!   non-terminal `is-a` predicates
//! - [`annotate`] and [`term`]: template annotation and construction code
//! - [`program`]: whole-specification assembly into a [`Program`]
//!
//! Generated matchers follow one calling convention:
//!
//! ```text
//! match_k(terms, head, tail, m) -> [(m', head'), ...]
//! ```
//!
//! An empty result list is the only representation of "no match".

pub mod annotate;
pub mod context;
pub mod matcher;
mod program;
pub mod term;

pub use annotate::{annotate, Annotated};
pub use context::{mangle, CompilationContext, CompileOptions};
pub use matcher::MatcherGen;
pub use program::{compile_spec, Entry, EntryKind, Program};
pub use term::compile_template;
