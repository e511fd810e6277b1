//! Redex IR - shared data model for the Redex compiler.
//!
//! This crate contains the types every pipeline stage agrees on:
//! - Spans for source locations
//! - Symbols (bound-symbol and prefix handling)
//! - Terms, the immutable data patterns match against
//! - Patterns and templates, the matching and construction languages
//! - Specification forms produced by the reader
//! - The target statement IR ([`code`]) emitted by code generation
//!
//! # Design Philosophy
//!
//! - **Share, don't copy**: symbols are `Rc<str>`, sequence children are
//!   `Rc<[Term]>`, so clones are O(1) and rebuilt terms share siblings.
//! - **Structural identity**: `Pattern` and `Term` are `Hash + Eq` so later
//!   stages can memoize on the node itself instead of a rendered string.
//!
//! Floats are stored as `u64` bits for `Hash` compatibility.

pub mod code;
mod forms;
mod pattern;
mod span;
mod symbol;
mod template;
mod term;

pub use forms::{
    AssertMatchEqual, AssertReductionEqual, AssertTermEqual, Contract, DefineLanguage,
    DefineMetafunction, DefineReductionRelation, ExpectedMatch, Form, MetafunctionCase,
    NonTerminalDef, RedexMatch, ReductionCase, Spec,
};
pub use pattern::{BuiltIn, BuiltInKind, ConstraintCheck, Literal, LiteralKind, Pattern, RepeatMode};
pub use span::Span;
pub use symbol::Symbol;
pub use template::{InsertMode, Template};
pub use term::{Float, Term, TermKind, TermPath};
