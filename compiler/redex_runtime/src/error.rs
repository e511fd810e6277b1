//! Recoverable runtime errors.

use redex_ir::{Term, TermKind};
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A failure raised while running compiled code.
///
/// "No match" is never an error; matchers return empty result lists.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("plug: no hole in `{term}`")]
    NoHole { term: Term },

    #[error("path {path:?} does not address a subterm of `{term}`")]
    InvalidPath { term: Term, path: Vec<usize> },

    #[error("inconsistent ellipsis match counts: expected {expected}, found {found}")]
    InconsistentEllipsisCounts { expected: usize, found: usize },

    #[error("expected {}, found {} `{term}`", .expected.name(), .term.kind().name())]
    WrongKind { expected: TermKind, term: Term },

    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
