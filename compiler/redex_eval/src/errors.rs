//! Evaluation errors.
//!
//! Every failure the generated code can hit is recoverable: a raised
//! assertion, a runtime helper error, or a malformed program. Constructor
//! functions keep message wording in one place.

use redex_runtime::RuntimeError;
use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A runtime helper failed (no hole, bad path, inconsistent counts).
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// A `raise` statement in generated code.
    #[error("{0}")]
    Raised(String),
    /// A foreign function reported failure.
    #[error("foreign function `{function}` failed: {message}")]
    Foreign { function: String, message: String },
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("`{function}` takes {expected} argument(s), got {found}")]
    WrongArgCount {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },
    #[error("cannot apply `{op}` to {left} and {right}")]
    InvalidBinaryOp {
        op: &'static str,
        left: String,
        right: String,
    },
    #[error("integer overflow")]
    Overflow,
    #[error("`break` outside of a loop")]
    BreakOutsideLoop,
    #[error("cannot read term literal: {0}")]
    ReadTerm(String),
    #[error("maximum recursion depth of {0} exceeded")]
    StackOverflow(usize),
}

pub(crate) fn type_mismatch(expected: &'static str, found: &crate::Value) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        found: found.type_name().to_owned(),
    }
}

pub(crate) fn invalid_binary_op(op: &'static str, left: &crate::Value, right: &crate::Value) -> EvalError {
    EvalError::InvalidBinaryOp {
        op,
        left: left.type_name().to_owned(),
        right: right.type_name().to_owned(),
    }
}

pub(crate) fn wrong_arg_count(function: &str, expected: usize, found: usize) -> EvalError {
    EvalError::WrongArgCount {
        function: function.to_owned(),
        expected,
        found,
    }
}
