//! Redex Runtime - the data model compiled matchers execute against.
//!
//! - [`MatchEnv`]: the binding environment, a persistent map from bound
//!   symbol to a stack of partially built term lists
//! - [`terms`]: path-based rebuilding, plugging and result comparison
//! - [`RuntimeError`]: recoverable failures raised by generated code

mod env;
mod error;
pub mod terms;

pub use env::MatchEnv;
pub use error::{RuntimeError, RuntimeResult};
