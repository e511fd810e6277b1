//! Diagnostic system for compile-time error reporting.
//!
//! Every compile error carries:
//! - An error code for searchability (`redexc explain E2003`)
//! - A clear message (what went wrong)
//! - A primary span (where it went wrong)
//! - Context labels and notes (why it's wrong)
//! - Suggestions (how to fix)
//!
//! Compilation stops at the first error, so passes return
//! `Result<T, Diagnostic>` and the driver renders the single diagnostic.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;
