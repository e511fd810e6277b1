//! Redex Eval - executes the statement IR emitted by `redex_codegen`.
//!
//! The interpreter is a direct tree walker over [`redex_ir::code`]:
//! module-level assignments run once when the interpreter is built, every
//! function call gets a fresh local scope, and [`RuntimeFn`] calls dispatch
//! onto `redex_runtime`.
//!
//! - [`Value`]: the dynamic values generated code manipulates
//! - [`ForeignRegistry`]: host functions reachable from `foreign-call`
//! - [`print_handler`]: where `print` statements go
//! - [`CallStats`]: per-function call counters for instrumentation
//!
//! [`RuntimeFn`]: redex_ir::code::RuntimeFn

mod diagnostics;
mod errors;
mod foreign;
mod interpreter;
pub mod print_handler;
mod runtime_calls;
mod value;

pub use diagnostics::{CallStack, CallStats};
pub use errors::{EvalError, EvalResult};
pub use foreign::{ForeignFn, ForeignRegistry};
pub use interpreter::{Interpreter, InterpreterConfig};
pub use print_handler::{buffer_handler, silent_handler, stdout_handler, SharedPrintHandler};
pub use value::Value;
