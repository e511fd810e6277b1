//! Stack growth for deep recursion.
//!
//! Three places recurse in proportion to the input rather than the code:
//! the reader and pattern passes (nesting depth of the source), term
//! traversal (`subterms`, path replacement) and the interpreter, where every
//! nested sequence in a matched term costs one generated-matcher call.
//! Wrapping those recursion points in [`ensure_sufficient_stack`] turns a
//! deeply nested term into extra heap-allocated stack instead of a crash.
//!
//! On WASM targets the wrapper is a passthrough.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
///
/// One interpreted call frame holds a variable map and the statement
/// walker's locals, so segments are sized for a few thousand frames.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
