//! Stack growth for deeply nested documents.
//!
//! Namespaces nest inside blocks, blocks nest inside namespaces, and
//! expressions call parameterized namespaces that evaluate further
//! expressions. Both the parser and the evaluator recurse along that
//! structure, so every recursive entry point runs through [`with_stack`].
//!
//! On native targets the stack is grown on demand with `stacker`; on
//! `wasm32` the closure is called directly.
//!
//! Logical limits (`max_recursion_depth`, `max_call_depth`) are enforced by
//! the callers. This crate only makes sure those limits are reached before
//! the thread stack runs out.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `wasm32` manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
