//! Stack growth for the recursive walk.
//!
//! `exec` and `eval` recurse once per nested node and once per SMPL call.
//! Each entry checks the remaining stack and moves onto a fresh segment
//! when it runs low, so depth is bounded by [`EvalConfig::max_call_depth`]
//! rather than by the thread's stack size.
//!
//! [`EvalConfig::max_call_depth`]: crate::EvalConfig::max_call_depth

/// Grow when less than this is left (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
