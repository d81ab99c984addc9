//! Stack safety utilities for deep recursion.
//!
//! Evaluation, resolution and optimization all recurse once per tree level,
//! so a deeply nested expression could overflow the native stack. Every
//! recursive step goes through [`ensure_sufficient_stack`], which grows the
//! stack with `stacker` when it runs low.
//!
//! # Configuration
//!
//! - **Red zone**: 100KB. Less than this remaining triggers growth.
//! - **Growth size**: 1MB per growth.
//!
//! On WASM targets the guard is a passthrough; the runtime manages the stack.

/// Minimum stack space to keep available (100KB red zone).
///
/// If less than this amount remains, the stack is grown.
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// On native targets, grows the stack with `stacker::maybe_grow` when less
/// than [`RED_ZONE`] remains. On WASM targets, calls `f` directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
