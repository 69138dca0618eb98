//! Stack growth for recursive descent over deeply nested scripts.
//!
//! A script like `((((...1...))))` or `-------x` recurses once per level in
//! both the parser and the evaluator. On native targets `stacker` grows the
//! stack on demand; on WASM the closure runs directly.

/// If less than this much stack remains, grow before recursing (100KB).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1MB).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the red zone has been reached.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_closure_result() {
        assert_eq!(ensure_sufficient_stack(|| 7 * 6), 42);
    }

    #[test]
    fn test_deep_nesting() {
        fn nest(depth: u32) -> u32 {
            ensure_sufficient_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
        }

        assert_eq!(nest(50_000), 50_000);
    }
}
