//! Evaluator configuration.

/// Default bound on nested calls of parameterized namespaces.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalOptions {
    /// Calls of parameterized namespaces deeper than this fail with
    /// `RecursionLimit`.
    pub max_call_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl EvalOptions {
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
