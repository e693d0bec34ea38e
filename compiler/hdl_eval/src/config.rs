//! Folding configuration.

/// Limits and switches for one folding session.
///
/// Built in code by the driver; nothing here is read from the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldConfig {
    /// Deepest nesting of calls a thunk may reach before the fold is
    /// abandoned.
    pub max_call_depth: usize,
    /// Instructions executed per fold before it is abandoned.
    pub max_steps: u64,
    /// Remove dead operations from thunks before code generation.
    pub optimize_thunks: bool,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_steps: 1_000_000,
            optimize_thunks: true,
        }
    }
}

impl FoldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    #[must_use]
    pub fn with_optimize_thunks(mut self, enabled: bool) -> Self {
        self.optimize_thunks = enabled;
        self
    }
}
