//! Runtime configuration.

/// Runtime configuration options.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Script call nesting allowed before `RangeError: Maximum call stack size exceeded`.
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 400,
        }
    }
}
