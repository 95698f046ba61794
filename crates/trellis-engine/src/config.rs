//! Lowering options.

use serde::{Deserialize, Serialize};
use trellis_common::utils::error::{Error, Result};

/// Default bound for loops that only have an exit condition.
pub const DEFAULT_MAX_LOOP_ITERATIONS: u32 = 64;

/// Options that shape how traversals are lowered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringOptions {
    /// Iteration bound for `repeat().until()` without `times()`.
    pub max_loop_iterations: u32,
    /// Lower `order()` followed by a global `limit(n)` to a single top-k sort.
    pub top_by_fusion: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            max_loop_iterations: DEFAULT_MAX_LOOP_ITERATIONS,
            top_by_fusion: true,
        }
    }
}

impl LoweringOptions {
    /// Sets the loop bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `n` is zero.
    pub fn with_max_loop_iterations(mut self, n: u32) -> Result<Self> {
        if n == 0 {
            return Err(Error::invalid_config(
                "max_loop_iterations must be at least 1",
            ));
        }
        self.max_loop_iterations = n;
        Ok(self)
    }

    /// Enables or disables top-k fusion.
    #[must_use]
    pub fn with_top_by_fusion(mut self, enabled: bool) -> Self {
        self.top_by_fusion = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LoweringOptions::default();
        assert_eq!(options.max_loop_iterations, 64);
        assert!(options.top_by_fusion);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(LoweringOptions::default().with_max_loop_iterations(0).is_err());
        let options = LoweringOptions::default()
            .with_max_loop_iterations(8)
            .unwrap()
            .with_top_by_fusion(false);
        assert_eq!(options.max_loop_iterations, 8);
        assert!(!options.top_by_fusion);
    }
}
