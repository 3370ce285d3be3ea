//! Error type shared by the stepping engine
//!
//! Three families of failure exist in this domain:
//!
//! 1. **Invalid configuration**: caught before the first step is taken
//!    (non-positive counts, grid too small for a stencil, bad parameters)
//! 2. **Numerical failure**: a singular implicit system or a NaN/Inf
//!    appearing in a freshly computed time level
//! 3. **Contract violation**: writing history outside its allocation,
//!    mismatched field lengths, evaluating the analytic solution at `t <= 0`
//!
//! None of them is retryable. The computation is deterministic, so a failed
//! step aborts the whole run.

use thiserror::Error;

/// Errors raised while configuring or advancing a simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Parameters or counts that make the run meaningless
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The scheme stencil does not fit on the requested grid
    #[error("{scheme} needs at least {required} grid points, got {actual}")]
    GridTooSmall {
        scheme: String,
        required: usize,
        actual: usize,
    },

    /// The implicit system has a vanishing pivot
    #[error("implicit system is singular (zero pivot at row {row})")]
    SingularMatrix { row: usize },

    /// History column outside the allocated time range
    #[error("history index {index} out of range (capacity {capacity} time steps)")]
    HistoryIndexOutOfRange { index: usize, capacity: usize },

    /// A field does not have the grid length
    #[error("field length mismatch: expected {expected} points, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The erfc reference divides by `t`
    #[error("analytic solution is undefined at t = {time} s (requires t > 0)")]
    AnalyticUndefined { time: f64 },

    /// NaN or Inf in the newly computed level
    #[error(
        "non-finite value {value} at grid point {index} after step {step}; \
         check the Courant and diffusion numbers"
    )]
    NumericalInstability { step: usize, index: usize, value: f64 },
}

impl SolverError {
    /// Shorthand for [`SolverError::InvalidConfiguration`]
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_too_small_message() {
        let error = SolverError::GridTooSmall {
            scheme: "Lax-Wendroff".to_string(),
            required: 5,
            actual: 4,
        };

        assert_eq!(
            error.to_string(),
            "Lax-Wendroff needs at least 5 grid points, got 4"
        );
    }

    #[test]
    fn test_invalid_shorthand() {
        let error = SolverError::invalid("time steps must be positive");
        assert_eq!(
            error,
            SolverError::InvalidConfiguration("time steps must be positive".to_string())
        );
        assert!(error.to_string().starts_with("invalid configuration"));
    }
}
