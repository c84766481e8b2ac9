// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Valence Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Valence Kernel failures.
///
/// Every failure is scoped to a single simulation invocation; nothing
/// here is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValenceError {
    /// A vector's length does not match its configured dimension.
    #[error("shape mismatch: {what} expected length {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Negative step count.
    #[error("invalid step count: {0} (must be >= 0)")]
    InvalidStepCount(i64),

    /// Input outside its admissible range (damping, initial state, k).
    #[error("validation error: {0}")]
    Validation(String),

    /// NaN/Inf in an input vector or scalar.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// State-guide source missing or malformed.
    #[error("data load error: {0}")]
    DataLoad(String),
}

pub type ValenceResult<T> = Result<T, ValenceError>;

impl ValenceError {
    pub fn shape(what: &'static str, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_display() {
        let err = ValenceError::shape("core", 7, 5);
        assert_eq!(
            err.to_string(),
            "shape mismatch: core expected length 7, got 5"
        );
    }

    #[test]
    fn test_invalid_step_count_display() {
        let err = ValenceError::InvalidStepCount(-3);
        assert_eq!(err.to_string(), "invalid step count: -3 (must be >= 0)");
    }

    #[test]
    fn test_data_load_display() {
        let err = ValenceError::DataLoad("stateGuides.json not found".into());
        assert!(err.to_string().starts_with("data load error"));
    }
}
