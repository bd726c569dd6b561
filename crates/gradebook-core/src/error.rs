//! Validation error types.
//!
//! Only rejected input is an error in the grading engine. Missing data
//! (no assignments yet, no calculator configured) resolves to neutral values,
//! and inconsistent requests (completing a course the learner is not taking)
//! are logged no-ops.

use thiserror::Error;

/// Errors raised when constructing or mutating an entity with invalid input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradebookError {
    /// A required name was empty or whitespace.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// Points earned were negative or not a finite number.
    #[error("points earned must be a finite non-negative number, got {0}")]
    InvalidPoints(f64),

    /// Points possible were zero, negative, or not a finite number.
    #[error("points possible must be a finite positive number, got {0}")]
    InvalidPointsPossible(f64),

    /// A category weight fell outside the 0.0..=1.0 range.
    #[error("category weight must be between 0.0 and 1.0, got {0}")]
    WeightOutOfRange(f64),
}

/// Reject empty or whitespace-only names.
pub(crate) fn require_name(name: &str, what: &'static str) -> Result<(), GradebookError> {
    if name.trim().is_empty() {
        return Err(GradebookError::EmptyName(what));
    }
    Ok(())
}
