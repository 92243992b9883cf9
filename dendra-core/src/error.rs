//! Structured error types for the dendra workspace.

use thiserror::Error;

/// Unified error type for all dendra operations.
#[derive(Debug, Error)]
pub enum DendraError {
    /// Invalid input (bad arguments, mismatched lengths, empty item sets)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A computation could not be completed (a data fetch failed mid-run,
    /// or internal state was found inconsistent)
    #[error("computation failed: {0}")]
    Computation(String),

    /// The run was cancelled via its [`CancelToken`](crate::CancelToken).
    ///
    /// This is a terminal outcome, not a defect; callers should treat it
    /// separately from the other variants.
    #[error("cancelled")]
    Cancelled,

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the dendra workspace.
pub type Result<T> = std::result::Result<T, DendraError>;

impl DendraError {
    /// True if this error represents cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DendraError::Cancelled)
    }
}
