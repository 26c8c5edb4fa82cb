//! Engine error type.

use vectrace_pipeline::{ValidationError, VectorizeSettings};

/// Errors surfaced by the orchestrator, sweep and selection operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Settings were rejected before any trace was attempted. The
    /// previous settings remain active.
    #[error("invalid settings: {0}")]
    Validation(#[from] ValidationError),

    /// A trace was requested without an active image.
    #[error("no image loaded")]
    NoImage,

    /// The vectorizer failed for the current request. The previous
    /// result remains available.
    #[error("trace failed: {reason}")]
    TraceFailed {
        /// Settings of the failed request.
        settings: VectorizeSettings,
        /// Vectorizer-provided cause.
        reason: String,
    },

    /// Export was requested before any trace completed for the current
    /// image.
    #[error("no trace result available")]
    NoResult,

    /// A sweep cell index lies outside the grid.
    #[error("sweep cell ({row}, {col}) is outside the grid")]
    CellOutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}
