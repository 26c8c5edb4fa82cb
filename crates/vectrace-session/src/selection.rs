//! Promoting a sweep cell to the live preview.

use vectrace_pipeline::VectorizeSettings;

use crate::error::SessionError;
use crate::orchestrator::{Orchestrator, TraceRequest};
use crate::sweep::{GRID_SIZE, cell_settings};
use crate::vectorizer::Vectorizer;

/// A chosen sweep cell.
///
/// Selecting a cell is the only way the sweep feeds back into the
/// orchestrator: the cell's threshold and turd size replace those of
/// the orchestrator's current settings, and every other field is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSelection {
    row: usize,
    col: usize,
}

impl PreviewSelection {
    /// Select cell `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CellOutOfRange`] if either index is not
    /// below [`GRID_SIZE`].
    pub const fn new(row: usize, col: usize) -> Result<Self, SessionError> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Ok(Self { row, col })
        } else {
            Err(SessionError::CellOutOfRange { row, col })
        }
    }

    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn col(&self) -> usize {
        self.col
    }

    /// `base` with this cell's threshold and turd size.
    #[must_use]
    pub fn resolve(&self, base: &VectorizeSettings) -> VectorizeSettings {
        cell_settings(base, self.row, self.col)
    }

    /// Make this cell's settings the orchestrator's current settings.
    ///
    /// Resolves against the orchestrator's settings at the time of the
    /// call, so edits made after the sweep was generated are kept.
    /// Returns the live-preview request, if one was issued.
    ///
    /// # Errors
    ///
    /// Propagates [`Orchestrator::update_settings`] errors.
    pub fn apply<V: Vectorizer>(
        &self,
        orchestrator: &Orchestrator<V>,
    ) -> Result<Option<TraceRequest>, SessionError> {
        let settings = self.resolve(&orchestrator.settings());
        log::debug!(
            "selected sweep cell ({}, {}): threshold {}, turd size {}",
            self.row,
            self.col,
            settings.threshold,
            settings.turd_size,
        );
        orchestrator.update_settings(settings)
    }
}
