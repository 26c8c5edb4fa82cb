//! The owned engine state: one orchestrator, one sweep, one vectorizer.

use std::sync::Arc;

use vectrace_export::ExportArtifact;
use vectrace_pipeline::{SourceImage, VectorizeSettings};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::orchestrator::{Orchestrator, TraceOutcome};
use crate::selection::PreviewSelection;
use crate::sweep::{SweepGenerator, SweepSummary};
use crate::vectorizer::Vectorizer;

/// What opening an image produced.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedImage {
    /// Outcome of the initial live-preview trace.
    pub preview: Result<TraceOutcome, SessionError>,
    /// State of the sweep once it stopped.
    pub sweep: SweepSummary,
}

/// Interactive vectorization session.
///
/// The orchestrator and the sweep generator each own their state and
/// share only the vectorizer. Cross-component effects go through
/// [`PreviewSelection`].
#[derive(Debug)]
pub struct Session<V> {
    orchestrator: Orchestrator<V>,
    sweep: SweepGenerator<V>,
}

impl<V: Vectorizer + Clone> Session<V> {
    /// Create a session with [`SessionConfig::default`].
    #[must_use]
    pub fn new(vectorizer: V) -> Self {
        Self::with_config(vectorizer, SessionConfig::default())
    }

    #[must_use]
    pub fn with_config(vectorizer: V, config: SessionConfig) -> Self {
        let orchestrator = Orchestrator::new(vectorizer.clone());
        orchestrator.set_live_preview(config.live_preview);
        let sweep = SweepGenerator::new(vectorizer).with_concurrency(config.sweep_concurrency);
        Self {
            orchestrator,
            sweep,
        }
    }

    pub const fn orchestrator(&self) -> &Orchestrator<V> {
        &self.orchestrator
    }

    pub const fn sweep(&self) -> &SweepGenerator<V> {
        &self.sweep
    }

    /// Load `image`, then run its initial trace and its sweep side by
    /// side.
    ///
    /// The sweep uses the settings current at the time of the call as
    /// its base. It is skipped when the grid already belongs to an image
    /// with the same pixels.
    #[allow(clippy::future_not_send)] // single-threaded; Send is not needed
    pub async fn open_image(&self, image: SourceImage) -> OpenedImage {
        let request = self.orchestrator.set_image(Some(image.clone()));
        let base = self.orchestrator.settings();

        let preview = async {
            match request {
                Some(request) => self.orchestrator.execute(request).await,
                None => Err(SessionError::NoImage),
            }
        };
        let (preview, sweep) = futures::join!(preview, self.sweep.generate(&image, &base));
        OpenedImage { preview, sweep }
    }

    /// Unload the image and drop the sweep.
    pub fn close_image(&self) {
        let _none = self.orchestrator.set_image(None);
        self.sweep.clear();
    }

    /// Edit the settings, tracing under the live-preview policy.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::apply_settings`].
    #[allow(clippy::future_not_send)]
    pub async fn edit_settings(
        &self,
        settings: VectorizeSettings,
    ) -> Result<Option<TraceOutcome>, SessionError> {
        self.orchestrator.apply_settings(settings).await
    }

    /// Promote sweep cell `(row, col)` and run the live trace it
    /// triggers.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CellOutOfRange`] for indices outside the
    /// grid, or [`SessionError::TraceFailed`] if the trace fails.
    #[allow(clippy::future_not_send)]
    pub async fn select(&self, row: usize, col: usize) -> Result<Option<TraceOutcome>, SessionError> {
        let selection = PreviewSelection::new(row, col)?;
        match selection.apply(&self.orchestrator)? {
            Some(request) => self.orchestrator.execute(request).await.map(Some),
            None => Ok(None),
        }
    }

    /// Package the current result for download.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoResult`] until a trace of the current
    /// image has been published.
    pub fn export(&self) -> Result<ExportArtifact, SessionError> {
        let result = self.orchestrator.download()?;
        let image = self.orchestrator.image().ok_or(SessionError::NoResult)?;
        Ok(ExportArtifact::new(image.name(), Arc::clone(&result.markup)))
    }
}
