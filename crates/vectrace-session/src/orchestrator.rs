//! Live-preview orchestration.
//!
//! [`Orchestrator`] is the single writer of the current image, settings
//! and published result. Every trace it issues carries a sequence
//! number; when a trace resolves, it is published only if no newer
//! request was issued in the meantime. Older traces keep running to
//! completion (a vectorizer cannot be interrupted) and their outcome is
//! dropped on arrival.
//!
//! Operations that may start a trace return a [`TraceRequest`] instead of
//! awaiting it, so the caller decides how to drive it. [`Orchestrator::execute`]
//! runs a request; several requests may be executing at once.

use std::cell::RefCell;

use log::{debug, info, warn};
use vectrace_pipeline::{SourceImage, VectorizeSettings};

use crate::error::SessionError;
use crate::result::TraceResult;
use crate::vectorizer::Vectorizer;

/// Coarse lifecycle of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image is loaded.
    Idle,
    /// An image is loaded but nothing has been published for it.
    HasImage,
    /// At least one trace is executing.
    Previewing,
    /// A result for the current image is available.
    HasResult,
}

/// A trace the orchestrator has issued but not yet run.
///
/// Carries a snapshot of the image and settings at the moment it was
/// issued. Pass it to [`Orchestrator::execute`].
#[derive(Debug, Clone)]
#[must_use = "a trace request does nothing until it is executed"]
pub struct TraceRequest {
    seq: u64,
    image: SourceImage,
    settings: VectorizeSettings,
}

impl TraceRequest {
    /// Sequence number; later requests have larger numbers.
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Image to trace.
    pub const fn image(&self) -> &SourceImage {
        &self.image
    }

    /// Settings to trace with.
    pub const fn settings(&self) -> &VectorizeSettings {
        &self.settings
    }
}

/// What happened to an executed request.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOutcome {
    /// The trace was the latest request and is now the current result.
    Published(TraceResult),
    /// A newer request was issued while this one ran; its output was
    /// dropped.
    Stale,
}

impl TraceOutcome {
    /// The published result, if any.
    #[must_use]
    pub const fn published(&self) -> Option<&TraceResult> {
        match self {
            Self::Published(result) => Some(result),
            Self::Stale => None,
        }
    }
}

#[derive(Debug)]
struct State {
    image: Option<SourceImage>,
    settings: VectorizeSettings,
    result: Option<TraceResult>,
    live_preview: bool,
    latest_seq: u64,
    in_flight: usize,
    last_error: Option<SessionError>,
}

impl State {
    /// Make every outstanding request stale.
    const fn invalidate(&mut self) {
        self.latest_seq += 1;
    }

    /// Issue a request for the current image and settings.
    fn issue(&mut self) -> Option<TraceRequest> {
        let image = self.image.clone()?;
        self.latest_seq += 1;
        debug!(
            "issuing trace #{} for image {} (threshold {}, turd size {})",
            self.latest_seq,
            image.id(),
            self.settings.threshold,
            self.settings.turd_size,
        );
        Some(TraceRequest {
            seq: self.latest_seq,
            image,
            settings: self.settings.clone(),
        })
    }
}

/// Owner of the current image, settings and live-preview result.
///
/// All methods take `&self`; state lives behind a `RefCell` that is
/// never borrowed across a vectorizer call, so overlapping
/// [`execute`](Self::execute) futures can be driven on one thread.
#[derive(Debug)]
pub struct Orchestrator<V> {
    vectorizer: V,
    state: RefCell<State>,
}

impl<V: Vectorizer> Orchestrator<V> {
    /// Create an orchestrator with default settings, live preview on,
    /// and no image.
    #[must_use]
    pub fn new(vectorizer: V) -> Self {
        Self::with_settings(vectorizer, VectorizeSettings::default())
    }

    /// Create an orchestrator starting from `settings`.
    ///
    /// `settings` is not validated here; [`update_settings`](Self::update_settings)
    /// is the validating entry point.
    #[must_use]
    pub const fn with_settings(vectorizer: V, settings: VectorizeSettings) -> Self {
        Self {
            vectorizer,
            state: RefCell::new(State {
                image: None,
                settings,
                result: None,
                live_preview: true,
                latest_seq: 0,
                in_flight: 0,
                last_error: None,
            }),
        }
    }

    /// The vectorizer this orchestrator traces with.
    pub const fn vectorizer(&self) -> &V {
        &self.vectorizer
    }

    /// Replace the active image.
    ///
    /// Clears the current result and last error, and makes every
    /// outstanding request stale. Returns the initial trace request for
    /// the new image, or `None` when the image was removed.
    pub fn set_image(&self, image: Option<SourceImage>) -> Option<TraceRequest> {
        let mut state = self.state.borrow_mut();
        match &image {
            Some(image) => info!(
                "image {} loaded ({}x{})",
                image.id(),
                image.dimensions().width,
                image.dimensions().height,
            ),
            None => info!("image removed"),
        }
        state.image = image;
        state.result = None;
        state.last_error = None;
        state.invalidate();
        state.issue()
    }

    /// Validate and store new settings.
    ///
    /// With live preview on and an image loaded, returns the trace
    /// request for the new settings. Changed settings make outstanding
    /// requests stale even when no new request is issued.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] if any field is outside its
    /// domain; the previous settings stay active.
    pub fn update_settings(
        &self,
        settings: VectorizeSettings,
    ) -> Result<Option<TraceRequest>, SessionError> {
        settings.validate()?;
        let mut state = self.state.borrow_mut();
        if state.settings != settings {
            state.settings = settings;
            state.invalidate();
        }
        if state.live_preview {
            Ok(state.issue())
        } else {
            debug!("live preview off; settings stored without tracing");
            Ok(None)
        }
    }

    /// Issue an explicit trace of the current image and settings.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoImage`] if no image is loaded.
    pub fn request_trace(&self) -> Result<TraceRequest, SessionError> {
        self.state.borrow_mut().issue().ok_or(SessionError::NoImage)
    }

    /// Run a request through the vectorizer.
    ///
    /// The vectorizer call is the only suspension point. When it
    /// resolves, the outcome is published only if `request` is still
    /// the latest one; otherwise [`TraceOutcome::Stale`] is returned and
    /// nothing changes, whether the trace succeeded or failed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TraceFailed`] if the latest request
    /// failed. The failure is recorded as the last error and the
    /// previous result stays available.
    #[allow(clippy::future_not_send)] // single-threaded; Send is not needed
    pub async fn execute(&self, request: TraceRequest) -> Result<TraceOutcome, SessionError> {
        let _in_flight = InFlight::enter(&self.state);

        let outcome = self
            .vectorizer
            .trace(&request.image, &request.settings)
            .await;

        let mut state = self.state.borrow_mut();
        if request.seq != state.latest_seq {
            debug!(
                "discarding stale trace #{} (latest is #{})",
                request.seq, state.latest_seq
            );
            return Ok(TraceOutcome::Stale);
        }

        match outcome {
            Ok(markup) => {
                info!(
                    "published trace #{} for image {} ({} bytes)",
                    request.seq,
                    request.image.id(),
                    markup.len(),
                );
                let result = TraceResult::new(request.image.id(), request.settings, markup);
                state.result = Some(result.clone());
                state.last_error = None;
                Ok(TraceOutcome::Published(result))
            }
            Err(e) => {
                warn!("trace #{} failed: {}", request.seq, e.reason);
                let error = SessionError::TraceFailed {
                    settings: request.settings,
                    reason: e.reason,
                };
                state.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Trace the current image with the current settings.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoImage`] without an image, or
    /// [`SessionError::TraceFailed`] if the trace fails.
    #[allow(clippy::future_not_send)]
    pub async fn vectorize(&self) -> Result<TraceOutcome, SessionError> {
        let request = self.request_trace()?;
        self.execute(request).await
    }

    /// Store new settings and run the live-preview trace they trigger.
    ///
    /// Returns `None` when no trace was issued (live preview off or no
    /// image).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] for rejected settings, or
    /// [`SessionError::TraceFailed`] if the trace fails.
    #[allow(clippy::future_not_send)]
    pub async fn apply_settings(
        &self,
        settings: VectorizeSettings,
    ) -> Result<Option<TraceOutcome>, SessionError> {
        match self.update_settings(settings)? {
            Some(request) => self.execute(request).await.map(Some),
            None => Ok(None),
        }
    }

    /// The current result, for export.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoResult`] until a trace for the current
    /// image has been published.
    pub fn download(&self) -> Result<TraceResult, SessionError> {
        self.state
            .borrow()
            .result
            .clone()
            .ok_or(SessionError::NoResult)
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> VectorizeSettings {
        self.state.borrow().settings.clone()
    }

    /// Current image, if any.
    #[must_use]
    pub fn image(&self) -> Option<SourceImage> {
        self.state.borrow().image.clone()
    }

    /// Failure of the most recent published request, cleared by the next
    /// success or a new image.
    #[must_use]
    pub fn last_error(&self) -> Option<SessionError> {
        self.state.borrow().last_error.clone()
    }

    #[must_use]
    pub fn live_preview(&self) -> bool {
        self.state.borrow().live_preview
    }

    /// Turn live preview on or off. Takes effect on the next settings
    /// edit.
    pub fn set_live_preview(&self, enabled: bool) {
        self.state.borrow_mut().live_preview = enabled;
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        let state = self.state.borrow();
        if state.image.is_none() {
            Phase::Idle
        } else if state.in_flight > 0 {
            Phase::Previewing
        } else if state.result.is_some() {
            Phase::HasResult
        } else {
            Phase::HasImage
        }
    }
}

/// Counts an executing request for [`Orchestrator::phase`], including
/// when the future is dropped before completion.
struct InFlight<'a>(&'a RefCell<State>);

impl<'a> InFlight<'a> {
    fn enter(state: &'a RefCell<State>) -> Self {
        state.borrow_mut().in_flight += 1;
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.0.borrow_mut();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}
