//! The tracing contract.

use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;

use vectrace_pipeline::{SourceImage, VectorizeSettings};

/// A vectorizer could not trace an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("trace failed: {reason}")]
pub struct TraceError {
    /// Human-readable cause.
    pub reason: String,
}

impl TraceError {
    /// Build an error from any displayable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Raster to vector conversion.
///
/// Implementations must be deterministic: the same image and settings
/// always produce byte-identical markup. Settings are validated before
/// they reach a vectorizer, so out-of-domain values are never passed in.
///
/// The returned future is the only place the engine suspends. It need
/// not be `Send`; a vectorizer may still hand the work to a thread pool
/// and await the outcome.
pub trait Vectorizer {
    /// Trace `image` under `settings` into a self-contained SVG document.
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>>;
}

impl<T: Vectorizer + ?Sized> Vectorizer for &T {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        (**self).trace(image, settings)
    }
}

impl<T: Vectorizer + ?Sized> Vectorizer for Rc<T> {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        (**self).trace(image, settings)
    }
}

impl<T: Vectorizer + ?Sized> Vectorizer for Arc<T> {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        (**self).trace(image, settings)
    }
}
