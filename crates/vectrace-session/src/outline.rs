//! Built-in vectorizer backed by `vectrace-pipeline` and `vectrace-export`.

use std::future::Future;

use vectrace_export::{SvgMetadata, to_svg};
use vectrace_pipeline::{SourceImage, VectorizeSettings};

use crate::vectorizer::{TraceError, Vectorizer};

/// Traces outlines in-process and serializes them as SVG.
///
/// Tracing is synchronous; the returned future is already resolved.
/// Wrap [`render`](Self::render) in a blocking task to keep a runtime
/// responsive on large images.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineVectorizer;

impl OutlineVectorizer {
    /// Trace `image` under `settings` and return the SVG document.
    ///
    /// The document records `settings` as JSON metadata and uses the
    /// image name (without extension) as its title.
    ///
    /// # Errors
    ///
    /// Returns a [`TraceError`] if the pipeline rejects the settings or
    /// the settings cannot be serialized.
    pub fn render(image: &SourceImage, settings: &VectorizeSettings) -> Result<String, TraceError> {
        let shape = vectrace_pipeline::process(image, settings)
            .map_err(|e| TraceError::new(e.to_string()))?;
        let settings_json = serde_json::to_string(settings)
            .map_err(|e| TraceError::new(format!("failed to serialize settings: {e}")))?;
        let title = image
            .name()
            .rsplit_once('.')
            .map_or(image.name(), |(stem, _)| stem);
        let metadata = SvgMetadata {
            title: (!title.is_empty()).then_some(title),
            description: None,
            settings_json: Some(&settings_json),
        };
        Ok(to_svg(&shape, settings, &metadata))
    }
}

impl Vectorizer for OutlineVectorizer {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        futures::future::ready(Self::render(image, settings))
    }
}
