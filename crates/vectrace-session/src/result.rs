//! Published trace output.

use std::sync::Arc;

use vectrace_pipeline::{ImageId, VectorizeSettings};

/// Markup traced from one image under one set of settings.
///
/// Results are never mutated. A newer trace replaces the whole value;
/// clones share the markup.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceResult {
    /// Image the markup was traced from.
    pub image_id: ImageId,
    /// Settings that produced the markup.
    pub settings: VectorizeSettings,
    /// Self-contained SVG document.
    pub markup: Arc<str>,
}

impl TraceResult {
    /// Wrap freshly traced markup.
    #[must_use]
    pub fn new(image_id: ImageId, settings: VectorizeSettings, markup: String) -> Self {
        Self {
            image_id,
            settings,
            markup: Arc::from(markup),
        }
    }
}
