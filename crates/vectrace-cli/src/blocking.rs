//! Runs the built-in tracer on tokio's blocking thread pool.

use std::future::Future;

use vectrace_pipeline::{SourceImage, VectorizeSettings};
use vectrace_session::{OutlineVectorizer, TraceError, Vectorizer};

/// [`OutlineVectorizer`] moved off the runtime thread.
///
/// The session still awaits each trace on its own thread, so ordering is
/// unchanged; a sweep with concurrency above 1 traces cells in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingVectorizer;

impl Vectorizer for BlockingVectorizer {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        let image = image.clone();
        let settings = settings.clone();
        async move {
            tokio::task::spawn_blocking(move || OutlineVectorizer::render(&image, &settings))
                .await
                .map_err(|e| TraceError::new(format!("trace task failed: {e}")))?
        }
    }
}
