//! vectrace-session: the interactive vectorization engine.
//!
//! Drives tracing through the [`Vectorizer`] contract:
//!
//! - [`Orchestrator`] owns the current image, settings and result, and
//!   publishes live-preview traces with last-write-wins ordering.
//! - [`SweepGenerator`] renders a 5x5 grid of threshold x turd size
//!   variants of one image.
//! - [`PreviewSelection`] promotes a sweep cell back into the
//!   orchestrator's settings.
//! - [`Session`] owns one of each and wires them together.
//!
//! Everything runs on a single logical thread. The only suspension
//! points are Vectorizer calls, so the futures here are not `Send`.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outline;
pub mod result;
pub mod selection;
pub mod session;
pub mod sweep;
pub mod vectorizer;

#[cfg(test)]
mod testing;

pub use config::SessionConfig;
pub use error::SessionError;
pub use orchestrator::{Orchestrator, Phase, TraceOutcome, TraceRequest};
pub use outline::OutlineVectorizer;
pub use result::TraceResult;
pub use selection::PreviewSelection;
pub use session::{OpenedImage, Session};
pub use sweep::{
    CellState, GRID_SIZE, SweepCell, SweepGenerator, SweepGrid, SweepSummary, threshold_axis,
    turd_size_axis,
};
pub use vectorizer::{TraceError, Vectorizer};
