//! Engine configuration.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Tunables for a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Trace on every accepted settings edit.
    pub live_preview: bool,

    /// Number of sweep cells traced at once. `1` awaits each cell
    /// before starting the next.
    pub sweep_concurrency: NonZeroUsize,
}

impl SessionConfig {
    /// Default live-preview policy.
    pub const DEFAULT_LIVE_PREVIEW: bool = true;

    /// Default sweep concurrency.
    pub const DEFAULT_SWEEP_CONCURRENCY: NonZeroUsize = NonZeroUsize::MIN;
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            live_preview: Self::DEFAULT_LIVE_PREVIEW,
            sweep_concurrency: Self::DEFAULT_SWEEP_CONCURRENCY,
        }
    }
}
