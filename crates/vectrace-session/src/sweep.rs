//! Parameter sweep over threshold and turd size.
//!
//! A sweep traces one image under 25 variants of a base settings value:
//! columns step the binarization threshold over `[65, 192]`, rows step
//! the noise suppression area over `[0, 10]`. Every other field is
//! inherited from the base.
//!
//! Cells are requested and presented in row-major order. With the
//! default concurrency of 1 each trace is awaited before the next one
//! starts; a higher limit lets several traces run at once, but settled
//! cells are still handed out in row-major order. A failing cell is
//! marked absent and the sweep carries on.

use std::cell::RefCell;
use std::num::NonZeroUsize;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use vectrace_pipeline::{ImageId, SourceImage, VectorizeSettings};

use crate::result::TraceResult;
use crate::vectorizer::Vectorizer;

/// Rows and columns of the sweep grid.
pub const GRID_SIZE: usize = 5;

const THRESHOLD_MIN: u32 = 65;
const THRESHOLD_MAX: u32 = 192;
const TURD_SIZE_MAX: f64 = 10.0;

/// Threshold of each column: evenly spaced over `[65, 192]`.
///
/// Values are rounded half to even, so the exact midpoint 128.5 maps to
/// 128.
///
/// ```
/// assert_eq!(vectrace_session::threshold_axis(), [65, 97, 128, 160, 192]);
/// ```
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn threshold_axis() -> [u32; GRID_SIZE] {
    let step = f64::from(THRESHOLD_MAX - THRESHOLD_MIN) / (GRID_SIZE - 1) as f64;
    std::array::from_fn(|i| {
        (i as f64)
            .mul_add(step, f64::from(THRESHOLD_MIN))
            .round_ties_even() as u32
    })
}

/// Turd size of each row: evenly spaced over `[0, 10]`, one decimal.
///
/// ```
/// assert_eq!(vectrace_session::turd_size_axis(), [0.0, 2.5, 5.0, 7.5, 10.0]);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn turd_size_axis() -> [f64; GRID_SIZE] {
    let step = TURD_SIZE_MAX / (GRID_SIZE - 1) as f64;
    std::array::from_fn(|i| (i as f64 * step * 10.0).round() / 10.0)
}

/// Settings of cell `(row, col)` derived from `base`.
///
/// Callers must keep `row` and `col` below [`GRID_SIZE`].
pub(crate) fn cell_settings(base: &VectorizeSettings, row: usize, col: usize) -> VectorizeSettings {
    base.with_sweep_axes(threshold_axis()[col], turd_size_axis()[row])
}

/// Progress of one sweep cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellState {
    /// Not traced yet.
    Pending,
    /// Traced successfully.
    Ready(TraceResult),
    /// The trace failed. Not retried.
    Absent {
        /// Vectorizer-provided cause.
        reason: String,
    },
}

/// One variant in the sweep grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepCell {
    pub row: usize,
    pub col: usize,
    /// Base settings with this cell's threshold and turd size.
    pub settings: VectorizeSettings,
    pub state: CellState,
}

impl SweepCell {
    /// The traced result, once ready.
    #[must_use]
    pub const fn result(&self) -> Option<&TraceResult> {
        match &self.state {
            CellState::Ready(result) => Some(result),
            CellState::Pending | CellState::Absent { .. } => None,
        }
    }
}

/// Counts of cell states in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub image_id: ImageId,
    pub ready: usize,
    pub absent: usize,
    pub pending: usize,
}

impl SweepSummary {
    /// Every cell has settled.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.pending == 0
    }
}

/// The 5x5 sweep of one image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    image_id: ImageId,
    base: VectorizeSettings,
    cells: Vec<SweepCell>,
}

impl SweepGrid {
    /// Lay out the cells for `image_id`, all pending.
    #[must_use]
    pub fn plan(image_id: ImageId, base: &VectorizeSettings) -> Self {
        let cells = (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |col| (row, col)))
            .map(|(row, col)| SweepCell {
                row,
                col,
                settings: cell_settings(base, row, col),
                state: CellState::Pending,
            })
            .collect();
        Self {
            image_id,
            base: base.clone(),
            cells,
        }
    }

    #[must_use]
    pub const fn image_id(&self) -> ImageId {
        self.image_id
    }

    /// Settings the cells were derived from.
    #[must_use]
    pub const fn base(&self) -> &VectorizeSettings {
        &self.base
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[SweepCell] {
        &self.cells
    }

    /// Cell at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&SweepCell> {
        if row < GRID_SIZE && col < GRID_SIZE {
            self.cells.get(row * GRID_SIZE + col)
        } else {
            None
        }
    }

    #[must_use]
    pub fn summary(&self) -> SweepSummary {
        let mut summary = SweepSummary {
            image_id: self.image_id,
            ready: 0,
            absent: 0,
            pending: 0,
        };
        for cell in &self.cells {
            match cell.state {
                CellState::Pending => summary.pending += 1,
                CellState::Ready(_) => summary.ready += 1,
                CellState::Absent { .. } => summary.absent += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default)]
struct SweepState {
    grid: Option<SweepGrid>,
    generation: u64,
}

/// Owner of the sweep grid.
///
/// The grid is read-only to everything else; [`grid`](Self::grid) and
/// [`cell`](Self::cell) hand out copies.
#[derive(Debug)]
pub struct SweepGenerator<V> {
    vectorizer: V,
    concurrency: NonZeroUsize,
    state: RefCell<SweepState>,
}

impl<V: Vectorizer> SweepGenerator<V> {
    /// Create a generator that traces one cell at a time.
    #[must_use]
    pub fn new(vectorizer: V) -> Self {
        Self {
            vectorizer,
            concurrency: NonZeroUsize::MIN,
            state: RefCell::new(SweepState::default()),
        }
    }

    /// Allow up to `limit` cells to be traced at once.
    #[must_use]
    pub fn with_concurrency(mut self, limit: NonZeroUsize) -> Self {
        self.concurrency = limit;
        self
    }

    #[must_use]
    pub const fn concurrency(&self) -> NonZeroUsize {
        self.concurrency
    }

    /// Sweep `image` around `base`.
    ///
    /// See [`generate_with`](Self::generate_with).
    #[allow(clippy::future_not_send)]
    pub async fn generate(&self, image: &SourceImage, base: &VectorizeSettings) -> SweepSummary {
        self.generate_with(image, base, |_| {}).await
    }

    /// Sweep `image` around `base`, calling `on_cell` for each settled
    /// cell in row-major order.
    ///
    /// Nothing is traced when the current grid already belongs to the
    /// same image; its summary is returned as is. If another sweep
    /// replaces this one while it runs, this run stops at the next
    /// settled cell and reports what it had completed.
    #[allow(clippy::future_not_send)] // single-threaded; Send is not needed
    pub async fn generate_with(
        &self,
        image: &SourceImage,
        base: &VectorizeSettings,
        mut on_cell: impl FnMut(&SweepCell),
    ) -> SweepSummary {
        let mut grid = SweepGrid::plan(image.id(), base);
        let my_generation = {
            let mut state = self.state.borrow_mut();
            if let Some(current) = &state.grid
                && current.image_id == image.id()
            {
                debug!("sweep of image {} is current; not regenerating", image.id());
                return current.summary();
            }
            state.generation += 1;
            state.grid = Some(grid.clone());
            state.generation
        };

        info!(
            "sweep of image {} started: {} cells, concurrency {}",
            image.id(),
            grid.cells.len(),
            self.concurrency,
        );

        let jobs: Vec<(usize, VectorizeSettings)> = grid
            .cells
            .iter()
            .map(|cell| cell.settings.clone())
            .enumerate()
            .collect();
        let mut traces = stream::iter(jobs)
            .map(|(index, settings)| async move {
                let outcome = self.vectorizer.trace(image, &settings).await;
                (index, settings, outcome)
            })
            .buffered(self.concurrency.get());

        while let Some((index, settings, outcome)) = traces.next().await {
            let Some(cell) = grid.cells.get_mut(index) else {
                continue;
            };
            cell.state = match outcome {
                Ok(markup) => CellState::Ready(TraceResult::new(image.id(), settings, markup)),
                Err(e) => {
                    warn!(
                        "sweep cell ({}, {}) of image {} failed: {}",
                        cell.row,
                        cell.col,
                        image.id(),
                        e.reason
                    );
                    CellState::Absent { reason: e.reason }
                }
            };

            {
                let mut state = self.state.borrow_mut();
                if state.generation != my_generation {
                    debug!("sweep of image {} superseded; stopping", image.id());
                    return grid.summary();
                }
                if let Some(shared) = state
                    .grid
                    .as_mut()
                    .and_then(|shared| shared.cells.get_mut(index))
                {
                    shared.state = cell.state.clone();
                }
            }

            on_cell(&*cell);
        }

        let summary = grid.summary();
        info!(
            "sweep of image {} finished: {} ready, {} absent",
            image.id(),
            summary.ready,
            summary.absent,
        );
        summary
    }

    /// Drop the grid and stop any sweep in progress.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.generation += 1;
        state.grid = None;
    }

    /// Copy of the current grid.
    #[must_use]
    pub fn grid(&self) -> Option<SweepGrid> {
        self.state.borrow().grid.clone()
    }

    /// Copy of one cell of the current grid.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<SweepCell> {
        self.state.borrow().grid.as_ref()?.cell(row, col).cloned()
    }

    #[must_use]
    pub fn summary(&self) -> Option<SweepSummary> {
        self.state.borrow().grid.as_ref().map(SweepGrid::summary)
    }
}
