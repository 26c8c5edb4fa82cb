//! Test doubles for the engine's unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::task::Poll;

use futures::channel::oneshot;
use image::{GrayImage, Luma};
use vectrace_pipeline::{SourceImage, VectorizeSettings};

use crate::vectorizer::{TraceError, Vectorizer};

/// A uniform 8x8 image; different `luma` values give different ids.
pub fn gray_image(name: &str, luma: u8) -> SourceImage {
    SourceImage::from_luma(name, GrayImage::from_pixel(8, 8, Luma([luma])))
}

/// Markup the fake produces: encodes the inputs so tests can tell
/// results apart.
pub fn fake_markup(image: &SourceImage, settings: &VectorizeSettings) -> String {
    format!(
        "<svg data-image=\"{}\" data-threshold=\"{}\" data-turd-size=\"{}\"/>",
        image.id(),
        settings.threshold,
        settings.turd_size,
    )
}

/// Yield to the executor once before continuing.
pub async fn yield_now() {
    let mut yielded = false;
    futures::future::poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}

/// Scriptable vectorizer.
///
/// Every trace yields at least once. A trace whose threshold has a gate
/// waits until the gate's sender fires (or is dropped). Traces matching
/// a failure entry fail after their gate opens.
#[derive(Default)]
pub struct FakeVectorizer {
    gates: RefCell<HashMap<u32, oneshot::Receiver<()>>>,
    failing: RefCell<Vec<(u32, f64)>>,
    extra_yields: RefCell<HashMap<u32, usize>>,
    calls: RefCell<Vec<VectorizeSettings>>,
    finished: RefCell<Vec<u32>>,
    active: Cell<usize>,
    max_active: Cell<usize>,
}

impl FakeVectorizer {
    /// Hold the next trace with `threshold` until the returned sender
    /// fires.
    pub fn gate(&self, threshold: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(threshold, rx);
        tx
    }

    /// Fail traces with exactly this threshold and turd size.
    pub fn fail_on(&self, threshold: u32, turd_size: f64) {
        self.failing.borrow_mut().push((threshold, turd_size));
    }

    /// Make traces with `threshold` yield `count` more times.
    pub fn slow_down(&self, threshold: u32, count: usize) {
        self.extra_yields.borrow_mut().insert(threshold, count);
    }

    /// Settings of every trace started, in start order.
    pub fn calls(&self) -> Vec<VectorizeSettings> {
        self.calls.borrow().clone()
    }

    /// Thresholds of every trace that finished, in finish order.
    pub fn finished(&self) -> Vec<u32> {
        self.finished.borrow().clone()
    }

    /// Largest number of traces that were running at once.
    pub fn max_active(&self) -> usize {
        self.max_active.get()
    }
}

impl Vectorizer for FakeVectorizer {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        let gate = self.gates.borrow_mut().remove(&settings.threshold);
        let yields = 1 + self
            .extra_yields
            .borrow()
            .get(&settings.threshold)
            .copied()
            .unwrap_or(0);
        let fails = self
            .failing
            .borrow()
            .iter()
            .any(|&(t, s)| t == settings.threshold && (s - settings.turd_size).abs() < 1e-9);
        let markup = fake_markup(image, settings);
        let threshold = settings.threshold;
        self.calls.borrow_mut().push(settings.clone());

        async move {
            self.active.set(self.active.get() + 1);
            self.max_active
                .set(self.max_active.get().max(self.active.get()));
            for _ in 0..yields {
                yield_now().await;
            }
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.active.set(self.active.get() - 1);
            self.finished.borrow_mut().push(threshold);
            if fails {
                Err(TraceError::new(format!("cannot trace at threshold {threshold}")))
            } else {
                Ok(markup)
            }
        }
    }
}
