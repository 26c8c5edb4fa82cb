//! Integration test: drive a session with the built-in vectorizer over a
//! synthetic PNG.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::join;
use image::{GrayImage, ImageFormat, Luma};
use vectrace_pipeline::{SourceImage, VectorizeSettings};
use vectrace_session::{
    CellState, OutlineVectorizer, Session, SessionError, TraceError, TraceOutcome, Vectorizer,
};

/// PNG of a gradient bar above a row of specks of growing size.
///
/// The gradient makes the threshold matter; the specks make the turd
/// size matter.
fn test_png() -> Vec<u8> {
    let img = GrayImage::from_fn(96, 64, |x, y| {
        if y < 24 {
            // Luminance rises left to right from 40 to 230.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let v = (40.0 + f64::from(x) * 2.0).min(230.0) as u8;
            return Luma([v]);
        }
        let speck = (0..5u32).any(|i| {
            let x0 = 8 + i * 18;
            let side = i + 1;
            (x0..x0 + side).contains(&x) && (40..40 + side).contains(&y)
        });
        Luma([if speck { 0 } else { 255 }])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn source() -> SourceImage {
    SourceImage::decode("bars.png", &test_png()).expect("decode should succeed")
}

/// Built-in tracer whose calls can be held open per threshold.
#[derive(Default)]
struct HeldVectorizer {
    gates: RefCell<HashMap<u32, oneshot::Receiver<()>>>,
}

impl HeldVectorizer {
    fn hold(&self, threshold: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(threshold, rx);
        tx
    }
}

impl Vectorizer for HeldVectorizer {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        let gate = self.gates.borrow_mut().remove(&settings.threshold);
        let rendered = OutlineVectorizer::render(image, settings);
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            rendered
        }
    }
}

#[test]
fn open_select_export() {
    let session = Session::new(OutlineVectorizer);
    let opened = block_on(session.open_image(source()));

    let preview = opened.preview.expect("initial trace should succeed");
    assert!(preview.published().is_some());
    assert!(opened.sweep.is_complete());
    assert_eq!(opened.sweep.ready, 25);

    let grid = session.sweep().grid().unwrap();
    eprintln!(
        "sweep cell sizes: {:?}",
        grid.cells()
            .iter()
            .map(|c| c.result().map_or(0, |r| r.markup.len()))
            .collect::<Vec<_>>()
    );
    // Lower thresholds pick up less of the gradient.
    let dark = grid.cell(0, 0).unwrap().result().unwrap();
    let light = grid.cell(0, 4).unwrap().result().unwrap();
    assert_ne!(dark.markup, light.markup);
    // Higher turd sizes drop the small specks.
    let clean = grid.cell(4, 2).unwrap().result().unwrap();
    let noisy = grid.cell(0, 2).unwrap().result().unwrap();
    assert!(clean.markup.matches('M').count() < noisy.markup.matches('M').count());

    let outcome = block_on(session.select(4, 2)).unwrap().unwrap();
    assert_eq!(outcome.published().unwrap().markup, clean.markup);

    let artifact = session.export().unwrap();
    assert_eq!(artifact.file_name, "bars.svg");
    assert_eq!(artifact.mime_type, "image/svg+xml");
    assert_eq!(artifact.markup, clean.markup);
}

#[test]
fn vectorize_is_idempotent() {
    let session = Session::new(OutlineVectorizer);
    block_on(session.open_image(source()));
    let a = block_on(session.orchestrator().vectorize()).unwrap();
    let b = block_on(session.orchestrator().vectorize()).unwrap();
    assert_eq!(
        a.published().unwrap().markup,
        b.published().unwrap().markup
    );
}

#[test]
fn slow_earlier_edit_never_overwrites_later_one() {
    let vectorizer = HeldVectorizer::default();
    let session = Session::new(&vectorizer);
    block_on(session.open_image(source()));
    let orchestrator = session.orchestrator();

    let a = VectorizeSettings {
        threshold: 90,
        ..VectorizeSettings::default()
    };
    let b = VectorizeSettings {
        threshold: 200,
        ..VectorizeSettings::default()
    };
    let release_a = vectorizer.hold(90);
    let request_a = orchestrator.update_settings(a).unwrap().unwrap();
    let request_b = orchestrator.update_settings(b).unwrap().unwrap();

    let (outcome_a, outcome_b) = block_on(async {
        join!(orchestrator.execute(request_a), async {
            let outcome = orchestrator.execute(request_b).await;
            release_a.send(()).unwrap();
            outcome
        })
    });

    assert_eq!(outcome_a.unwrap(), TraceOutcome::Stale);
    let published = outcome_b.unwrap();
    assert_eq!(published.published().unwrap().settings.threshold, 200);
    assert_eq!(orchestrator.download().unwrap().settings.threshold, 200);
}

#[test]
fn replacing_image_requires_new_trace() {
    let session = Session::new(OutlineVectorizer);
    block_on(session.open_image(source()));
    assert!(session.orchestrator().download().is_ok());

    let blank = SourceImage::from_luma("blank.png", GrayImage::from_pixel(16, 16, Luma([255])));
    let request = session.orchestrator().set_image(Some(blank)).unwrap();
    assert_eq!(
        session.orchestrator().download(),
        Err(SessionError::NoResult)
    );
    block_on(session.orchestrator().execute(request)).unwrap();
    assert!(session.orchestrator().download().is_ok());
}

/// Fails every cell at one sweep position.
struct FailingCell;

impl Vectorizer for FailingCell {
    fn trace(
        &self,
        image: &SourceImage,
        settings: &VectorizeSettings,
    ) -> impl Future<Output = Result<String, TraceError>> {
        let outcome = if settings.threshold == 160 && (settings.turd_size - 5.0).abs() < 1e-9 {
            Err(TraceError::new("simulated fault"))
        } else {
            OutlineVectorizer::render(image, settings)
        };
        futures::future::ready(outcome)
    }
}

#[test]
fn one_failing_cell_leaves_the_rest() {
    let session = Session::new(&FailingCell);
    let opened = block_on(session.open_image(source()));
    assert_eq!(opened.sweep.absent, 1);
    assert_eq!(opened.sweep.ready, 24);
    match session.sweep().cell(2, 3).unwrap().state {
        CellState::Absent { reason } => assert_eq!(reason, "simulated fault"),
        other => panic!("expected absent cell, got {other:?}"),
    }
}
