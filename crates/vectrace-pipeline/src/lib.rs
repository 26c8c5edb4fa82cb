//! vectrace-pipeline: tracing settings, image identity and outline
//! geometry (sans-IO).
//!
//! Converts a luminance image into closed vector outlines through:
//! binarize -> border tracing -> noise suppression -> polygon fitting ->
//! corner detection and curve smoothing.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! pixels and returns structured data. Markup serialization lives in
//! `vectrace-export`; the interactive engine lives in `vectrace-session`.

pub mod binarize;
pub mod contour;
pub mod curve;
pub mod settings;
pub mod simplify;
pub mod source;
pub mod types;

pub use settings::{Color, ColorParseError, SettingField, ValidationError, VectorizeSettings};
pub use source::{ImageId, SourceImage};
pub use types::{Dimensions, Outline, PipelineError, Point, Ring, Segment, TracedShape};

/// Polygon fitting tolerance in pixels, applied to every border.
///
/// Large enough to straighten single-pixel stair steps.
pub const POLYGON_TOLERANCE: f64 = 1.0;

/// Trace `image` into closed outlines.
///
/// # Pipeline steps
///
/// 1. Validate settings
/// 2. Binarize at `settings.threshold` (darker pixels are foreground)
/// 3. Border following, dropping regions of at most `settings.turd_size`
///    pixels
/// 4. Polygon fitting (RDP at [`POLYGON_TOLERANCE`], plus
///    `settings.opt_tolerance` when `settings.opt_curve` is set, which
///    merges nearly collinear runs into fewer, longer curves)
/// 5. Corner detection against `settings.alpha_max` and cubic smoothing
///
/// The result is a pure function of the pixels and settings.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidSettings`] if any settings field is
/// outside its domain.
pub fn process(
    image: &SourceImage,
    settings: &VectorizeSettings,
) -> Result<TracedShape, PipelineError> {
    // 1. Validate.
    settings.validate()?;

    // 2. Binarize.
    let mask = binarize::binarize(image.pixels(), settings.threshold);

    // 3. Border following + noise suppression.
    let rings = contour::trace_regions(&mask, settings.turd_size);

    // 4. Polygon fitting.
    let tolerance = if settings.opt_curve {
        POLYGON_TOLERANCE + settings.opt_tolerance
    } else {
        POLYGON_TOLERANCE
    };

    // 5. Corners and curves.
    let outlines = rings
        .iter()
        .map(|ring| simplify::simplify_ring(ring, tolerance))
        .filter_map(|ring| curve::fit_outline(&ring, settings.alpha_max))
        .collect();

    Ok(TracedShape {
        outlines,
        dimensions: image.dimensions(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{GrayImage, Luma};

    use super::*;

    /// White canvas with a dark filled disc.
    fn disc_image(size: u32, radius: f64) -> SourceImage {
        let c = f64::from(size) / 2.0;
        let pixels = GrayImage::from_fn(size, size, |x, y| {
            let d = (f64::from(x) + 0.5 - c).hypot(f64::from(y) + 0.5 - c);
            Luma([if d <= radius { 20 } else { 235 }])
        });
        SourceImage::from_luma("disc.png", pixels)
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = VectorizeSettings {
            threshold: 0,
            ..VectorizeSettings::default()
        };
        let result = process(&disc_image(20, 5.0), &settings);
        assert!(matches!(result, Err(PipelineError::InvalidSettings(_))));
    }

    #[test]
    fn blank_image_traces_nothing() {
        let image = SourceImage::from_luma("blank.png", GrayImage::from_pixel(16, 16, Luma([255])));
        let shape = process(&image, &VectorizeSettings::default()).unwrap();
        assert!(shape.outlines.is_empty());
        assert_eq!(
            shape.dimensions,
            Dimensions {
                width: 16,
                height: 16
            }
        );
    }

    #[test]
    fn disc_traces_one_smooth_outline() {
        let shape = process(&disc_image(64, 20.0), &VectorizeSettings::default()).unwrap();
        assert_eq!(shape.outlines.len(), 1);
        assert!(shape.outlines[0].curve_count() > 0);
    }

    #[test]
    fn threshold_below_foreground_traces_nothing() {
        // The disc has luminance 20; a cut point of 20 excludes it.
        let settings = VectorizeSettings {
            threshold: 20,
            ..VectorizeSettings::default()
        };
        let shape = process(&disc_image(32, 8.0), &settings).unwrap();
        assert!(shape.outlines.is_empty());
    }

    #[test]
    fn alpha_zero_traces_polygon() {
        let settings = VectorizeSettings {
            alpha_max: 0.0,
            ..VectorizeSettings::default()
        };
        let shape = process(&disc_image(64, 20.0), &settings).unwrap();
        assert!(shape.outlines.iter().all(|o| o.curve_count() == 0));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let image = disc_image(48, 15.0);
        let settings = VectorizeSettings::default();
        let a = process(&image, &settings).unwrap();
        let b = process(&image, &settings).unwrap();
        assert_eq!(a, b);
    }
}
