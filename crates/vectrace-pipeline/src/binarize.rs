//! Threshold a luminance image into a foreground mask.

use image::{GrayImage, Luma};

/// Mask value marking a foreground pixel.
pub const FOREGROUND: u8 = 255;

/// Binarize `gray` at `threshold`.
///
/// Pixels darker than `threshold` become [`FOREGROUND`], everything else
/// becomes 0. Dark-on-light input therefore traces the dark shapes.
#[must_use = "returns the foreground mask"]
pub fn binarize(gray: &GrayImage, threshold: u32) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if u32::from(gray.get_pixel(x, y).0[0]) < threshold {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Number of foreground pixels in a mask.
#[must_use]
pub fn foreground_count(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| p.0[0] == FOREGROUND).map(|_| 1).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ramp() -> GrayImage {
        // Luminance 0, 64, 128, 192, 255 across one row.
        GrayImage::from_raw(5, 1, vec![0, 64, 128, 192, 255]).unwrap()
    }

    #[test]
    fn darker_than_threshold_is_foreground() {
        let mask = binarize(&ramp(), 128);
        let values: Vec<u8> = mask.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![255, 255, 0, 0, 0]);
    }

    #[test]
    fn threshold_one_keeps_only_black() {
        let mask = binarize(&ramp(), 1);
        assert_eq!(foreground_count(&mask), 1);
    }

    #[test]
    fn threshold_255_keeps_everything_but_white() {
        let mask = binarize(&ramp(), 255);
        assert_eq!(foreground_count(&mask), 4);
    }

    #[test]
    fn dimensions_preserved() {
        let mask = binarize(&GrayImage::new(7, 3), 100);
        assert_eq!(mask.dimensions(), (7, 3));
    }
}
