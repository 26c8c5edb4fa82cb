//! Region border tracing and noise suppression.
//!
//! Borders are traced with Suzuki-Abe border following
//! (`imageproc::contours::find_contours`). Each border is converted into a
//! closed [`Ring`] through the centers of its border pixels, and borders
//! enclosing no more than `turd_size` pixels are dropped.

use geo::{Area, LineString, Polygon};
use image::GrayImage;
use imageproc::contours::{BorderType, Contour};

use crate::types::{Point, Ring};

/// Trace every region border of a foreground mask.
///
/// Outer borders and hole borders are both returned. A border is
/// suppressed when the pixel area it encloses (for holes: the area of the
/// hole) is less than or equal to `turd_size`.
#[must_use = "returns the traced rings"]
pub fn trace_regions(mask: &GrayImage, turd_size: f64) -> Vec<Ring> {
    let contours: Vec<Contour<u32>> = imageproc::contours::find_contours(mask);

    contours
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .filter(|c| region_area(c) > turd_size)
        .map(|c| to_ring(&c.points))
        .collect()
}

/// Approximate pixel area enclosed by a border chain.
///
/// Uses Pick's theorem on the chain through pixel centers: for an outer
/// border the region covers `A + B/2 + 1` pixels, for a hole border the
/// hole covers `A - B/2 + 1` pixels, where `A` is the polygon area and
/// `B` the number of chain points.
#[allow(clippy::cast_precision_loss)]
fn region_area(contour: &Contour<u32>) -> f64 {
    let points = &contour.points;
    if points.len() == 1 {
        return 1.0;
    }
    let area = chain_area(points);
    let boundary = points.len() as f64 / 2.0;
    match contour.border_type {
        BorderType::Outer => area + boundary + 1.0,
        BorderType::Hole => (area - boundary + 1.0).max(0.0),
    }
}

/// Unsigned polygon area of a pixel chain.
fn chain_area(points: &[imageproc::point::Point<u32>]) -> f64 {
    let coords: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (f64::from(p.x), f64::from(p.y)))
        .collect();
    Polygon::new(LineString::from(coords), vec![]).unsigned_area()
}

/// Convert a border chain into a ring through pixel centers.
///
/// Chains that span fewer than three distinct points (single pixels and
/// straight one-pixel-wide strokes) have no area of their own and are
/// replaced by the rectangle covering their pixels.
fn to_ring(points: &[imageproc::point::Point<u32>]) -> Ring {
    let centers: Vec<Point> = points
        .iter()
        .map(|p| Point::new(f64::from(p.x) + 0.5, f64::from(p.y) + 0.5))
        .collect();

    let mut distinct = centers.clone();
    distinct.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    distinct.dedup();
    if distinct.len() >= 3 && !is_collinear(&distinct) {
        return Ring::new(centers);
    }

    let (min_x, max_x) = bounds(centers.iter().map(|p| p.x));
    let (min_y, max_y) = bounds(centers.iter().map(|p| p.y));
    Ring::new(vec![
        Point::new(min_x - 0.5, min_y - 0.5),
        Point::new(max_x + 0.5, min_y - 0.5),
        Point::new(max_x + 0.5, max_y + 0.5),
        Point::new(min_x - 0.5, max_y + 0.5),
    ])
}

fn is_collinear(points: &[Point]) -> bool {
    let a = points[0];
    let b = points[points.len() - 1];
    points.iter().all(|p| {
        let cross = (b.x - a.x).mul_add(p.y - a.y, -((b.y - a.y) * (p.x - a.x)));
        cross.abs() < f64::EPSILON
    })
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::binarize::FOREGROUND;

    /// Mask with filled axis-aligned rectangles `(x, y, w, h)`.
    fn mask_with(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let inside = rects
                .iter()
                .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
            Luma([if inside { FOREGROUND } else { 0 }])
        })
    }

    #[test]
    fn empty_mask_has_no_regions() {
        assert!(trace_regions(&GrayImage::new(10, 10), 0.0).is_empty());
    }

    #[test]
    fn single_square_traces_one_ring() {
        let mask = mask_with(20, 20, &[(5, 5, 6, 6)]);
        let rings = trace_regions(&mask, 0.0);
        assert_eq!(rings.len(), 1);
        for p in rings[0].points() {
            assert!(p.x >= 5.5 && p.x <= 10.5, "x out of square: {}", p.x);
            assert!(p.y >= 5.5 && p.y <= 10.5, "y out of square: {}", p.y);
        }
    }

    #[test]
    fn small_regions_are_suppressed() {
        // A 2x2 speck (4 px) and a 5x5 block (25 px).
        let mask = mask_with(30, 30, &[(2, 2, 2, 2), (15, 15, 5, 5)]);
        assert_eq!(trace_regions(&mask, 0.0).len(), 2);
        assert_eq!(trace_regions(&mask, 3.9).len(), 2);
        assert_eq!(trace_regions(&mask, 4.0).len(), 1);
        assert_eq!(trace_regions(&mask, 10.0).len(), 1);
    }

    #[test]
    fn single_pixel_becomes_unit_square() {
        let mask = mask_with(5, 5, &[(2, 2, 1, 1)]);
        let rings = trace_regions(&mask, 0.0);
        assert_eq!(rings.len(), 1);
        assert_eq!(
            rings[0].points(),
            &[
                Point::new(2.0, 2.0),
                Point::new(3.0, 2.0),
                Point::new(3.0, 3.0),
                Point::new(2.0, 3.0),
            ]
        );
    }

    #[test]
    fn ring_with_hole_yields_outer_and_hole_borders() {
        // 9x9 block with a 3x3 hole in the middle.
        let mask = GrayImage::from_fn(15, 15, |x, y| {
            let block = (3..12).contains(&x) && (3..12).contains(&y);
            let hole = (6..9).contains(&x) && (6..9).contains(&y);
            Luma([if block && !hole { FOREGROUND } else { 0 }])
        });
        assert_eq!(trace_regions(&mask, 0.0).len(), 2);
        // The hole covers 9 pixels; suppressing up to 9 removes it.
        assert_eq!(trace_regions(&mask, 9.0).len(), 1);
    }
}
