//! Polygon fitting for closed rings using the Ramer-Douglas-Peucker
//! algorithm.
//!
//! A ring is split at its first vertex and the vertex farthest from it;
//! each half is simplified as an open chain so the split points are always
//! kept.

use crate::types::{Point, Ring};

/// Simplify a closed ring.
///
/// Vertices within `tolerance` pixels of the chord between their kept
/// neighbors are removed. A tolerance of 0.0 only removes exactly
/// collinear vertices. Rings with 4 or fewer vertices are returned
/// unchanged.
#[must_use = "returns the simplified ring"]
pub fn simplify_ring(ring: &Ring, tolerance: f64) -> Ring {
    let points = ring.points();
    if points.len() <= 4 {
        return ring.clone();
    }

    let anchor = points[0];
    let far = points
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|(_, a), (_, b)| a.distance_squared(anchor).total_cmp(&b.distance_squared(anchor)))
        .map_or(points.len() / 2, |(i, _)| i);

    // Walk the ring as an open chain that ends back at the anchor.
    let mut chain: Vec<Point> = points.to_vec();
    chain.push(anchor);
    let last = chain.len() - 1;

    let mut kept = vec![false; chain.len()];
    kept[0] = true;
    kept[far] = true;
    rdp_recurse(&chain, 0, far, tolerance, &mut kept);
    rdp_recurse(&chain, far, last, tolerance, &mut kept);

    let simplified: Vec<Point> = chain[..last]
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Ring::new(simplified)
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
