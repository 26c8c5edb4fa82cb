//! Corner detection and Bézier smoothing of fitted polygons.
//!
//! Every polygon vertex `j` with neighbors `i` and `k` receives a
//! smoothness value `alpha` in `[0, 4/3]` derived from how far `j` sits
//! from the chord `i`–`k`, measured against the chord's L1 length. A
//! vertex with `alpha >= alpha_max` stays a sharp corner; every other
//! vertex becomes a cubic Bézier arc between the midpoints of its two
//! edges. This is the smoothing rule popularized by potrace.

use crate::types::{Outline, Point, Ring, Segment};

/// Largest possible `alpha`; `alpha_max` above this never yields corners.
pub const ALPHA_LIMIT: f64 = 4.0 / 3.0;

/// Lower clamp applied to `alpha` when placing curve control points.
const MIN_CURVE_ALPHA: f64 = 0.55;

/// Smoothness of the vertex `j` between neighbors `i` and `k`.
///
/// Returns [`ALPHA_LIMIT`] when `i` and `k` coincide.
#[must_use]
pub fn vertex_alpha(i: Point, j: Point, k: Point) -> f64 {
    let denom = (k.x - i.x).abs() + (k.y - i.y).abs();
    if denom == 0.0 {
        return ALPHA_LIMIT;
    }
    let cross = (j.x - i.x).mul_add(k.y - i.y, -((j.y - i.y) * (k.x - i.x)));
    let dd = (cross / denom).abs();
    let alpha = if dd > 1.0 { 1.0 - 1.0 / dd } else { 0.0 };
    alpha / 0.75
}

/// Turn a closed polygon into an outline of lines and cubic curves.
///
/// Returns `None` for rings with fewer than three vertices.
#[must_use]
pub fn fit_outline(ring: &Ring, alpha_max: f64) -> Option<Outline> {
    let vertices = ring.points();
    let n = vertices.len();
    if n < 3 {
        return None;
    }

    // The outline starts on the midpoint of the last edge so every vertex
    // is visited exactly once as the middle of a (mid, vertex, mid) triple.
    let start = vertices[n - 1].midpoint(vertices[0]);
    let mut segments = Vec::with_capacity(n * 2);

    for idx in 0..n {
        let i = vertices[(idx + n - 1) % n];
        let j = vertices[idx];
        let k = vertices[(idx + 1) % n];
        let end = j.midpoint(k);
        let alpha = vertex_alpha(i, j, k);

        if alpha >= alpha_max {
            segments.push(Segment::Line { to: j });
            segments.push(Segment::Line { to: end });
        } else {
            let a = alpha.clamp(MIN_CURVE_ALPHA, 1.0);
            let t = 0.5f64.mul_add(a, 0.5);
            segments.push(Segment::Cubic {
                c1: lerp(i, j, t),
                c2: lerp(k, j, t),
                to: end,
            });
        }
    }

    Some(Outline { start, segments })
}

/// Point at fraction `t` along the segment from `a` to `b`.
fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(t.mul_add(b.x - a.x, a.x), t.mul_add(b.y - a.y, a.y))
}
