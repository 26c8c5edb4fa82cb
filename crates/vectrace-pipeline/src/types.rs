//! Shared geometry and error types for the tracing pipeline.

use serde::{Deserialize, Serialize};

use crate::settings::ValidationError;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A closed sequence of points. The last point connects back to the first;
/// the closing point is not repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring(Vec<Point>);

impl Ring {
    /// Create a new ring from its vertices.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the ring has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the ring and returns the underlying vertices.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// One drawing command of a closed outline, starting from the previous
/// segment's end point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// Straight line to `to`.
    Line {
        /// End point.
        to: Point,
    },
    /// Cubic Bézier curve with control points `c1` and `c2`, ending at `to`.
    Cubic {
        /// First control point.
        c1: Point,
        /// Second control point.
        c2: Point,
        /// End point.
        to: Point,
    },
}

impl Segment {
    /// End point of the segment.
    #[must_use]
    pub const fn end(&self) -> Point {
        match *self {
            Self::Line { to } | Self::Cubic { to, .. } => to,
        }
    }
}

/// A closed curve: starts at `start`, follows `segments`, and closes back
/// to `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// First point of the outline.
    pub start: Point,
    /// Drawing commands in order.
    pub segments: Vec<Segment>,
}

impl Outline {
    /// Number of segments that are curves rather than straight lines.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Cubic { .. }))
            .count()
    }
}

/// Vector geometry produced by [`crate::process`].
///
/// Outer borders and hole borders are emitted alike; renderers fill the
/// combined path with the even-odd rule so holes stay open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracedShape {
    /// All closed outlines, in contour discovery order.
    pub outlines: Vec<Outline>,
    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur while decoding or tracing an image.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Tracing was requested with settings outside their domains.
    #[error("invalid tracing settings: {0}")]
    InvalidSettings(#[from] ValidationError),
}
