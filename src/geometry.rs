//! Geometry helpers for region hit testing.
//!
//! All functions here are total: degenerate input (empty or near-empty point
//! lists, zero-area rectangles) yields zero/false results instead of errors.

use serde::{Deserialize, Serialize};

/// Bounding box as `[x, y, width, height]`.
pub type BBox = [f64; 4];

/// Minimum number of vertices for a polygon that can contain anything.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// A 2D point in canvas (image) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Compute the axis-aligned bounding box of a point list.
///
/// An empty list yields `[0, 0, 0, 0]`.
pub fn bounding_box(points: &[Point]) -> BBox {
    let Some(first) = points.first() else {
        return [0.0; 4];
    };

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    [min_x, min_y, max_x - min_x, max_y - min_y]
}

/// Even-odd ray casting point-in-polygon test.
///
/// The polygon is implicitly closed (the first point is not repeated).
/// Polygons with fewer than three vertices never contain a point.
pub fn point_in_polygon(points: &[Point], x: f64, y: f64) -> bool {
    if points.len() < MIN_POLYGON_VERTICES {
        return false;
    }

    let mut inside = false;
    let mut k = points.len() - 1;
    for j in 0..points.len() {
        let (xi, yi) = (points[j].x, points[j].y);
        let (xj, yj) = (points[k].x, points[k].y);
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        k = j;
    }
    inside
}

/// Check that every vertex lies inside the rectangle (inclusive bounds).
///
/// This is stricter than intersection: a polygon poking out of the
/// rectangle by a single vertex is not contained. An empty point list is
/// never contained.
pub fn fully_contained(
    points: &[Point],
    rect_min_x: f64,
    rect_min_y: f64,
    rect_max_x: f64,
    rect_max_y: f64,
) -> bool {
    !points.is_empty()
        && points.iter().all(|p| {
            p.x >= rect_min_x && p.x <= rect_max_x && p.y >= rect_min_y && p.y <= rect_max_y
        })
}

/// Axis-aligned rectangle given by two arbitrary corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Create a normalized rectangle from two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether every vertex of `points` lies inside this rectangle.
    pub fn contains_all(&self, points: &[Point]) -> bool {
        fully_contained(points, self.min_x, self.min_y, self.max_x, self.max_y)
    }
}
