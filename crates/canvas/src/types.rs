use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A 2-D coordinate in surface-local units
///
/// Points are immutable once recorded; the draw model only ever appends
/// new points to a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// One continuous press-to-release pointer path
///
/// A stroke always contains at least one point. Points are stored in
/// the order they were captured; each consecutive pair defines a line
/// segment for the rasterizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Create a stroke from its first captured point
    pub fn new(first: Point) -> Self {
        Self {
            points: vec![first],
        }
    }

    /// Append a point to the stroke
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// All captured points in capture order
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Last captured point
    pub fn last(&self) -> Point {
        // Non-empty by construction
        *self.points.last().unwrap()
    }

    /// Number of captured points (always >= 1)
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Consecutive point pairs as line segments
    ///
    /// A single-point stroke yields no segments; the rasterizer stamps
    /// it as a dot instead.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}
