//! Geometric primitives for layout analysis.
//!
//! This module provides the axis-aligned boxes used by the merge and
//! reading-order stages. Quadrilateral coordinates and coordinate-system
//! transforms live in [`coordinates`].

pub mod coordinates;

pub use coordinates::{CoordinateSystem, CoordinateSystemKind, CoordinatesMetadata, Orientation};

use crate::error::{Error, Result};

/// A 2D point in document space.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(f32, f32)", into = "(f32, f32)")]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// A rectangle in document space (origin top-left, y growing downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Compute the area of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.area(), 5000.0);
    /// ```
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Whether the box is unusable for geometric analysis.
    ///
    /// Non-finite values and zero or negative extents are degenerate.
    pub fn is_degenerate(&self) -> bool {
        !(self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Validate the box, returning [`Error::MalformedGeometry`] when degenerate.
    pub fn validate(&self) -> Result<()> {
        if self.is_degenerate() {
            return Err(Error::malformed(format!(
                "degenerate box at ({}, {}) size {}x{}",
                self.x, self.y, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Overlapping region of two rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x0 = self.left().max(other.left());
        let y0 = self.top().max(other.top());
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Some(Rect::from_points(x0, y0, x1, y1))
    }

    /// Intersection-over-Union of two rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect::new(5.0, 0.0, 10.0, 10.0);
    /// assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    /// ```
    pub fn iou(&self, other: &Rect) -> f32 {
        let inter = match self.intersection(other) {
            Some(r) => r.area(),
            None => return 0.0,
        };
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }

    /// Grow the rectangle outward by `margin` on every side.
    pub fn pad(&self, margin: f32) -> Rect {
        Rect::from_points(
            self.left() - margin,
            self.top() - margin,
            self.right() + margin,
            self.bottom() + margin,
        )
    }

    /// Clip the rectangle to `[0, width] x [0, height]`.
    pub fn clip_to(&self, width: f32, height: f32) -> Rect {
        Rect::from_points(
            self.left().clamp(0.0, width),
            self.top().clamp(0.0, height),
            self.right().clamp(0.0, width),
            self.bottom().clamp(0.0, height),
        )
    }

    /// Scale width and height by `factor`, keeping the top-left corner fixed.
    ///
    /// `left()` and `top()` are unchanged; only the right and bottom edges move.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::Rect;
    ///
    /// let shrunk = Rect::new(10.0, 20.0, 100.0, 50.0).shrink_top_left(0.9);
    /// assert_eq!(shrunk.x, 10.0);
    /// assert_eq!(shrunk.y, 20.0);
    /// assert_eq!(shrunk.width, 90.0);
    /// assert_eq!(shrunk.height, 45.0);
    /// ```
    pub fn shrink_top_left(&self, factor: f32) -> Rect {
        Rect::new(self.x, self.y, self.width * factor, self.height * factor)
    }
}
