//! Element coordinates and coordinate-system transforms.
//!
//! Coordinates are stored as four corner points starting at the top-left
//! corner and proceeding counter-clockwise (top-left, bottom-left,
//! bottom-right, top-right), tagged with the system they are expressed in.
//!
//! Transforms go through a relative system in `[0, 1] x [0, 1]`, so any two
//! systems can be converted between as long as both dimensions are known.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Point, Rect};
use crate::error::{Error, Result};

/// Axis direction of a coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Origin top-left, y grows downward (rendered images, screens).
    Screen,
    /// Origin bottom-left, y grows upward (PDF user space).
    Cartesian,
}

impl Orientation {
    /// Per-axis direction multipliers `(x, y)`.
    pub fn axis_signs(&self) -> (f32, f32) {
        match self {
            Orientation::Screen => (1.0, -1.0),
            Orientation::Cartesian => (1.0, 1.0),
        }
    }
}

/// Name of the system a set of coordinates is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CoordinateSystemKind {
    /// Pixels of a rendered page image.
    PixelSpace,
    /// PDF points.
    PointSpace,
    /// Unit square.
    RelativeCoordinateSystem,
    /// A system this crate does not know; treated as screen-oriented.
    Other(String),
}

impl CoordinateSystemKind {
    /// Axis orientation of this system.
    pub fn orientation(&self) -> Orientation {
        match self {
            CoordinateSystemKind::PixelSpace | CoordinateSystemKind::Other(_) => Orientation::Screen,
            CoordinateSystemKind::PointSpace | CoordinateSystemKind::RelativeCoordinateSystem => {
                Orientation::Cartesian
            },
        }
    }

    /// Serialized name.
    pub fn name(&self) -> &str {
        match self {
            CoordinateSystemKind::PixelSpace => "PixelSpace",
            CoordinateSystemKind::PointSpace => "PointSpace",
            CoordinateSystemKind::RelativeCoordinateSystem => "RelativeCoordinateSystem",
            CoordinateSystemKind::Other(name) => name,
        }
    }
}

impl From<String> for CoordinateSystemKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "PixelSpace" => CoordinateSystemKind::PixelSpace,
            "PointSpace" => CoordinateSystemKind::PointSpace,
            "RelativeCoordinateSystem" => CoordinateSystemKind::RelativeCoordinateSystem,
            _ => CoordinateSystemKind::Other(name),
        }
    }
}

impl From<CoordinateSystemKind> for String {
    fn from(kind: CoordinateSystemKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for CoordinateSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete coordinate system: a kind plus its layout dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    /// Which system
    pub kind: CoordinateSystemKind,
    /// Layout width in system units
    pub width: f32,
    /// Layout height in system units
    pub height: f32,
}

impl CoordinateSystem {
    /// Create a coordinate system.
    pub fn new(kind: CoordinateSystemKind, width: f32, height: f32) -> Self {
        Self {
            kind,
            width,
            height,
        }
    }

    /// Pixel space of the given image size.
    pub fn pixel_space(width: f32, height: f32) -> Self {
        Self::new(CoordinateSystemKind::PixelSpace, width, height)
    }

    /// PDF point space of the given page size.
    pub fn point_space(width: f32, height: f32) -> Self {
        Self::new(CoordinateSystemKind::PointSpace, width, height)
    }

    /// The unit square.
    pub fn relative() -> Self {
        Self::new(CoordinateSystemKind::RelativeCoordinateSystem, 1.0, 1.0)
    }

    fn check_dimensions(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::malformed(format!(
                "{} has non-positive layout size {}x{}",
                self.kind, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Map a point of this system into the relative system.
    pub fn to_relative(&self, p: Point) -> Point {
        let (sx, sy) = self.kind.orientation().axis_signs();
        Point::new(
            convert_coordinate(p.x, self.width, 1.0, sx),
            convert_coordinate(p.y, self.height, 1.0, sy),
        )
    }

    /// Map a relative point into this system.
    pub fn from_relative(&self, p: Point) -> Point {
        let (sx, sy) = self.kind.orientation().axis_signs();
        Point::new(
            convert_coordinate(p.x, 1.0, self.width, sx),
            convert_coordinate(p.y, 1.0, self.height, sy),
        )
    }

    /// Map a point of this system into `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::{CoordinateSystem, Point};
    ///
    /// let pixels = CoordinateSystem::pixel_space(200.0, 100.0);
    /// let points = CoordinateSystem::point_space(100.0, 50.0);
    /// let p = pixels.convert_point(Point::new(20.0, 10.0), &points);
    /// assert!((p.x - 10.0).abs() < 1e-4);
    /// assert!((p.y - 45.0).abs() < 1e-4);
    /// ```
    pub fn convert_point(&self, p: Point, target: &CoordinateSystem) -> Point {
        target.from_relative(self.to_relative(p))
    }
}

/// Linear transform of one axis value between systems.
///
/// `orientation` is `1.0` when the axis grows in the same direction as the
/// relative system and `-1.0` when it is flipped.
fn convert_coordinate(old_t: f32, old_t_max: f32, new_t_max: f32, orientation: f32) -> f32 {
    let ratio = old_t / old_t_max;
    ((1.0 - ratio) * (1.0 - orientation) / 2.0 + ratio * (1.0 + orientation) / 2.0) * new_t_max
}

/// Location of an element on its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesMetadata {
    /// Corner points: top-left, bottom-left, bottom-right, top-right.
    pub points: [Point; 4],
    /// System the points are expressed in
    pub system: CoordinateSystemKind,
    /// Width of the page in system units
    pub layout_width: f32,
    /// Height of the page in system units
    pub layout_height: f32,
}

impl CoordinatesMetadata {
    /// Build coordinates from explicit corner points.
    pub fn new(points: [Point; 4], system: &CoordinateSystem) -> Self {
        Self {
            points,
            system: system.kind.clone(),
            layout_width: system.width,
            layout_height: system.height,
        }
    }

    /// Build coordinates from a top-left anchored rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::{CoordinateSystem, CoordinatesMetadata, Rect};
    ///
    /// let system = CoordinateSystem::pixel_space(612.0, 792.0);
    /// let coords = CoordinatesMetadata::from_rect(Rect::from_points(0.0, 0.0, 100.0, 20.0), &system);
    /// let xs: Vec<(f32, f32)> = coords.points.iter().map(|p| (p.x, p.y)).collect();
    /// assert_eq!(xs, vec![(0.0, 0.0), (0.0, 20.0), (100.0, 20.0), (100.0, 0.0)]);
    /// ```
    pub fn from_rect(rect: Rect, system: &CoordinateSystem) -> Self {
        let points = [
            Point::new(rect.left(), rect.top()),
            Point::new(rect.left(), rect.bottom()),
            Point::new(rect.right(), rect.bottom()),
            Point::new(rect.right(), rect.top()),
        ];
        Self::new(points, system)
    }

    /// The system these coordinates are expressed in.
    pub fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::new(self.system.clone(), self.layout_width, self.layout_height)
    }

    /// Axis-aligned bounding box of the four points.
    pub fn bounding_rect(&self) -> Rect {
        let mut x0 = f32::MAX;
        let mut y0 = f32::MAX;
        let mut x1 = f32::MIN;
        let mut y1 = f32::MIN;
        for p in &self.points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Signed area of the quadrilateral (shoelace formula).
    fn signed_area(&self) -> f32 {
        let mut acc = 0.0;
        for i in 0..4 {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    /// Whether the quadrilateral is simple (its edges don't cross).
    pub fn is_simple(&self) -> bool {
        let p = &self.points;
        !segments_cross(p[0], p[1], p[2], p[3]) && !segments_cross(p[1], p[2], p[3], p[0])
    }

    /// Whether the quadrilateral encloses zero area.
    pub fn is_degenerate(&self) -> bool {
        !self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            || self.signed_area().abs() <= f32::EPSILON
            || self.bounding_rect().is_degenerate()
    }

    /// Reject self-intersecting or zero-area quadrilaterals.
    pub fn validate(&self) -> Result<()> {
        if !self.is_simple() {
            return Err(Error::malformed("self-intersecting quadrilateral"));
        }
        if self.is_degenerate() {
            return Err(Error::malformed("zero-area quadrilateral"));
        }
        Ok(())
    }

    /// Whether these coordinates can take part in reading-order analysis.
    pub fn is_usable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Return these coordinates expressed in `target`.
    pub fn to_system(&self, target: &CoordinateSystem) -> Result<CoordinatesMetadata> {
        let source = self.coordinate_system();
        source.check_dimensions()?;
        target.check_dimensions()?;
        let points = self.points.map(|p| source.convert_point(p, target));
        Ok(CoordinatesMetadata::new(points, target))
    }
}

fn orientation_sign(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Proper crossing of segments `ab` and `cd` (touching endpoints don't count).
fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    let d1 = orientation_sign(c, d, a);
    let d2 = orientation_sign(c, d, b);
    let d3 = orientation_sign(a, b, c);
    let d4 = orientation_sign(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_pixel_to_pixel_scales() {
        let small = CoordinateSystem::pixel_space(100.0, 100.0);
        let large = CoordinateSystem::pixel_space(200.0, 400.0);
        let p = small.convert_point(Point::new(10.0, 20.0), &large);
        assert!(close(p.x, 20.0));
        assert!(close(p.y, 80.0));
    }

    #[test]
    fn test_pixel_to_point_flips_y() {
        let pixels = CoordinateSystem::pixel_space(100.0, 100.0);
        let points = CoordinateSystem::point_space(100.0, 100.0);
        let p = pixels.convert_point(Point::new(0.0, 0.0), &points);
        assert!(close(p.x, 0.0));
        assert!(close(p.y, 100.0));
    }

    #[test]
    fn test_round_trip_through_relative() {
        let pixels = CoordinateSystem::pixel_space(640.0, 480.0);
        let rel = CoordinateSystem::relative();
        let p = Point::new(320.0, 120.0);
        let back = rel.convert_point(pixels.convert_point(p, &rel), &pixels);
        assert!(close(back.x, p.x));
        assert!(close(back.y, p.y));
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&CoordinateSystemKind::PixelSpace).unwrap();
        assert_eq!(json, "\"PixelSpace\"");
        let other: CoordinateSystemKind = serde_json::from_str("\"WeirdSpace\"").unwrap();
        assert_eq!(other, CoordinateSystemKind::Other("WeirdSpace".to_string()));
        assert_eq!(other.orientation(), Orientation::Screen);
    }

    #[test]
    fn test_validate_rejects_bow_tie() {
        let system = CoordinateSystem::pixel_space(100.0, 100.0);
        let bow_tie = CoordinatesMetadata::new(
            [
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
                Point::new(10.0, 0.0),
            ],
            &system,
        );
        assert!(!bow_tie.is_simple());
        assert!(bow_tie.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_area() {
        let system = CoordinateSystem::pixel_space(100.0, 100.0);
        let flat = CoordinatesMetadata::from_rect(Rect::from_points(0.0, 5.0, 50.0, 5.0), &system);
        assert!(flat.is_simple());
        assert!(flat.is_degenerate());
        assert!(!flat.is_usable());
    }

    #[test]
    fn test_to_system_returns_new_value() {
        let system = CoordinateSystem::pixel_space(200.0, 200.0);
        let coords = CoordinatesMetadata::from_rect(Rect::from_points(0.0, 0.0, 100.0, 50.0), &system);
        let rel = coords.to_system(&CoordinateSystem::relative()).unwrap();
        assert_eq!(rel.system, CoordinateSystemKind::RelativeCoordinateSystem);
        assert!(close(rel.points[2].x, 0.5));
        assert!(close(rel.points[2].y, 0.75));
        // the source is untouched
        assert_eq!(coords.points[2], Point::new(100.0, 50.0));
    }

    #[test]
    fn test_to_system_rejects_zero_layout() {
        let system = CoordinateSystem::pixel_space(0.0, 200.0);
        let coords = CoordinatesMetadata::from_rect(Rect::from_points(0.0, 0.0, 1.0, 1.0), &system);
        assert!(coords.to_system(&CoordinateSystem::relative()).is_err());
    }
}
