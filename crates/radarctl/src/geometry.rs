use crate::sweep::{self, SweepAngle};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARGIN: i32 = 40;
pub const DEFAULT_MAX_SIDE: i32 = 600;
/// Gap between the outer ring and the surface edge.
pub const RING_INSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Square drawing surface derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceDimensions {
    side: i32,
}

impl SurfaceDimensions {
    pub fn fit(viewport_width: i32, margin: i32, max_side: i32) -> Self {
        let side = viewport_width.saturating_sub(margin).min(max_side).max(0);
        Self { side }
    }

    pub fn from_viewport(viewport_width: i32) -> Self {
        Self::fit(viewport_width, DEFAULT_MARGIN, DEFAULT_MAX_SIDE)
    }

    pub fn width(&self) -> i32 {
        self.side
    }

    pub fn height(&self) -> i32 {
        self.side
    }

    pub fn side(&self) -> f64 {
        self.side as f64
    }

    pub fn is_empty(&self) -> bool {
        self.side == 0
    }
}

/// Target location as fractions of the surface's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPosition", into = "RawPosition")]
pub struct TargetPosition {
    x: f64,
    y: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

impl From<RawPosition> for TargetPosition {
    fn from(raw: RawPosition) -> Self {
        Self::new(raw.x, raw.y)
    }
}

impl From<TargetPosition> for RawPosition {
    fn from(pos: TargetPosition) -> Self {
        Self { x: pos.x, y: pos.y }
    }
}

impl TargetPosition {
    /// Coordinates are clamped into `[0, 1]`; NaN collapses to the center.
    pub fn new(x: f64, y: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0) };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Bearing from the surface center, in the sweep's convention.
    pub fn bearing(&self) -> f64 {
        sweep::bearing_of(self.x - 0.5, self.y - 0.5)
    }
}

impl Default for TargetPosition {
    fn default() -> Self {
        Self::new(0.7, 0.3)
    }
}

/// Center and radius of the radar disc. Everything else is derived from these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarGeometry {
    pub center: Point,
    pub radius: f64,
}

impl RadarGeometry {
    pub fn new(side: f64) -> Self {
        let half = side / 2.0;
        Self {
            center: Point::new(half, half),
            radius: (half - RING_INSET).max(0.0),
        }
    }

    pub fn with_center(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Maps normalized coordinates across the disc's diameter.
    pub fn target_pixel(&self, pos: TargetPosition) -> Point {
        Point::new(
            self.center.x + pos.x * self.radius * 2.0 - self.radius,
            self.center.y + pos.y * self.radius * 2.0 - self.radius,
        )
    }

    pub fn sweep_tip(&self, angle: SweepAngle) -> Point {
        let rad = angle.screen_radians();
        Point::new(
            self.center.x + rad.cos() * self.radius,
            self.center.y + rad.sin() * self.radius,
        )
    }

    /// Distance of the target from the center, as a fraction of the radius.
    pub fn range_fraction(&self, pos: TargetPosition) -> f64 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        self.center.distance_to(self.target_pixel(pos)) / self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance_to(b) < 1e-9
    }

    #[test]
    fn test_surface_is_square_and_capped() {
        let cases = vec![(1024, 600), (640, 600), (500, 460), (40, 0), (10, 0), (-5, 0)];

        for (viewport, expected) in cases {
            let dims = SurfaceDimensions::from_viewport(viewport);
            assert_eq!(dims.width(), expected, "viewport {viewport}");
            assert_eq!(dims.width(), dims.height());
        }
        assert!(SurfaceDimensions::from_viewport(20).is_empty());
    }

    #[test]
    fn test_surface_fit_custom_limits() {
        let dims = SurfaceDimensions::fit(900, 100, 700);
        assert_eq!(dims.side(), 700.0);
        assert_eq!(SurfaceDimensions::fit(i32::MIN, 40, 600).width(), 0);
    }

    #[test]
    fn test_target_pixel_maps_across_diameter() {
        let r = 290.0;
        let geometry = RadarGeometry::with_center(Point::new(r, r), r);
        let pixel = geometry.target_pixel(TargetPosition::new(0.6, 0.2));

        assert!(close(pixel, Point::new(1.2 * r, 0.4 * r)), "{pixel:?}");
    }

    #[test]
    fn test_target_pixel_extremes() {
        let geometry = RadarGeometry::new(600.0);
        assert_eq!(geometry.center, Point::new(300.0, 300.0));
        assert_eq!(geometry.radius, 290.0);

        let top_left = geometry.target_pixel(TargetPosition::new(0.0, 0.0));
        let middle = geometry.target_pixel(TargetPosition::new(0.5, 0.5));
        assert!(close(top_left, Point::new(10.0, 10.0)));
        assert!(close(middle, geometry.center));
    }

    #[test]
    fn test_position_is_clamped() {
        let pos = TargetPosition::new(1.5, -0.2);
        assert_eq!((pos.x(), pos.y()), (1.0, 0.0));
        assert_eq!(TargetPosition::new(f64::NAN, 0.1).x(), 0.5);
    }

    #[test]
    fn test_position_deserialization_clamps() {
        let pos: TargetPosition = serde_json::from_str(r#"{"x": 0.25, "y": 3.0}"#).unwrap();
        assert_eq!(pos, TargetPosition::new(0.25, 1.0));
    }

    #[test]
    fn test_default_target_bearing() {
        // (0.7, 0.3) sits on the upper-right diagonal
        let bearing = TargetPosition::default().bearing();
        assert!((bearing - 45.0).abs() < 1e-9, "{bearing}");
    }

    #[test]
    fn test_sweep_tip() {
        let geometry = RadarGeometry::new(600.0);
        assert!(close(
            geometry.sweep_tip(SweepAngle::new(0.0)),
            Point::new(300.0, 10.0)
        ));
        assert!(close(
            geometry.sweep_tip(SweepAngle::new(90.0)),
            Point::new(590.0, 300.0)
        ));
    }

    #[test]
    fn test_range_fraction() {
        let geometry = RadarGeometry::new(600.0);
        let edge = TargetPosition::new(1.0, 0.5);
        assert!((geometry.range_fraction(edge) - 1.0).abs() < 1e-9);
        assert_eq!(RadarGeometry::new(0.0).range_fraction(edge), 0.0);
    }
}
