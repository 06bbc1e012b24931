use std::time::Duration;

pub const FULL_TURN: f64 = 360.0;
pub const DEFAULT_STEP: f64 = 2.0;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);
pub const DEFAULT_TOLERANCE: f64 = 20.0;

/// Sweep position in degrees, always within `[0, 360)`. 0° points up and the
/// sweep turns clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SweepAngle(f64);

impl SweepAngle {
    pub fn new(degrees: f64) -> Self {
        Self(normalize(degrees))
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    pub fn advanced(&self, step: f64) -> Self {
        Self::new(self.0 + step)
    }

    /// Angle in radians in cairo's convention (0 along +x, y pointing down).
    pub fn screen_radians(&self) -> f64 {
        (self.0 - 90.0).to_radians()
    }
}

fn normalize(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}

/// Shortest distance between two bearings, in degrees, within `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(FULL_TURN);
    d.min(FULL_TURN - d)
}

/// Animation state advanced by the periodic timer. Once stopped, ticks are
/// ignored until a new sweep is constructed.
#[derive(Debug, Clone)]
pub struct Sweep {
    angle: SweepAngle,
    step: f64,
    active: bool,
}

impl Sweep {
    pub fn new(step: f64) -> Self {
        Self::starting_at(SweepAngle::default(), step)
    }

    pub fn starting_at(angle: SweepAngle, step: f64) -> Self {
        Self {
            angle,
            step,
            active: true,
        }
    }

    pub fn angle(&self) -> SweepAngle {
        self.angle
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advances by one step. Returns the new angle, or `None` once stopped.
    pub fn tick(&mut self) -> Option<SweepAngle> {
        if !self.active {
            return None;
        }
        self.angle = self.angle.advanced(self.step);
        Some(self.angle)
    }

    pub fn stop(&mut self) {
        self.active = false;
    }
}

impl Default for Sweep {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

/// Decides whether the sweep currently illuminates a target at a fixed bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detector {
    bearing: f64,
    tolerance: f64,
}

impl Detector {
    pub fn new(bearing: f64, tolerance: f64) -> Self {
        Self {
            bearing: normalize(bearing),
            tolerance: tolerance.abs(),
        }
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn illuminates(&self, angle: SweepAngle) -> bool {
        angular_distance(angle.degrees(), self.bearing) < self.tolerance
    }
}

/// Bearing (sweep convention) of a screen-space offset from the center.
pub fn bearing_of(dx: f64, dy: f64) -> f64 {
    normalize(dy.atan2(dx).to_degrees() + 90.0)
}
