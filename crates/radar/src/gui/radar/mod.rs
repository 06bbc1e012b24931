use std::f64::consts::PI;

pub mod model;
pub mod view;

pub use model::{Emphasis, Frame, RadarState};
pub use view::{draw, paint};

pub const NOISE_DOTS: usize = 100;
pub const NOISE_MIN_SIZE: f64 = 1.0;
pub const NOISE_SIZE_SPREAD: f64 = 2.0;
pub const RING_COUNT: usize = 3;
pub const TRAIL_WIDTH: f64 = PI / 4.0; // sector trailing the sweep line
pub const CENTER_DOT_RADIUS: f64 = 3.0;
pub const TICK_DIVISIONS: usize = 10; // 0, 10, ... 100
pub const LABEL_FONT: &str = "monospace";
pub const LABEL_SIZE: f64 = 10.0;
pub const LINE_HEIGHT: f64 = 12.0;

// Layer opacities
pub const BACKGROUND_ALPHA: f64 = 0.2;
pub const NOISE_ALPHA: f64 = 0.02;
pub const GRID_ALPHA: f64 = 0.1;
pub const RING_ALPHA: f64 = 0.3;
pub const BOUNDARY_ALPHA: f64 = 0.5;
pub const SWEEP_LINE_ALPHA: f64 = 0.8;
pub const SWEEP_EDGE_ALPHA: f64 = 0.2;
pub const CENTER_DOT_ALPHA: f64 = 0.8;
pub const TICK_LABEL_ALPHA: f64 = 0.5;

// Target marker
pub const TARGET_ID: &str = "XR-7429";
pub const GLYPH_SIZE: f64 = 10.0;
pub const IMAGE_SIZE: f64 = 60.0;
pub const RANGE_METERS: f64 = 500.0; // shown distance at the outer ring
pub const BLINK_PERIOD_MS: f64 = 100.0;
pub const IMAGE_PULSE: f64 = 0.05;
pub const IMAGE_PULSE_PERIOD_MS: f64 = 300.0;
pub const GLOW_BLUR: f64 = 15.0;
pub const GLOW_BLUR_SWING: f64 = 5.0;
pub const GLOW_PERIOD_MS: f64 = 250.0;
pub const TEXT_PERIOD_MS: f64 = 400.0;
