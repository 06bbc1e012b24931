use crate::config::{Config, SurfaceConfig};
use crate::gui::radar::BLINK_PERIOD_MS;
use crate::sys::loader;
use gdk_pixbuf::Pixbuf;
use radarctl::geometry::{SurfaceDimensions, TargetPosition};
use radarctl::sweep::{Detector, Sweep, SweepAngle};
use radarctl::target::{LoadError, LoadTicket, TargetLoader, TargetPath};
use std::time::Duration;

/// Sine wave over elapsed time, in `[-1, 1]`.
pub fn oscillate(elapsed: Duration, period_ms: f64) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 / period_ms).sin()
}

/// How strongly the target marker is drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emphasis {
    pub highlighted: bool,
    pub opacity: f64,
    /// Scales the red channel of the target color.
    pub intensity: f64,
    pub line_width: f64,
    pub glow: f64,
}

impl Emphasis {
    pub fn resolve(detection_gated: bool, detected: bool, elapsed: Duration) -> Self {
        if detection_gated && !detected {
            return Self::dim();
        }
        Self {
            highlighted: true,
            opacity: (0.6 + 0.4 * oscillate(elapsed, BLINK_PERIOD_MS)).clamp(0.0, 1.0),
            intensity: 1.0,
            line_width: 2.0,
            glow: 1.0,
        }
    }

    pub fn dim() -> Self {
        Self {
            highlighted: false,
            opacity: 0.5,
            intensity: 180.0 / 255.0,
            line_width: 1.5,
            glow: 0.5,
        }
    }
}

/// Everything the compositor needs for one repaint.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub side: f64,
    pub angle: SweepAngle,
    pub elapsed: Duration,
    pub target: TargetPosition,
    pub emphasis: Emphasis,
    pub image: Option<&'a Pixbuf>,
}

/// Per-mount widget state. Dropped and rebuilt on every mount.
pub struct RadarState {
    pub sweep: Sweep,
    pub surface: SurfaceDimensions,
    pub target: TargetPosition,
    pub detector: Detector,
    pub detection_gated: bool,
    pub detected: bool,
    pub loader: TargetLoader<Pixbuf>,
    pub elapsed: Duration,
    surface_config: SurfaceConfig,
    noise: fastrand::Rng,
}

impl RadarState {
    pub fn new(config: &Config) -> Self {
        let sweep = Sweep::new(config.sweep.step_degrees);
        let target = config.target_position;
        let detector = Detector::new(target.bearing(), config.sweep.detection_tolerance);
        let noise = config
            .noise_seed
            .map(fastrand::Rng::with_seed)
            .unwrap_or_default();

        Self {
            detected: detector.illuminates(sweep.angle()),
            sweep,
            surface: SurfaceDimensions::default(),
            target,
            detector,
            detection_gated: config.detection_gated,
            loader: TargetLoader::new(),
            elapsed: Duration::ZERO,
            surface_config: config.surface.clone(),
            noise,
        }
    }

    /// Rebuilds the state for a new mount. Load tickets issued by the previous
    /// mount stay stale.
    pub fn remount(&mut self, config: &Config) {
        let loader = self.loader.succeeding();
        *self = Self::new(config);
        self.loader = loader;
    }

    pub fn is_active(&self) -> bool {
        self.sweep.is_active()
    }

    /// Advances the sweep. Returns whether a repaint is needed.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        match self.sweep.tick() {
            Some(angle) => {
                self.elapsed = elapsed;
                self.detected = self.detector.illuminates(angle);
                true
            }
            None => false,
        }
    }

    /// Refits the square surface to a new viewport width.
    pub fn resize(&mut self, viewport_width: i32) -> bool {
        if !self.is_active() {
            return false;
        }
        let dims = self.surface_config.fit(viewport_width);
        let changed = dims != self.surface;
        self.surface = dims;
        changed
    }

    pub fn request_target(&mut self, path: TargetPath) -> LoadTicket {
        self.loader.request(path)
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Pixbuf, LoadError>) -> bool {
        self.loader
            .complete(ticket, result, loader::fallback_icon)
            .changed()
    }

    /// Stops the sweep and discards in-flight loads. Further ticks, resizes and
    /// load results are ignored.
    pub fn deactivate(&mut self) {
        self.sweep.stop();
        self.loader.cancel();
    }

    pub fn emphasis(&self) -> Emphasis {
        Emphasis::resolve(self.detection_gated, self.detected, self.elapsed)
    }

    /// Splits the state into the frame description and the noise source.
    pub fn frame(&mut self) -> (Frame<'_>, &mut fastrand::Rng) {
        let emphasis = self.emphasis();
        let frame = Frame {
            side: self.surface.side(),
            angle: self.sweep.angle(),
            elapsed: self.elapsed,
            target: self.target,
            emphasis,
            image: self.loader.handle(),
        };
        (frame, &mut self.noise)
    }
}
