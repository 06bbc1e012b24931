use super::model::{Emphasis, Frame, RadarState, oscillate};
use super::*;
use crate::gui::surface;
use crate::gui::theme::ThemeColors;
use cairo::{Context, FontSlant, FontWeight, Operator, RadialGradient};
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgb;
use radarctl::geometry::{Point, RadarGeometry};
use radarctl::sweep::SweepAngle;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::time::Duration;

fn set_color(cr: &Context, color: Srgb<f64>, alpha: f64) {
    let (r, g, b) = color.into_components();
    cr.set_source_rgba(r, g, b, alpha);
}

fn radial_fade(
    center: Point,
    inner: f64,
    outer: f64,
    color: Srgb<f64>,
    stops: &[(f64, f64)],
) -> RadialGradient {
    let gradient = RadialGradient::new(center.x, center.y, inner, center.x, center.y, outer);
    let (r, g, b) = color.into_components();
    for &(offset, alpha) in stops {
        gradient.add_color_stop_rgba(offset, r, g, b, alpha);
    }
    gradient
}

fn draw_labels(cr: &Context, origin: Point, lines: &[String]) -> Result<(), cairo::Error> {
    cr.select_font_face(LABEL_FONT, FontSlant::Normal, FontWeight::Normal);
    cr.set_font_size(LABEL_SIZE);
    for (i, line) in lines.iter().enumerate() {
        cr.move_to(origin.x, origin.y + i as f64 * LINE_HEIGHT);
        cr.show_text(line)?;
    }
    Ok(())
}

fn draw_dashed_box(cr: &Context, center: Point, half: f64) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.set_dash(&[4.0, 3.0], 0.0);
    cr.set_line_width(1.0);
    cr.rectangle(center.x - half, center.y - half, half * 2.0, half * 2.0);
    cr.stroke()?;
    cr.restore()
}

struct TargetRenderer<'a> {
    position: Point,
    emphasis: Emphasis,
    elapsed: Duration,
    range: f64,
    image: Option<&'a Pixbuf>,
}

impl<'a> TargetRenderer<'a> {
    fn new(frame: &Frame<'a>, geometry: &RadarGeometry) -> Self {
        Self {
            position: geometry.target_pixel(frame.target),
            emphasis: frame.emphasis,
            elapsed: frame.elapsed,
            range: geometry.range_fraction(frame.target) * RANGE_METERS,
            image: frame.image,
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        match self.image {
            Some(pixbuf) => self.draw_image(cr, pixbuf, colors),
            None => self.draw_glyph(cr, colors),
        }
    }

    fn status(&self) -> &'static str {
        if self.emphasis.highlighted {
            "TARGET FOUND"
        } else {
            "TARGET"
        }
    }

    fn draw_glyph(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let Point { x, y } = self.position;
        let e = self.emphasis;
        let size = GLYPH_SIZE;
        let color = Srgb::new(
            colors.target.red * e.intensity,
            colors.target.green,
            colors.target.blue,
        );

        set_color(cr, color, e.opacity);
        cr.set_line_width(e.line_width);

        for ring in [size, size / 2.0] {
            cr.new_sub_path();
            cr.arc(x, y, ring, 0.0, 2.0 * PI);
            cr.stroke()?;
        }

        cr.move_to(x - size * 1.5, y);
        cr.line_to(x + size * 1.5, y);
        cr.move_to(x, y - size * 1.5);
        cr.line_to(x, y + size * 1.5);
        cr.stroke()?;

        draw_dashed_box(cr, self.position, size * 1.8)?;

        draw_labels(
            cr,
            Point::new(x + size * 2.0, y),
            &[self.status().to_string(), format!("ID: {}", TARGET_ID)],
        )?;

        let glow = radial_fade(
            self.position,
            size * 0.5,
            size * 2.0,
            colors.target,
            &[(0.0, 0.2 * e.glow), (1.0, 0.0)],
        );
        cr.new_path();
        cr.arc(x, y, size * 1.5, 0.0, 2.0 * PI);
        cr.set_source(&glow)?;
        cr.fill()
    }

    fn draw_image(
        &self,
        cr: &Context,
        pixbuf: &Pixbuf,
        colors: &ThemeColors,
    ) -> Result<(), cairo::Error> {
        let Point { x, y } = self.position;
        let e = self.emphasis;
        let t = self.elapsed;
        // dimmed markers keep their reduced opacity
        let fade = if e.highlighted { 1.0 } else { e.opacity };

        let display = IMAGE_SIZE * (1.0 + IMAGE_PULSE * oscillate(t, IMAGE_PULSE_PERIOD_MS));
        let half = display / 2.0;

        // glow behind the image
        let blur = GLOW_BLUR + GLOW_BLUR_SWING * oscillate(t, GLOW_PERIOD_MS);
        let glow_alpha = (0.5 + 0.3 * oscillate(t, GLOW_PERIOD_MS)) * e.glow;
        let glow = radial_fade(
            self.position,
            half * 0.5,
            half + blur,
            colors.target,
            &[(0.0, glow_alpha), (1.0, 0.0)],
        );
        cr.new_path();
        cr.arc(x, y, half + blur, 0.0, 2.0 * PI);
        cr.set_source(&glow)?;
        cr.fill()?;

        let longest = pixbuf.width().max(pixbuf.height()).max(1) as f64;
        let fit = display / longest;
        let (w, h) = (pixbuf.width() as f64 * fit, pixbuf.height() as f64 * fit);

        cr.save()?;
        cr.translate(x - w / 2.0, y - h / 2.0);
        cr.scale(fit, fit);
        cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
        cr.paint_with_alpha(fade)?;
        cr.restore()?;

        let text_alpha = (0.7 + 0.3 * oscillate(t, TEXT_PERIOD_MS)) * fade;
        set_color(cr, colors.target, text_alpha);
        draw_dashed_box(cr, self.position, half + 6.0)?;
        draw_labels(
            cr,
            Point::new(x + half + 12.0, y - LINE_HEIGHT),
            &[
                self.status().to_string(),
                format!("ID: {}", TARGET_ID),
                format!("DIST: {:.0}m", self.range),
            ],
        )
    }
}

fn clear(cr: &Context, side: f64) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.set_operator(Operator::Clear);
    cr.rectangle(0.0, 0.0, side, side);
    cr.fill()?;
    cr.restore()
}

fn draw_background(cr: &Context, side: f64, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_color(cr, colors.backdrop, BACKGROUND_ALPHA);
    cr.rectangle(0.0, 0.0, side, side);
    cr.fill()
}

fn draw_noise(
    cr: &Context,
    side: f64,
    colors: &ThemeColors,
    rng: &mut fastrand::Rng,
) -> Result<(), cairo::Error> {
    set_color(cr, colors.phosphor, NOISE_ALPHA);
    for _ in 0..NOISE_DOTS {
        let (x, y) = (rng.f64() * side, rng.f64() * side);
        let size = NOISE_MIN_SIZE + rng.f64() * NOISE_SIZE_SPREAD;
        cr.rectangle(x, y, size, size);
        cr.fill()?;
    }
    Ok(())
}

fn draw_grid(cr: &Context, g: &RadarGeometry, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let (c, r) = (g.center, g.radius);
    set_color(cr, colors.phosphor, GRID_ALPHA);
    cr.set_line_width(1.0);

    cr.move_to(c.x - r, c.y);
    cr.line_to(c.x + r, c.y);
    cr.move_to(c.x, c.y - r);
    cr.line_to(c.x, c.y + r);

    // diagonals at ±45° end on the boundary ring
    let d = r * FRAC_1_SQRT_2;
    cr.move_to(c.x - d, c.y - d);
    cr.line_to(c.x + d, c.y + d);
    cr.move_to(c.x - d, c.y + d);
    cr.line_to(c.x + d, c.y - d);
    cr.stroke()
}

fn draw_rings(cr: &Context, g: &RadarGeometry, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let c = g.center;
    set_color(cr, colors.phosphor, RING_ALPHA);
    cr.set_line_width(1.0);
    for i in 1..=RING_COUNT {
        cr.new_sub_path();
        cr.arc(c.x, c.y, g.radius / RING_COUNT as f64 * i as f64, 0.0, 2.0 * PI);
        cr.stroke()?;
    }

    set_color(cr, colors.phosphor, BOUNDARY_ALPHA);
    cr.set_line_width(2.0);
    cr.new_sub_path();
    cr.arc(c.x, c.y, g.radius, 0.0, 2.0 * PI);
    cr.stroke()
}

fn draw_sweep(
    cr: &Context,
    g: &RadarGeometry,
    angle: SweepAngle,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let (c, r) = (g.center, g.radius);
    let tip = g.sweep_tip(angle);

    set_color(cr, colors.phosphor, SWEEP_LINE_ALPHA);
    cr.set_line_width(2.0);
    cr.move_to(c.x, c.y);
    cr.line_to(tip.x, tip.y);
    cr.stroke()?;

    if r <= 0.0 {
        return Ok(());
    }

    let rad = angle.screen_radians();
    cr.move_to(c.x, c.y);
    cr.arc(c.x, c.y, r, rad - TRAIL_WIDTH, rad);
    cr.close_path();

    let trail = radial_fade(
        c,
        0.0,
        r,
        colors.phosphor,
        &[(0.0, 0.3), (0.7, 0.1), (1.0, 0.0)],
    );
    cr.set_source(&trail)?;
    cr.fill_preserve()?;

    set_color(cr, colors.phosphor, SWEEP_EDGE_ALPHA);
    cr.set_line_width(1.0);
    cr.stroke()
}

fn draw_center_dot(
    cr: &Context,
    g: &RadarGeometry,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_color(cr, colors.phosphor, CENTER_DOT_ALPHA);
    cr.new_sub_path();
    cr.arc(g.center.x, g.center.y, CENTER_DOT_RADIUS, 0.0, 2.0 * PI);
    cr.fill()
}

/// Fixed 0-100 scale along the bottom and left edges, whatever the pixel size.
fn draw_coordinates(cr: &Context, side: f64, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_color(cr, colors.phosphor, TICK_LABEL_ALPHA);
    cr.select_font_face(LABEL_FONT, FontSlant::Normal, FontWeight::Normal);
    cr.set_font_size(LABEL_SIZE);

    let step = side / TICK_DIVISIONS as f64;
    for i in 0..=TICK_DIVISIONS {
        cr.move_to(step * i as f64, side - 5.0);
        cr.show_text(&(i * 10).to_string())?;
    }
    for i in 0..=TICK_DIVISIONS {
        cr.move_to(5.0, step * i as f64);
        cr.show_text(&(i * 10).to_string())?;
    }
    Ok(())
}

/// Repaints the whole scope, back to front, onto a `frame.side` square at the
/// origin. A zero-sized surface draws nothing.
pub fn draw(
    cr: &Context,
    frame: &Frame<'_>,
    colors: &ThemeColors,
    rng: &mut fastrand::Rng,
) -> Result<(), cairo::Error> {
    if frame.side <= 0.0 {
        return Ok(());
    }
    let geometry = RadarGeometry::new(frame.side);

    clear(cr, frame.side)?;
    draw_background(cr, frame.side, colors)?;
    draw_noise(cr, frame.side, colors, rng)?;
    draw_grid(cr, &geometry, colors)?;
    draw_rings(cr, &geometry, colors)?;
    draw_sweep(cr, &geometry, frame.angle, colors)?;
    TargetRenderer::new(frame, &geometry).draw(cr, colors)?;
    draw_center_dot(cr, &geometry, colors)?;
    draw_coordinates(cr, frame.side, colors)
}

/// Draws the state centered in a viewport of the given size. Unmounted or
/// not-yet-sized widgets draw nothing.
pub fn paint(
    cr: &Context,
    viewport_width: i32,
    viewport_height: i32,
    state: &mut RadarState,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    if !state.is_active() || state.surface.is_empty() {
        return Ok(());
    }
    let origin = surface::centered_origin(viewport_width, viewport_height, state.surface);
    let side = state.surface.side();

    cr.save()?;
    cr.translate(origin.x, origin.y);
    cr.rectangle(0.0, 0.0, side, side);
    cr.clip();
    let (frame, rng) = state.frame();
    let drawn = draw(cr, &frame, colors, rng);
    cr.restore()?;
    drawn
}
