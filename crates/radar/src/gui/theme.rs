use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgb;

/// Base colors of the scope. Per-layer opacity is applied at draw time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub phosphor: Srgb<f64>,
    pub backdrop: Srgb<f64>,
    pub target: Srgb<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            phosphor: Srgb::new(0.0, 1.0, 0.0),
            backdrop: Srgb::new(0.0, 20.0 / 255.0, 0.0),
            target: Srgb::new(1.0, 50.0 / 255.0, 50.0 / 255.0),
        }
    }
}

impl ThemeColors {
    /// Reads the `@define-color` entries from the active stylesheet so users
    /// can recolor the scope with their own CSS.
    #[allow(deprecated)]
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let defaults = Self::default();
        Self {
            phosphor: Self::lookup_color(context, "radar_phosphor", defaults.phosphor),
            backdrop: Self::lookup_color(context, "radar_backdrop", defaults.backdrop),
            target: Self::lookup_color(context, "radar_target", defaults.target),
        }
    }

    #[allow(deprecated)]
    fn lookup_color(context: &gtk::StyleContext, name: &str, fallback: Srgb<f64>) -> Srgb<f64> {
        context
            .lookup_color(name)
            .map(|c| Srgb::new(c.red() as f64, c.green() as f64, c.blue() as f64))
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
@define-color radar_phosphor #00ff00;
@define-color radar_backdrop #001400;
@define-color radar_target #ff3232;

.radar-window {
    background-color: black;
}

.radar-drawing-area {
    background: none;
    background-color: transparent;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
