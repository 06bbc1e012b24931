use gtk::prelude::*;
use gtk4 as gtk;
use radarctl::geometry::{Point, SurfaceDimensions};

/// Resize subscription on the drawing area. The area fills the window, so its
/// width is the viewport width.
#[derive(Default)]
pub struct SurfaceWatch {
    handler: Option<(gtk::DrawingArea, glib::SignalHandlerId)>,
}

impl SurfaceWatch {
    pub fn attach(&mut self, area: &gtk::DrawingArea, on_resize: impl Fn(i32) + 'static) {
        self.detach();
        let id = area.connect_resize(move |_, width, _| on_resize(width));
        self.handler = Some((area.clone(), id));
    }

    pub fn detach(&mut self) {
        if let Some((area, id)) = self.handler.take() {
            area.disconnect(id);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.handler.is_some()
    }
}

impl Drop for SurfaceWatch {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Top-left corner that centers the square surface inside the viewport.
pub fn centered_origin(viewport_width: i32, viewport_height: i32, dims: SurfaceDimensions) -> Point {
    Point::new(
        ((viewport_width - dims.width()).max(0) / 2) as f64,
        ((viewport_height - dims.height()).max(0) / 2) as f64,
    )
}
