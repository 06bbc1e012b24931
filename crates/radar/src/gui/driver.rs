use std::time::Duration;

/// Periodic animation timer on the GTK main loop. Ticks run on the same
/// thread as drawing, so removing the source guarantees no tick fires after
/// `stop` returns.
#[derive(Default)]
pub struct AnimationDriver {
    source: Option<glib::SourceId>,
}

impl AnimationDriver {
    pub fn start(&mut self, interval: Duration, mut on_tick: impl FnMut() + 'static) {
        self.stop();
        let source = glib::timeout_add_local(interval, move || {
            on_tick();
            glib::ControlFlow::Continue
        });
        self.source = Some(source);
    }

    pub fn stop(&mut self) {
        if let Some(source) = self.source.take() {
            source.remove();
        }
    }

    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
