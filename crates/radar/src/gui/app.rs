use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::gui::driver::AnimationDriver;
use crate::gui::radar::{self, RadarState};
use crate::gui::surface::SurfaceWatch;
use crate::gui::theme::{self, ThemeColors};
use crate::sys::loader;
use gtk::prelude::*;
use gtk4 as gtk;
use radarctl::target::{LoadError, LoadTicket, TargetPath};
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tokio::task::JoinHandle;

pub struct AppModel {
    pub state: Rc<RefCell<RadarState>>,
    pub config: Config,
    pub mounted: bool,
    pub mounted_at: Instant,
    /// Bumped on every mount. Ticks queued by an earlier mount's timer carry
    /// an older value and are dropped.
    pub epoch: u64,
    pub drawing_area: gtk::DrawingArea,
    driver: AnimationDriver,
    surface: SurfaceWatch,
    load_task: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub enum AppMsg {
    Show,
    Hide,
    Tick(u64),
    Resize(i32),
    Target(TargetPath),
    TargetFetched(LoadTicket, Result<Vec<u8>, LoadError>),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show => AppMsg::Show,
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::Target(path) => AppMsg::Target(path),
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

impl AppModel {
    /// Builds fresh state and starts the timer, the resize listener and the
    /// target load.
    fn mount(&mut self, sender: &ComponentSender<Self>) {
        if self.mounted {
            return;
        }

        self.state.borrow_mut().remount(&self.config);
        self.mounted_at = Instant::now();
        self.mounted = true;
        self.epoch += 1;

        let epoch = self.epoch;
        let tick_sender = sender.clone();
        self.driver.start(self.config.sweep.interval(), move || {
            tick_sender.input(AppMsg::Tick(epoch));
        });

        let resize_sender = sender.clone();
        self.surface.attach(&self.drawing_area, move |width| {
            resize_sender.input(AppMsg::Resize(width));
        });
        // already allocated when remounting, so no resize signal will come
        self.state.borrow_mut().resize(self.drawing_area.width());

        self.request_target(self.config.target_image.clone(), sender);
        self.drawing_area.queue_draw();
        log::info!("Radar mounted");
    }

    /// Tears down everything `mount` started. Nothing scheduled before this
    /// call can change the state afterwards.
    fn unmount(&mut self) {
        if !self.mounted {
            return;
        }

        self.driver.stop();
        self.surface.detach();
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        self.state.borrow_mut().deactivate();
        self.mounted = false;
        self.drawing_area.queue_draw();
        log::info!("Radar unmounted");
    }

    fn request_target(&mut self, path: TargetPath, sender: &ComponentSender<Self>) {
        let resolved = path.resolve(self.config.asset_dir.as_deref());
        let ticket = self.state.borrow_mut().request_target(path);

        if let Some(task) = self.load_task.take() {
            task.abort();
        }

        let sender = sender.clone();
        self.load_task = Some(relm4::spawn(async move {
            let result = loader::fetch(&resolved).await;
            sender.input(AppMsg::TargetFetched(ticket, result));
        }));
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Radar"),
            set_default_width: 680,
            set_default_height: 680,
            #[watch]
            set_visible: model.mounted,
            add_css_class: "radar-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Hide);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "radar-drawing-area",
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, rx) = init;

        theme::load_css();

        let model = AppModel {
            state: Rc::new(RefCell::new(RadarState::new(&config))),
            config,
            mounted: false,
            mounted_at: Instant::now(),
            epoch: 0,
            drawing_area: gtk::DrawingArea::default(),
            driver: AnimationDriver::default(),
            surface: SurfaceWatch::default(),
            load_task: None,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                #[allow(deprecated)]
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                let mut state = state_draw.borrow_mut();
                if let Err(e) = radar::paint(cr, width, height, &mut state, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        model.mount(&sender);
        root.set_visible(true);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show => self.mount(&sender),
            AppMsg::Hide => self.unmount(),
            AppMsg::Tick(epoch) => {
                if !self.mounted || epoch != self.epoch {
                    return;
                }
                let elapsed = self.mounted_at.elapsed();
                if self.state.borrow_mut().tick(elapsed) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Resize(width) => {
                if self.mounted && self.state.borrow_mut().resize(width) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Target(path) => {
                self.config.target_image = path.clone();
                if self.mounted {
                    self.request_target(path, &sender);
                }
            }
            AppMsg::TargetFetched(ticket, result) => {
                if !self.mounted {
                    return;
                }
                let decoded = result.and_then(loader::decode);
                if self.state.borrow_mut().finish_load(ticket, decoded) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    let was_mounted = self.mounted;
                    self.unmount();
                    self.config = new_config;
                    if was_mounted {
                        self.mount(&sender);
                    }
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}
