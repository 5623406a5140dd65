use std::path::{Path, PathBuf};
use eframe::egui;
use log::{info, warn};

use crate::config::Config;
use crate::state::BrowserState;

use super::{dialogs, image};
use super::APP_TITLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Action {
    OpenDirectory,
    Exit,
    ToggleFullscreen,
    ShowAbout,
}

pub struct GuiApp {
    pub(super) state: BrowserState,
    pub(super) config: Config,
    pub(super) texture: Option<egui::TextureHandle>,
    pub(super) texture_generation: u64,
    pub(super) show_about: bool,
    is_fullscreen: bool,
    window_title: String,
    initial_scale_applied: bool,
}

impl GuiApp {
    pub fn new(config: Config, start_dir: Option<PathBuf>) -> Self {
        let state = BrowserState::new(
            config.input.zoom_modifier,
            config.browse.sort,
            config.window.width,
            config.window.height,
        );
        let mut app = Self {
            state,
            config,
            texture: None,
            texture_generation: 0,
            show_about: false,
            is_fullscreen: false,
            window_title: String::new(),
            initial_scale_applied: false,
        };
        if let Some(dir) = start_dir {
            app.open_directory(&dir);
        }
        app
    }

    /// Failures end up in the status line; the window keeps running.
    fn open_directory(&mut self, dir: &Path) {
        match self.state.open_directory(dir) {
            Ok(0) => {
                warn!("No images in {:?}", dir);
                self.state.set_status(format!("No images in {}", dir.display()), true);
            },
            Ok(_) => {},
            Err(e) => {
                warn!("{:#}", e);
                self.state.set_status(format!("{:#}", e), true);
            },
        }
    }

    fn perform(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::OpenDirectory => {
                if let Some(dir) = dialogs::pick_directory() {
                    self.open_directory(&dir);
                }
            },
            Action::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Action::ToggleFullscreen => {
                self.is_fullscreen = !self.is_fullscreen;
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
            },
            Action::ShowAbout => self.show_about = true,
        }
    }

    pub fn run(self) -> Result<(), eframe::Error> {
        let width = self.config.window.width as f32;
        let height = self.config.window.height as f32;
        info!("Starting {}x{} window", width, height);

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([width, height])
                .with_title(self.state.title()),
            ..Default::default()
        };

        eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Ok(Box::new(self))))
    }
}

impl eframe::App for GuiApp {
    // Required by eframe 0.34; all drawing happens in `update`, which eframe still calls first.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.initial_scale_applied {
            ctx.set_pixels_per_point(ctx.pixels_per_point() * self.config.window.font_scale);
            self.initial_scale_applied = true;
        }

        let mut action = dialogs::handle_shortcuts(ctx);

        if !self.is_fullscreen {
            egui::TopBottomPanel::top("menu").show(ctx, |ui| {
                if let Some(a) = dialogs::menu_bar(ui) {
                    action = Some(a);
                }
            });
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                dialogs::status_bar(self, ui);
            });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

                image::forward_input(self, ctx, response.rect);
                if self.state.pump() {
                    ctx.request_repaint();
                }
                image::sync_texture(self, ctx);
                image::paint(self, ui, response.rect);
            });

        if self.show_about {
            dialogs::show_about(self, ctx);
        }

        if let Some(action) = action {
            self.perform(ctx, action);
        }

        let title = self.state.title();
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }
}
