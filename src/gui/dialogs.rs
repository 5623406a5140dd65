use std::path::PathBuf;
use eframe::egui;

use super::app::{Action, GuiApp};
use super::APP_TITLE;

/// Global keyboard shortcuts.
pub(super) fn handle_shortcuts(ctx: &egui::Context) -> Option<Action> {
    ctx.input(|i| {
        let command = i.modifiers.ctrl || i.modifiers.mac_cmd;
        if command && i.key_pressed(egui::Key::O) {
            Some(Action::OpenDirectory)
        } else if command && i.key_pressed(egui::Key::Q) {
            Some(Action::Exit)
        } else if i.key_pressed(egui::Key::F2) {
            Some(Action::ToggleFullscreen)
        } else if i.key_pressed(egui::Key::F1) {
            Some(Action::ShowAbout)
        } else {
            None
        }
    })
}

pub(super) fn menu_bar(ui: &mut egui::Ui) -> Option<Action> {
    let mut action = None;
    egui::MenuBar::new().ui(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.add(egui::Button::new("Open directory...").shortcut_text("Ctrl+O")).clicked() {
                action = Some(Action::OpenDirectory);
                ui.close();
            }
            ui.separator();
            if ui.add(egui::Button::new("Exit").shortcut_text("Ctrl+Q")).clicked() {
                action = Some(Action::Exit);
                ui.close();
            }
        });
        ui.menu_button("View", |ui| {
            if ui.add(egui::Button::new("Toggle full screen").shortcut_text("F2")).clicked() {
                action = Some(Action::ToggleFullscreen);
                ui.close();
            }
        });
        ui.menu_button("Help", |ui| {
            if ui.add(egui::Button::new("About").shortcut_text("F1")).clicked() {
                action = Some(Action::ShowAbout);
                ui.close();
            }
        });
    });
    action
}

/// Native folder picker, starting in the working directory.
pub(super) fn pick_directory() -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new().set_title("Open directory");
    if let Ok(cwd) = std::env::current_dir() {
        dialog = dialog.set_directory(cwd);
    }
    dialog.pick_folder()
}

pub(super) fn show_about(app: &mut GuiApp, ctx: &egui::Context) {
    let mut open = app.show_about;
    egui::Window::new("About")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.heading(APP_TITLE);
            ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
            ui.label(format!("Build {}", env!("APP_GIT_HASH")));
            ui.separator();
            ui.label("Scroll to read down and across a page.");
            ui.label("Keep scrolling at a corner to turn the page.");
            ui.label(format!("Hold {:?} or the left button while scrolling to zoom.", app.config.input.zoom_modifier));
        });
    app.show_about = open;
}

pub(super) fn status_bar(app: &GuiApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        if let Some((msg, is_error)) = &app.state.status_message {
            ui.colored_label(if *is_error { egui::Color32::RED } else { egui::Color32::GREEN }, msg);
            return;
        }
        let Some(session) = app.state.session() else {
            ui.label("No directory open");
            return;
        };
        let position = session.current_index().map_or(0, |i| i + 1);
        let (w, h) = app.state.viewport().content_size();
        ui.label(format!("{}/{}", position, session.count()));
        if let Some(name) = session.store().current_path().and_then(|p| p.file_name()) {
            ui.separator();
            ui.label(name.to_string_lossy().to_string());
        }
        ui.separator();
        ui.label(format!("{}x{}", w, h));
        ui.separator();
        ui.label(format!("{:.0}%", session.zoom_factor() * 100.0));
        let pending = app.state.interpreter().pending_next().max(app.state.interpreter().pending_prev());
        if pending > 0 {
            ui.separator();
            ui.label("•".repeat(pending as usize));
        }
    });
}
