use eframe::egui;
use crossbeam_channel::Sender;
use log::{debug, trace};

use crate::gesture::{Modifiers, PointerButton, WheelInput};
use crate::state::ViewportEvent;
use crate::viewport::Viewport;

use super::app::GuiApp;

/// Signed scroll distance in pixels for one wheel event. Positive `delta_y`
/// is the wheel turned away from the user, which scrolls back up the page.
pub(super) fn wheel_pixels(unit: egui::MouseWheelUnit, delta_y: f32, line_px: f32, page_px: f32, ppp: f32) -> i32 {
    let px = match unit {
        egui::MouseWheelUnit::Point => delta_y * ppp,
        egui::MouseWheelUnit::Line => delta_y * line_px,
        egui::MouseWheelUnit::Page => delta_y * page_px,
    };
    px.round() as i32
}

pub(super) fn to_modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers { ctrl: m.ctrl || m.mac_cmd, alt: m.alt, shift: m.shift }
}

pub(super) fn to_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Screen rect for an image of `size` points inside `area`, scrolled by
/// `offset`. An axis where the image is smaller than the area is centered.
pub(super) fn paint_rect(area: egui::Rect, size: egui::Vec2, offset: egui::Vec2) -> egui::Rect {
    let x = if size.x < area.width() {
        area.center().x - size.x / 2.0
    } else {
        area.min.x - offset.x
    };
    let y = if size.y < area.height() {
        area.center().y - size.y / 2.0
    } else {
        area.min.y - offset.y
    };
    egui::Rect::from_min_size(egui::pos2(x, y), size)
}

/// Per-frame facts needed to translate one egui event.
#[derive(Debug, Clone, Copy)]
pub(super) struct InputFrame {
    pub(super) rect: egui::Rect,
    pub(super) ppp: f32,
    pub(super) line_px: f32,
    pub(super) dragging: bool,
    pub(super) over_image: bool,
    pub(super) primary_down: bool,
}

impl InputFrame {
    /// Pixel coordinates relative to the top-left of the image area.
    fn to_local(&self, pos: egui::Pos2) -> (f32, f32) {
        ((pos.x - self.rect.min.x) * self.ppp, (pos.y - self.rect.min.y) * self.ppp)
    }
}

pub(super) fn translate(event: egui::Event, frame: &InputFrame) -> Option<ViewportEvent> {
    match event {
        egui::Event::MouseWheel { unit, delta, modifiers, .. } if frame.over_image => {
            let page_px = frame.rect.height() * frame.ppp;
            let magnitude = wheel_pixels(unit, delta.y, frame.line_px, page_px, frame.ppp);
            // Horizontal-only motion has no vertical component to interpret
            if magnitude == 0 {
                return None;
            }
            Some(ViewportEvent::Wheel(WheelInput {
                magnitude,
                modifiers: to_modifiers(modifiers),
                primary_held: frame.primary_down,
            }))
        },
        egui::Event::PointerButton { pos, button, pressed: true, .. } if frame.rect.contains(pos) => {
            to_button(button).map(|button| {
                let (x, y) = frame.to_local(pos);
                ViewportEvent::PointerPressed { button, x, y }
            })
        },
        egui::Event::PointerButton { pressed: false, .. } => Some(ViewportEvent::PointerReleased),
        egui::Event::PointerMoved(pos) if frame.dragging || frame.rect.contains(pos) => {
            let (x, y) = frame.to_local(pos);
            Some(ViewportEvent::PointerMoved { x, y })
        },
        _ => None,
    }
}

fn queue(tx: &Sender<ViewportEvent>, event: ViewportEvent) {
    trace!("queue {:?}", event);
    if let Err(e) = tx.send(event) {
        debug!("viewport event dropped: {}", e);
    }
}

/// Queues this frame's raw input over `rect` as viewport events.
pub(super) fn forward_input(app: &GuiApp, ctx: &egui::Context, rect: egui::Rect) {
    let tx = app.state.sender();
    let (events, hover, primary_down) =
        ctx.input(|i| (i.events.clone(), i.pointer.hover_pos(), i.pointer.primary_down()));
    let frame = InputFrame {
        rect,
        ppp: ctx.pixels_per_point(),
        line_px: app.config.input.line_px,
        dragging: app.state.interpreter().drag_active(),
        over_image: hover.is_some_and(|p| rect.contains(p)),
        primary_down,
    };

    let size = ((rect.width() * frame.ppp).round() as u32, (rect.height() * frame.ppp).round() as u32);
    queue(&tx, ViewportEvent::Resized { width: size.0, height: size.1 });

    for event in events {
        if let Some(event) = translate(event, &frame) {
            queue(&tx, event);
        }
    }
}

/// Re-uploads the bitmap when the viewport shows a different one.
pub(super) fn sync_texture(app: &mut GuiApp, ctx: &egui::Context) {
    let viewport = app.state.viewport();
    if viewport.generation() == app.texture_generation {
        return;
    }
    app.texture_generation = viewport.generation();
    app.texture = viewport.bitmap().map(|bitmap| {
        let size = [bitmap.width() as usize, bitmap.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, bitmap.as_raw());
        ctx.load_texture("current_page", color_image, egui::TextureOptions::LINEAR)
    });
}

pub(super) fn paint(app: &GuiApp, ui: &egui::Ui, rect: egui::Rect) {
    let painter = ui.painter().with_clip_rect(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

    let Some(texture) = &app.texture else {
        if app.state.session().is_none() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "File > Open directory (Ctrl+O)",
                egui::FontId::proportional(16.0),
                egui::Color32::GRAY,
            );
        }
        return;
    };

    // One bitmap pixel per physical pixel
    let ppp = ui.ctx().pixels_per_point();
    let size = texture.size_vec2() / ppp;
    let b = app.state.viewport().scroll_bounds();
    let offset = egui::vec2(b.horizontal_value as f32, b.vertical_value as f32) / ppp;

    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    painter.image(texture.id(), paint_rect(rect, size, offset), uv, egui::Color32::WHITE);
}
