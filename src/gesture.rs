use log::debug;
use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// Consecutive corner hits needed before a page actually turns.
pub const PAGE_TURN_THRESHOLD: u8 = 3;

/// Keyboard modifier that turns the wheel into a zoom control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZoomModifier {
    #[default]
    Ctrl,
    Alt,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn holds(&self, modifier: ZoomModifier) -> bool {
        match modifier {
            ZoomModifier::Ctrl => self.ctrl,
            ZoomModifier::Alt => self.alt,
            ZoomModifier::Shift => self.shift,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// One wheel tick as delivered by the window system.
///
/// Negative magnitudes move forward: down the page, or zoom in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelInput {
    pub magnitude: i32,
    pub modifiers: Modifiers,
    pub primary_held: bool,
}

impl WheelInput {
    pub fn new(magnitude: i32) -> Self {
        Self { magnitude, ..Default::default() }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// A zero delta counts as backward, with a step of zero.
    fn direction(&self) -> Direction {
        if self.magnitude < 0 { Direction::Forward } else { Direction::Backward }
    }

    fn step(&self) -> i32 {
        self.magnitude.checked_abs().unwrap_or(i32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Scroll change actually applied to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollDelta {
    pub vertical: i32,
    pub horizontal: i32,
}

/// Semantic outcome of one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Pan(ScrollDelta),
    ZoomIn,
    ZoomOut,
    PageNext,
    PagePrev,
    None,
}

/// Classifies wheel and pointer input into pan, zoom and page-turn intents.
///
/// Wheel pans walk the image in an S shape: down the vertical axis, then
/// across the horizontal one. Reaching a corner does not turn the page right
/// away; the user has to keep scrolling into the corner for
/// [`PAGE_TURN_THRESHOLD`] consecutive events.
#[derive(Debug, Default)]
pub struct GestureInterpreter {
    zoom_modifier: ZoomModifier,
    drag_active: bool,
    pending_next: u8,
    pending_prev: u8,
}

impl GestureInterpreter {
    pub fn new(zoom_modifier: ZoomModifier) -> Self {
        Self { zoom_modifier, ..Default::default() }
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn pending_next(&self) -> u8 {
        self.pending_next
    }

    pub fn pending_prev(&self) -> u8 {
        self.pending_prev
    }

    fn reset_pending(&mut self) {
        self.pending_next = 0;
        self.pending_prev = 0;
    }

    pub fn on_wheel(&mut self, input: WheelInput, viewport: &mut impl Viewport) -> Gesture {
        let direction = input.direction();

        // Zoom takes priority and leaves paging counters alone
        if input.modifiers.holds(self.zoom_modifier) || input.primary_held || self.drag_active {
            return match direction {
                Direction::Forward => Gesture::ZoomIn,
                Direction::Backward => Gesture::ZoomOut,
            };
        }

        let before = viewport.scroll_bounds();
        let step = input.step();
        let (vertical, horizontal) = match direction {
            Direction::Forward if before.vertical_at_max() => (
                before.vertical_value,
                before.horizontal_value.saturating_add(step).min(before.horizontal_max),
            ),
            Direction::Forward => (
                before.vertical_value.saturating_add(step).min(before.vertical_max),
                before.horizontal_value,
            ),
            Direction::Backward if before.vertical_at_min() => (
                before.vertical_value,
                before.horizontal_value.saturating_sub(step).max(before.horizontal_min),
            ),
            Direction::Backward => (
                before.vertical_value.saturating_sub(step).max(before.vertical_min),
                before.horizontal_value,
            ),
        };
        viewport.set_scroll_position(vertical, horizontal);

        let after = viewport.scroll_bounds();
        let at_end = after.at_bottom_right();
        let at_start = after.at_top_left();

        // When the image fits both corners coincide and bottom-right wins
        if at_end {
            self.pending_prev = 0;
            self.pending_next += 1;
            if self.pending_next >= PAGE_TURN_THRESHOLD {
                self.pending_next = 0;
                debug!("corner held for {} events, turning to next page", PAGE_TURN_THRESHOLD);
                return Gesture::PageNext;
            }
            debug!("bottom-right corner hit {}/{}", self.pending_next, PAGE_TURN_THRESHOLD);
        } else if at_start {
            self.pending_next = 0;
            self.pending_prev += 1;
            if self.pending_prev >= PAGE_TURN_THRESHOLD {
                self.pending_prev = 0;
                debug!("corner held for {} events, turning to previous page", PAGE_TURN_THRESHOLD);
                return Gesture::PagePrev;
            }
            debug!("top-left corner hit {}/{}", self.pending_prev, PAGE_TURN_THRESHOLD);
        } else {
            self.reset_pending();
        }
        Gesture::None
    }

    pub fn on_pointer_pressed(&mut self, button: PointerButton) {
        if button == PointerButton::Primary {
            self.drag_active = true;
        }
    }

    /// Absolute positioning: the pointer coordinate becomes the scroll position.
    pub fn on_pointer_moved(&mut self, x: f32, y: f32, viewport: &mut impl Viewport) -> Gesture {
        if !self.drag_active {
            return Gesture::None;
        }
        self.reset_pending();

        let before = viewport.scroll_bounds();
        viewport.set_scroll_position(to_pixel(y), to_pixel(x));
        let after = viewport.scroll_bounds();

        Gesture::Pan(ScrollDelta {
            vertical: after.vertical_value - before.vertical_value,
            horizontal: after.horizontal_value - before.horizontal_value,
        })
    }

    pub fn on_pointer_released(&mut self) {
        self.drag_active = false;
    }
}

fn to_pixel(coord: f32) -> i32 {
    // `as` saturates and maps NaN to 0
    coord.round() as i32
}
