use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};

use crate::gesture::{Gesture, GestureInterpreter, PointerButton, WheelInput, ZoomModifier};
use crate::scanner::SortOrder;
use crate::session::NavigationSession;
use crate::store::{DirectoryStore, ImageStore};
use crate::viewport::{ScrollViewport, Viewport};

/// Input delivered from the window layer, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    Wheel(WheelInput),
    PointerPressed { button: PointerButton, x: f32, y: f32 },
    PointerMoved { x: f32, y: f32 },
    PointerReleased,
    Resized { width: u32, height: u32 },
}

/// Everything the browser window shows, owned in one place.
///
/// The interpreter and viewport live as long as the window. A session is
/// created per opened directory.
pub struct BrowserState<S: ImageStore = DirectoryStore> {
    interpreter: GestureInterpreter,
    viewport: ScrollViewport,
    session: Option<NavigationSession<S>>,
    make_store: Box<dyn Fn() -> S>,
    directory: Option<PathBuf>,
    events_tx: Sender<ViewportEvent>,
    events_rx: Receiver<ViewportEvent>,
    pub status_message: Option<(String, bool)>,
}

impl BrowserState<DirectoryStore> {
    pub fn new(zoom_modifier: ZoomModifier, sort_order: SortOrder, width: u32, height: u32) -> Self {
        Self::with_store(zoom_modifier, width, height, move || DirectoryStore::new(sort_order))
    }
}

impl<S: ImageStore> BrowserState<S> {
    pub fn with_store<F>(zoom_modifier: ZoomModifier, width: u32, height: u32, make_store: F) -> Self
    where
        F: Fn() -> S + 'static,
    {
        let (events_tx, events_rx) = unbounded();
        Self {
            interpreter: GestureInterpreter::new(zoom_modifier),
            viewport: ScrollViewport::new(width, height),
            session: None,
            make_store: Box::new(make_store),
            directory: None,
            events_tx,
            events_rx,
            status_message: None,
        }
    }

    pub fn sender(&self) -> Sender<ViewportEvent> {
        self.events_tx.clone()
    }

    pub fn viewport(&self) -> &ScrollViewport {
        &self.viewport
    }

    pub fn interpreter(&self) -> &GestureInterpreter {
        &self.interpreter
    }

    pub fn session(&self) -> Option<&NavigationSession<S>> {
        self.session.as_ref()
    }

    pub fn set_status(&mut self, msg: String, is_error: bool) {
        self.status_message = Some((msg, is_error));
    }

    /// Replaces the session with one for `dir` and shows its first image.
    ///
    /// On error the previous directory stays open.
    pub fn open_directory(&mut self, dir: &Path) -> Result<usize> {
        let mut store = (self.make_store)();
        let count = store
            .load_images(dir)
            .with_context(|| format!("opening {}", dir.display()))?;
        info!("Opened {:?}: {} images", dir, count);

        let mut session = NavigationSession::new(store);
        self.viewport.clear();
        session.on_page_next(&mut self.viewport);
        self.session = Some(session);
        self.directory = Some(dir.to_path_buf());
        self.status_message = None;
        Ok(count)
    }

    /// Feeds one event through the interpreter and session. Returns true when
    /// the view needs repainting.
    pub fn handle_event(&mut self, event: ViewportEvent) -> bool {
        match event {
            ViewportEvent::Wheel(input) => {
                let before = self.viewport.scroll_bounds();
                let gesture = self.interpreter.on_wheel(input, &mut self.viewport);
                let moved = self.viewport.scroll_bounds() != before;
                self.apply(gesture) || moved
            },
            ViewportEvent::PointerPressed { button, x, y } => {
                debug!("pointer {:?} pressed at ({:.0}, {:.0})", button, x, y);
                self.interpreter.on_pointer_pressed(button);
                false
            },
            ViewportEvent::PointerMoved { x, y } => {
                let gesture = self.interpreter.on_pointer_moved(x, y, &mut self.viewport);
                self.apply(gesture)
            },
            ViewportEvent::PointerReleased => {
                self.interpreter.on_pointer_released();
                false
            },
            ViewportEvent::Resized { width, height } => {
                if self.viewport.visible_size() == (width, height) {
                    return false;
                }
                self.viewport.resize(width, height);
                true
            },
        }
    }

    fn apply(&mut self, gesture: Gesture) -> bool {
        match self.session.as_mut() {
            Some(session) => session.apply(gesture, &mut self.viewport),
            None => {
                if !matches!(gesture, Gesture::None | Gesture::Pan(_)) {
                    warn!("{:?} ignored, no directory open", gesture);
                }
                false
            },
        }
    }

    /// Drains queued events in arrival order.
    pub fn pump(&mut self) -> bool {
        let mut repaint = false;
        while let Ok(event) = self.events_rx.try_recv() {
            repaint |= self.handle_event(event);
        }
        repaint
    }

    /// `"<dir name> [i/n]"`, or the bare program name when nothing is open.
    pub fn title(&self) -> String {
        let (Some(dir), Some(session)) = (&self.directory, &self.session) else {
            return env!("CARGO_PKG_NAME").to_string();
        };
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string());
        let position = session.current_index().map_or(0, |i| i + 1);
        format!("{} [{}/{}]", name, position, session.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Modifiers;
    use image::{Rgba, RgbaImage};
    use std::fs;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) {
        RgbaImage::from_pixel(w, h, Rgba([10, 120, 200, 255])).save(dir.join(name)).unwrap();
    }

    /// Three 100x150 pages shown through a 100x100 window: 50px of vertical range.
    fn book() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in ["p1.png", "p2.png", "p10.png"] {
            write_png(dir.path(), name, 100, 150);
        }
        dir
    }

    fn browser() -> BrowserState {
        BrowserState::new(ZoomModifier::Ctrl, SortOrder::NameNatural, 100, 100)
    }

    fn wheel(magnitude: i32) -> ViewportEvent {
        ViewportEvent::Wheel(WheelInput::new(magnitude))
    }

    #[test]
    fn test_open_directory_shows_first_image() {
        let dir = book();
        let mut state = browser();
        assert_eq!(state.title(), "wheelpage");

        assert_eq!(state.open_directory(dir.path()).unwrap(), 3);
        assert_eq!(state.viewport().content_size(), (100, 150));
        let b = state.viewport().scroll_bounds();
        assert_eq!((b.vertical_value, b.horizontal_value), (0, 0));

        let dir_name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(state.title(), format!("{dir_name} [1/3]"));
    }

    #[test]
    fn test_pump_processes_events_in_arrival_order() {
        let dir = book();
        let mut state = browser();
        state.open_directory(dir.path()).unwrap();
        let tx = state.sender();

        // Five ticks to the corner, two more to turn
        for _ in 0..7 {
            tx.send(wheel(-10)).unwrap();
        }
        assert!(state.pump());
        assert_eq!(state.session().unwrap().current_index(), Some(1));

        // On to the third page, back out of its top-left into the second
        // page's end, then up that page to its top
        for _ in 0..7 {
            tx.send(wheel(-10)).unwrap();
        }
        for _ in 0..8 {
            tx.send(wheel(10)).unwrap();
        }
        state.pump();
        assert_eq!(state.session().unwrap().current_index(), Some(1));
        assert_eq!(state.viewport().scroll_bounds().vertical_value, 0);
        assert_eq!(state.interpreter().pending_prev(), 1);

        assert!(!state.pump());
    }

    #[test]
    fn test_held_button_zooms_then_release_pans() {
        let dir = book();
        let mut state = browser();
        state.open_directory(dir.path()).unwrap();
        let tx = state.sender();

        tx.send(ViewportEvent::PointerPressed { button: PointerButton::Primary, x: 0.0, y: 0.0 }).unwrap();
        tx.send(wheel(-10)).unwrap();
        tx.send(ViewportEvent::PointerReleased).unwrap();
        tx.send(wheel(-10)).unwrap();
        state.pump();

        assert_eq!(state.viewport().content_size(), (125, 188));
        let b = state.viewport().scroll_bounds();
        assert_eq!((b.vertical_value, b.horizontal_value), (10, 0));
        assert!(!state.interpreter().drag_active());
    }

    #[test]
    fn test_modifier_zoom_goes_through_session() {
        let dir = book();
        let mut state = browser();
        state.open_directory(dir.path()).unwrap();

        let ctrl = Modifiers { ctrl: true, ..Default::default() };
        assert!(state.handle_event(ViewportEvent::Wheel(WheelInput::new(10).with_modifiers(ctrl))));
        assert_eq!(state.viewport().content_size(), (80, 120));
        assert!((state.session().unwrap().zoom_factor() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_failed_open_keeps_previous_directory() {
        let dir = book();
        let mut state = browser();
        state.open_directory(dir.path()).unwrap();
        let title = state.title();

        let stray = dir.path().join("p1.png");
        let err = state.open_directory(&stray).unwrap_err();
        assert!(format!("{err:#}").contains("not a directory"));
        assert_eq!(state.title(), title);
        assert_eq!(state.viewport().content_size(), (100, 150));
    }

    #[test]
    fn test_empty_directory_clears_the_view() {
        let dir = book();
        let empty = tempfile::tempdir().unwrap();
        fs::write(empty.path().join("notes.txt"), b"nothing to see").unwrap();
        let mut state = browser();
        state.open_directory(dir.path()).unwrap();

        assert_eq!(state.open_directory(empty.path()).unwrap(), 0);
        assert!(state.viewport().bitmap().is_none());
        assert!(state.title().ends_with(" [0/0]"));
        assert!(!state.handle_event(wheel(-10)));
    }

    #[test]
    fn test_wheel_without_directory_is_harmless() {
        let mut state = browser();
        for _ in 0..5 {
            assert!(!state.handle_event(wheel(-10)));
        }
        assert!(state.session().is_none());
    }

    #[test]
    fn test_resize_refits_ranges() {
        let dir = book();
        let mut state = browser();
        state.open_directory(dir.path()).unwrap();

        assert!(!state.handle_event(ViewportEvent::Resized { width: 100, height: 100 }));
        assert!(state.handle_event(ViewportEvent::Resized { width: 60, height: 120 }));
        let b = state.viewport().scroll_bounds();
        assert_eq!((b.vertical_max, b.horizontal_max), (30, 40));
    }
}
