use log::{debug, info, warn};

use crate::gesture::Gesture;
use crate::store::{ImageFile, ImageStore};
use crate::viewport::Viewport;

pub const ZOOM_IN_FACTOR: f64 = 1.25;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

/// Turns page and zoom gestures into store calls and viewport updates.
///
/// One session exists per open directory. Nothing here fails: a missing
/// neighbour or an undecodable image leaves the view as it was.
#[derive(Debug)]
pub struct NavigationSession<S: ImageStore> {
    store: S,
    zoom_factor: f64,
}

impl<S: ImageStore> NavigationSession<S> {
    pub fn new(store: S) -> Self {
        Self { store, zoom_factor: 1.0 }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_index(&self) -> Option<usize> {
        self.store.current_index()
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Returns true when the viewport changed.
    pub fn apply(&mut self, gesture: Gesture, viewport: &mut impl Viewport) -> bool {
        match gesture {
            Gesture::PageNext => self.on_page_next(viewport),
            Gesture::PagePrev => self.on_page_prev(viewport),
            Gesture::ZoomIn => self.on_zoom_in(viewport),
            Gesture::ZoomOut => self.on_zoom_out(viewport),
            Gesture::Pan(delta) => delta.vertical != 0 || delta.horizontal != 0,
            Gesture::None => false,
        }
    }

    /// Shows the next image from the top-left corner.
    pub fn on_page_next(&mut self, viewport: &mut impl Viewport) -> bool {
        if !self.store.has_next() {
            debug!("no next image");
            return false;
        }
        let image = self.store.next();
        self.display(image, viewport);
        let b = viewport.scroll_bounds();
        viewport.set_scroll_position(b.vertical_min, b.horizontal_min);
        true
    }

    /// Shows the previous image from the bottom-right corner, so reading
    /// backwards continues where that image ends.
    pub fn on_page_prev(&mut self, viewport: &mut impl Viewport) -> bool {
        if !self.store.has_prev() {
            debug!("no previous image");
            return false;
        }
        let image = self.store.prev();
        self.display(image, viewport);
        let b = viewport.scroll_bounds();
        viewport.set_scroll_position(b.vertical_max, b.horizontal_max);
        true
    }

    pub fn on_zoom_in(&mut self, viewport: &mut impl Viewport) -> bool {
        self.zoom(ZOOM_IN_FACTOR, viewport)
    }

    pub fn on_zoom_out(&mut self, viewport: &mut impl Viewport) -> bool {
        self.zoom(ZOOM_OUT_FACTOR, viewport)
    }

    fn zoom(&mut self, factor: f64, viewport: &mut impl Viewport) -> bool {
        self.zoom_factor *= factor;
        let image = self.store.zoom(factor);
        self.display(image, viewport)
    }

    /// Draws `image` unless it is missing or failed to decode.
    pub fn display(&self, image: Option<ImageFile>, viewport: &mut impl Viewport) -> bool {
        let Some(file) = image else {
            return false;
        };
        let Some(bitmap) = file.image else {
            warn!("Unable to display {:?}", file.path);
            return false;
        };
        info!("Displaying {}/{} {:?}", file.index + 1, self.store.count(), file.path);
        viewport.set_bitmap(bitmap);
        true
    }
}
