use image::RgbaImage;

/// Snapshot of both scroll axes, read fresh from the viewport for every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollBounds {
    pub vertical_min: i32,
    pub vertical_max: i32,
    pub vertical_value: i32,
    pub horizontal_min: i32,
    pub horizontal_max: i32,
    pub horizontal_value: i32,
}

impl ScrollBounds {
    pub fn vertical_at_max(&self) -> bool {
        self.vertical_value >= self.vertical_max
    }

    pub fn vertical_at_min(&self) -> bool {
        self.vertical_value <= self.vertical_min
    }

    pub fn horizontal_at_max(&self) -> bool {
        self.horizontal_value >= self.horizontal_max
    }

    pub fn horizontal_at_min(&self) -> bool {
        self.horizontal_value <= self.horizontal_min
    }

    /// Both axes at their maximum.
    pub fn at_bottom_right(&self) -> bool {
        self.vertical_at_max() && self.horizontal_at_max()
    }

    /// Both axes at their minimum.
    pub fn at_top_left(&self) -> bool {
        self.vertical_at_min() && self.horizontal_at_min()
    }
}

/// The scrollable surface the gesture core reads and the session writes.
pub trait Viewport {
    fn scroll_bounds(&self) -> ScrollBounds;
    /// Moves both axes; values outside the current range are clamped.
    fn set_scroll_position(&mut self, vertical: i32, horizontal: i32);
    fn set_bitmap(&mut self, image: RgbaImage);
    /// Changes the visible area in pixels.
    fn resize(&mut self, width: u32, height: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollBar {
    minimum: i32,
    maximum: i32,
    value: i32,
}

impl ScrollBar {
    pub fn minimum(&self) -> i32 {
        self.minimum
    }

    pub fn maximum(&self) -> i32 {
        self.maximum
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn set_range(&mut self, minimum: i32, maximum: i32) {
        self.minimum = minimum;
        self.maximum = maximum.max(minimum);
        self.value = self.value.clamp(self.minimum, self.maximum);
    }

    pub fn set_value(&mut self, value: i32) {
        self.value = value.clamp(self.minimum, self.maximum);
    }

    /// Range for content of `content` pixels shown through `visible` pixels.
    fn fit(&mut self, content: u32, visible: u32) {
        let overflow = i64::from(content) - i64::from(visible);
        let max = overflow.clamp(0, i64::from(i32::MAX)) as i32;
        self.set_range(0, max);
    }
}

/// Viewport backed by two scroll bars and the bitmap currently on display.
///
/// The scroll range of each axis is the amount by which the bitmap overflows
/// the visible area, so an image smaller than the area has an empty range.
#[derive(Debug, Default)]
pub struct ScrollViewport {
    vertical: ScrollBar,
    horizontal: ScrollBar,
    visible: (u32, u32),
    bitmap: Option<RgbaImage>,
    // Bumped on every set_bitmap so renderers know when to re-upload
    generation: u64,
}

impl ScrollViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { visible: (width, height), ..Default::default() }
    }

    pub fn vertical(&self) -> &ScrollBar {
        &self.vertical
    }

    pub fn horizontal(&self) -> &ScrollBar {
        &self.horizontal
    }

    pub fn visible_size(&self) -> (u32, u32) {
        self.visible
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pixel size of the displayed bitmap, (0, 0) when nothing is shown.
    pub fn content_size(&self) -> (u32, u32) {
        self.bitmap.as_ref().map(|b| b.dimensions()).unwrap_or((0, 0))
    }

    /// Drops the bitmap and returns both axes to an empty range.
    pub fn clear(&mut self) {
        self.bitmap = None;
        self.generation += 1;
        self.refit();
    }

    fn refit(&mut self) {
        let (content_w, content_h) = self.content_size();
        self.horizontal.fit(content_w, self.visible.0);
        self.vertical.fit(content_h, self.visible.1);
    }
}

impl Viewport for ScrollViewport {
    fn scroll_bounds(&self) -> ScrollBounds {
        ScrollBounds {
            vertical_min: self.vertical.minimum(),
            vertical_max: self.vertical.maximum(),
            vertical_value: self.vertical.value(),
            horizontal_min: self.horizontal.minimum(),
            horizontal_max: self.horizontal.maximum(),
            horizontal_value: self.horizontal.value(),
        }
    }

    fn set_scroll_position(&mut self, vertical: i32, horizontal: i32) {
        self.vertical.set_value(vertical);
        self.horizontal.set_value(horizontal);
    }

    fn set_bitmap(&mut self, image: RgbaImage) {
        self.bitmap = Some(image);
        self.generation += 1;
        self.refit();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.visible = (width, height);
        self.refit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_follow_bitmap_overflow() {
        let mut vp = ScrollViewport::new(100, 50);
        assert_eq!(vp.scroll_bounds(), ScrollBounds::default());

        vp.set_bitmap(RgbaImage::new(300, 80));
        let b = vp.scroll_bounds();
        assert_eq!((b.horizontal_min, b.horizontal_max), (0, 200));
        assert_eq!((b.vertical_min, b.vertical_max), (0, 30));
        assert_eq!(vp.generation(), 1);

        // Smaller than the visible area: empty range
        vp.set_bitmap(RgbaImage::new(10, 10));
        let b = vp.scroll_bounds();
        assert_eq!(b.horizontal_max, 0);
        assert_eq!(b.vertical_max, 0);
        assert!(b.at_top_left() && b.at_bottom_right());
    }

    #[test]
    fn test_values_are_clamped() {
        let mut vp = ScrollViewport::new(100, 100);
        vp.set_bitmap(RgbaImage::new(200, 400));

        vp.set_scroll_position(1000, -5);
        let b = vp.scroll_bounds();
        assert_eq!(b.vertical_value, 300);
        assert_eq!(b.horizontal_value, 0);

        // Shrinking the content pulls the value back inside the range
        vp.set_bitmap(RgbaImage::new(200, 150));
        assert_eq!(vp.scroll_bounds().vertical_value, 50);

        // Growing the visible area does too
        vp.resize(100, 150);
        assert_eq!(vp.scroll_bounds().vertical_value, 0);
    }

    #[test]
    fn test_clear_empties_ranges() {
        let mut vp = ScrollViewport::new(100, 100);
        vp.set_bitmap(RgbaImage::new(300, 300));
        vp.set_scroll_position(150, 150);

        vp.clear();
        assert!(vp.bitmap().is_none());
        assert_eq!(vp.generation(), 2);
        assert_eq!(vp.scroll_bounds(), ScrollBounds::default());
    }

    #[test]
    fn test_scroll_bar_range_never_inverts() {
        let mut bar = ScrollBar::default();
        bar.set_range(10, 5);
        assert_eq!(bar.minimum(), 10);
        assert_eq!(bar.maximum(), 10);
        bar.set_value(0);
        assert_eq!(bar.value(), 10);
    }
}
