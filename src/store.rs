use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use fast_image_resize::images::Image as FastImage;
use fast_image_resize::{PixelType, ResizeOptions, Resizer};
use image::RgbaImage;
use log::{debug, warn};
use thiserror::Error;

use crate::scanner::{self, FileEntry, SortOrder};

/// Largest side a rescaled image may have.
pub const MAX_IMAGE_SIDE: u32 = 8192;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not a directory: {0:?}")]
    NotADirectory(PathBuf),
    #[error("failed to list directory: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Error)]
enum DecodeError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// An image handed out by a store. `image` is `None` when decoding failed.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub path: PathBuf,
    pub index: usize,
    pub image: Option<RgbaImage>,
}

/// Ordered collection of images with a cursor and a zoom scale.
///
/// The cursor starts before the first image, so the first `next()` yields
/// image 0. `next`/`prev`/`zoom` return `None` when there is nothing to show.
pub trait ImageStore {
    fn load_images(&mut self, dir: &Path) -> Result<usize, StoreError>;
    fn has_next(&self) -> bool;
    fn has_prev(&self) -> bool;
    fn next(&mut self) -> Option<ImageFile>;
    fn prev(&mut self) -> Option<ImageFile>;
    /// Multiplies the accumulated scale and returns the current image at it.
    fn zoom(&mut self, factor: f64) -> Option<ImageFile>;
    fn current_index(&self) -> Option<usize>;
    fn count(&self) -> usize;
}

/// Images of one directory, decoded on demand.
#[derive(Debug)]
pub struct DirectoryStore {
    sort_order: SortOrder,
    files: Vec<FileEntry>,
    position: Option<usize>,
    scale: f64,
    // Full-size decode of the current image; rescales start from here
    original: Option<RgbaImage>,
}

impl Default for DirectoryStore {
    fn default() -> Self {
        Self::new(SortOrder::default())
    }
}

impl DirectoryStore {
    pub fn new(sort_order: SortOrder) -> Self {
        Self { sort_order, files: Vec::new(), position: None, scale: 1.0, original: None }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.position.and_then(|i| self.files.get(i)).map(|f| f.path.as_path())
    }

    fn move_to(&mut self, index: usize) -> ImageFile {
        self.position = Some(index);
        let path = self.files[index].path.clone();
        self.original = match decode_image(&path) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("Unable to decode {:?}: {}", path, e);
                None
            }
        };
        self.current_file()
    }

    fn current_file(&self) -> ImageFile {
        let index = self.position.unwrap_or(0);
        ImageFile {
            path: self.files.get(index).map(|f| f.path.clone()).unwrap_or_default(),
            index,
            image: self.original.as_ref().and_then(|img| rescale(img, self.scale)),
        }
    }
}

impl ImageStore for DirectoryStore {
    fn load_images(&mut self, dir: &Path) -> Result<usize, StoreError> {
        let files = scanner::scan_directory(dir, self.sort_order)?;
        self.files = files;
        self.position = None;
        self.scale = 1.0;
        self.original = None;
        Ok(self.files.len())
    }

    fn has_next(&self) -> bool {
        match self.position {
            Some(i) => i + 1 < self.files.len(),
            None => !self.files.is_empty(),
        }
    }

    fn has_prev(&self) -> bool {
        matches!(self.position, Some(i) if i > 0)
    }

    fn next(&mut self) -> Option<ImageFile> {
        if !self.has_next() {
            return None;
        }
        let index = self.position.map_or(0, |i| i + 1);
        Some(self.move_to(index))
    }

    fn prev(&mut self) -> Option<ImageFile> {
        let index = self.position.filter(|&i| i > 0)? - 1;
        Some(self.move_to(index))
    }

    fn zoom(&mut self, factor: f64) -> Option<ImageFile> {
        self.scale *= factor;
        debug!("zoom x{} -> scale {:.4}", factor, self.scale);
        self.position?;
        Some(self.current_file())
    }

    fn current_index(&self) -> Option<usize> {
        self.position
    }

    fn count(&self) -> usize {
        self.files.len()
    }
}

fn decode_image(path: &Path) -> Result<RgbaImage, DecodeError> {
    let bytes = fs::read(path)?;

    // Guess from magic bytes; if that fails fall back to a fresh reader
    let mut reader = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .unwrap_or_else(|_| image::ImageReader::new(Cursor::new(&bytes)));

    // Extension fallback for formats without magic (TGA)
    if reader.format().is_none() {
        if let Ok(fmt) = image::ImageFormat::from_path(path) {
            reader.set_format(fmt);
        }
    }

    Ok(reader.decode()?.to_rgba8())
}

/// Pixel size of a `width` x `height` image drawn at `scale`.
///
/// Each side is at least 1 pixel; the longer side is capped at
/// [`MAX_IMAGE_SIDE`] keeping the aspect ratio.
pub fn scaled_size(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let mut w = (f64::from(width) * scale).round().max(1.0);
    let mut h = (f64::from(height) * scale).round().max(1.0);
    let longest = w.max(h);
    let cap = f64::from(MAX_IMAGE_SIDE);
    if longest > cap {
        let k = cap / longest;
        w = (w * k).round().max(1.0);
        h = (h * k).round().max(1.0);
    }
    (w as u32, h as u32)
}

fn rescale(original: &RgbaImage, scale: f64) -> Option<RgbaImage> {
    let (w, h) = original.dimensions();
    let (new_w, new_h) = scaled_size(w, h, scale);
    if (new_w, new_h) == (w, h) {
        return Some(original.clone());
    }

    let src = match FastImage::from_vec_u8(w, h, original.as_raw().clone(), PixelType::U8x4) {
        Ok(img) => img,
        Err(e) => {
            warn!("Cannot wrap {}x{} image for resize: {}", w, h, e);
            return None;
        }
    };
    let mut dst = FastImage::new(new_w, new_h, PixelType::U8x4);

    let mut resizer = Resizer::new();
    if let Err(e) = resizer.resize(&src, &mut dst, &ResizeOptions::default()) {
        warn!("Resize {}x{} -> {}x{} failed: {}", w, h, new_w, new_h, e);
        return None;
    }
    RgbaImage::from_raw(new_w, new_h, dst.buffer().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) {
        RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255])).save(dir.join(name)).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "01.png", 40, 20);
        write_png(dir.path(), "02.png", 8, 8);
        fs::write(dir.path().join("03.png"), b"definitely not a png").unwrap();
        dir
    }

    #[test]
    fn test_cursor_walks_the_directory() {
        let dir = fixture();
        let mut store = DirectoryStore::default();
        assert_eq!(store.load_images(dir.path()).unwrap(), 3);

        assert!(store.has_next());
        assert!(!store.has_prev());
        assert_eq!(store.current_index(), None);
        assert!(store.prev().is_none());

        let first = store.next().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.image.as_ref().map(|i| i.dimensions()), Some((40, 20)));
        assert!(!store.has_prev());

        store.next().unwrap();
        let broken = store.next().unwrap();
        assert_eq!(broken.index, 2);
        assert!(broken.image.is_none());
        assert!(broken.path.ends_with("03.png"));

        // End of the collection leaves the cursor alone
        assert!(!store.has_next());
        assert!(store.next().is_none());
        assert_eq!(store.current_index(), Some(2));

        let back = store.prev().unwrap();
        assert_eq!(back.index, 1);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_zoom_rescales_and_persists_across_pages() {
        let dir = fixture();
        let mut store = DirectoryStore::default();
        store.load_images(dir.path()).unwrap();

        // Nothing current yet: scale still accumulates
        assert!(store.zoom(1.25).is_none());
        assert!((store.scale() - 1.25).abs() < 1e-9);

        let first = store.next().unwrap();
        assert_eq!(first.image.unwrap().dimensions(), (50, 25));

        let out = store.zoom(0.8).unwrap();
        assert_eq!(out.image.unwrap().dimensions(), (40, 20));
        assert!((store.scale() - 1.0).abs() < 1e-9);

        store.zoom(2.0);
        let second = store.next().unwrap();
        assert_eq!(second.image.unwrap().dimensions(), (16, 16));
    }

    #[test]
    fn test_zoom_on_broken_image_stays_invalid() {
        let dir = fixture();
        let mut store = DirectoryStore::default();
        store.load_images(dir.path()).unwrap();
        for _ in 0..3 {
            store.next();
        }
        let zoomed = store.zoom(1.25).unwrap();
        assert!(zoomed.image.is_none());
    }

    #[test]
    fn test_reload_resets_cursor_and_scale() {
        let dir = fixture();
        let mut store = DirectoryStore::default();
        store.load_images(dir.path()).unwrap();
        store.next();
        store.zoom(1.25);

        let other = tempfile::tempdir().unwrap();
        assert_eq!(store.load_images(other.path()).unwrap(), 0);
        assert_eq!(store.current_index(), None);
        assert!(!store.has_next());
        assert!((store.scale() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_size_limits() {
        assert_eq!(scaled_size(40, 20, 1.25), (50, 25));
        assert_eq!(scaled_size(3, 3, 0.01), (1, 1));
        assert_eq!(scaled_size(1000, 500, 100.0), (8192, 4096));
        assert_eq!(scaled_size(10, 10, 1.25 * 0.8), (10, 10));
    }
}
