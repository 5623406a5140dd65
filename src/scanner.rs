use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use log::debug;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::store::StoreError;

pub const IMAGE_EXTS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "tga", "ico",
    "pnm", "pbm", "pgm", "ppm", "qoi", "exr", "hdr", "ff",
];

/// Order in which a directory's images are paged through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    Name,
    NameDesc,
    #[default]
    NameNatural,
    NameNaturalDesc,
    Date,
    DateDesc,
    Size,
    SizeDesc,
    Random,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

pub fn is_image_ext(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn lower_name(entry: &FileEntry) -> String {
    entry.path.file_name().map(|s| s.to_string_lossy().to_lowercase()).unwrap_or_default()
}

pub fn sort_files(files: &mut [FileEntry], sort_order: SortOrder) {
    use rand::seq::SliceRandom;
    match sort_order {
        SortOrder::Name => files.sort_by_key(lower_name),
        SortOrder::NameDesc => files.sort_by(|a, b| lower_name(b).cmp(&lower_name(a))),
        SortOrder::NameNatural => files.sort_by(|a, b| natord::compare(&lower_name(a), &lower_name(b))),
        SortOrder::NameNaturalDesc => files.sort_by(|a, b| natord::compare(&lower_name(b), &lower_name(a))),
        SortOrder::Date => files.sort_by(|a, b| a.modified.cmp(&b.modified)),
        SortOrder::DateDesc => files.sort_by(|a, b| b.modified.cmp(&a.modified)),
        SortOrder::Size => files.sort_by(|a, b| a.size.cmp(&b.size)),
        SortOrder::SizeDesc => files.sort_by(|a, b| b.size.cmp(&a.size)),
        SortOrder::Random => {
            let mut rng = rand::rng();
            files.shuffle(&mut rng);
        },
    }
}

/// Lists the images directly inside `dir`, ordered by `sort_order`.
pub fn scan_directory(dir: &Path, sort_order: SortOrder) -> Result<Vec<FileEntry>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image_ext(entry.path()) {
            continue;
        }
        // Unreadable metadata only affects date/size ordering
        let (size, modified) = match entry.metadata() {
            Ok(m) => (m.len(), m.modified().unwrap_or(UNIX_EPOCH)),
            Err(_) => (0, UNIX_EPOCH),
        };
        files.push(FileEntry { path: entry.into_path(), size, modified });
    }

    sort_files(&mut files, sort_order);
    debug!("scanned {:?}: {} images", dir, files.len());
    Ok(files)
}
