use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use image::{DynamicImage, ImageResult, RgbaImage};
use tracing::{info, warn};

/// A diagnostic image write running on its own thread.
///
/// Dropping this detaches the writer; nothing in the audit path ever waits
/// on it.
pub struct PendingWrite {
    pub path: PathBuf,
    handle: JoinHandle<()>,
}

impl PendingWrite {
    /// Block until the write has finished (or failed and been logged).
    pub fn wait(self) {
        if self.handle.join().is_err() {
            warn!("image writer for {} panicked", self.path.display());
        }
    }
}

/// `<UTC timestamp>_<suffix>.png`, e.g. `20261016-142501-123_inaccessible_elements.png`.
pub fn timestamped_filename(suffix: &str) -> String {
    format!("{}_{}.png", Utc::now().format("%Y%m%d-%H%M%S-%3f"), suffix)
}

/// Write `img` as PNG under `dir` without blocking the caller.
///
/// Errors are logged and swallowed.
pub fn persist_async(img: RgbaImage, dir: &Path, suffix: &str) -> PendingWrite {
    let path = dir.join(timestamped_filename(suffix));
    let target = path.clone();

    let handle = thread::spawn(move || match save_png(img, &target) {
        Ok(()) => info!("saved diagnostic image to {}", target.display()),
        Err(e) => warn!("failed to save diagnostic image {}: {}", target.display(), e),
    });

    PendingWrite { path, handle }
}

fn save_png(img: RgbaImage, path: &Path) -> ImageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    DynamicImage::ImageRgba8(img).save(path)
}
