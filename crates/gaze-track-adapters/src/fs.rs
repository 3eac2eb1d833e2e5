//! Filesystem frame source.
//!
//! A recorded session is a directory of numbered captures. The paths given
//! on the command line are expanded once into a sorted list of raster files,
//! which both `count_hint` and `frames` then share.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use gaze_track_core::{Frame, FrameSource};
use tracing::{debug, trace, warn};

/// Extensions of frame images, lowercase.
const FRAME_EXTENSIONS: [&str; 8] = ["bmp", "gif", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

/// Frames read from image files, replayed in sorted path order.
pub struct FsFrameSource {
    roots: Vec<PathBuf>,
    recursive: bool,
    files: OnceLock<Vec<PathBuf>>,
}

impl FsFrameSource {
    /// Creates a source over `roots`, which may be files or directories.
    ///
    /// Directories are descended into only when `recursive` is set.
    #[must_use]
    pub const fn new(roots: Vec<PathBuf>, recursive: bool) -> Self {
        Self {
            roots,
            recursive,
            files: OnceLock::new(),
        }
    }

    /// Frame files in replay order. Scans the roots on first use.
    pub fn files(&self) -> &[PathBuf] {
        self.files.get_or_init(|| {
            let mut files = scan(&self.roots, self.recursive);
            files.sort();
            files.dedup();
            debug!(count = files.len(), "frame files found");
            files
        })
    }
}

impl FrameSource for FsFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = Result<Frame>> + Send + '_> {
        Box::new(self.files().iter().map(|path| load_frame(path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.files().len())
    }
}

/// Expands roots into frame files. Missing paths and unreadable directories
/// are logged and skipped.
fn scan(roots: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = Vec::new();

    for root in roots {
        if root.is_dir() {
            pending.push(root.clone());
        } else if !root.exists() {
            warn!("Path does not exist: {}", root.display());
        } else if is_frame_file(root) {
            files.push(root.clone());
        } else {
            warn!("Not a frame image: {}", root.display());
        }
    }

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                continue;
            }
        };

        for path in entries.filter_map(|entry| entry.ok().map(|e| e.path())) {
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if is_frame_file(&path) {
                files.push(path);
            } else {
                trace!("Ignoring {}", path.display());
            }
        }
    }

    files
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Decodes one frame and converts it to grayscale.
fn load_frame(path: &Path) -> Result<Frame> {
    let image =
        image::open(path).with_context(|| format!("Failed to open frame: {}", path.display()))?;
    Ok(Frame::new(path.to_string_lossy(), &image))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_extensions() {
        assert!(is_frame_file(Path::new("frame_001.jpg")));
        assert!(is_frame_file(Path::new("frame.JPEG")));
        assert!(is_frame_file(Path::new("frame.png")));
        assert!(is_frame_file(Path::new("frame.Tif")));
        assert!(!is_frame_file(Path::new("frame.landmarks.json")));
        assert!(!is_frame_file(Path::new("frame.cr2")));
        assert!(!is_frame_file(Path::new("frame")));
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let source = FsFrameSource::new(vec![PathBuf::from("/nonexistent/frames")], true);
        assert_eq!(source.count_hint(), Some(0));
        assert!(source.frames().next().is_none());
    }

    #[test]
    fn test_files_deduplicated_across_roots() {
        let dir = tempfile::tempdir().unwrap();
        let frame = dir.path().join("frame_001.png");
        std::fs::write(&frame, b"not decoded here").unwrap();

        let source = FsFrameSource::new(vec![frame.clone(), dir.path().to_path_buf()], false);

        assert_eq!(source.files(), [frame]);
    }

    #[test]
    fn test_subdirectories_need_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("take_2");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("frame_001.png"), b"").unwrap();

        let flat = FsFrameSource::new(vec![dir.path().to_path_buf()], false);
        let deep = FsFrameSource::new(vec![dir.path().to_path_buf()], true);

        assert!(flat.files().is_empty());
        assert_eq!(deep.files().len(), 1);
    }
}
