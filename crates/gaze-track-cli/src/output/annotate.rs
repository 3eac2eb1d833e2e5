//! Annotated frame writer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use tracing::debug;

/// Saves annotated frames as PNGs named after the source frame.
pub struct AnnotationWriter {
    dir: PathBuf,
}

impl AnnotationWriter {
    /// Creates the writer, creating `dir` if needed.
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create annotation dir: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Writes `image` as `<dir>/<frame stem>.png` and returns the path.
    pub fn write(&self, frame_path: &str, image: &RgbImage) -> Result<PathBuf> {
        let stem = Path::new(frame_path)
            .file_stem()
            .map_or_else(|| String::from("frame"), |s| s.to_string_lossy().into_owned());
        let path = self.dir.join(format!("{stem}.png"));

        image
            .save(&path)
            .with_context(|| format!("Failed to write annotated frame: {}", path.display()))?;
        debug!("Wrote annotated frame {}", path.display());
        Ok(path)
    }
}
