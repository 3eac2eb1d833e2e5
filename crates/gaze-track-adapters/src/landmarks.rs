//! Landmark sidecar adapter.
//!
//! Stands in for a face detector and a landmark predictor by reading the
//! faces of each frame from a JSON file recorded next to it:
//!
//! ```json
//! {"faces": [{"region": {"x": 10, "y": 5, "width": 140, "height": 70},
//!             "points": [[25, 40], [38, 28], ...]}]}
//! ```
//!
//! `region` is optional and defaults to the bounding box of the points.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use gaze_track_core::{FaceDetector, FaceRegion, Frame, LandmarkPredictor, LandmarkSet, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Suffix replacing a frame's extension to form its sidecar file name.
pub const SIDECAR_SUFFIX: &str = ".landmarks.json";

/// Contents of one sidecar file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidecarFile {
    #[serde(default)]
    pub faces: Vec<SidecarFace>,
}

/// One face of a sidecar file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarFace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<FaceRegion>,
    pub points: Vec<[i32; 2]>,
}

impl SidecarFace {
    /// Builds a sidecar entry from a landmark set, with an explicit region.
    #[must_use]
    pub fn new(region: Option<FaceRegion>, landmarks: &LandmarkSet) -> Self {
        Self {
            region,
            points: landmarks.points().iter().map(|p| [p.x, p.y]).collect(),
        }
    }

    fn landmarks(&self) -> Result<LandmarkSet> {
        let points = self.points.iter().map(|&[x, y]| Point::new(x, y)).collect();
        Ok(LandmarkSet::new(points)?)
    }

    fn region(&self) -> Option<FaceRegion> {
        self.region.or_else(|| {
            let points: Vec<Point> = self.points.iter().map(|&[x, y]| Point::new(x, y)).collect();
            FaceRegion::enclosing(&points)
        })
    }
}

/// Returns the sidecar path for a frame, inside `dir` when given.
#[must_use]
pub fn sidecar_path(frame_path: &Path, dir: Option<&Path>) -> PathBuf {
    let stem = frame_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}{SIDECAR_SUFFIX}");

    match dir {
        Some(dir) => dir.join(name),
        None => frame_path.with_file_name(name),
    }
}

/// Face detector and landmark predictor backed by sidecar JSON files.
#[derive(Debug, Clone, Default)]
pub struct SidecarLandmarks {
    dir: Option<PathBuf>,
}

impl SidecarLandmarks {
    /// Reads sidecars from `dir`, or from beside each frame when `None`.
    #[must_use]
    pub const fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Loads the sidecar for `frame`. A missing file means no faces.
    fn load(&self, frame: &Frame) -> Result<SidecarFile> {
        let path = sidecar_path(Path::new(&frame.path), self.dir.as_deref());
        if !path.exists() {
            trace!("No landmark sidecar at {}", path.display());
            return Ok(SidecarFile::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read landmarks: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse landmarks: {}", path.display()))
    }
}

impl FaceDetector for SidecarLandmarks {
    fn detect(&self, frame: &Frame) -> Result<Vec<FaceRegion>> {
        let sidecar = self.load(frame)?;
        let regions: Vec<_> = sidecar.faces.iter().filter_map(SidecarFace::region).collect();
        debug!(path = %frame.path, faces = regions.len(), "sidecar faces");
        Ok(regions)
    }
}

impl LandmarkPredictor for SidecarLandmarks {
    fn predict(&self, frame: &Frame, face: &FaceRegion) -> Result<LandmarkSet> {
        let sidecar = self.load(frame)?;
        let entry = sidecar
            .faces
            .iter()
            .find(|f| f.region().as_ref() == Some(face))
            .ok_or_else(|| anyhow!("No landmarks recorded for face {face:?} in {}", frame.path))?;

        entry
            .landmarks()
            .with_context(|| format!("Invalid landmarks for {}", frame.path))
    }
}
