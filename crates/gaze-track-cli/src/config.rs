//! Configuration file support for gaze-track.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/gaze-track/config.toml` (lowest priority)
//! - Project-local: `.gaze-track.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

const PROJECT_FILE: &str = ".gaze-track.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Threshold calibration settings.
    pub calibration: CalibrationConfig,
    /// Gaze direction and blink decision settings.
    pub gaze: GazeConfig,
    /// Pupil contour filter settings.
    pub pupil: PupilConfig,
    /// Landmark sidecar settings.
    pub landmarks: LandmarksConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Threshold calibration configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Target iris fraction of the trimmed eye region (0.0-1.0).
    pub iris_target: Option<f64>,
}

/// Gaze decision configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Horizontal ratio at or below which the subject looks right.
    pub right_threshold: Option<f64>,
    /// Horizontal ratio at or above which the subject looks left.
    pub left_threshold: Option<f64>,
    /// Blink ratio above which the eyes are closed.
    pub blink_threshold: Option<f64>,
}

/// Pupil detection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PupilConfig {
    /// Smallest iris blob as a fraction of the eye region.
    pub min_area_ratio: Option<f64>,
    /// Largest iris blob as a fraction of the eye region.
    pub max_area_ratio: Option<f64>,
}

/// Landmark sidecar configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LandmarksConfig {
    /// Directory holding `<frame>.landmarks.json` files, instead of beside each frame.
    pub dir: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Write annotated frames into this directory.
    pub annotate_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/gaze-track/config.toml`
    /// 2. Project-local: `.gaze-track.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        let unit_ranged = [
            ("calibration.iris_target", self.calibration.iris_target),
            ("gaze.right_threshold", self.gaze.right_threshold),
            ("gaze.left_threshold", self.gaze.left_threshold),
            ("pupil.min_area_ratio", self.pupil.min_area_ratio),
            ("pupil.max_area_ratio", self.pupil.max_area_ratio),
        ];
        for (key, value) in unit_ranged {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(format!("{key} must be 0.0-1.0, got {v}"));
                }
            }
        }

        if let Some(t) = self.gaze.blink_threshold {
            if t <= 0.0 {
                return Err(format!("gaze.blink_threshold must be positive, got {t}"));
            }
        }

        if let (Some(right), Some(left)) = (self.gaze.right_threshold, self.gaze.left_threshold) {
            if right >= left {
                return Err(format!(
                    "gaze.right_threshold ({right}) must be below gaze.left_threshold ({left})"
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.pupil.min_area_ratio, self.pupil.max_area_ratio) {
            if min > max {
                return Err(format!(
                    "pupil.min_area_ratio ({min}) must not exceed pupil.max_area_ratio ({max})"
                ));
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.calibration.iris_target = other
            .calibration
            .iris_target
            .or(self.calibration.iris_target);

        self.gaze.right_threshold = other.gaze.right_threshold.or(self.gaze.right_threshold);
        self.gaze.left_threshold = other.gaze.left_threshold.or(self.gaze.left_threshold);
        self.gaze.blink_threshold = other.gaze.blink_threshold.or(self.gaze.blink_threshold);

        self.pupil.min_area_ratio = other.pupil.min_area_ratio.or(self.pupil.min_area_ratio);
        self.pupil.max_area_ratio = other.pupil.max_area_ratio.or(self.pupil.max_area_ratio);

        self.landmarks.dir = other.landmarks.dir.or_else(|| self.landmarks.dir.take());

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.annotate_dir = other
            .output
            .annotate_dir
            .or_else(|| self.output.annotate_dir.take());
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gaze-track").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.gaze-track.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
