//! Per-frame gaze results.

use serde::{Deserialize, Serialize};

use super::{FrameDimensions, Point};

/// Complete result for a single processed frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameResult {
    /// Path to the frame.
    pub path: String,
    /// Timestamp of processing (ISO 8601).
    pub timestamp: String,
    /// Frame dimensions.
    pub dimensions: FrameDimensions,
    /// Gaze estimate for the frame.
    pub gaze: GazeReading,
}

/// Snapshot of everything a consumer reads from a session after one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeReading {
    /// A face (and therefore both eyes) was found.
    pub face_detected: bool,
    /// Both pupils were located.
    pub pupils_located: bool,
    /// The threshold calibration has collected all of its samples.
    pub calibrated: bool,
    /// Left pupil in frame coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_pupil: Option<Point>,
    /// Right pupil in frame coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_pupil: Option<Point>,
    /// 0.0 extreme right, 0.5 center, 1.0 extreme left.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_ratio: Option<f64>,
    /// 0.0 extreme top, 0.5 center, 1.0 extreme bottom.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_ratio: Option<f64>,
    /// Whether the eyes are closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blinking: Option<bool>,
    /// Single summary label for the frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GazeStatus>,
}

/// What the subject is doing, in display precedence order.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeStatus {
    /// Eyes closed.
    Blinking,
    /// Looking towards the right.
    Right,
    /// Looking towards the left.
    Left,
    /// Looking at the center.
    Center,
}

impl GazeStatus {
    /// Human-readable description.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blinking => "Eyes are blinking",
            Self::Right => "Eyes are looking towards right",
            Self::Left => "Eyes are looking towards left",
            Self::Center => "Eyes are looking at the center",
        }
    }
}
