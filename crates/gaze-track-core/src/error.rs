use thiserror::Error;

use crate::domain::EyeSide;

/// Errors raised by the tracking core.
///
/// Conditions local to one frame (no face, no pupil) are not errors; they
/// surface as absent values on [`crate::GazeSession`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GazeError {
    #[error("no calibration samples recorded for the {side} eye")]
    InsufficientCalibrationData { side: EyeSide },

    #[error("eye region {width}x{height} is too small to trim a 5px border")]
    DegenerateEyeRegion { width: u32, height: u32 },

    #[error("expected {expected} landmarks, got {actual}")]
    InvalidLandmarkCount { expected: usize, actual: usize },

    #[error("invalid eye side index {0}, expected 0 (left) or 1 (right)")]
    InvalidSide(usize),
}

pub type Result<T> = std::result::Result<T, GazeError>;
