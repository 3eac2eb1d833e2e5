//! Binarization threshold calibration.
//!
//! For the first frames of a session each eye region is binarized at every
//! candidate threshold and the one whose dark-pixel fraction is closest to
//! the expected iris size is recorded. Once both eyes hold
//! [`CALIBRATION_FRAMES`] samples the mean of each side is used from then on.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use image::{imageops, GrayImage};
use tracing::{debug, info, trace};

use super::pupil::image_processing;
use crate::domain::EyeSide;
use crate::error::{GazeError, Result};

/// Samples collected per eye before calibration is complete.
pub const CALIBRATION_FRAMES: usize = 20;

/// Border trimmed from every side of an eye region before measuring the iris.
pub const IRIS_TRIM: u32 = 5;

/// Thresholds tried during calibration: 5 to 95 in steps of 5.
pub const THRESHOLD_CANDIDATES: [u8; 19] = [
    5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95,
];

/// Calibration parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Expected fraction of a trimmed, open, centered eye region covered by the iris.
    pub target_iris_size: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            target_iris_size: 0.48,
        }
    }
}

/// Per-side threshold samples, accumulated then frozen.
#[derive(Debug, Clone, Default)]
pub struct Calibration {
    config: CalibrationConfig,
    left: Vec<u8>,
    right: Vec<u8>,
}

impl Calibration {
    /// Creates an empty calibration.
    #[must_use]
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            left: Vec::with_capacity(CALIBRATION_FRAMES),
            right: Vec::with_capacity(CALIBRATION_FRAMES),
        }
    }

    /// Returns the calibration parameters.
    #[must_use]
    pub const fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// True once both sides hold all of their samples. Never reverts.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.left.len() >= CALIBRATION_FRAMES && self.right.len() >= CALIBRATION_FRAMES
    }

    /// Thresholds recorded so far for one side, oldest first.
    #[must_use]
    pub fn samples(&self, side: EyeSide) -> &[u8] {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    /// Mean of the recorded thresholds for one side, truncated.
    ///
    /// # Errors
    ///
    /// Returns [`GazeError::InsufficientCalibrationData`] when nothing has been
    /// recorded for `side` yet.
    pub fn threshold(&self, side: EyeSide) -> Result<u8> {
        let samples = self.samples(side);
        if samples.is_empty() {
            return Err(GazeError::InsufficientCalibrationData { side });
        }
        let sum: usize = samples.iter().map(|&t| usize::from(t)).sum();
        Ok((sum / samples.len()) as u8)
    }

    /// Appends a threshold sample for one side.
    ///
    /// Returns `false` without recording once the side already holds
    /// [`CALIBRATION_FRAMES`] samples.
    pub fn record(&mut self, side: EyeSide, threshold: u8) -> bool {
        let samples = match side {
            EyeSide::Left => &mut self.left,
            EyeSide::Right => &mut self.right,
        };
        if samples.len() >= CALIBRATION_FRAMES {
            return false;
        }
        samples.push(threshold);
        true
    }

    /// Finds the candidate threshold whose iris size is closest to the target.
    ///
    /// Ties go to the lowest threshold.
    ///
    /// # Errors
    ///
    /// Returns [`GazeError::DegenerateEyeRegion`] when the region is too small
    /// to trim, which leaves every candidate unusable.
    pub fn best_threshold(&self, eye_frame: &GrayImage) -> Result<u8> {
        let (width, height) = eye_frame.dimensions();
        let target = self.config.target_iris_size;

        let mut best: Option<(u8, f64)> = None;
        for threshold in THRESHOLD_CANDIDATES {
            let binary = image_processing(eye_frame, threshold);
            let Some(size) = iris_size(&binary) else {
                continue;
            };
            let distance = (size - target).abs();
            trace!(threshold, size, "calibration candidate");

            let closer = match best {
                Some((_, best_distance)) => distance < best_distance,
                None => true,
            };
            if closer {
                best = Some((threshold, distance));
            }
        }

        best.map(|(threshold, _)| threshold)
            .ok_or(GazeError::DegenerateEyeRegion { width, height })
    }

    /// Computes the best threshold for `eye_frame` and records it for `side`.
    ///
    /// Returns the threshold found for this frame, whether or not there was
    /// still room to record it.
    ///
    /// # Errors
    ///
    /// Returns [`GazeError::DegenerateEyeRegion`] when no threshold could be evaluated.
    pub fn evaluate(&mut self, eye_frame: &GrayImage, side: EyeSide) -> Result<u8> {
        let threshold = self.best_threshold(eye_frame)?;
        let was_complete = self.is_complete();

        if self.record(side, threshold) {
            debug!(
                %side,
                threshold,
                samples = self.samples(side).len(),
                "recorded calibration sample"
            );
        }

        if !was_complete && self.is_complete() {
            info!(
                left = self.threshold(EyeSide::Left).ok(),
                right = self.threshold(EyeSide::Right).ok(),
                "threshold calibration complete"
            );
        }

        Ok(threshold)
    }
}

/// Fraction of black pixels in a binary eye region, ignoring a
/// [`IRIS_TRIM`]-pixel border.
///
/// Returns `None` when the region is too small for the trim to leave anything.
#[must_use]
pub fn iris_size(binary: &GrayImage) -> Option<f64> {
    let (width, height) = binary.dimensions();
    if width <= 2 * IRIS_TRIM || height <= 2 * IRIS_TRIM {
        return None;
    }

    let inner = imageops::crop_imm(
        binary,
        IRIS_TRIM,
        IRIS_TRIM,
        width - 2 * IRIS_TRIM,
        height - 2 * IRIS_TRIM,
    )
    .to_image();
    let total = u64::from(inner.width()) * u64::from(inner.height());
    let blacks = inner.pixels().filter(|p| p.0[0] == 0).count();

    Some(blacks as f64 / total as f64)
}
