//! Frame-by-frame gaze session.

use anyhow::Context;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use tracing::{debug, trace};

use super::calibration::{Calibration, CalibrationConfig};
use super::eye::Eye;
use super::pupil::PupilLocalizer;
use crate::domain::{EyeSide, Frame, GazeReading, GazeStatus, Point};
use crate::ports::{FaceDetector, LandmarkPredictor};

/// Half-length of the crosshair drawn on each pupil.
const CROSSHAIR: f32 = 5.0;

/// Decision thresholds applied to gaze and blink ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeConfig {
    /// Horizontal ratio at or below which the subject looks right.
    pub right_threshold: f64,
    /// Horizontal ratio at or above which the subject looks left.
    pub left_threshold: f64,
    /// Average blink ratio above which the eyes count as closed.
    pub blink_threshold: f64,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            right_threshold: 0.35,
            left_threshold: 0.65,
            blink_threshold: 3.8,
        }
    }
}

impl GazeConfig {
    #[must_use]
    pub fn is_right(&self, horizontal_ratio: f64) -> bool {
        horizontal_ratio <= self.right_threshold
    }

    #[must_use]
    pub fn is_left(&self, horizontal_ratio: f64) -> bool {
        horizontal_ratio >= self.left_threshold
    }

    #[must_use]
    pub fn is_blinking(&self, blinking_ratio: f64) -> bool {
        blinking_ratio > self.blink_threshold
    }
}

/// Both eyes of the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EyePair {
    pub left: Eye,
    pub right: Eye,
}

impl EyePair {
    /// True when both eyes have a pupil.
    #[must_use]
    pub const fn pupils_located(&self) -> bool {
        self.left.pupil.is_some() && self.right.pupil.is_some()
    }

    #[must_use]
    pub const fn get(&self, side: EyeSide) -> &Eye {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    /// Mean of both eyes' horizontal ratios.
    #[must_use]
    pub fn horizontal_ratio(&self) -> Option<f64> {
        Some(mean(self.left.horizontal_ratio()?, self.right.horizontal_ratio()?))
    }

    /// Mean of both eyes' vertical ratios.
    #[must_use]
    pub fn vertical_ratio(&self) -> Option<f64> {
        Some(mean(self.left.vertical_ratio()?, self.right.vertical_ratio()?))
    }

    /// Mean of both eyes' blink ratios.
    #[must_use]
    pub fn blinking_ratio(&self) -> f64 {
        mean(self.left.blinking, self.right.blinking)
    }
}

fn mean(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

/// Tracks gaze across a sequence of frames.
///
/// Owns the threshold calibration for its whole lifetime; every
/// [`refresh`](Self::refresh) replaces the frame and both eyes. Every derived
/// value is `None` unless both pupils were located in the current frame.
pub struct GazeSession {
    detector: Box<dyn FaceDetector>,
    predictor: Box<dyn LandmarkPredictor>,
    calibration: Calibration,
    localizer: PupilLocalizer,
    config: GazeConfig,
    frame: Option<Frame>,
    eyes: Option<EyePair>,
}

impl GazeSession {
    /// Creates a session with default thresholds.
    #[must_use]
    pub fn new(detector: Box<dyn FaceDetector>, predictor: Box<dyn LandmarkPredictor>) -> Self {
        Self {
            detector,
            predictor,
            calibration: Calibration::default(),
            localizer: PupilLocalizer::default(),
            config: GazeConfig::default(),
            frame: None,
            eyes: None,
        }
    }

    #[must_use]
    pub const fn with_config(mut self, config: GazeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the calibration, discarding any samples collected so far.
    #[must_use]
    pub fn with_calibration_config(mut self, config: CalibrationConfig) -> Self {
        self.calibration = Calibration::new(config);
        self
    }

    #[must_use]
    pub const fn with_localizer(mut self, localizer: PupilLocalizer) -> Self {
        self.localizer = localizer;
        self
    }

    /// Analyzes a new frame, replacing all per-frame state.
    ///
    /// Only the first detected face is used. When there is none both eyes are
    /// absent until the next refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the face detector or landmark predictor fails. The
    /// eyes are absent afterwards but the session remains usable.
    pub fn refresh(&mut self, frame: Frame) -> anyhow::Result<()> {
        self.eyes = None;
        let frame = &*self.frame.insert(frame);

        let faces = self
            .detector
            .detect(frame)
            .with_context(|| format!("face detection failed for {}", frame.path))?;
        let Some(face) = faces.first() else {
            debug!(path = %frame.path, "no face detected");
            return Ok(());
        };
        trace!(faces = faces.len(), ?face, "using first face");

        let landmarks = self
            .predictor
            .predict(frame, face)
            .with_context(|| format!("landmark prediction failed for {}", frame.path))?;

        let [left, right] = EyeSide::BOTH.map(|side| {
            Eye::build(
                &frame.image,
                &landmarks,
                side,
                &mut self.calibration,
                &self.localizer,
            )
        });
        self.eyes = Some(EyePair { left, right });
        Ok(())
    }

    /// The most recently refreshed frame.
    #[must_use]
    pub const fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Both eyes, when a face was found in the current frame.
    #[must_use]
    pub const fn eyes(&self) -> Option<&EyePair> {
        self.eyes.as_ref()
    }

    #[must_use]
    pub fn left_eye(&self) -> Option<&Eye> {
        self.eyes.as_ref().map(|eyes| &eyes.left)
    }

    #[must_use]
    pub fn right_eye(&self) -> Option<&Eye> {
        self.eyes.as_ref().map(|eyes| &eyes.right)
    }

    #[must_use]
    pub const fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    #[must_use]
    pub const fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// True when a face was found and both of its pupils were located.
    #[must_use]
    pub fn pupils_located(&self) -> bool {
        self.located().is_some()
    }

    fn located(&self) -> Option<&EyePair> {
        self.eyes.as_ref().filter(|eyes| eyes.pupils_located())
    }

    /// Left pupil in frame coordinates.
    #[must_use]
    pub fn left_pupil_coords(&self) -> Option<Point> {
        self.located()?.left.pupil_coords()
    }

    /// Right pupil in frame coordinates.
    #[must_use]
    pub fn right_pupil_coords(&self) -> Option<Point> {
        self.located()?.right.pupil_coords()
    }

    /// 0.0 extreme right, 0.5 center, 1.0 extreme left.
    #[must_use]
    pub fn horizontal_ratio(&self) -> Option<f64> {
        self.located()?.horizontal_ratio()
    }

    /// 0.0 extreme top, 0.5 center, 1.0 extreme bottom.
    #[must_use]
    pub fn vertical_ratio(&self) -> Option<f64> {
        self.located()?.vertical_ratio()
    }

    #[must_use]
    pub fn is_looking_right(&self) -> Option<bool> {
        self.horizontal_ratio()
            .map(|ratio| self.config.is_right(ratio))
    }

    #[must_use]
    pub fn is_looking_left(&self) -> Option<bool> {
        self.horizontal_ratio()
            .map(|ratio| self.config.is_left(ratio))
    }

    /// Neither right nor left.
    #[must_use]
    pub fn is_looking_center(&self) -> Option<bool> {
        Some(!self.is_looking_right()? && !self.is_looking_left()?)
    }

    #[must_use]
    pub fn is_blinking(&self) -> Option<bool> {
        let eyes = self.located()?;
        Some(self.config.is_blinking(eyes.blinking_ratio()))
    }

    /// Summary of the current frame: blinking first, then direction.
    #[must_use]
    pub fn status(&self) -> Option<GazeStatus> {
        if self.is_blinking()? {
            Some(GazeStatus::Blinking)
        } else if self.is_looking_right()? {
            Some(GazeStatus::Right)
        } else if self.is_looking_left()? {
            Some(GazeStatus::Left)
        } else {
            Some(GazeStatus::Center)
        }
    }

    /// Everything a consumer reads after a refresh, as one value.
    #[must_use]
    pub fn reading(&self) -> GazeReading {
        GazeReading {
            face_detected: self.eyes.is_some(),
            pupils_located: self.pupils_located(),
            calibrated: self.calibration.is_complete(),
            left_pupil: self.left_pupil_coords(),
            right_pupil: self.right_pupil_coords(),
            horizontal_ratio: self.horizontal_ratio(),
            vertical_ratio: self.vertical_ratio(),
            blinking: self.is_blinking(),
            status: self.status(),
        }
    }

    /// The current frame in color with a green crosshair on each located pupil.
    #[must_use]
    pub fn annotated_frame(&self) -> Option<RgbImage> {
        let frame = self.frame.as_ref()?;
        let mut canvas = DynamicImage::ImageLuma8(frame.image.clone()).to_rgb8();

        let pupils = [self.left_pupil_coords(), self.right_pupil_coords()];
        for pupil in pupils.into_iter().flatten() {
            draw_crosshair(&mut canvas, pupil);
        }
        Some(canvas)
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_crosshair(canvas: &mut RgbImage, at: Point) {
    let color = Rgb([0, 255, 0]);
    let (x, y) = (at.x as f32, at.y as f32);
    draw_line_segment_mut(canvas, (x - CROSSHAIR, y), (x + CROSSHAIR, y), color);
    draw_line_segment_mut(canvas, (x, y - CROSSHAIR), (x, y + CROSSHAIR), color);
}
