//! Landmark predictor port.

use crate::domain::{FaceRegion, Frame, LandmarkSet};

/// Port for predicting the 68 facial landmarks of a detected face.
pub trait LandmarkPredictor: Send + Sync {
    /// Predicts landmarks for the face inside `face`.
    ///
    /// # Errors
    ///
    /// Returns an error if prediction fails.
    fn predict(&self, frame: &Frame, face: &FaceRegion) -> anyhow::Result<LandmarkSet>;
}
