//! Face detector port.

use crate::domain::{FaceRegion, Frame};

/// Port for detecting faces in a grayscale frame.
pub trait FaceDetector: Send + Sync {
    /// Returns the face regions found in the frame, possibly none.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector itself fails. Finding no face is not an error.
    fn detect(&self, frame: &Frame) -> anyhow::Result<Vec<FaceRegion>>;
}
