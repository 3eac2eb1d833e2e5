//! Test support utilities for gaze-track.
//!
//! Provides mocks of the core ports and a synthetic face builder for testing
//! the tracking pipeline without a camera or a landmark model.
//!
//! # Example
//!
//! ```
//! use gaze_track_test_support::{MockFaceDetector, MockLandmarkPredictor, SyntheticFaceBuilder};
//!
//! // A face looking to the subject's right, and ports that report it
//! let face = SyntheticFaceBuilder::new().looking(-16, 0).build();
//! let detector = MockFaceDetector::new(vec![face.region]);
//! let predictor = MockLandmarkPredictor::new(face.landmarks.clone());
//! ```

mod builders;
mod mocks;

pub use builders::{SyntheticFace, SyntheticFaceBuilder};
pub use mocks::{
    MockFaceDetector, MockFrameSource, MockLandmarkPredictor, MockProgressSink, MockResultOutput,
};
