//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the tracking core and the
//! external collaborators: frame acquisition, face detection, landmark
//! prediction, result output and progress reporting.

mod face_detector;
mod frame_source;
mod landmark_predictor;
mod progress;
mod result_output;

pub use face_detector::FaceDetector;
pub use frame_source::FrameSource;
pub use landmark_predictor::LandmarkPredictor;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
