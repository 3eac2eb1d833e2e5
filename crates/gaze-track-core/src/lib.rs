//! Gaze Track Core - Domain logic for webcam gaze estimation
//!
//! This crate contains the domain types, port traits for the external
//! collaborators (frame source, face detector, landmark predictor, output)
//! and the tracking pipeline itself:
//!
//! - [`Calibration`] searches the binarization threshold that isolates the iris
//! - [`PupilLocalizer`] binarizes an eye region and finds the iris blob centroid
//! - [`Eye`] isolates one eye from a frame using its six landmarks
//! - [`GazeSession`] drives all of the above frame by frame and derives
//!   gaze ratios, direction and blink state

pub mod domain;
mod error;
pub mod ports;
pub mod tracking;

pub use domain::{
    EyeSide, FaceRegion, Frame, FrameDimensions, FrameResult, GazeReading, GazeStatus,
    LandmarkSet, Point,
};
pub use error::{GazeError, Result};
pub use ports::{
    FaceDetector, FrameSource, LandmarkPredictor, ProgressEvent, ProgressSink, ResultOutput,
};
pub use tracking::{
    image_processing, iris_size, Calibration, CalibrationConfig, Eye, EyeFrame, EyePair,
    GazeConfig, GazeSession, Pupil, PupilLocalizer, CALIBRATION_FRAMES, IRIS_TRIM,
    THRESHOLD_CANDIDATES,
};
