//! Core domain types for gaze tracking.

mod frame;
mod landmarks;
mod result;

pub use frame::{Frame, FrameDimensions};
pub use landmarks::{EyeSide, FaceRegion, LandmarkSet, Point};
pub use result::{FrameResult, GazeReading, GazeStatus};
