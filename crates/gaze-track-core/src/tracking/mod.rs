//! Gaze tracking pipeline.
//!
//! Leaf to root: threshold calibration, pupil localization, eye isolation,
//! and the per-frame session that ties them to the face/landmark ports.

mod calibration;
mod eye;
mod pupil;
mod session;

pub use calibration::{
    iris_size, Calibration, CalibrationConfig, CALIBRATION_FRAMES, IRIS_TRIM,
    THRESHOLD_CANDIDATES,
};
pub use eye::{Eye, EyeFrame, EYE_MARGIN};
pub use pupil::{image_processing, Pupil, PupilLocalizer};
pub use session::{EyePair, GazeConfig, GazeSession};
