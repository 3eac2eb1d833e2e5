//! Gaze Track Adapters - External adapters for gaze-track.
//!
//! This crate provides adapters for:
//! - Filesystem frame source (a recorded frame sequence on disk)
//! - Landmark sidecar files standing in for the face detector and
//!   landmark predictor

pub mod fs;
pub mod landmarks;

pub use fs::FsFrameSource;
pub use landmarks::{sidecar_path, SidecarLandmarks, SIDECAR_SUFFIX};
