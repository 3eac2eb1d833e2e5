//! CLI command definitions and handlers.

pub mod track;

use clap::{Parser, Subcommand};

/// Gaze Track - Estimate gaze direction and blinks from webcam frames
#[derive(Parser)]
#[command(name = "gaze-track")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared track arguments (paths, thresholds, flags).
    #[command(flatten)]
    pub track: track::TrackArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Track gaze across a sequence of frames
    Track(track::TrackArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Frames processed and pupils located in at least one of them.
    Success = 0,
    /// Frames processed but pupils were never located.
    PupilsNotLocated = 1,
    /// Invalid input or an unrecoverable failure.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
