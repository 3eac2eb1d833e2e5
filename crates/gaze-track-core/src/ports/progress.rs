//! Progress reporting port for UI integration.

use crate::domain::FrameResult;

/// Events emitted while processing a frame sequence.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Processing started for a frame.
    Started {
        /// Path to the frame.
        path: String,
        /// Index in the sequence (0-based).
        index: usize,
        /// Total frames in the sequence, if known.
        total: Option<usize>,
    },
    /// Processing completed for a frame.
    Completed {
        /// The frame result.
        result: FrameResult,
    },
    /// A frame was skipped due to an error.
    Skipped {
        /// Path to the frame.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All frames have been processed.
    Finished {
        /// Total frames processed successfully.
        processed: usize,
        /// Total frames skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
