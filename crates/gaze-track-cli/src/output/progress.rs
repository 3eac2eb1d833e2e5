//! Terminal progress reporting.
//!
//! On a terminal (or with `--progress`) an indicatif bar tracks the sequence.
//! Otherwise every frame gets one status line on stderr, the way a live demo
//! would caption each captured frame.

use gaze_track_core::{FrameResult, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

enum Mode {
    Quiet,
    Lines,
    Bar(IndicatifBar),
}

/// Progress sink for the CLI.
pub struct ProgressBar {
    mode: Mode,
}

impl ProgressBar {
    /// `total` sizes the bar when known. `quiet` silences everything,
    /// including skip warnings; `show_bar` picks the bar over status lines.
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        let mode = if quiet {
            Mode::Quiet
        } else if show_bar {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("#>-"));
            }
            Mode::Bar(bar)
        } else {
            Mode::Lines
        };

        Self { mode }
    }
}

/// One-line caption for a processed frame.
fn status_line(result: &FrameResult) -> String {
    let gaze = &result.gaze;
    let caption = match gaze.status {
        Some(status) => status.label(),
        None if !gaze.face_detected => "no face",
        None => "pupils not located",
    };
    format!("{}: {caption}", result.path)
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        match (&self.mode, event) {
            (Mode::Quiet, _) => {}
            (Mode::Bar(bar), ProgressEvent::Started { path, index, total }) => {
                if let Some(total) = total {
                    bar.set_length(total as u64);
                }
                bar.set_position(index as u64);
                bar.set_message(path);
            }
            (Mode::Bar(bar), ProgressEvent::Completed { .. }) => bar.inc(1),
            (Mode::Lines, ProgressEvent::Completed { result }) => {
                eprintln!("{}", status_line(&result));
            }
            (mode, ProgressEvent::Skipped { path, reason }) => {
                if let Mode::Bar(bar) = mode {
                    bar.inc(1);
                }
                eprintln!("WARN: Skipping {path}: {reason}");
            }
            (Mode::Bar(bar), ProgressEvent::Finished { processed, skipped }) => {
                bar.finish_with_message(format!("Done: {processed} processed, {skipped} skipped"));
            }
            (Mode::Lines, ProgressEvent::Started { .. } | ProgressEvent::Finished { .. }) => {}
        }
    }
}
