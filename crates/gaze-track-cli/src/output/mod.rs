//! Output formatting for CLI.

mod annotate;
mod json;
mod progress;

pub use annotate::AnnotationWriter;
pub use json::JsonOutput;
pub use progress::ProgressBar;
