//! Track command - estimate gaze over a frame sequence.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use gaze_track_adapters::{FsFrameSource, SidecarLandmarks};
use gaze_track_core::{
    CalibrationConfig, FrameResult, FrameSource, GazeConfig, GazeSession, ProgressEvent,
    ProgressSink, PupilLocalizer, ResultOutput,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{AnnotationWriter, JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Hardcoded default values for thresholds.
mod defaults {
    pub const IRIS_TARGET: f64 = 0.48;
    pub const RIGHT_THRESHOLD: f64 = 0.35;
    pub const LEFT_THRESHOLD: f64 = 0.65;
    pub const BLINK_THRESHOLD: f64 = 3.8;
    pub const MIN_AREA_RATIO: f64 = 0.01;
    pub const MAX_AREA_RATIO: f64 = 0.85;
}

/// Parse and validate a ratio value (0.0-1.0).
fn parse_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse and validate a strictly positive value.
fn parse_positive(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{value} is not a positive number"))
    }
}

/// Shared arguments for gaze tracking.
#[derive(Args, Clone)]
pub struct TrackArgs {
    /// Frame files or directories, processed in sorted order
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Directory holding `<frame>.landmarks.json` sidecars (default: beside each frame)
    #[arg(long, value_name = "DIR")]
    pub landmarks_dir: Option<PathBuf>,

    /// Expected iris fraction of a trimmed eye region (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub iris_target: Option<f64>,

    /// Horizontal ratio at or below which the subject looks right (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub right_threshold: Option<f64>,

    /// Horizontal ratio at or above which the subject looks left (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub left_threshold: Option<f64>,

    /// Eye width/height ratio above which the eyes count as closed
    #[arg(long, value_parser = parse_positive)]
    pub blink_threshold: Option<f64>,

    /// Write frames annotated with pupil crosshairs into DIR
    #[arg(long, value_name = "DIR")]
    pub annotate: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl TrackArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        args.iris_target = args.iris_target.or(config.calibration.iris_target);
        args.right_threshold = args.right_threshold.or(config.gaze.right_threshold);
        args.left_threshold = args.left_threshold.or(config.gaze.left_threshold);
        args.blink_threshold = args.blink_threshold.or(config.gaze.blink_threshold);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        if args.landmarks_dir.is_none() {
            args.landmarks_dir.clone_from(&config.landmarks.dir);
        }
        if args.annotate.is_none() {
            args.annotate.clone_from(&config.output.annotate_dir);
        }

        // Pupil area window is config-only.
        args.config = Some(config.clone());

        args
    }

    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    fn calibration_config(&self) -> CalibrationConfig {
        CalibrationConfig {
            target_iris_size: self.iris_target.unwrap_or(defaults::IRIS_TARGET),
        }
    }

    fn gaze_config(&self) -> GazeConfig {
        GazeConfig {
            right_threshold: self.right_threshold.unwrap_or(defaults::RIGHT_THRESHOLD),
            left_threshold: self.left_threshold.unwrap_or(defaults::LEFT_THRESHOLD),
            blink_threshold: self.blink_threshold.unwrap_or(defaults::BLINK_THRESHOLD),
        }
    }

    fn localizer(&self) -> PupilLocalizer {
        let pupil = self.config.as_ref().map(|c| &c.pupil);
        PupilLocalizer::new(
            pupil
                .and_then(|p| p.min_area_ratio)
                .unwrap_or(defaults::MIN_AREA_RATIO),
            pupil
                .and_then(|p| p.max_area_ratio)
                .unwrap_or(defaults::MAX_AREA_RATIO),
        )
    }
}

/// Result of running the track command.
pub struct TrackResult {
    /// Number of frames processed.
    pub processed: usize,
    /// Number of frames skipped.
    pub skipped: usize,
    /// Number of frames in which both pupils were located.
    pub located: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the track command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &TrackArgs) -> Result<TrackResult> {
    info!("Running track command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsFrameSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout();
    let annotator = args
        .annotate
        .as_deref()
        .map(AnnotationWriter::new)
        .transpose()?;

    let mut session = build_session(args);

    process_frames(
        &source,
        &mut session,
        &output,
        &progress_bar,
        annotator.as_ref(),
        args,
    )
}

/// Build the gaze session from merged args (CLI + config).
fn build_session(args: &TrackArgs) -> GazeSession {
    let landmarks = SidecarLandmarks::new(args.landmarks_dir.clone());
    if let Some(dir) = &args.landmarks_dir {
        debug!("Reading landmark sidecars from {}", dir.display());
    }

    GazeSession::new(Box::new(landmarks.clone()), Box::new(landmarks))
        .with_calibration_config(args.calibration_config())
        .with_config(args.gaze_config())
        .with_localizer(args.localizer())
}

/// Feed every frame through one session so calibration carries across frames.
fn process_frames(
    source: &dyn FrameSource,
    session: &mut GazeSession,
    output: &JsonOutput,
    progress: &dyn ProgressSink,
    annotator: Option<&AnnotationWriter>,
    args: &TrackArgs,
) -> Result<TrackResult> {
    let total = source.count_hint();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut located = 0usize;
    let mut all_results: Vec<FrameResult> = Vec::new();

    for (index, frame_result) in source.frames().enumerate() {
        let frame = match frame_result {
            Ok(frame) => frame,
            Err(e) => {
                // Note: error message contains the path via anyhow context
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("frame {index}"),
                    reason: e.to_string(),
                });
                skipped += 1;
                continue;
            }
        };

        let path = frame.path.clone();
        let dimensions = frame.dimensions();

        progress.on_event(ProgressEvent::Started {
            path: path.clone(),
            index,
            total,
        });

        if let Err(e) = session.refresh(frame) {
            warn!("{e:#}");
        }

        if let Some(annotator) = annotator {
            if let Some(image) = session.annotated_frame() {
                if let Err(e) = annotator.write(&path, &image) {
                    warn!("{e:#}");
                }
            }
        }

        let result = FrameResult {
            path,
            timestamp: iso_timestamp(),
            dimensions,
            gaze: session.reading(),
        };

        if result.gaze.pupils_located {
            located += 1;
        }

        progress.on_event(ProgressEvent::Completed {
            result: result.clone(),
        });

        match args.format() {
            OutputFormat::Jsonl => {
                output.write(&result)?;
            }
            OutputFormat::Json => {
                all_results.push(result);
            }
        }

        processed += 1;
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_results, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    debug!(
        calibrated = session.calibration().is_complete(),
        "Sequence finished"
    );

    let exit_code = if processed > 0 && located == 0 {
        ExitCode::PupilsNotLocated
    } else {
        ExitCode::Success
    };

    Ok(TrackResult {
        processed,
        skipped,
        located,
        exit_code,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use gaze_track_core::{Frame, GazeStatus};
    use image::GrayImage;

    fn parse_args(paths: &[&str]) -> TrackArgs {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            track: TrackArgs,
        }

        let mut argv = vec!["gaze-track"];
        argv.extend_from_slice(paths);
        Wrapper::parse_from(argv).track
    }

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("0.4").unwrap(), 0.4);
        assert!(parse_ratio("1.2").unwrap_err().contains("0.0..=1.0"));
        assert!(parse_ratio("abc").unwrap_err().contains("not a valid number"));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("4.5").unwrap(), 4.5);
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("-1").is_err());
        assert!(parse_positive("inf").is_err());
    }

    #[test]
    fn test_defaults_without_config() {
        let args = TrackArgs::with_config(parse_args(&["frames"]), &AppConfig::default());

        assert_eq!(args.gaze_config(), GazeConfig::default());
        assert_eq!(args.calibration_config(), CalibrationConfig::default());
        assert_eq!(args.localizer(), PupilLocalizer::default());
        assert!(matches!(args.format(), OutputFormat::Jsonl));
        assert!(!args.recursive);
    }

    #[test]
    fn test_config_fills_unset_args() {
        let config: AppConfig = toml::from_str(
            r"
[general]
recursive = true

[gaze]
blink_threshold = 4.5
right_threshold = 0.3

[pupil]
max_area_ratio = 0.5

[output]
format = 'json'
annotate_dir = 'out'
",
        )
        .unwrap();

        let cli = parse_args(&["--right-threshold", "0.25", "frames"]);
        let args = TrackArgs::with_config(cli, &config);

        assert!(args.recursive);
        assert_eq!(args.gaze_config().right_threshold, 0.25);
        assert_eq!(args.gaze_config().blink_threshold, 4.5);
        assert_eq!(args.gaze_config().left_threshold, 0.65);
        assert_eq!(args.localizer().max_area_ratio, 0.5);
        assert!(matches!(args.format(), OutputFormat::Json));
        assert_eq!(args.annotate, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_exit_code_when_pupils_never_located() {
        use gaze_track_test_support::{MockFrameSource, MockProgressSink};

        let frames = vec![
            Frame::from_gray("a.png", GrayImage::new(32, 32)),
            Frame::from_gray("b.png", GrayImage::new(32, 32)),
        ];
        let source = MockFrameSource::new(frames);
        let sink = MockProgressSink::new();
        let mut session = build_session(&TrackArgs::with_config(
            parse_args(&["frames"]),
            &AppConfig::default(),
        ));
        let args = parse_args(&["frames"]);

        let result = process_frames(
            &source,
            &mut session,
            &JsonOutput::new(Box::new(std::io::sink())),
            &sink,
            None,
            &args,
        )
        .unwrap();

        assert_eq!(result.processed, 2);
        assert_eq!(result.located, 0);
        assert_eq!(result.exit_code, ExitCode::PupilsNotLocated);
        assert_eq!(sink.completed_count(), 2);
        assert_eq!(sink.finished_counts(), Some((2, 0)));

        let statuses: Vec<Option<GazeStatus>> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Completed { result } => Some(result.gaze.status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![None, None]);
    }

    #[test]
    fn test_empty_sequence_succeeds() {
        use gaze_track_test_support::{MockFrameSource, MockProgressSink};

        let mut session = build_session(&parse_args(&["frames"]));
        let result = process_frames(
            &MockFrameSource::empty(),
            &mut session,
            &JsonOutput::new(Box::new(std::io::sink())),
            &MockProgressSink::new(),
            None,
            &parse_args(&["frames"]),
        )
        .unwrap();

        assert_eq!(result.processed, 0);
        assert_eq!(result.exit_code, ExitCode::Success);
    }
}
