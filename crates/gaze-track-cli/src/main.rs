//! Gaze Track CLI - Gaze direction and blink estimation over webcam frames.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::track::{self, TrackArgs};
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = match cli.command {
        Some(Commands::Track(args)) => args,
        None => {
            // Default behavior: track with flattened args
            if cli.track.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            cli.track
        }
    };

    let args = TrackArgs::with_config(args, &AppConfig::load());
    let exit_code = match track::run(&args) {
        Ok(result) => {
            tracing::info!(
                processed = result.processed,
                skipped = result.skipped,
                located = result.located,
                "Tracking finished"
            );
            result.exit_code
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    };

    exit_code.into()
}
