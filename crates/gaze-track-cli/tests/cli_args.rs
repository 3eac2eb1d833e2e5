//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::PathBuf;

use assert_cmd::Command;
use gaze_track_test_support::SyntheticFaceBuilder;
use predicates::prelude::*;
use tempfile::TempDir;

/// A directory holding one face frame without landmarks.
fn frame_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame_001.png");
    SyntheticFaceBuilder::new()
        .build()
        .to_image()
        .save(&path)
        .unwrap();
    (dir, path)
}

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_nonexistent_path_warns_but_continues() {
    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("/nonexistent/path/to/frame.png");

    cmd.assert()
        .code(0)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_directory() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg(temp_dir.path());

    cmd.assert().code(0).stdout(predicate::str::is_empty());
}

#[test]
fn test_track_subcommand() {
    let (_dir, path) = frame_dir();

    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("track").arg(&path);

    // No sidecar, so no face and no pupils.
    cmd.assert().code(1);
}

// === Format Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let (_dir, path) = frame_dir();

    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("--format").arg("xml").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("jsonl")));
}

#[test]
fn test_valid_formats_accepted() {
    let (_dir, path) = frame_dir();

    for format in ["json", "jsonl"] {
        let mut cmd = Command::cargo_bin("gaze-track").unwrap();
        cmd.arg("--format").arg(format).arg(&path);
        cmd.assert().code(predicate::in_iter([0, 1]));
    }
}

// === Threshold Validation Tests ===

#[test]
fn test_ratio_threshold_above_one_rejected() {
    let (_dir, path) = frame_dir();

    for flag in ["--iris-target", "--right-threshold", "--left-threshold"] {
        let mut cmd = Command::cargo_bin("gaze-track").unwrap();
        cmd.arg(flag).arg("1.5").arg(&path);

        cmd.assert()
            .code(2)
            .stderr(predicate::str::contains("1.5 is not in 0.0..=1.0"));
    }
}

#[test]
fn test_ratio_threshold_non_numeric_rejected() {
    let (_dir, path) = frame_dir();

    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("--right-threshold").arg("abc").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number"));
}

#[test]
fn test_blink_threshold_must_be_positive() {
    let (_dir, path) = frame_dir();

    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("--blink-threshold").arg("0").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a positive number"));
}

#[test]
fn test_blink_threshold_above_one_accepted() {
    let (_dir, path) = frame_dir();

    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("--blink-threshold").arg("5.5").arg(&path);

    cmd.assert().code(1);
}

// === Help and Version ===

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("--help");

    cmd.assert().success().stdout(
        predicate::str::contains("--blink-threshold")
            .and(predicate::str::contains("--landmarks-dir"))
            .and(predicate::str::contains("--annotate")),
    );
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("gaze-track").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("gaze-track"));
}
