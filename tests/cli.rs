//! Command-line interface tests.
//!
//! These run the built `stillframe` binary. The success case needs an
//! `ffmpeg` binary on `PATH` and is skipped without one.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn stillframe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stillframe"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run stillframe")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .is_ok_and(|output| output.status.success())
}

// ── usage errors ───────────────────────────────────────────────────

#[test]
fn no_flags_exits_one() {
    let output = stillframe(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("all flags must be provided"),
        "unexpected stderr: {}",
        stderr(&output)
    );
}

#[test]
fn missing_subtitle_flag_exits_one() {
    let output = stillframe(&["--video", "movie.mkv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("all flags must be provided"));
}

#[test]
fn completions_exit_zero() {
    let output = stillframe(&["--completions", "bash"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("stillframe"));
}

// ── render errors ──────────────────────────────────────────────────

#[test]
fn missing_subtitle_file_exits_one() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = directory.path().join("still.png");
    let subtitle_path = directory.path().join("missing.vtt");

    let output = stillframe(&[
        "--video",
        "movie.mkv",
        "--subtitle",
        subtitle_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("error:"), "unexpected stderr: {message}");
    assert!(message.contains("missing.vtt"), "unexpected stderr: {message}");
    assert!(!output_path.exists());
}

#[test]
fn existing_output_without_overwrite_exits_one() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = directory.path().join("still.png");
    fs::write(&output_path, b"keep me").unwrap();

    let output = stillframe(&[
        "--video",
        "movie.mkv",
        "--subtitle",
        "movie.vtt",
        "--output",
        output_path.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--overwrite"));
    assert_eq!(fs::read(&output_path).unwrap(), b"keep me");
}

// ── success ────────────────────────────────────────────────────────

fn generate_video(path: &Path) {
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-f", "lavfi", "-i"])
        .arg("testsrc=duration=10:size=320x240:rate=10")
        .args(["-c:v", "mpeg4", "-y"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "failed to generate test video");
}

#[test]
fn successful_render_exits_zero() {
    if !ffmpeg_available() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video_path = directory.path().join("testsrc.mp4");
    let subtitle_path = directory.path().join("testsrc.vtt");
    let output_path = directory.path().join("still.png");
    generate_video(&video_path);
    fs::write(
        &subtitle_path,
        "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\n\n00:00:05.000 --> 00:00:07.000\nWorld\n",
    )
    .unwrap();

    let output = stillframe(&[
        "--video",
        video_path.to_str().unwrap(),
        "--subtitle",
        subtitle_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
        "--seed",
        "1",
    ]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("success: Rendered frame to"), "stdout: {stdout}");
    assert!(stdout.contains(output_path.to_str().unwrap()));
    assert!(output_path.exists());
}

#[test]
fn json_output_reports_cue() {
    if !ffmpeg_available() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video_path = directory.path().join("testsrc.mp4");
    let subtitle_path = directory.path().join("testsrc.srt");
    let output_path = directory.path().join("still.png");
    generate_video(&video_path);
    fs::write(&subtitle_path, "1\n00:00:02,000 --> 00:00:04,000\nOnly line\n").unwrap();

    let output = stillframe(&[
        "--video",
        video_path.to_str().unwrap(),
        "--subtitle",
        subtitle_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
        "--json",
    ]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(payload["text"], "Only line");
    assert_eq!(payload["timestamp"], "00:00:02.00");
    assert_eq!(payload["path"], output_path.to_str().unwrap());
}
