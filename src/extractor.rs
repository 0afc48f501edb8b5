//! Frame extraction backends.
//!
//! [`FrameExtractor`] is the seam between the caption pipeline and whatever
//! decodes video. The pipeline hands it a seek string and a destination
//! path it owns; the extractor writes exactly one still image there.
//!
//! [`FfmpegExtractor`] shells out to the `ffmpeg` binary. With the `native`
//! feature, [`NativeExtractor`](crate::NativeExtractor) decodes in-process
//! through `ffmpeg-next` instead.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::StillframeError;

/// How often a running decoder is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A backend that writes a single video frame to an image file.
pub trait FrameExtractor: Send + Sync {
    /// Decode the frame at `seek` (`HH:MM:SS.ff`) from `video_path` and save
    /// it at `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`StillframeError::ExtractionFailed`] if the frame cannot be
    /// produced.
    fn extract_frame(
        &self,
        video_path: &Path,
        seek: &str,
        destination: &Path,
    ) -> Result<(), StillframeError>;
}

impl<E: FrameExtractor + ?Sized> FrameExtractor for Box<E> {
    fn extract_frame(
        &self,
        video_path: &Path,
        seek: &str,
        destination: &Path,
    ) -> Result<(), StillframeError> {
        (**self).extract_frame(video_path, seek, destination)
    }
}

/// Extracts frames by running the `ffmpeg` command-line tool.
///
/// Runs `ffmpeg -ss <seek> -i <video> -frames:v 1 -q:v <quality> -y <dest>`
/// and kills the process if it outlives the timeout.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use stillframe::FfmpegExtractor;
///
/// let extractor = FfmpegExtractor::new()
///     .with_binary("/usr/local/bin/ffmpeg")
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(extractor.timeout(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct FfmpegExtractor {
    binary: PathBuf,
    timeout: Duration,
    quality: u8,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegExtractor {
    /// Use `ffmpeg` from `PATH`, a 60 second timeout and JPEG quality 2.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            timeout: Duration::from_secs(60),
            quality: 2,
        }
    }

    /// Run a specific `ffmpeg` executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Kill the decoder if it has not finished after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `-q:v` quality scale (2 is best, 31 worst).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(2, 31);
        self
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, video_path: &Path, seek: &str, destination: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-hide_banner")
            .args(["-loglevel", "error"])
            .args(["-ss", seek])
            .arg("-i")
            .arg(video_path)
            .args(["-frames:v", "1"])
            .args(["-q:v", &self.quality.to_string()])
            .arg("-y")
            .arg(destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract_frame(
        &self,
        video_path: &Path,
        seek: &str,
        destination: &Path,
    ) -> Result<(), StillframeError> {
        log::debug!(
            "Running {} at {} on {}",
            self.binary.display(),
            seek,
            video_path.display()
        );

        let mut child = self
            .command(video_path, seek, destination)
            .spawn()
            .map_err(|error| {
                StillframeError::ExtractionFailed(format!(
                    "failed to start {}: {error}",
                    self.binary.display()
                ))
            })?;

        // Drain stderr on a thread so a chatty decoder cannot block on a
        // full pipe while we poll for exit.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut output = String::new();
                let _ = stderr.read_to_string(&mut output);
                output
            })
        });

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(StillframeError::ExtractionFailed(format!(
                        "{} timed out after {:?} generating image from {}",
                        self.binary.display(),
                        self.timeout,
                        video_path.display()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(error) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(StillframeError::ExtractionFailed(format!(
                        "failed waiting for {}: {error}",
                        self.binary.display()
                    )));
                }
            }
        };

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            let detail = stderr.trim();
            return Err(StillframeError::ExtractionFailed(format!(
                "failed generating image from {} ({status}){}{}",
                video_path.display(),
                if detail.is_empty() { "" } else { ": " },
                detail
            )));
        }

        // ffmpeg exits 0 without writing anything when the seek is past the
        // last frame.
        let written = std::fs::metadata(destination)
            .map(|metadata| metadata.len() > 0)
            .unwrap_or(false);
        if !written {
            return Err(StillframeError::ExtractionFailed(format!(
                "no frame decoded at {seek} from {}",
                video_path.display()
            )));
        }

        Ok(())
    }
}
