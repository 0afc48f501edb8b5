//! Error types for the `stillframe` crate.
//!
//! This module defines [`StillframeError`], the unified error type returned by
//! every fallible operation in the crate. Each variant names the stage that
//! failed; the message carries the path or upstream reason so callers can
//! report it without extra logging.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for all `stillframe` operations.
///
/// A render aborts on the first error and surfaces it unchanged in kind to
/// the caller. There is no retry or partial recovery anywhere in the flow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StillframeError {
    /// A required argument was missing or the input cannot be used as given
    /// (for example a subtitle track without any cues).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The subtitle track could not be read or parsed.
    #[error("Failed to read subtitle track at {path}: {reason}")]
    SubtitleParseFailed {
        /// Path of the subtitle file that was being read.
        path: PathBuf,
        /// Underlying reason the parse failed.
        reason: String,
    },

    /// The frame decoder failed to produce a still image.
    #[error("Failed to export frame: {0}")]
    ExtractionFailed(String),

    /// Loading, drawing onto, or saving the image failed.
    #[error("Failed to render caption: {0}")]
    RenderFailed(String),
}

impl StillframeError {
    /// Build a [`StillframeError::SubtitleParseFailed`] for `path`.
    pub(crate) fn subtitle(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StillframeError::SubtitleParseFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
