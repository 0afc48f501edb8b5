//! Subtitle track parsing.
//!
//! This module provides [`Cue`], a single timed subtitle line, and the
//! readers that turn a WebVTT or SubRip file into an ordered list of cues.
//! The format is chosen from the file extension.
//!
//! # Example
//!
//! ```no_run
//! use stillframe::{StillframeError, subtitle};
//!
//! let cues = subtitle::open("episode.vtt")?;
//! for cue in &cues {
//!     println!("[{:?}] {}", cue.start_time, cue.text);
//! }
//! # Ok::<(), StillframeError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::time::Duration;

use srtlib::{Subtitles, Timestamp};

use crate::error::StillframeError;
use crate::timestamp::parse_timestamp;

/// Separator used when a multi-line cue is flattened into one caption line.
const LINE_SEPARATOR: &str = " - ";

/// A single timed subtitle entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// When this cue starts displaying, measured from the start of the video.
    pub start_time: Duration,
    /// When this cue stops displaying.
    pub end_time: Duration,
    /// Display text, with markup removed and lines joined by `" - "`.
    pub text: String,
    /// Zero-based position of this cue in the track.
    pub index: usize,
}

/// Subtitle file formats understood by [`open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// Web Video Text Tracks (.vtt).
    WebVtt,
    /// SubRip Text (.srt).
    Srt,
}

impl SubtitleFormat {
    /// Pick the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "vtt" | "webvtt" => Some(SubtitleFormat::WebVtt),
            "srt" => Some(SubtitleFormat::Srt),
            _ => None,
        }
    }
}

impl Display for SubtitleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubtitleFormat::WebVtt => write!(f, "WebVTT"),
            SubtitleFormat::Srt => write!(f, "SRT"),
        }
    }
}

/// Read and parse a subtitle file.
///
/// # Errors
///
/// Returns [`StillframeError::SubtitleParseFailed`] if the extension is not
/// a supported format, the file cannot be read, or a cue is malformed. An
/// empty but well-formed track parses to an empty list.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Vec<Cue>, StillframeError> {
    let path = path.as_ref();
    let format = SubtitleFormat::from_path(path).ok_or_else(|| {
        StillframeError::subtitle(path, "unsupported subtitle format (expected .vtt or .srt)")
    })?;

    let content = std::fs::read_to_string(path)
        .map_err(|error| StillframeError::subtitle(path, error.to_string()))?;

    let cues =
        parse(&content, format).map_err(|reason| StillframeError::subtitle(path, reason))?;
    log::debug!(
        "Parsed {} {} cue(s) from {}",
        cues.len(),
        format,
        path.display()
    );
    Ok(cues)
}

/// Parse subtitle text in the given format.
///
/// The error string describes the first malformed block.
pub fn parse(content: &str, format: SubtitleFormat) -> Result<Vec<Cue>, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    match format {
        SubtitleFormat::WebVtt => parse_webvtt(content),
        SubtitleFormat::Srt => parse_srt(content),
    }
}

/// Split content into blank-line separated blocks of trimmed-right lines.
fn blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_webvtt(content: &str) -> Result<Vec<Cue>, String> {
    let mut blocks = blocks(content).into_iter();

    let header = blocks.next().ok_or("missing WEBVTT header")?;
    let signature = header.first().copied().unwrap_or_default();
    if !(signature == "WEBVTT" || signature.starts_with("WEBVTT ") || signature.starts_with("WEBVTT\t"))
    {
        return Err(format!("missing WEBVTT header, found {signature:?}"));
    }

    let mut cues = Vec::new();
    for block in blocks {
        let first = block[0];
        if first.starts_with("NOTE") || first == "STYLE" || first == "REGION" {
            continue;
        }

        // The cue identifier line is optional.
        let timing_position = if first.contains("-->") { 0 } else { 1 };
        let timing = block
            .get(timing_position)
            .ok_or_else(|| format!("cue {first:?} has no timing line"))?;
        let (start_time, end_time) = parse_timing_line(timing)?;

        let text = join_lines(block[timing_position + 1..].iter().map(|line| strip_markup(line)));
        cues.push(Cue {
            start_time,
            end_time,
            text,
            index: cues.len(),
        });
    }

    Ok(cues)
}

fn parse_srt(content: &str) -> Result<Vec<Cue>, String> {
    let content = content.replace("\r\n", "\n");
    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let track = Subtitles::parse_from_str(content.to_string())
        .map_err(|error| format!("invalid SubRip track: {error}"))?;

    Ok(track
        .to_vec()
        .into_iter()
        .enumerate()
        .map(|(index, subtitle)| Cue {
            start_time: srt_duration(&subtitle.start_time),
            end_time: srt_duration(&subtitle.end_time),
            text: join_lines(subtitle.text.lines().map(strip_markup)),
            index,
        })
        .collect())
}

fn srt_duration(timestamp: &Timestamp) -> Duration {
    let (hours, minutes, seconds, milliseconds) = timestamp.get();
    let total = milliseconds as u64
        + 1000 * (seconds as u64 + 60 * (minutes as u64 + 60 * hours as u64));
    Duration::from_millis(total)
}

/// Parse `start --> end [settings]`.
fn parse_timing_line(line: &str) -> Result<(Duration, Duration), String> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| format!("invalid timing line: {line:?}"))?;
    let end = rest.split_whitespace().next().unwrap_or_default();

    let start_time =
        parse_timestamp(start).ok_or_else(|| format!("invalid start time in {line:?}"))?;
    let end_time = parse_timestamp(end).ok_or_else(|| format!("invalid end time in {line:?}"))?;
    Ok((start_time, end_time))
}

fn join_lines(lines: impl Iterator<Item = String>) -> String {
    lines
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Remove inline markup and decode the common character references.
///
/// Drops `<...>` spans (italics, voice spans, classes, inline timestamps)
/// and SubRip/ASS style `{...}` override blocks.
fn strip_markup(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut closing = None;

    for c in line.chars() {
        match closing {
            Some(end) if c == end => closing = None,
            Some(_) => {}
            None if c == '<' => closing = Some('>'),
            None if c == '{' => closing = Some('}'),
            None => result.push(c),
        }
    }

    result
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
