//! Timestamp formatting and parsing.
//!
//! The frame decoder seeks with `HH:MM:SS.ff` strings (centisecond
//! precision). Subtitle tracks use `HH:MM:SS.mmm` (WebVTT) or
//! `HH:MM:SS,mmm` (SubRip), and WebVTT also allows the hour field to be
//! omitted.

use std::time::Duration;

/// Format an offset from the start of the video as a decoder seek string.
///
/// The result is `HH:MM:SS.ff`, zero-padded. Sub-centisecond precision is
/// truncated, never rounded up, so the seek never lands after the cue start.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// let seek = stillframe::format_seek_timestamp(Duration::from_millis(3_723_450));
/// assert_eq!(seek, "01:02:03.45");
/// ```
pub fn format_seek_timestamp(offset: Duration) -> String {
    let total_secs = offset.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let centis = offset.subsec_millis() / 10;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
}

/// Parse a cue or seek timestamp into a [`Duration`].
///
/// Accepts `HH:MM:SS.fff`, `MM:SS.fff` and the SubRip comma separator
/// (`HH:MM:SS,fff`). The fractional part may have one to three digits and is
/// read as a decimal fraction, so `.5`, `.50` and `.500` are equal. Returns
/// `None` for anything else.
pub fn parse_timestamp(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (clock, fraction) = match value.rsplit_once(['.', ',']) {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (value, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0, parse_field(minutes)?, parse_field(seconds)?),
        [hours, minutes, seconds] => (
            parse_field(hours)?,
            parse_field(minutes)?,
            parse_field(seconds)?,
        ),
        _ => return None,
    };
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let millis = match fraction {
        Some(digits) if (1..=3).contains(&digits.len()) => {
            let value = parse_field(digits)?;
            value * 10u64.pow(3 - digits.len() as u32)
        }
        Some(_) => return None,
        None => 0,
    };

    let total = hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1000 + millis)?;
    Some(Duration::from_millis(total))
}

fn parse_field(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
