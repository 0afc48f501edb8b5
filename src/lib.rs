//! # stillframe
//!
//! Render caption stills: pick a random line from a subtitle track, grab the
//! matching frame from the video, and burn the line onto it in outlined
//! yellow text.
//!
//! Frame decoding is delegated to FFmpeg (the `ffmpeg` binary by default,
//! or the libraries in-process with the `native` feature). Text is drawn
//! with an embedded DejaVu Sans typeface via
//! [`fontdue`](https://crates.io/crates/fontdue), and the result is written
//! as PNG with the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let result = stillframe::render("movie.mkv", "movie.en.vtt", Some(Path::new("still.png")))?;
//! println!("{} ({})", result.text, result.timestamp);
//! # Ok::<(), stillframe::StillframeError>(())
//! ```
//!
//! ## Pieces
//!
//! - **Cue selection**: [`select_cue`] picks uniformly from the track using
//!   a caller-supplied [`rand::Rng`].
//! - **Seek timestamps**: [`format_seek_timestamp`] produces the
//!   `HH:MM:SS.ff` string FFmpeg seeks with.
//! - **Frame extraction**: any [`FrameExtractor`]; [`FfmpegExtractor`] runs
//!   the `ffmpeg` binary with a timeout.
//! - **Font fitting**: [`fit_font`] finds the largest size that keeps the
//!   caption inside 80% of the frame width and 10% of its height.
//! - **Outlined text**: [`draw_outlined_text`] stamps a one-pixel black
//!   outline and a yellow fill.
//! - **Orchestration**: [`Renderer`] runs the whole pipeline, cleans up its
//!   scratch frame, and only publishes the output once it is complete.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `native` | [`NativeExtractor`] decodes through `ffmpeg-next` instead of spawning `ffmpeg` |

pub mod configuration;
#[cfg(feature = "native")]
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod font;
pub mod overlay;
pub mod render;
pub mod selection;
pub mod subtitle;
pub mod timestamp;

pub use configuration::{FitOptions, RenderOptions, TEMP_SUBDIRECTORY};
#[cfg(feature = "native")]
pub use decoder::NativeExtractor;
pub use error::StillframeError;
pub use extractor::{FfmpegExtractor, FrameExtractor};
pub use font::{CaptionFont, FittedFont, FontFace, fit_font};
pub use overlay::{TextStyle, caption_anchor, draw_outlined_text};
pub use render::{RenderRequest, RenderResult, Renderer, render};
pub use selection::{clock_seeded_rng, select_cue};
pub use subtitle::{Cue, SubtitleFormat};
pub use timestamp::{format_seek_timestamp, parse_timestamp};
