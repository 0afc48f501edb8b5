//! The caption pipeline.
//!
//! [`Renderer`] wires the pieces together: parse the subtitle track, pick a
//! cue, extract the matching frame, fit the font, draw the outlined caption,
//! and write the PNG. Any failing step aborts the render.
//!
//! # Example
//!
//! ```no_run
//! use stillframe::{RenderRequest, Renderer, StillframeError};
//!
//! let mut renderer = Renderer::new()?;
//! let request = RenderRequest::new("movie.mkv", "movie.en.vtt").with_output("still.png");
//! let result = renderer.render(&request)?;
//! println!("{} at {}: {}", result.path.display(), result.timestamp, result.text);
//! # Ok::<(), StillframeError>(())
//! ```

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader, RgbaImage};
use rand::Rng;
use rand::rngs::StdRng;
use tempfile::{Builder, NamedTempFile, TempPath};
use uuid::Uuid;

use crate::configuration::RenderOptions;
use crate::error::StillframeError;
use crate::extractor::{FfmpegExtractor, FrameExtractor};
use crate::font::{CaptionFont, fit_font};
use crate::overlay::{caption_anchor, draw_outlined_text};
use crate::selection::{clock_seeded_rng, select_cue};
use crate::subtitle;
use crate::timestamp::format_seek_timestamp;

/// What to render: a video, its subtitle track, and where to put the still.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Video the frame is taken from.
    pub video_path: PathBuf,
    /// Subtitle track the caption is taken from.
    pub subtitle_path: PathBuf,
    /// Output PNG path. `None` synthesizes `<temp dir>/<uuid>.png`.
    pub output_path: Option<PathBuf>,
}

impl RenderRequest {
    /// Create a request that writes to a synthesized output path.
    pub fn new(video_path: impl Into<PathBuf>, subtitle_path: impl Into<PathBuf>) -> Self {
        Self {
            video_path: video_path.into(),
            subtitle_path: subtitle_path.into(),
            output_path: None,
        }
    }

    /// Write the still to `path`.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// The outcome of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Where the PNG was written.
    pub path: PathBuf,
    /// Caption text that was drawn.
    pub text: String,
    /// Cue start as `HH:MM:SS.ff`.
    pub timestamp: String,
}

/// Renders caption stills.
///
/// A renderer owns its random source and its frame extractor. Rendering
/// takes `&mut self`, so a renderer is used from one thread at a time; build
/// one per thread to render concurrently, each with its own seed.
pub struct Renderer<E = FfmpegExtractor, R = StdRng> {
    extractor: E,
    rng: R,
    options: RenderOptions,
    font: CaptionFont,
}

impl Renderer {
    /// A renderer using the `ffmpeg` binary, default options, and a random
    /// source seeded from the clock.
    ///
    /// # Errors
    ///
    /// Returns [`StillframeError::RenderFailed`] if the embedded font cannot
    /// be loaded.
    pub fn new() -> Result<Self, StillframeError> {
        Self::with_parts(
            FfmpegExtractor::new(),
            clock_seeded_rng(),
            RenderOptions::default(),
        )
    }
}

impl<E: FrameExtractor, R: Rng> Renderer<E, R> {
    /// Assemble a renderer from an extractor, a random source and options.
    ///
    /// # Errors
    ///
    /// Returns [`StillframeError::RenderFailed`] if the embedded font cannot
    /// be loaded.
    pub fn with_parts(extractor: E, rng: R, options: RenderOptions) -> Result<Self, StillframeError> {
        Ok(Self {
            extractor,
            rng,
            options,
            font: CaptionFont::embedded()?,
        })
    }

    /// The options this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render one caption still.
    ///
    /// The extracted frame is written under the temp directory and removed
    /// before this returns, whether or not the render succeeds. The output
    /// file only appears once it has been fully written.
    ///
    /// # Errors
    ///
    /// - [`StillframeError::SubtitleParseFailed`] if the track cannot be read.
    /// - [`StillframeError::InvalidInput`] if the track has no cues.
    /// - [`StillframeError::ExtractionFailed`] if the frame cannot be decoded.
    /// - [`StillframeError::RenderFailed`] if loading, drawing or saving fails.
    pub fn render(&mut self, request: &RenderRequest) -> Result<RenderResult, StillframeError> {
        let output_path = match &request.output_path {
            Some(path) => path.clone(),
            None => self.synthesize_output_path()?,
        };

        let cues = subtitle::open(&request.subtitle_path)?;
        let cue = select_cue(&cues, &mut self.rng)?;
        let timestamp = format_seek_timestamp(cue.start_time);
        log::info!("Rendering cue {:?} at {}", cue.text, timestamp);

        let frame = self.export_frame(&request.video_path, &timestamp)?;
        self.overlay_text(&frame, &output_path, &cue.text)?;
        drop(frame);

        Ok(RenderResult {
            path: output_path,
            text: cue.text.clone(),
            timestamp,
        })
    }

    /// `<temp dir>/<uuid>.png`, creating the directory if needed.
    fn synthesize_output_path(&self) -> Result<PathBuf, StillframeError> {
        let directory = &self.options.temp_directory;
        fs::create_dir_all(directory).map_err(|error| {
            StillframeError::RenderFailed(format!(
                "failed creating output dir {}: {error}",
                directory.display()
            ))
        })?;
        Ok(directory.join(format!("{}.png", Uuid::new_v4())))
    }

    /// Extract the frame into a scratch file that is deleted when the
    /// returned guard drops.
    fn export_frame(&self, video_path: &Path, seek: &str) -> Result<TempPath, StillframeError> {
        let directory = &self.options.temp_directory;
        fs::create_dir_all(directory).map_err(|error| {
            StillframeError::ExtractionFailed(format!(
                "failed creating output dir {}: {error}",
                directory.display()
            ))
        })?;

        // Guard first, so a decoder that fails halfway still gets cleaned up.
        let frame = TempPath::from_path(directory.join(format!("{}.jpg", Uuid::new_v4())));
        self.extractor.extract_frame(video_path, seek, &frame)?;
        Ok(frame)
    }

    /// Load the frame, draw the caption and persist the PNG at `output_path`.
    fn overlay_text(
        &self,
        frame_path: &Path,
        output_path: &Path,
        text: &str,
    ) -> Result<(), StillframeError> {
        let mut canvas = load_canvas(frame_path)?;
        let (width, height) = canvas.dimensions();

        let fitted = fit_font(&self.font, width, height, text, &self.options.fit);
        let anchor = caption_anchor(width, height, &fitted.face, self.options.bottom_margin);
        draw_outlined_text(&mut canvas, text, &fitted.face, anchor, &self.options.style);

        save_png(&canvas, output_path)
    }
}

/// Decode an image, sniffing the format from its content.
fn load_canvas(path: &Path) -> Result<RgbaImage, StillframeError> {
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|error| {
            StillframeError::RenderFailed(format!(
                "failed to load image {}: {error}",
                path.display()
            ))
        })?
        .decode()
        .map_err(|error| {
            StillframeError::RenderFailed(format!(
                "failed to load image {}: {error}",
                path.display()
            ))
        })?;
    Ok(image.to_rgba8())
}

/// Encode into a sibling temp file and rename it over `path` on success.
fn save_png(canvas: &RgbaImage, path: &Path) -> Result<(), StillframeError> {
    let failed = |error: &dyn std::fmt::Display| {
        StillframeError::RenderFailed(format!("failed to save {}: {error}", path.display()))
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = staging_file(directory).map_err(|error| failed(&error))?;

    {
        let mut writer = BufWriter::new(staging.as_file());
        canvas
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|error| failed(&error))?;
        writer
            .into_inner()
            .map_err(|error| failed(&error.into_error()))?;
    }

    staging.persist(path).map_err(|error| failed(&error.error))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// A temp file in `directory` created with the umask-derived mode of a plain
/// `File::create`, not the owner-only mode of a default temp file.
fn staging_file(directory: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".stillframe-").suffix(".png.tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(directory)
}

/// Render one still with the default [`Renderer`].
///
/// # Errors
///
/// See [`Renderer::render`].
pub fn render(
    video_path: impl AsRef<Path>,
    subtitle_path: impl AsRef<Path>,
    output_path: Option<&Path>,
) -> Result<RenderResult, StillframeError> {
    let mut request = RenderRequest::new(video_path.as_ref(), subtitle_path.as_ref());
    request.output_path = output_path.map(Path::to_path_buf);
    Renderer::new()?.render(&request)
}
