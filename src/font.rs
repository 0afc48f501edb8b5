//! Caption typeface and font-size fitting.
//!
//! The crate embeds a single typeface (DejaVu Sans). A [`FontFace`] is that
//! typeface at one pixel size; [`fit_font`] walks increasing sizes until the
//! caption no longer fits its box and keeps the last size that did.

use fontdue::{Font, FontSettings};

use crate::configuration::FitOptions;
use crate::error::StillframeError;

static EMBEDDED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// A parsed typeface used for every caption.
pub struct CaptionFont {
    font: Font,
}

impl CaptionFont {
    /// Parse the typeface compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`StillframeError::RenderFailed`] if the font data cannot be
    /// parsed.
    pub fn embedded() -> Result<Self, StillframeError> {
        Self::from_bytes(EMBEDDED_FONT)
    }

    /// Parse a TrueType or OpenType font from memory.
    ///
    /// # Errors
    ///
    /// Returns [`StillframeError::RenderFailed`] if `data` is not a usable
    /// font.
    pub fn from_bytes(data: &[u8]) -> Result<Self, StillframeError> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|error| {
            StillframeError::RenderFailed(format!("failed to parse font: {error}"))
        })?;
        Ok(Self { font })
    }

    /// The typeface at `size` pixels.
    pub fn face(&self, size: f32) -> FontFace<'_> {
        FontFace {
            font: &self.font,
            size,
        }
    }
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("name", &self.font.name())
            .finish()
    }
}

/// A typeface at a specific pixel size.
#[derive(Clone, Copy)]
pub struct FontFace<'a> {
    font: &'a Font,
    size: f32,
}

impl<'a> FontFace<'a> {
    /// Pixel size of this face.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Distance between consecutive baselines: ascent - descent + line gap.
    pub fn line_height(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map(|metrics| metrics.new_line_size)
            .unwrap_or(self.size)
    }

    /// Measure `text` on a single line without drawing it.
    ///
    /// Returns `(width, height)` where width is the sum of glyph advances
    /// and kerning, and height is the [line height](FontFace::line_height).
    pub fn measure(&self, text: &str) -> (f32, f32) {
        let mut width = 0.0;
        let mut previous = None;
        for character in text.chars() {
            if let Some(previous) = previous {
                width += self.kerning(previous, character);
            }
            width += self.font.metrics(character, self.size).advance_width;
            previous = Some(character);
        }
        (width, self.line_height())
    }

    pub(crate) fn kerning(&self, left: char, right: char) -> f32 {
        self.font
            .horizontal_kern(left, right, self.size)
            .unwrap_or(0.0)
    }

    pub(crate) fn font(&self) -> &'a Font {
        self.font
    }
}

impl std::fmt::Debug for FontFace<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").field("size", &self.size).finish()
    }
}

/// The outcome of [`fit_font`].
#[derive(Debug, Clone, Copy)]
pub struct FittedFont<'a> {
    /// The chosen face.
    pub face: FontFace<'a>,
    /// `true` when even the initial size did not fit and the caption will
    /// spill outside the box.
    pub overflows: bool,
}

/// Find the largest candidate size whose measured caption fits the box.
///
/// Candidates start at [`FitOptions::initial_size`] and grow by
/// [`FitOptions::step`] up to [`FitOptions::max_size`]. The box is
/// `width_fraction` of the canvas width by `height_fraction` of its height.
/// When the initial size already overflows, the initial size is returned
/// with [`FittedFont::overflows`] set.
///
/// # Example
///
/// ```
/// use stillframe::{CaptionFont, FitOptions, fit_font};
///
/// let font = CaptionFont::embedded()?;
/// let fitted = fit_font(&font, 1280, 720, "Hello", &FitOptions::default());
/// assert!(!fitted.overflows);
/// assert!(fitted.face.size() >= 12.0);
/// # Ok::<(), stillframe::StillframeError>(())
/// ```
pub fn fit_font<'a>(
    font: &'a CaptionFont,
    canvas_width: u32,
    canvas_height: u32,
    text: &str,
    options: &FitOptions,
) -> FittedFont<'a> {
    let max_width = canvas_width as f32 * options.width_fraction;
    let max_height = canvas_height as f32 * options.height_fraction;
    // A zero, negative or NaN step would never reach `max_size`.
    let initial_size = options.initial_size.max(1.0);
    let step = options.step.max(1.0);
    let max_size = options.max_size.max(initial_size);

    let mut best = None;
    let mut size = initial_size;
    while size <= max_size {
        let face = font.face(size);
        let (width, height) = face.measure(text);
        if width > max_width || height > max_height {
            break;
        }
        best = Some(face);
        size += step;
    }

    match best {
        Some(face) => {
            log::debug!(
                "Fitted caption at {}px for {}x{} canvas",
                face.size(),
                canvas_width,
                canvas_height
            );
            FittedFont {
                face,
                overflows: false,
            }
        }
        None => {
            log::warn!(
                "Caption does not fit a {}x{} canvas even at {}px; drawing it anyway",
                canvas_width,
                canvas_height,
                initial_size
            );
            FittedFont {
                face: font.face(initial_size),
                overflows: true,
            }
        }
    }
}
