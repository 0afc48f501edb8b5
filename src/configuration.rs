//! Render configuration.
//!
//! [`RenderOptions`] is a builder that threads the scratch directory, the
//! font-fitting parameters, and the caption style through a [`Renderer`]
//! without widening every function signature.
//!
//! # Example
//!
//! ```
//! use stillframe::{FitOptions, RenderOptions};
//!
//! let options = RenderOptions::new()
//!     .with_bottom_margin(80.0)
//!     .with_fit(FitOptions::new().with_height_fraction(0.08));
//! assert_eq!(options.bottom_margin, 80.0);
//! ```
//!
//! [`Renderer`]: crate::Renderer

use std::path::PathBuf;

use crate::overlay::TextStyle;

/// Name of the directory created under the OS temp directory for extracted
/// frames and default outputs.
pub const TEMP_SUBDIRECTORY: &str = "stillframe";

/// Parameters for [`fit_font`](crate::fit_font).
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct FitOptions {
    /// First candidate size in pixels. Defaults to 12.
    pub initial_size: f32,
    /// Increment between candidate sizes in pixels. Defaults to 10.
    pub step: f32,
    /// Largest size ever tried, whether or not the caption still fits.
    /// Defaults to 1024.
    pub max_size: f32,
    /// Fraction of the canvas width the caption may occupy. Defaults to 0.8.
    pub width_fraction: f32,
    /// Fraction of the canvas height the caption may occupy. Defaults to 0.1.
    pub height_fraction: f32,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FitOptions {
    /// Create fitting options with the default box and size ladder.
    pub fn new() -> Self {
        Self {
            initial_size: 12.0,
            step: 10.0,
            max_size: 1024.0,
            width_fraction: 0.8,
            height_fraction: 0.1,
        }
    }

    /// Set the first candidate size. Clamped to a minimum of 1 pixel.
    pub fn with_initial_size(mut self, size: f32) -> Self {
        self.initial_size = size.max(1.0);
        self
    }

    /// Set the increment between candidates. Clamped to a minimum of 1 pixel
    /// so the search always terminates.
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step.max(1.0);
        self
    }

    /// Set the largest size tried.
    pub fn with_max_size(mut self, size: f32) -> Self {
        self.max_size = size.max(1.0);
        self
    }

    /// Set the fraction of the canvas width available to the caption.
    pub fn with_width_fraction(mut self, fraction: f32) -> Self {
        self.width_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the fraction of the canvas height available to the caption.
    pub fn with_height_fraction(mut self, fraction: f32) -> Self {
        self.height_fraction = fraction.clamp(0.0, 1.0);
        self
    }
}

/// Configuration for a [`Renderer`](crate::Renderer).
///
/// A default-constructed value reproduces the classic caption look: yellow
/// text with a one-pixel black outline, sized to at most 80% of the frame
/// width and 10% of its height, 50 pixels above the bottom edge.
#[derive(Debug, Clone)]
#[must_use]
pub struct RenderOptions {
    /// Directory for extracted frames and synthesized output paths.
    pub temp_directory: PathBuf,
    /// Font-size search parameters.
    pub fit: FitOptions,
    /// Gap in pixels between the bottom of the caption's line box and the
    /// bottom edge of the frame.
    pub bottom_margin: f32,
    /// Caption colors and outline width.
    pub style: TextStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderOptions {
    /// Create options with the defaults described on [`RenderOptions`].
    pub fn new() -> Self {
        Self {
            temp_directory: std::env::temp_dir().join(TEMP_SUBDIRECTORY),
            fit: FitOptions::default(),
            bottom_margin: 50.0,
            style: TextStyle::default(),
        }
    }

    /// Use `directory` for scratch files instead of `<os temp>/stillframe`.
    pub fn with_temp_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.temp_directory = directory.into();
        self
    }

    /// Replace the font-fitting parameters.
    pub fn with_fit(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    /// Set the bottom margin in pixels.
    pub fn with_bottom_margin(mut self, margin: f32) -> Self {
        self.bottom_margin = margin.max(0.0);
        self
    }

    /// Replace the caption style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}
