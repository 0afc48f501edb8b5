//! Outlined caption drawing.
//!
//! Captions are drawn the way subtitle burners have always done it without
//! a stroker: the text is stamped four times in the outline color, offset by
//! one pixel along each diagonal, and then once in the fill color on top.

use image::{Pixel, Rgba, RgbaImage};

use crate::font::FontFace;

/// Diagonal directions used to build the outline.
const OUTLINE_DIRECTIONS: [(i64, i64); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Caption colors and outline width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct TextStyle {
    /// Color of the caption body. Defaults to opaque yellow.
    pub fill: Rgba<u8>,
    /// Color of the outline. Defaults to opaque black.
    pub outline: Rgba<u8>,
    /// Outline offset in pixels. Defaults to 1; 0 disables the outline.
    pub outline_offset: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fill: Rgba([255, 255, 0, 255]),
            outline: Rgba([0, 0, 0, 255]),
            outline_offset: 1,
        }
    }
}

impl TextStyle {
    /// Set the fill color.
    pub fn with_fill(mut self, color: Rgba<u8>) -> Self {
        self.fill = color;
        self
    }

    /// Set the outline color.
    pub fn with_outline(mut self, color: Rgba<u8>) -> Self {
        self.outline = color;
        self
    }

    /// Set the outline offset in pixels.
    pub fn with_outline_offset(mut self, offset: u32) -> Self {
        self.outline_offset = offset;
        self
    }
}

/// Anchor for a caption centered horizontally near the bottom of the canvas.
///
/// Returns `(x, y)` with `x` at the horizontal center and
/// `y = height - line_height - bottom_margin`. Together with the anchoring
/// used by [`draw_outlined_text`] this puts the baseline `bottom_margin`
/// pixels above the bottom edge.
pub fn caption_anchor(
    canvas_width: u32,
    canvas_height: u32,
    face: &FontFace<'_>,
    bottom_margin: f32,
) -> (f32, f32) {
    let x = canvas_width as f32 / 2.0;
    let y = canvas_height as f32 - face.line_height() - bottom_margin;
    (x, y)
}

/// Draw `text` with an outline onto `canvas`.
///
/// The anchor is the horizontal center of the text and the top of its line
/// box: the text is shifted left by half its measured width and down by one
/// line height to reach the baseline. The canvas is never resized; glyph
/// pixels outside it are clipped.
pub fn draw_outlined_text(
    canvas: &mut RgbaImage,
    text: &str,
    face: &FontFace<'_>,
    anchor: (f32, f32),
    style: &TextStyle,
) {
    let glyphs = layout(text, face, anchor);

    if style.outline_offset > 0 {
        let offset = style.outline_offset as i64;
        for (dx, dy) in OUTLINE_DIRECTIONS {
            stamp(canvas, &glyphs, dx * offset, dy * offset, style.outline);
        }
    }
    stamp(canvas, &glyphs, 0, 0, style.fill);
}

/// A rasterized glyph at its final canvas position.
struct PlacedGlyph {
    x: i64,
    y: i64,
    width: usize,
    height: usize,
    coverage: Vec<u8>,
}

/// Rasterize each character once and place it relative to the anchor.
fn layout(text: &str, face: &FontFace<'_>, anchor: (f32, f32)) -> Vec<PlacedGlyph> {
    let (text_width, line_height) = face.measure(text);
    let baseline = (anchor.1 + line_height).round() as i64;

    let mut glyphs = Vec::with_capacity(text.len());
    let mut pen = anchor.0 - text_width / 2.0;
    let mut previous = None;

    for character in text.chars() {
        if let Some(previous) = previous {
            pen += face.kerning(previous, character);
        }
        previous = Some(character);

        let (metrics, coverage) = face.font().rasterize(character, face.size());
        if metrics.width > 0 && metrics.height > 0 {
            glyphs.push(PlacedGlyph {
                x: pen.round() as i64 + metrics.xmin as i64,
                y: baseline - metrics.ymin as i64 - metrics.height as i64,
                width: metrics.width,
                height: metrics.height,
                coverage,
            });
        }
        pen += metrics.advance_width;
    }

    glyphs
}

/// Blend every glyph into the canvas in `color`, shifted by `(dx, dy)`.
fn stamp(canvas: &mut RgbaImage, glyphs: &[PlacedGlyph], dx: i64, dy: i64, color: Rgba<u8>) {
    let (canvas_width, canvas_height) = (canvas.width() as i64, canvas.height() as i64);

    for glyph in glyphs {
        for row in 0..glyph.height {
            let y = glyph.y + dy + row as i64;
            if y < 0 || y >= canvas_height {
                continue;
            }
            for column in 0..glyph.width {
                let x = glyph.x + dx + column as i64;
                if x < 0 || x >= canvas_width {
                    continue;
                }
                let coverage = glyph.coverage[row * glyph.width + column];
                if coverage == 0 {
                    continue;
                }
                let alpha = (color[3] as u16 * coverage as u16 / 255) as u8;
                let source = Rgba([color[0], color[1], color[2], alpha]);
                canvas.get_pixel_mut(x as u32, y as u32).blend(&source);
            }
        }
    }
}
