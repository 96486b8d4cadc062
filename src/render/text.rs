//! Font loading, text measurement, and glyph rasterization
//!
//! Measurement uses real font metrics so text hit-testing matches what the
//! compositor actually draws.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::RgbaImage;

use crate::domain::{Color, Point, Rect};

/// Baseline-to-baseline spacing as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Well-known system font locations, checked in order
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
];

/// A loaded font used for text annotations
#[derive(Clone)]
pub struct TextFont {
    font: FontArc,
}

impl TextFont {
    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let font = FontArc::try_from_vec(bytes)?;
        Ok(Self { font })
    }

    /// Load a sans-serif font from a well-known system location
    pub fn load_system() -> Option<Self> {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(bytes) = std::fs::read(path) {
                match Self::from_bytes(bytes) {
                    Ok(font) => {
                        log::debug!("loaded font from {}", path);
                        return Some(font);
                    }
                    Err(err) => log::warn!("unusable font at {}: {}", path, err),
                }
            }
        }
        log::warn!("no system font found, text annotations unavailable");
        None
    }

    pub fn line_height(font_size: f32) -> f32 {
        font_size * LINE_HEIGHT_FACTOR
    }

    /// Advance width of a single line at the given size
    pub fn line_width(&self, line: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_size));
        let mut width = 0.0f32;
        let mut last = None;
        for ch in line.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = last {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            last = Some(id);
        }
        width
    }

    /// Bounding box of a (possibly multi-line) text block anchored at
    /// `position`, matching how the compositor lays the lines out.
    ///
    /// Height is line-count based, not ink-based: the first line's glyphs
    /// sit between `y + line_height - ascent` and the baseline at
    /// `y + line_height`, so a tall descender on the last line can extend
    /// a few pixels past the reported box.
    pub fn measure_block(&self, position: Point, text: &str, font_size: f32) -> Rect {
        let mut max_width = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            max_width = max_width.max(self.line_width(line, font_size));
            lines += 1;
        }
        Rect::new(
            position.x,
            position.y,
            max_width as f64,
            (lines as f32 * Self::line_height(font_size)) as f64,
        )
    }

    /// Rasterize one line with its baseline at `baseline_y`, blending glyph
    /// coverage over the image
    pub fn draw_line(
        &self,
        img: &mut RgbaImage,
        line: &str,
        x: f32,
        baseline_y: f32,
        font_size: f32,
        color: Color,
    ) {
        let scale = PxScale::from(font_size);
        let scaled = self.font.as_scaled(scale);
        let (w, h) = (img.width() as i32, img.height() as i32);

        let mut cursor_x = x;
        let mut last = None;
        for ch in line.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = last {
                cursor_x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    if px < 0 || py < 0 || px >= w || py >= h {
                        return;
                    }
                    let alpha = coverage * (color.a as f32 / 255.0);
                    if alpha <= 0.0 {
                        return;
                    }
                    let pixel = img.get_pixel_mut(px as u32, py as u32);
                    for (i, channel) in [color.r, color.g, color.b].into_iter().enumerate() {
                        pixel[i] =
                            (channel as f32 * alpha + pixel[i] as f32 * (1.0 - alpha)).round() as u8;
                    }
                    pixel[3] = pixel[3].max((alpha * 255.0).round() as u8);
                });
            }
            cursor_x += scaled.h_advance(id);
            last = Some(id);
        }
    }
}

impl std::fmt::Debug for TextFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFont").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_font() -> Option<TextFont> {
    TextFont::load_system()
}
