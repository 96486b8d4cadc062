//! Annotation types for drawing on screenshots
//!
//! All coordinates are in image pixel space of the base screenshot.

use super::geometry::{Point, Rect};

/// An arrow shorter than this (|dx| + |dy|) is treated as an accidental click
pub const MIN_ARROW_SPAN: f64 = 10.0;

/// A highlight/blur rectangle with either dimension at or below this is discarded
pub const MIN_RECT_DIMENSION: f64 = 5.0;

/// RGBA color, 0-255 per channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Default arrow color (#e94560)
    pub const ARROW: Color = Color::rgba(0xe9, 0x45, 0x60, 0xff);
    /// Default text color (#ffeb3b)
    pub const TEXT: Color = Color::rgba(0xff, 0xeb, 0x3b, 0xff);
    /// Default highlight fill (translucent yellow)
    pub const HIGHLIGHT: Color = Color::rgba(0xff, 0xeb, 0x3b, 0x66);
}

/// Text annotation, possibly multi-line
#[derive(Clone, Debug, PartialEq)]
pub struct TextAnnotation {
    /// Top-left of the text block; the first baseline sits one line below
    pub position: Point,
    pub text: String,
    pub font_size: f32,
    pub color: Color,
}

/// Arrow annotation from start to end with a filled head at the end
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowAnnotation {
    pub start: Point,
    pub end: Point,
    pub color: Color,
    pub line_width: f32,
}

/// Translucent filled rectangle
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightAnnotation {
    pub rect: Rect,
    pub color: Color,
}

/// Redaction rectangle; drawn as a flat overlay in previews, flattened as a
/// real box blur by the compositor
#[derive(Clone, Debug, PartialEq)]
pub struct BlurAnnotation {
    pub rect: Rect,
}

/// Unified annotation type; store order is z-order
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Text(TextAnnotation),
    Arrow(ArrowAnnotation),
    Highlight(HighlightAnnotation),
    Blur(BlurAnnotation),
}

impl Annotation {
    /// Commit-time filter: annotations too small to be intentional are dropped.
    ///
    /// Arrows need `|dx| + |dy| > 10`, rectangles need both dimensions above
    /// 5px, text needs non-whitespace content.
    pub fn passes_commit_threshold(&self) -> bool {
        match self {
            Annotation::Text(t) => !t.text.trim().is_empty(),
            Annotation::Arrow(a) => {
                let dx = (a.end.x - a.start.x).abs();
                let dy = (a.end.y - a.start.y).abs();
                dx + dy > MIN_ARROW_SPAN
            }
            Annotation::Highlight(h) => rect_above_min(h.rect),
            Annotation::Blur(b) => rect_above_min(b.rect),
        }
    }

    /// Normalize any rectangle so negative drag deltas become a positive-size
    /// rect anchored at its top-left. Applied at commit, not during drag.
    pub fn normalized(self) -> Annotation {
        match self {
            Annotation::Highlight(h) => Annotation::Highlight(HighlightAnnotation {
                rect: h.rect.normalized(),
                ..h
            }),
            Annotation::Blur(b) => Annotation::Blur(BlurAnnotation {
                rect: b.rect.normalized(),
            }),
            other => other,
        }
    }

    /// Translate the annotation's anchor (all points for an arrow) by a delta
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Annotation::Text(t) => {
                t.position.x += dx;
                t.position.y += dy;
            }
            Annotation::Arrow(a) => {
                a.start.x += dx;
                a.start.y += dy;
                a.end.x += dx;
                a.end.y += dy;
            }
            Annotation::Highlight(h) => {
                h.rect.x += dx;
                h.rect.y += dy;
            }
            Annotation::Blur(b) => {
                b.rect.x += dx;
                b.rect.y += dy;
            }
        }
    }
}

fn rect_above_min(rect: Rect) -> bool {
    let r = rect.normalized();
    r.width > MIN_RECT_DIMENSION && r.height > MIN_RECT_DIMENSION
}
