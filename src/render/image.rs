//! Flattening of annotations onto the base screenshot
//!
//! `compose` is a pure function: the same base image and annotation list
//! always produce the same output. Annotations are drawn in store order, so
//! later entries land on top.

use image::RgbaImage;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::arrow;
use super::text::TextFont;
use crate::capture::crop::clamp_crop;
use crate::domain::{
    Annotation, ArrowAnnotation, Color, HighlightAnnotation, Rect, TextAnnotation,
};

/// Box blur radius applied to blur-redaction rectangles
pub const BLUR_RADIUS: i32 = 8;

/// Flatten base + annotations into one output image.
///
/// Malformed geometry renders nothing rather than failing; an empty
/// annotation list returns a pixel-identical copy of the base.
pub fn compose(base: &RgbaImage, annotations: &[Annotation], font: &TextFont) -> RgbaImage {
    let mut img = base.clone();
    for annotation in annotations {
        match annotation {
            Annotation::Text(text) => draw_text(&mut img, text, font),
            Annotation::Arrow(a) => draw_arrow(&mut img, a),
            Annotation::Highlight(h) => draw_highlight(&mut img, h),
            Annotation::Blur(b) => box_blur_region(&mut img, b.rect),
        }
    }
    img
}

/// Convert RgbaImage to Pixmap, apply a drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

fn skia_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn draw_text(img: &mut RgbaImage, text: &TextAnnotation, font: &TextFont) {
    let line_height = TextFont::line_height(text.font_size);
    let x = text.position.x as f32;
    for (i, line) in text.text.split('\n').enumerate() {
        // Baselines step down from the anchor, first line one line below it
        let baseline = text.position.y as f32 + (i as f32 + 1.0) * line_height;
        font.draw_line(img, line, x, baseline, text.font_size, text.color);
    }
}

fn draw_arrow(img: &mut RgbaImage, a: &ArrowAnnotation) {
    let (sx, sy) = (a.start.x as f32, a.start.y as f32);
    let (ex, ey) = (a.end.x as f32, a.end.y as f32);

    with_pixmap(img, |pixmap| {
        let paint = skia_paint(a.color);

        // Shaft
        let mut pb = PathBuilder::new();
        pb.move_to(sx, sy);
        pb.line_to(ex, ey);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: a.line_width,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        // Filled triangular head at the end
        if let Some(((b1x, b1y), (b2x, b2y))) = arrow::head_points(sx, sy, ex, ey) {
            let mut pb = PathBuilder::new();
            pb.move_to(ex, ey);
            pb.line_to(b1x, b1y);
            pb.line_to(b2x, b2y);
            pb.close();
            if let Some(path) = pb.finish() {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    });
}

fn draw_highlight(img: &mut RgbaImage, h: &HighlightAnnotation) {
    let r = h.rect.normalized().rounded();
    if r.width <= 0.0 || r.height <= 0.0 {
        return;
    }
    with_pixmap(img, |pixmap| {
        if let Some(rect) =
            tiny_skia::Rect::from_xywh(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
        {
            let mut paint = skia_paint(h.color);
            paint.anti_alias = false;
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    });
}

/// Box blur of the pixels inside `rect`, clamped to the image.
///
/// The averaging neighborhood is clamped to the rectangle's own bounds:
/// edge pixels average a smaller window instead of sampling outside the
/// rectangle, so redacted content never bleeds in from around it. Cost is
/// O(area * radius^2), fine for user-drawn rectangles.
fn box_blur_region(img: &mut RgbaImage, rect: Rect) {
    let Some((x0, y0, w, h)) = clamp_crop(img.width(), img.height(), rect) else {
        return;
    };
    let (w, h) = (w as i32, h as i32);

    // Snapshot the region so every output pixel averages original values
    let mut source = vec![[0u8; 4]; (w * h) as usize];
    for row in 0..h {
        for col in 0..w {
            source[(row * w + col) as usize] =
                img.get_pixel(x0 + col as u32, y0 + row as u32).0;
        }
    }

    for py in 0..h {
        for px in 0..w {
            let mut sums = [0u64; 4];
            let mut count = 0u64;
            for dy in -BLUR_RADIUS..=BLUR_RADIUS {
                for dx in -BLUR_RADIUS..=BLUR_RADIUS {
                    let nx = (px + dx).clamp(0, w - 1);
                    let ny = (py + dy).clamp(0, h - 1);
                    let p = source[(ny * w + nx) as usize];
                    for c in 0..4 {
                        sums[c] += p[c] as u64;
                    }
                    count += 1;
                }
            }
            let averaged = image::Rgba([
                (sums[0] / count) as u8,
                (sums[1] / count) as u8,
                (sums[2] / count) as u8,
                (sums[3] / count) as u8,
            ]);
            img.put_pixel(x0 + px as u32, y0 + py as u32, averaged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BlurAnnotation, Point};

    fn checkerboard(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([200, 30, 30, 255])
            } else {
                image::Rgba([30, 30, 200, 255])
            }
        })
    }

    fn compose_no_text(base: &RgbaImage, annotations: &[Annotation]) -> RgbaImage {
        // None of these tests draw text; reuse the drawing internals directly
        let mut img = base.clone();
        for a in annotations {
            match a {
                Annotation::Arrow(arrow) => draw_arrow(&mut img, arrow),
                Annotation::Highlight(h) => draw_highlight(&mut img, h),
                Annotation::Blur(b) => box_blur_region(&mut img, b.rect),
                Annotation::Text(_) => unreachable!(),
            }
        }
        img
    }

    #[test]
    fn empty_annotation_list_is_identity() {
        let base = checkerboard(40, 30);
        let out = compose_no_text(&base, &[]);
        assert_eq!(base.as_raw(), out.as_raw());
    }

    #[test]
    fn highlight_blends_inside_and_leaves_outside_untouched() {
        let base = RgbaImage::from_pixel(100, 100, image::Rgba([10, 10, 10, 255]));
        let out = compose_no_text(
            &base,
            &[Annotation::Highlight(HighlightAnnotation {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
                color: Color::HIGHLIGHT,
            })],
        );
        assert_ne!(out.get_pixel(15, 15), base.get_pixel(15, 15));
        assert_eq!(out.get_pixel(5, 5), base.get_pixel(5, 5));
        assert_eq!(out.get_pixel(31, 31), base.get_pixel(31, 31));
    }

    #[test]
    fn zero_area_rectangles_render_nothing() {
        let base = checkerboard(20, 20);
        let out = compose_no_text(
            &base,
            &[
                Annotation::Highlight(HighlightAnnotation {
                    rect: Rect::new(5.0, 5.0, 0.0, 10.0),
                    color: Color::HIGHLIGHT,
                }),
                Annotation::Blur(BlurAnnotation {
                    rect: Rect::new(5.0, 5.0, 0.0, 0.0),
                }),
            ],
        );
        assert_eq!(base.as_raw(), out.as_raw());
    }

    #[test]
    fn blur_mixes_pixels_inside_the_rect() {
        let base = checkerboard(60, 60);
        let out = compose_no_text(
            &base,
            &[Annotation::Blur(BlurAnnotation {
                rect: Rect::new(10.0, 10.0, 30.0, 30.0),
            })],
        );
        // Checkerboard averages to an even mix, so blurred pixels change
        assert_ne!(out.get_pixel(20, 20), base.get_pixel(20, 20));
        // Untouched outside
        assert_eq!(out.get_pixel(5, 5), base.get_pixel(5, 5));
        assert_eq!(out.get_pixel(50, 50), base.get_pixel(50, 50));
    }

    #[test]
    fn blur_never_samples_outside_its_rectangle() {
        // Uniform white inside the rect, loud red everywhere else. If the
        // blur sampled outside, inside pixels would pick up red.
        let mut base = RgbaImage::from_pixel(50, 50, image::Rgba([255, 0, 0, 255]));
        for y in 10..30 {
            for x in 10..30 {
                base.put_pixel(x, y, image::Rgba([255, 255, 255, 255]));
            }
        }
        let out = compose_no_text(
            &base,
            &[Annotation::Blur(BlurAnnotation {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
            })],
        );
        for y in 10..30 {
            for x in 10..30 {
                assert_eq!(
                    out.get_pixel(x, y),
                    &image::Rgba([255, 255, 255, 255]),
                    "leak at ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn blur_at_image_edge_is_clamped() {
        let base = checkerboard(30, 30);
        // Rect hangs off the top-left corner
        let out = compose_no_text(
            &base,
            &[Annotation::Blur(BlurAnnotation {
                rect: Rect::new(-10.0, -10.0, 25.0, 25.0),
            })],
        );
        assert_eq!(out.dimensions(), base.dimensions());
        // Outside the clamped region untouched
        assert_eq!(out.get_pixel(20, 20), base.get_pixel(20, 20));
    }

    #[test]
    fn arrow_marks_shaft_pixels() {
        let base = RgbaImage::from_pixel(60, 60, image::Rgba([0, 0, 0, 255]));
        let out = compose_no_text(
            &base,
            &[Annotation::Arrow(ArrowAnnotation {
                start: Point::new(5.0, 30.0),
                end: Point::new(55.0, 30.0),
                color: Color::ARROW,
                line_width: 3.0,
            })],
        );
        assert_ne!(out.get_pixel(30, 30), base.get_pixel(30, 30));
        // Far from the arrow nothing changes
        assert_eq!(out.get_pixel(30, 5), base.get_pixel(30, 5));
    }

    #[test]
    fn later_annotations_draw_on_top() {
        let base = RgbaImage::from_pixel(40, 40, image::Rgba([0, 0, 0, 255]));
        let bottom = Annotation::Highlight(HighlightAnnotation {
            rect: Rect::new(0.0, 0.0, 40.0, 40.0),
            color: Color::rgba(255, 0, 0, 255),
        });
        let top = Annotation::Highlight(HighlightAnnotation {
            rect: Rect::new(0.0, 0.0, 40.0, 40.0),
            color: Color::rgba(0, 255, 0, 255),
        });
        let out = compose_no_text(&base, &[bottom, top]);
        assert_eq!(out.get_pixel(20, 20), &image::Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn text_draws_pixels_when_font_available() {
        let Some(font) = super::super::text::test_font() else {
            return;
        };
        let base = RgbaImage::from_pixel(200, 100, image::Rgba([0, 0, 0, 255]));
        let out = compose(
            &base,
            &[Annotation::Text(TextAnnotation {
                position: Point::new(10.0, 10.0),
                text: "Hi".into(),
                font_size: 24.0,
                color: Color::TEXT,
            })],
            &font,
        );
        assert_ne!(base.as_raw(), out.as_raw());
    }
}
