//! Software region cropping of captured PNGs
//!
//! The primary path decodes through the `image` crate; a raw `png`-crate
//! path exists as a fallback for images the primary decoder rejects. Both
//! share one clamping function so they select exactly the same pixels.

use image::GenericImageView;

use super::error::{CaptureError, Result};
use crate::domain::Rect;

/// Clamp a requested crop into the source dimensions.
///
/// The top-left corner is clamped into `[0, fw-1] x [0, fh-1]` and the size
/// clamped so the crop never reads outside the source. Returns `None` when
/// the clamped area is degenerate; callers then keep the uncropped source.
pub fn clamp_crop(full_w: u32, full_h: u32, rect: Rect) -> Option<(u32, u32, u32, u32)> {
    if full_w == 0 || full_h == 0 {
        return None;
    }
    let r = rect.normalized().rounded();
    let left = (r.x as i64).clamp(0, full_w as i64 - 1);
    let top = (r.y as i64).clamp(0, full_h as i64 - 1);
    let width = (r.width as i64).min(full_w as i64 - left);
    let height = (r.height as i64).min(full_h as i64 - top);
    if width <= 0 || height <= 0 {
        return None;
    }
    Some((left as u32, top as u32, width as u32, height as u32))
}

/// Crop a PNG buffer to `rect`, returning a freshly encoded PNG.
///
/// Degenerate clamped regions return the source buffer unchanged rather
/// than failing.
pub fn crop_png(full_png: &[u8], rect: Rect) -> Result<Vec<u8>> {
    match crop_with_image_crate(full_png, rect) {
        Ok(bytes) => Ok(bytes),
        Err(primary_err) => {
            log::debug!(
                "image-crate crop failed ({}), trying raw png path",
                primary_err
            );
            crop_with_png_crate(full_png, rect)
        }
    }
}

fn crop_with_image_crate(full_png: &[u8], rect: Rect) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory_with_format(full_png, image::ImageFormat::Png)
        .map_err(|e| CaptureError::Decode(e.to_string()))?;
    let (fw, fh) = decoded.dimensions();
    let Some((x, y, w, h)) = clamp_crop(fw, fh, rect) else {
        return Ok(full_png.to_vec());
    };
    let rgba = decoded.to_rgba8();
    let cropped = image::imageops::crop_imm(&rgba, x, y, w, h).to_image();
    encode_rgba(&cropped)
}

/// Pure png-crate decode/recompose path, bit-identical pixel selection to
/// the primary path
fn crop_with_png_crate(full_png: &[u8], rect: Rect) -> Result<Vec<u8>> {
    let decoder = png::Decoder::new(full_png);
    let mut reader = decoder
        .read_info()
        .map_err(|e| CaptureError::Decode(e.to_string()))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| CaptureError::Decode(e.to_string()))?;
    let (fw, fh) = (info.width, info.height);

    let bpp = match info.color_type {
        png::ColorType::Rgba => 4,
        png::ColorType::Rgb => 3,
        other => {
            return Err(CaptureError::Decode(format!(
                "unsupported png color type: {:?}",
                other
            )))
        }
    };
    if info.bit_depth != png::BitDepth::Eight {
        return Err(CaptureError::Decode(format!(
            "unsupported png bit depth: {:?}",
            info.bit_depth
        )));
    }

    let Some((x, y, w, h)) = clamp_crop(fw, fh, rect) else {
        return Ok(full_png.to_vec());
    };

    // Recompose as RGBA regardless of source layout, same as the primary path
    let mut out = vec![0u8; (w * h * 4) as usize];
    for row in 0..h {
        for col in 0..w {
            let src = (((y + row) * fw + (x + col)) * bpp) as usize;
            let dst = ((row * w + col) * 4) as usize;
            out[dst] = buf[src];
            out[dst + 1] = buf[src + 1];
            out[dst + 2] = buf[src + 2];
            out[dst + 3] = if bpp == 4 { buf[src + 3] } else { 255 };
        }
    }

    let img = image::RgbaImage::from_raw(w, h, out)
        .ok_or_else(|| CaptureError::Decode("cropped buffer size mismatch".into()))?;
    encode_rgba(&img)
}

fn encode_rgba(img: &image::RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    crate::artifact::write_png(&mut bytes, img)
        .map_err(|e| CaptureError::Io(std::io::Error::other(e.to_string())))?;
    Ok(bytes)
}
