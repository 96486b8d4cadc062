//! Saving finished screenshots to disk

use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;

/// Errors from writing a finished screenshot
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Refusing to write a zero-byte file
    #[error("refusing to save an empty screenshot")]
    EmptyArtifact,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Encode an RGBA image as PNG into any writer
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Encode an RGBA image as an in-memory PNG buffer
pub fn encode_png(image: &RgbaImage) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_png(&mut buffer, image)?;
    Ok(buffer)
}

/// Default output directory: `Pictures/Screenshots`, created on first use
pub fn default_screenshots_dir() -> io::Result<PathBuf> {
    let pictures = dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        .ok_or_else(|| io::Error::other("no home directory"))?;
    let dir = pictures.join("Screenshots");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write PNG bytes into `dir` under a timestamped name, returning the full
/// path. Empty buffers are rejected before anything touches the disk.
pub fn save_png(png: &[u8], dir: &Path) -> Result<PathBuf, SaveError> {
    if png.is_empty() {
        return Err(SaveError::EmptyArtifact);
    }
    std::fs::create_dir_all(dir)?;
    let name = format!("ninjashot-{}.png", chrono::Utc::now().timestamp_millis());
    let path = dir.join(name);
    std::fs::write(&path, png)?;
    log::info!("saved screenshot to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_png(&[], dir.path()).unwrap_err();
        assert!(matches!(err, SaveError::EmptyArtifact));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = save_png(&[1, 2, 3], &nested).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn filenames_are_timestamped_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_png(&[9], dir.path()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ninjashot-"));
        assert!(name.ends_with(".png"));
        let millis: i64 = name
            .trim_start_matches("ninjashot-")
            .trim_end_matches(".png")
            .parse()
            .unwrap();
        assert!(millis > 0);
    }

    #[test]
    fn encode_round_trips_through_the_png_header() {
        let img = RgbaImage::from_pixel(5, 7, image::Rgba([1, 2, 3, 255]));
        let png = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (5, 7));
        assert_eq!(decoded.get_pixel(4, 6), &image::Rgba([1, 2, 3, 255]));
    }
}
