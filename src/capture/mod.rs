//! Cross-platform screen capture
//!
//! Normalizes heterogeneous OS capture tools into one bitmap-producing
//! contract. Only the Linux branch has real policy: Wayland sessions prefer
//! grim and fall back to gnome-screenshot on compositors without the
//! screen-copy protocol, X11 sessions use scrot. macOS delegates to the
//! bundled `screencapture`.

pub mod backend;
pub mod crop;
pub mod error;

pub use error::{CaptureError, DependencyId, Result};

use crate::domain::Rect;

/// A captured screenshot: PNG-encoded bytes, decoded on demand
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    png: Vec<u8>,
}

impl Bitmap {
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    pub fn as_png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    /// Pixel dimensions, read from the PNG header without a full decode
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let decoder = png::Decoder::new(self.png.as_slice());
        let reader = decoder
            .read_info()
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        let info = reader.info();
        Ok((info.width, info.height))
    }

    /// Full decode to RGBA for compositing
    pub fn to_rgba(&self) -> Result<image::RgbaImage> {
        let decoded = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        Ok(decoded.to_rgba8())
    }
}

/// A connected display, for multi-monitor capture
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayInfo {
    pub id: usize,
    pub name: String,
}

/// Capture the full screen as a PNG bitmap.
///
/// `display` selects a monitor where the platform supports it; the Linux
/// tools capture all outputs and ignore it.
pub async fn capture_full_screen(display: Option<usize>) -> Result<Bitmap> {
    #[cfg(target_os = "linux")]
    {
        let _ = display;
        capture_full_screen_linux().await
    }
    #[cfg(target_os = "macos")]
    {
        capture_macos(display, None).await
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        let _ = display;
        Err(CaptureError::UnsupportedPlatform)
    }
}

/// Capture a region of the screen as a PNG bitmap.
///
/// Uses native region capture where the backend supports it (grim geometry,
/// screencapture -R); otherwise captures the full screen and crops in
/// software with clamped bounds.
pub async fn capture_region(rect: Rect, display: Option<usize>) -> Result<Bitmap> {
    #[cfg(target_os = "linux")]
    {
        capture_region_linux(rect, display).await
    }
    #[cfg(target_os = "macos")]
    {
        capture_macos(display, Some(rect)).await
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        let _ = (rect, display);
        Err(CaptureError::UnsupportedPlatform)
    }
}

/// List connected displays. Best-effort: falls back to a single primary
/// entry when enumeration is unavailable.
pub async fn list_displays() -> Vec<DisplayInfo> {
    #[cfg(target_os = "linux")]
    {
        if backend::detect_session() == backend::SessionKind::X11 {
            if let Some(displays) = xrandr_displays().await {
                return displays;
            }
        }
    }
    vec![DisplayInfo {
        id: 0,
        name: "Display 1".to_string(),
    }]
}

#[cfg(target_os = "linux")]
async fn capture_full_screen_linux() -> Result<Bitmap> {
    let session = backend::detect_session();
    let chain = backend::fallback_chain(session);
    let backends = backend::select_backends(chain, backend::tool_installed)?;

    let mut last_err = None;
    for b in &backends {
        match backend::run_backend(*b, None).await {
            Ok(bytes) => return Ok(Bitmap::from_png(bytes)),
            Err(err @ CaptureError::BackendUnsupported { .. }) => {
                log::warn!("{}, trying next backend", err);
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_err.unwrap_or(CaptureError::UnsupportedPlatform))
}

#[cfg(target_os = "linux")]
async fn capture_region_linux(rect: Rect, display: Option<usize>) -> Result<Bitmap> {
    let session = backend::detect_session();
    if session == backend::SessionKind::Wayland
        && backend::tool_installed(backend::Backend::Grim.command())
    {
        match backend::run_backend(backend::Backend::Grim, Some(rect)).await {
            Ok(bytes) => return Ok(Bitmap::from_png(bytes)),
            Err(err @ CaptureError::BackendUnsupported { .. }) => {
                log::warn!("{}, falling back to full capture + crop", err);
            }
            Err(err) => return Err(err),
        }
    }
    let full = capture_full_screen(display).await?;
    let cropped = crop::crop_png(full.as_png(), rect)?;
    Ok(Bitmap::from_png(cropped))
}

#[cfg(target_os = "macos")]
async fn capture_macos(display: Option<usize>, region: Option<Rect>) -> Result<Bitmap> {
    use std::process::Stdio;

    let tmp = backend::CaptureTempFile::new();
    let mut cmd = tokio::process::Command::new("screencapture");
    cmd.arg("-x");
    if let Some(n) = display {
        // screencapture numbers displays from 1
        cmd.arg("-D").arg((n + 1).to_string());
    }
    if let Some(r) = region {
        let r = r.normalized().rounded();
        cmd.arg("-R").arg(format!(
            "{},{},{},{}",
            r.x as i64, r.y as i64, r.width as i64, r.height as i64
        ));
    }
    let output = cmd
        .arg(tmp.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CaptureError::ProcessFailure {
            tool: "screencapture".to_string(),
            detail: format!("failed to spawn: {}", e),
        })?;
    if !output.status.success() {
        return Err(CaptureError::ProcessFailure {
            tool: "screencapture".to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    let bytes = tokio::fs::read(tmp.path()).await?;
    Ok(Bitmap::from_png(bytes))
}

#[cfg(target_os = "linux")]
async fn xrandr_displays() -> Option<Vec<DisplayInfo>> {
    use std::process::Stdio;

    let output = tokio::process::Command::new("xrandr")
        .arg("--query")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let listing = String::from_utf8_lossy(&output.stdout);
    let displays = parse_xrandr_displays(&listing);
    if displays.is_empty() {
        None
    } else {
        Some(displays)
    }
}

/// Parse connected outputs from `xrandr --query` output
#[cfg(target_os = "linux")]
fn parse_xrandr_displays(listing: &str) -> Vec<DisplayInfo> {
    listing
        .lines()
        .filter(|line| line.contains(" connected"))
        .enumerate()
        .map(|(id, line)| DisplayInfo {
            id,
            name: line
                .split_whitespace()
                .next()
                .unwrap_or("unknown")
                .to_string(),
        })
        .collect()
}
