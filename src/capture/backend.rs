//! External screenshot tool selection and invocation
//!
//! All Linux backends are command-line tools invoked as child processes.
//! Each invocation writes to a uniquely named temp file and reads the PNG
//! back; stdout capture is unreliable for some of these tools when run from
//! a restricted process, the temp file sidesteps that.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::error::{CaptureError, DependencyId, Result};
use crate::domain::Rect;

/// Well-known install locations checked in addition to `which`, for
/// restricted-PATH environments.
const TOOL_SEARCH_PATHS: &[&str] = &["/usr/bin", "/usr/local/bin"];

/// PATH prefix for spawned tools, same reason as above
const SPAWN_PATH_PREFIX: &str = "/usr/bin:/usr/local/bin";

/// Display-server family of the current session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    Wayland,
    X11,
}

/// Detect the session family from the environment
pub fn detect_session() -> SessionKind {
    let session_type = std::env::var("XDG_SESSION_TYPE").unwrap_or_default();
    if session_type == "wayland" || std::env::var_os("WAYLAND_DISPLAY").is_some() {
        SessionKind::Wayland
    } else {
        SessionKind::X11
    }
}

/// A Linux capture backend, in fallback order per session kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Grim,
    GnomeScreenshot,
    Scrot,
}

impl Backend {
    pub fn dependency(&self) -> DependencyId {
        match self {
            Backend::Grim => DependencyId::Grim,
            Backend::GnomeScreenshot => DependencyId::GnomeScreenshot,
            Backend::Scrot => DependencyId::Scrot,
        }
    }

    pub fn command(&self) -> &'static str {
        self.dependency().command()
    }

    /// Whether the tool accepts a region geometry directly
    pub fn supports_native_region(&self) -> bool {
        matches!(self, Backend::Grim)
    }

    /// Arguments for a capture writing to `out`. `region` must be pre-rounded.
    pub fn args(&self, out: &Path, region: Option<Rect>) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = Vec::new();
        match self {
            Backend::Grim => {
                if let Some(r) = region {
                    args.push("-g".into());
                    args.push(geometry_arg(r).into());
                }
            }
            Backend::GnomeScreenshot => {
                args.push("-f".into());
            }
            Backend::Scrot => {}
        }
        args.push(out.as_os_str().to_owned());
        args
    }
}

/// Format a rectangle as the `"x,y WxH"` geometry string grim expects
pub fn geometry_arg(r: Rect) -> String {
    let r = r.normalized().rounded();
    format!(
        "{},{} {}x{}",
        r.x as i64, r.y as i64, r.width as i64, r.height as i64
    )
}

/// Ordered fallback chain for a session; evaluated first-success-wins
pub fn fallback_chain(session: SessionKind) -> &'static [Backend] {
    match session {
        SessionKind::Wayland => &[Backend::Grim, Backend::GnomeScreenshot],
        SessionKind::X11 => &[Backend::Scrot],
    }
}

/// Pick the installed backends from a chain, preserving order.
///
/// The availability probe is injected so the policy is testable without the
/// tools installed. Fails with the full remediation hint when nothing in the
/// chain is present.
pub fn select_backends(
    chain: &[Backend],
    probe: impl Fn(&str) -> bool,
) -> Result<Vec<Backend>> {
    let available: Vec<Backend> = chain
        .iter()
        .copied()
        .filter(|b| probe(b.command()))
        .collect();
    if available.is_empty() {
        let mut deps = chain.iter().map(|b| b.dependency());
        let dependency = deps.next().ok_or(CaptureError::UnsupportedPlatform)?;
        return Err(CaptureError::DependencyMissing {
            dependency,
            alternative: deps.next(),
        });
    }
    Ok(available)
}

/// True when the tool resolves on the shell PATH or sits at a well-known
/// install location
pub fn tool_installed(command: &str) -> bool {
    let which = std::process::Command::new("which")
        .arg(command)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if which {
        return true;
    }
    TOOL_SEARCH_PATHS
        .iter()
        .any(|dir| Path::new(dir).join(command).exists())
}

/// True when stderr matches the known "compositor doesn't implement the
/// screen-copy protocol" signature (grim on GNOME, for example)
pub fn is_protocol_unsupported(stderr: &str) -> bool {
    let msg = stderr.to_lowercase();
    msg.contains("wlr-screencopy")
        || msg.contains("doesn't support")
        || msg.contains("compositor doesn't support")
}

/// Temp file path for one capture invocation; removed on drop on every exit
/// path. Deletion failures are swallowed, a stale temp file is not worth
/// failing a successful capture over.
pub struct CaptureTempFile {
    path: PathBuf,
}

impl CaptureTempFile {
    pub fn new() -> Self {
        let stamp = chrono::Utc::now().timestamp_millis();
        let path = std::env::temp_dir().join(format!("ninjashot-{}-{}.png", std::process::id(), stamp));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CaptureTempFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CaptureTempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Run one backend, returning the PNG bytes it produced.
///
/// Distinguishes the protocol-unsupported signature (so the caller can fall
/// back) from other process failures.
pub async fn run_backend(backend: Backend, region: Option<Rect>) -> Result<Vec<u8>> {
    let tmp = CaptureTempFile::new();
    let inherited = std::env::var("PATH").unwrap_or_default();
    let output = Command::new(backend.command())
        .args(backend.args(tmp.path(), region))
        .env("PATH", format!("{}:{}", SPAWN_PATH_PREFIX, inherited))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CaptureError::ProcessFailure {
            tool: backend.command().to_string(),
            detail: format!("failed to spawn: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if is_protocol_unsupported(&stderr) {
            return Err(CaptureError::BackendUnsupported {
                tool: backend.dependency(),
                detail: stderr.trim().to_string(),
            });
        }
        let detail = if stderr.trim().is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr.trim().to_string()
        };
        return Err(CaptureError::ProcessFailure {
            tool: backend.command().to_string(),
            detail,
        });
    }

    let bytes = tokio::fs::read(tmp.path()).await?;
    log::debug!(
        "{} captured {} bytes to {}",
        backend.command(),
        bytes.len(),
        tmp.path().display()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wayland_chain_prefers_grim() {
        assert_eq!(
            fallback_chain(SessionKind::Wayland),
            &[Backend::Grim, Backend::GnomeScreenshot]
        );
        assert_eq!(fallback_chain(SessionKind::X11), &[Backend::Scrot]);
    }

    #[test]
    fn select_skips_missing_tools_in_order() {
        let chain = fallback_chain(SessionKind::Wayland);
        let picked = select_backends(chain, |cmd| cmd == "gnome-screenshot").unwrap();
        assert_eq!(picked, vec![Backend::GnomeScreenshot]);

        let picked = select_backends(chain, |_| true).unwrap();
        assert_eq!(picked, vec![Backend::Grim, Backend::GnomeScreenshot]);
    }

    #[test]
    fn empty_wayland_chain_names_both_packages() {
        let err = select_backends(fallback_chain(SessionKind::Wayland), |_| false).unwrap_err();
        match &err {
            CaptureError::DependencyMissing {
                dependency,
                alternative,
            } => {
                assert_eq!(*dependency, DependencyId::Grim);
                assert_eq!(*alternative, Some(DependencyId::GnomeScreenshot));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn empty_x11_chain_names_scrot() {
        let err = select_backends(fallback_chain(SessionKind::X11), |_| false).unwrap_err();
        match err {
            CaptureError::DependencyMissing {
                dependency,
                alternative,
            } => {
                assert_eq!(dependency, DependencyId::Scrot);
                assert_eq!(alternative, None);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn protocol_signature_matches_known_compositor_errors() {
        assert!(is_protocol_unsupported(
            "compositor doesn't support wlr-screencopy-unstable-v1"
        ));
        assert!(is_protocol_unsupported("Compositor Doesn't Support screencopy"));
        assert!(!is_protocol_unsupported("failed to open output file"));
    }

    #[test]
    fn geometry_arg_rounds_and_normalizes() {
        let r = Rect::new(100.4, 50.6, -20.0, 30.0);
        assert_eq!(geometry_arg(r), "80,51 20x30");
    }

    #[test]
    fn region_args_only_for_grim() {
        let out = PathBuf::from("/tmp/shot.png");
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        let args = Backend::Grim.args(&out, Some(r));
        assert_eq!(args[0], "-g");
        assert!(Backend::Grim.supports_native_region());
        assert!(!Backend::GnomeScreenshot.supports_native_region());
        assert!(!Backend::Scrot.supports_native_region());
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let path = {
            let tmp = CaptureTempFile::new();
            std::fs::write(tmp.path(), b"x").unwrap();
            tmp.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
