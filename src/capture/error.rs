//! Error types for the capture layer

use thiserror::Error;

/// External tools the capture layer may depend on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DependencyId {
    Grim,
    GnomeScreenshot,
    Scrot,
}

impl DependencyId {
    /// Executable name of the tool
    pub fn command(&self) -> &'static str {
        match self {
            DependencyId::Grim => "grim",
            DependencyId::GnomeScreenshot => "gnome-screenshot",
            DependencyId::Scrot => "scrot",
        }
    }

    /// Human-readable remediation hint for a missing tool
    pub fn install_hint(&self) -> &'static str {
        match self {
            DependencyId::Grim => {
                "grim is required on Wayland. Install it: sudo apt-get install grim"
            }
            DependencyId::GnomeScreenshot => {
                "On GNOME Wayland install: sudo apt-get install gnome-screenshot"
            }
            DependencyId::Scrot => {
                "scrot is required on Linux (X11). Install it: sudo apt-get install scrot"
            }
        }
    }
}

impl std::fmt::Display for DependencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

/// Capture failure taxonomy
#[derive(Error, Debug)]
pub enum CaptureError {
    /// A required external capture tool is not installed. Recoverable by
    /// installing the named package and retrying. `alternative` names a
    /// second tool that would also work (grim vs gnome-screenshot on Wayland).
    #[error("{}", missing_message(.dependency, .alternative))]
    DependencyMissing {
        dependency: DependencyId,
        alternative: Option<DependencyId>,
    },

    /// The tool ran but the compositor rejected the capture protocol
    /// (e.g. grim on a compositor without wlr-screencopy). Handled internally
    /// by falling back to the next backend; surfaced only when no fallback
    /// succeeds.
    #[error("{tool} is not supported by this compositor: {detail}")]
    BackendUnsupported { tool: DependencyId, detail: String },

    /// The external tool exited non-zero or could not be spawned
    #[error("{tool} failed: {detail}")]
    ProcessFailure { tool: String, detail: String },

    /// Temp file or output I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The captured PNG could not be decoded
    #[error("could not decode captured image: {0}")]
    Decode(String),

    /// Capture is not implemented for this platform
    #[error("screen capture is not supported on this platform")]
    UnsupportedPlatform,
}

fn missing_message(dependency: &DependencyId, alternative: &Option<DependencyId>) -> String {
    match alternative {
        Some(alt) => format!("{} Or: {}", dependency.install_hint(), alt.install_hint()),
        None => dependency.install_hint().to_string(),
    }
}

impl CaptureError {
    /// The dependency the caller should offer to install, if any.
    ///
    /// This replaces substring-matching on error messages: the remediation UI
    /// reads this field instead of parsing text.
    pub fn missing_dependency(&self) -> Option<DependencyId> {
        match self {
            CaptureError::DependencyMissing { dependency, .. } => Some(*dependency),
            CaptureError::BackendUnsupported { tool, .. } => match tool {
                // grim rejected by the compositor means the GNOME tool is the fix
                DependencyId::Grim => Some(DependencyId::GnomeScreenshot),
                _ => None,
            },
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
