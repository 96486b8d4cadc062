//! Screenshot capture and annotation pipeline
//!
//! Capture goes through external OS tools (grim, gnome-screenshot, scrot,
//! screencapture) selected per session type, with software cropping for
//! region captures the tool cannot do natively. Annotations are kept as
//! vector data in an [`editor::EditorSession`] until the compositor
//! flattens them into the final PNG.

pub mod artifact;
pub mod capture;
pub mod config;
pub mod domain;
pub mod editor;
pub mod render;

pub use capture::{capture_full_screen, capture_region, Bitmap, CaptureError};
pub use editor::EditorSession;
pub use render::{compose, TextFont};
