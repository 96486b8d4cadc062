//! Rendering: fonts, annotation geometry, and the compositor

pub mod geometry;
pub mod image;
pub mod text;

pub use image::{compose, BLUR_RADIUS};
pub use text::TextFont;
