//! Domain types shared across capture, editing, and rendering

pub mod annotation;
pub mod geometry;

pub use annotation::{
    Annotation, ArrowAnnotation, BlurAnnotation, Color, HighlightAnnotation, TextAnnotation,
    MIN_ARROW_SPAN, MIN_RECT_DIMENSION,
};
pub use geometry::{point_segment_distance_sq, Point, Rect};
