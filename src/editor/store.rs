//! Ordered annotation storage with commit filtering and hit-testing

use crate::domain::{point_segment_distance_sq, Annotation, Point};
use crate::render::TextFont;

/// Squared hit radius for arrow shafts (8px)
const ARROW_HIT_RADIUS_SQ: f64 = 64.0;

/// The committed annotations for one capture, in draw order.
///
/// Index 0 is the bottom of the stack; later entries draw on top of earlier
/// ones and win hit-test ties. Append-only: entries are moved in place but
/// never reordered or removed, except by clearing for a new capture.
#[derive(Clone, Debug, Default)]
pub struct AnnotationStore {
    items: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit an annotation, filtering out accidental gestures.
    ///
    /// Returns whether the annotation was kept. Kept rectangles are
    /// normalized so stored geometry always has positive dimensions.
    pub fn commit(&mut self, annotation: Annotation) -> bool {
        if !annotation.passes_commit_threshold() {
            log::debug!("discarding sub-threshold annotation: {:?}", annotation);
            return false;
        }
        self.items.push(annotation.normalized());
        true
    }

    /// Topmost annotation under `point`, if any.
    ///
    /// Text hits inside its measured block, arrows within 8px of the shaft,
    /// rectangles inside their bounds.
    pub fn hit_test(&self, point: Point, font: &TextFont) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .rev()
            .find(|(_, annotation)| match annotation {
                Annotation::Text(t) => font
                    .measure_block(t.position, &t.text, t.font_size)
                    .contains(point),
                Annotation::Arrow(a) => {
                    point_segment_distance_sq(point, a.start, a.end) <= ARROW_HIT_RADIUS_SQ
                }
                Annotation::Highlight(h) => h.rect.contains(point),
                Annotation::Blur(b) => b.rect.contains(point),
            })
            .map(|(i, _)| i)
    }

    /// Move the annotation at `index` by a delta. Out-of-range indices are
    /// ignored.
    pub fn translate(&mut self, index: usize, dx: f64, dy: f64) {
        if let Some(annotation) = self.items.get_mut(index) {
            annotation.translate(dx, dy);
        }
    }

    pub fn items(&self) -> &[Annotation] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
