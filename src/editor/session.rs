//! Editing session state: active tool, in-progress gesture, selection
//!
//! The session is a pure state machine over pointer events. It owns the
//! captured image and the annotation store, and produces the flattened
//! output on demand. No UI toolkit types appear here.

use image::RgbaImage;

use super::store::AnnotationStore;
use crate::domain::{
    Annotation, ArrowAnnotation, BlurAnnotation, Color, HighlightAnnotation, Point, Rect,
    TextAnnotation,
};
use crate::render::{compose, TextFont};

/// Default font size for new text annotations
pub const DEFAULT_FONT_SIZE: f32 = 24.0;
/// Default stroke width for new arrows
pub const DEFAULT_LINE_WIDTH: f32 = 3.0;

/// The active editing tool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Select,
    Text,
    Arrow,
    Highlight,
    Blur,
}

/// What the pointer is currently doing
#[derive(Clone, Debug, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    /// A draft annotation being shaped by the drag
    Drawing(Annotation),
    /// Dragging an existing annotation; `last` is the previous pointer
    /// position, so each move applies an incremental delta
    Moving { index: usize, last: Point },
}

/// One capture-and-annotate editing session
#[derive(Debug)]
pub struct EditorSession {
    image: RgbaImage,
    store: AnnotationStore,
    font: TextFont,
    tool: Tool,
    gesture: Gesture,
    selected: Option<usize>,
    pub text_color: Color,
    pub arrow_color: Color,
    pub highlight_color: Color,
    pub font_size: f32,
    pub line_width: f32,
}

impl EditorSession {
    pub fn new(image: RgbaImage, font: TextFont) -> Self {
        Self {
            image,
            store: AnnotationStore::new(),
            font,
            tool: Tool::default(),
            gesture: Gesture::Idle,
            selected: None,
            text_color: Color::TEXT,
            arrow_color: Color::ARROW,
            highlight_color: Color::HIGHLIGHT,
            font_size: DEFAULT_FONT_SIZE,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    /// Replace the base image and start over: annotations belong to the
    /// capture they were drawn on
    pub fn load_capture(&mut self, image: RgbaImage) {
        self.image = image;
        self.store.clear();
        self.gesture = Gesture::Idle;
        self.selected = None;
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools, abandoning any in-progress draft and clearing the
    /// selection
    pub fn set_tool(&mut self, tool: Tool) {
        if !matches!(self.gesture, Gesture::Idle) {
            log::debug!("tool switch abandons in-progress gesture");
        }
        self.gesture = Gesture::Idle;
        self.selected = None;
        self.tool = tool;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The draft annotation of an active drawing gesture, for live preview
    pub fn draft(&self) -> Option<&Annotation> {
        match &self.gesture {
            Gesture::Drawing(a) => Some(a),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.gesture = match self.tool {
            Tool::Select => match self.store.hit_test(p, &self.font) {
                Some(index) => {
                    self.selected = Some(index);
                    Gesture::Moving { index, last: p }
                }
                None => {
                    self.selected = None;
                    Gesture::Idle
                }
            },
            Tool::Text => Gesture::Drawing(Annotation::Text(TextAnnotation {
                position: p,
                text: String::new(),
                font_size: self.font_size,
                color: self.text_color,
            })),
            Tool::Arrow => Gesture::Drawing(Annotation::Arrow(ArrowAnnotation {
                start: p,
                end: p,
                color: self.arrow_color,
                line_width: self.line_width,
            })),
            Tool::Highlight => Gesture::Drawing(Annotation::Highlight(HighlightAnnotation {
                rect: Rect::new(p.x, p.y, 0.0, 0.0),
                color: self.highlight_color,
            })),
            Tool::Blur => Gesture::Drawing(Annotation::Blur(BlurAnnotation {
                rect: Rect::new(p.x, p.y, 0.0, 0.0),
            })),
        };
    }

    pub fn pointer_moved(&mut self, p: Point) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing(draft) => match draft {
                Annotation::Text(t) => t.position = p,
                Annotation::Arrow(a) => a.end = p,
                Annotation::Highlight(h) => {
                    h.rect.width = p.x - h.rect.x;
                    h.rect.height = p.y - h.rect.y;
                }
                Annotation::Blur(b) => {
                    b.rect.width = p.x - b.rect.x;
                    b.rect.height = p.y - b.rect.y;
                }
            },
            Gesture::Moving { index, last } => {
                self.store.translate(*index, p.x - last.x, p.y - last.y);
                *last = p;
            }
        }
    }

    /// Finish the gesture. Drafts go through commit filtering; returns
    /// whether an annotation was added. Selection lives only for the
    /// duration of a drag, so it is cleared here regardless of the gesture.
    pub fn pointer_up(&mut self) -> bool {
        self.selected = None;
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing(draft) => self.store.commit(draft),
            _ => false,
        }
    }

    /// Set the content of an in-progress text draft
    pub fn set_draft_text(&mut self, text: &str) {
        if let Gesture::Drawing(Annotation::Text(t)) = &mut self.gesture {
            t.text = text.to_string();
        }
    }

    /// Flatten the session into the final image
    pub fn compose(&self) -> RgbaImage {
        compose(&self.image, self.store.items(), &self.font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::test_font;

    fn session() -> Option<EditorSession> {
        let font = test_font()?;
        Some(EditorSession::new(
            RgbaImage::from_pixel(100, 100, image::Rgba([20, 20, 20, 255])),
            font,
        ))
    }

    #[test]
    fn drag_draws_and_commits_a_highlight() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Highlight);
        s.pointer_down(Point::new(10.0, 10.0));
        s.pointer_moved(Point::new(20.0, 15.0));
        s.pointer_moved(Point::new(30.0, 30.0));
        assert!(s.draft().is_some());
        assert!(s.pointer_up());
        assert_eq!(s.store().len(), 1);
        assert!(s.draft().is_none());
    }

    #[test]
    fn tiny_drag_is_discarded() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Blur);
        s.pointer_down(Point::new(10.0, 10.0));
        s.pointer_moved(Point::new(13.0, 13.0));
        assert!(!s.pointer_up());
        assert!(s.store().is_empty());
    }

    #[test]
    fn tool_switch_abandons_draft() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Arrow);
        s.pointer_down(Point::new(0.0, 0.0));
        s.pointer_moved(Point::new(50.0, 50.0));
        s.set_tool(Tool::Highlight);
        assert!(s.draft().is_none());
        assert!(!s.pointer_up());
        assert!(s.store().is_empty());
    }

    #[test]
    fn select_drag_moves_existing_annotation() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Highlight);
        s.pointer_down(Point::new(10.0, 10.0));
        s.pointer_moved(Point::new(30.0, 30.0));
        s.pointer_up();

        s.set_tool(Tool::Select);
        s.pointer_down(Point::new(15.0, 15.0));
        assert_eq!(s.selected(), Some(0));
        s.pointer_moved(Point::new(20.0, 15.0));
        s.pointer_moved(Point::new(25.0, 15.0));
        s.pointer_up();

        match &s.store().items()[0] {
            Annotation::Highlight(h) => assert_eq!(h.rect, Rect::new(20.0, 10.0, 20.0, 20.0)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn selection_lives_only_while_dragging() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Highlight);
        s.pointer_down(Point::new(10.0, 10.0));
        s.pointer_moved(Point::new(30.0, 30.0));
        s.pointer_up();

        s.set_tool(Tool::Select);
        s.pointer_down(Point::new(15.0, 15.0));
        assert_eq!(s.selected(), Some(0));
        s.pointer_moved(Point::new(18.0, 15.0));
        s.pointer_up();
        assert_eq!(s.selected(), None);
        // The moved annotation stays in the store
        assert_eq!(s.store().len(), 1);
    }

    #[test]
    fn select_on_empty_space_selects_nothing() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Highlight);
        s.pointer_down(Point::new(10.0, 10.0));
        s.pointer_moved(Point::new(30.0, 30.0));
        s.pointer_up();

        s.set_tool(Tool::Select);
        s.pointer_down(Point::new(90.0, 90.0));
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn load_capture_clears_annotations() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Highlight);
        s.pointer_down(Point::new(10.0, 10.0));
        s.pointer_moved(Point::new(40.0, 40.0));
        s.pointer_up();
        assert_eq!(s.store().len(), 1);

        s.load_capture(RgbaImage::new(50, 50));
        assert!(s.store().is_empty());
        assert_eq!(s.image().dimensions(), (50, 50));
    }

    #[test]
    fn text_draft_collects_typed_content() {
        let Some(mut s) = session() else { return };
        s.set_tool(Tool::Text);
        s.pointer_down(Point::new(10.0, 10.0));
        s.set_draft_text("note");
        assert!(s.pointer_up());
        match &s.store().items()[0] {
            Annotation::Text(t) => assert_eq!(t.text, "note"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
