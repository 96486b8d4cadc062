//! The annotation editor: store, session state machine, and gestures

pub mod session;
pub mod store;

pub use session::{EditorSession, Tool, DEFAULT_FONT_SIZE, DEFAULT_LINE_WIDTH};
pub use store::AnnotationStore;
