//! In-page annotation: find mentions in text nodes, convert them and insert
//! a marked span after each, exactly once per element.

mod controller;
mod debounce;
mod marks;
mod overlay;
mod price_blocks;
mod span;
mod traversal;
mod watcher;

pub use controller::{AnnotationController, ControllerConfig, ScanReport};
pub use debounce::Debouncer;
pub use marks::{AnnotationMarks, TextSplit};
pub use overlay::{
    NoOpOverlay, Overlay, OverlayEvent, RecordingOverlay, Selection, Tooltip, TOOLTIP_OFFSET_Y,
};
pub use price_blocks::{find_price_blocks, PriceBlock};
pub use span::{create_annotation, is_annotation, is_annotation_node, ANNOTATION_CLASS};
pub use traversal::{text_fragments, TextFragment};
pub use watcher::{is_relevant, WatcherHandle};
