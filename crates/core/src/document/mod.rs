//! Mutable document tree the annotator works on.
//!
//! Nodes live in an arena and are addressed by generational [`NodeId`]s.
//! The tree is shared as [`SharedDocument`]; the lock is never held across
//! an `.await`.

mod html;
mod mutation;
mod style;
mod tree;

use std::sync::{Arc, Mutex};

pub use html::{inner_html, outer_html, parse_html, to_html};
pub use mutation::{AddedNode, MutationBatch, MutationOrigin, MutationRecord};
pub use style::{ComputedFont, InlineStyle};
pub use tree::{Ancestors, Document, Element, NodeData, NodeId};

pub type SharedDocument = Arc<Mutex<Document>>;

pub fn shared(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}
