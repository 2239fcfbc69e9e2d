use serde::Serialize;

use super::NodeId;

/// Who performed a tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationOrigin {
    /// Anything other than the annotator: page scripts, API callers, tests.
    Page,
    /// The annotation controller inserting or stripping its own output.
    Annotator,
}

/// A node that became a child of [`MutationRecord::target`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedNode {
    pub id: NodeId,
    /// Class list at insertion time; empty for text nodes.
    pub classes: Vec<String>,
}

impl AddedNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// One child-list change under `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<AddedNode>,
    pub removed: Vec<NodeId>,
    pub origin: MutationOrigin,
}

/// Records delivered together to every subscriber on
/// [`Document::flush`](super::Document::flush).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
}

impl MutationBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
