use std::collections::{HashMap, HashSet};

use crate::document::{Document, NodeId};

/// A page text node split around an inserted annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplit {
    /// The page's own node, cut back to end at the mention.
    pub head: NodeId,
    /// Remainder after the mention, created by the annotator.
    pub tail: Option<NodeId>,
}

/// Elements already annotated, and the splits made to annotate them.
///
/// Keys are generational ids, so an entry for an element that left the tree
/// can never match a different element; such entries are pruned at the
/// start of each scan.
#[derive(Debug, Default)]
pub struct AnnotationMarks {
    marked: HashSet<NodeId>,
    splits: HashMap<NodeId, TextSplit>,
}

impl AnnotationMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, element: NodeId) {
        self.marked.insert(element);
    }

    pub fn is_marked(&self, element: NodeId) -> bool {
        self.marked.contains(&element)
    }

    pub fn unmark(&mut self, element: NodeId) -> bool {
        self.marked.remove(&element)
    }

    /// Remember that `annotation` was inserted by splitting a text node.
    pub fn record_split(&mut self, annotation: NodeId, split: TextSplit) {
        self.splits.insert(annotation, split);
    }

    pub fn take_split(&mut self, annotation: NodeId) -> Option<TextSplit> {
        self.splits.remove(&annotation)
    }

    /// Drop entries whose element is no longer attached. Returns how many
    /// marks went.
    pub fn prune(&mut self, document: &Document) -> usize {
        let before = self.marked.len();
        self.marked.retain(|id| document.is_attached(*id));
        self.splits
            .retain(|annotation, _| document.is_attached(*annotation));
        before - self.marked.len()
    }

    pub fn clear(&mut self) {
        self.marked.clear();
        self.splits.clear();
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_detached() {
        let mut doc = Document::new();
        let kept = doc.create_element("p");
        let dropped = doc.create_element("p");
        doc.append_child(doc.root(), kept).unwrap();
        doc.append_child(doc.root(), dropped).unwrap();

        let mut marks = AnnotationMarks::new();
        marks.mark(kept);
        marks.mark(dropped);
        doc.remove(dropped).unwrap();

        assert_eq!(marks.prune(&doc), 1);
        assert!(marks.is_marked(kept));
        assert!(!marks.is_marked(dropped));
    }

    #[test]
    fn test_splits_of_detached_annotations_are_pruned() {
        let mut doc = Document::new();
        let head = doc.create_text("$5");
        let kept = doc.create_element("span");
        let dropped = doc.create_element("span");
        for id in [head, kept, dropped] {
            doc.append_child(doc.root(), id).unwrap();
        }
        let split = TextSplit { head, tail: None };

        let mut marks = AnnotationMarks::new();
        marks.record_split(kept, split);
        marks.record_split(dropped, split);
        doc.remove(dropped).unwrap();
        marks.prune(&doc);

        assert_eq!(marks.take_split(kept), Some(split));
        assert_eq!(marks.take_split(dropped), None);
    }
}
