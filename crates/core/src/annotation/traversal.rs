use crate::document::{Document, NodeId};

use super::marks::AnnotationMarks;
use super::span::is_annotation;

/// Elements whose text the user is editing.
const EDITABLE_TAGS: &[&str] = &["input", "textarea"];

/// A text node eligible for annotation, captured with the state it had when
/// the scan saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub node: NodeId,
    pub parent: NodeId,
    pub text: String,
}

/// Whether the subtree rooted at element `id` is never scanned.
/// Editability is inherited and can be switched off again below, so it is
/// checked per text node instead.
fn prunes_subtree(document: &Document, id: NodeId) -> bool {
    let Some(element) = document.element(id) else {
        return false;
    };
    document.is_non_content(id)
        || EDITABLE_TAGS.iter().any(|t| element.is(t))
        || is_annotation(element)
}

/// Eligible text fragments under `root`, in document order.
pub fn text_fragments(
    document: &Document,
    root: NodeId,
    marks: &AnnotationMarks,
) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    if std::iter::once(root)
        .chain(document.ancestors(root))
        .any(|a| prunes_subtree(document, a))
    {
        return fragments;
    }

    let mut stack: Vec<NodeId> = document.children(root).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if let Some(text) = document.text(id) {
            let Some(parent) = document.parent(id) else {
                continue;
            };
            if marks.is_marked(parent)
                || text.trim().is_empty()
                || document.is_content_editable(parent)
            {
                continue;
            }
            fragments.push(TextFragment {
                node: id,
                parent,
                text: text.to_string(),
            });
        } else if !prunes_subtree(document, id) {
            stack.extend(document.children(id).iter().rev().copied());
        }
    }
    fragments
}
