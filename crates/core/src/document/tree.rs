use std::fmt;

use log::debug;
use serde::Serialize;
use tokio::sync::broadcast;

use super::mutation::{AddedNode, MutationBatch, MutationOrigin, MutationRecord};
use super::style::{ComputedFont, InlineStyle};
use crate::errors::DocumentError;

/// Buffered batches per subscriber before it starts lagging.
const MUTATION_CHANNEL_CAPACITY: usize = 256;

/// Elements whose content is never rendered as text.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript"];

type Result<T> = std::result::Result<T, DocumentError>;

/// Generational handle to a node of a [`Document`].
///
/// A handle whose node was removed from the tree never resolves again, even
/// after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: InlineStyle,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            classes: Vec::new(),
            style: InlineStyle::default(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Attribute value. `class` and `style` are rendered from their parsed form.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name.to_ascii_lowercase().as_str() {
            "class" if !self.classes.is_empty() => Some(self.class_name()),
            "style" if !self.style.is_empty() => Some(self.style.to_string()),
            "class" | "style" => None,
            name => self
                .attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => self.style = InlineStyle::parse(value),
            _ => match self.attributes.iter_mut().find(|(n, _)| *n == name) {
                Some(existing) => existing.1 = value.to_string(),
                None => self.attributes.push((name, value.to_string())),
            },
        }
    }

    /// Attributes other than `class` and `style`, in source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut InlineStyle {
        &mut self.style
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed document tree.
///
/// Child-list mutations are recorded while at least one subscriber exists
/// and published as one [`MutationBatch`] per [`flush`](Self::flush).
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    origin: MutationOrigin,
    pending: Vec<MutationRecord>,
    observers: broadcast::Sender<MutationBatch>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &(self.slots.len() - self.free.len()))
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        let (observers, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node {
                    parent: None,
                    children: Vec::new(),
                    data: NodeData::Root,
                }),
            }],
            free: Vec::new(),
            root,
            origin: MutationOrigin::Page,
            pending: Vec::new(),
            observers,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element, or the root when the document has none.
    pub fn body(&self) -> NodeId {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.element(*id).is_some_and(|e| e.is("body")))
            .unwrap_or(self.root)
    }

    // ------------------------------------------------------------------
    // Node access
    // ------------------------------------------------------------------

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DocumentError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DocumentError::StaleNode(id))
    }

    /// Whether `id` still refers to a live node (attached or not).
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).ok().map(|n| &n.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Attribute edits are not child-list mutations and are not recorded.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.node_mut(id).ok().map(|n| &mut n.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Parent, grandparent, ... up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    /// Whether `id` is live and reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id == self.root {
            return true;
        }
        self.contains(id) && self.ancestors(id).any(|a| a == self.root)
    }

    /// Every node below `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Elements below `id` in document order for which `predicate` holds.
    pub fn find_elements<F>(&self, id: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|d| self.element(*d).is_some_and(&predicate))
            .collect()
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text(d))
            .collect()
    }

    // ------------------------------------------------------------------
    // Style queries
    // ------------------------------------------------------------------

    /// Value of an inherited property: the element's own inline declaration,
    /// else the closest ancestor's.
    pub fn computed_style(&self, id: NodeId, property: &str) -> Option<String> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|n| self.element(n))
            .find_map(|e| e.style().get(property).map(str::to_string))
    }

    pub fn computed_font(&self, id: NodeId) -> ComputedFont {
        ComputedFont {
            font_size: self.computed_style(id, "font-size"),
            font_family: self.computed_style(id, "font-family"),
            font_weight: self.computed_style(id, "font-weight"),
        }
    }

    /// `contenteditable` is inherited until an element sets it to `false`.
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|n| self.element(n))
            .find_map(|e| e.attribute("contenteditable"))
            .is_some_and(|value| !value.eq_ignore_ascii_case("false"))
    }

    /// script, style and noscript.
    pub fn is_non_content(&self, id: NodeId) -> bool {
        self.element(id)
            .is_some_and(|e| NON_CONTENT_TAGS.iter().any(|t| e.is(t)))
    }

    // ------------------------------------------------------------------
    // Construction and mutation
    // ------------------------------------------------------------------

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            data,
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    /// New detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(tag)))
    }

    pub fn create_element_from(&mut self, element: Element) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    /// New detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Replace the data of a text node. Not a child-list mutation.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(existing) => {
                *existing = text.to_string();
                Ok(())
            }
            _ => Err(DocumentError::NotAContainer(id)),
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (or last when `None`).
    /// A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if child == self.root {
            return Err(DocumentError::RootImmutable);
        }
        if matches!(self.node(parent)?.data, NodeData::Text(_)) {
            return Err(DocumentError::NotAContainer(parent));
        }
        self.node(child)?;
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(DocumentError::Cycle { parent, child });
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            if self.parent(reference) != Some(parent) {
                return Err(DocumentError::NotAChild { parent, reference });
            }
        }

        self.detach(child)?;

        let position = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .ok_or(DocumentError::NotAChild { parent, reference })?,
            None => self.children(parent).len(),
        };
        self.node_mut(parent)?.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);

        let classes = self
            .element(child)
            .map(|e| e.classes().to_vec())
            .unwrap_or_default();
        self.record(MutationRecord {
            target: parent,
            added: vec![AddedNode { id: child, classes }],
            removed: Vec::new(),
            origin: self.origin,
        });
        Ok(())
    }

    /// Unlink `id` from its parent, keeping the subtree alive.
    fn detach(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|c| *c != id);
        self.node_mut(id)?.parent = None;
        self.record(MutationRecord {
            target: parent,
            added: Vec::new(),
            removed: vec![id],
            origin: self.origin,
        });
        Ok(())
    }

    /// Remove `id` and its subtree from the document. Their handles go stale.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DocumentError::RootImmutable);
        }
        self.detach(id)?;

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index);
        }
        Ok(())
    }

    /// Merge adjacent text nodes and drop empty ones in the subtree of `id`.
    pub fn normalize(&mut self, id: NodeId) -> Result<()> {
        let mut containers = vec![id];
        containers.extend(
            self.descendants(id)
                .into_iter()
                .filter(|d| !self.is_text(*d)),
        );

        for container in containers {
            let children = self.children(container).to_vec();
            let mut run_head: Option<NodeId> = None;
            for child in children {
                let Some(text) = self.text(child).map(str::to_string) else {
                    run_head = None;
                    continue;
                };
                match run_head {
                    _ if text.is_empty() => self.remove(child)?,
                    Some(head) => {
                        let merged = format!("{}{}", self.text(head).unwrap_or_default(), text);
                        self.set_text(head, &merged)?;
                        self.remove(child)?;
                    }
                    None => run_head = Some(child),
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutation observation
    // ------------------------------------------------------------------

    /// Receive every batch published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MutationBatch> {
        self.observers.subscribe()
    }

    fn record(&mut self, record: MutationRecord) {
        if self.observers.receiver_count() > 0 {
            self.pending.push(record);
        }
    }

    /// Records not yet flushed.
    pub fn pending_records(&self) -> &[MutationRecord] {
        &self.pending
    }

    /// Publish the pending records as one batch. Returns how many were sent.
    pub fn flush(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let batch = MutationBatch {
            records: std::mem::take(&mut self.pending),
        };
        let count = batch.len();
        if self.observers.send(batch).is_err() {
            debug!("Mutation batch dropped: no subscribers");
        }
        count
    }

    /// Run `f` with every recorded mutation attributed to `origin`, then flush.
    pub fn mutate_as<T, F>(&mut self, origin: MutationOrigin, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let previous = std::mem::replace(&mut self.origin, origin);
        let result = f(self);
        self.origin = previous;
        self.flush();
        result
    }
}

pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &mut Document, text: &str) -> (NodeId, NodeId) {
        let p = doc.create_element("p");
        let t = doc.create_text(text);
        doc.append_child(doc.root(), p).unwrap();
        doc.append_child(p, t).unwrap();
        (p, t)
    }

    #[test]
    fn test_removed_handles_never_alias() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "hello");
        doc.remove(t).unwrap();
        let reused = doc.create_text("again");

        assert!(!doc.contains(t));
        assert_ne!(reused, t);
        assert!(doc.is_attached(p));
        assert!(!doc.is_attached(reused));
    }

    #[test]
    fn test_insert_before_orders_children() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "b");
        let a = doc.create_text("a");
        doc.insert_before(p, a, Some(t)).unwrap();
        assert_eq!(doc.children(p), &[a, t]);
        assert_eq!(doc.text_content(p), "ab");
    }

    #[test]
    fn test_cycles_and_foreign_references_are_rejected() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "x");
        let div = doc.create_element("div");
        doc.append_child(p, div).unwrap();

        assert_eq!(
            doc.append_child(div, p),
            Err(DocumentError::Cycle {
                parent: div,
                child: p
            })
        );
        assert_eq!(doc.append_child(t, div), Err(DocumentError::NotAContainer(t)));

        let other = doc.create_text("y");
        assert!(matches!(
            doc.insert_before(div, other, Some(t)),
            Err(DocumentError::NotAChild { .. })
        ));
    }

    #[test]
    fn test_normalize_merges_and_drops_empty_text() {
        let mut doc = Document::new();
        let (p, _) = paragraph(&mut doc, "I paid ");
        for text in ["$5", "", " today"] {
            let t = doc.create_text(text);
            doc.append_child(p, t).unwrap();
        }

        doc.normalize(p).unwrap();

        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), "I paid $5 today");
    }

    #[test]
    fn test_computed_font_and_editable_are_inherited() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.element_mut(div)
            .unwrap()
            .set_attribute("style", "font-size: 18px; font-family: Georgia");
        doc.element_mut(div)
            .unwrap()
            .set_attribute("contenteditable", "true");
        let span = doc.create_element("span");
        doc.element_mut(span)
            .unwrap()
            .set_attribute("style", "font-size: 12px");
        doc.append_child(doc.root(), div).unwrap();
        doc.append_child(div, span).unwrap();

        let font = doc.computed_font(span);
        assert_eq!(font.font_size.as_deref(), Some("12px"));
        assert_eq!(font.font_family.as_deref(), Some("Georgia"));
        assert_eq!(font.font_weight, None);
        assert!(doc.is_content_editable(span));

        doc.element_mut(span)
            .unwrap()
            .set_attribute("contenteditable", "false");
        assert!(!doc.is_content_editable(span));
    }

    #[test]
    fn test_records_only_while_observed() {
        let mut doc = Document::new();
        paragraph(&mut doc, "unobserved");
        assert!(doc.pending_records().is_empty());

        let mut rx = doc.subscribe();
        let (p, _) = paragraph(&mut doc, "observed");
        assert_eq!(doc.flush(), 2);

        let batch = rx.try_recv().unwrap();
        assert_eq!(batch.records[0].target, doc.root());
        assert_eq!(batch.records[0].added[0].id, p);
        assert!(batch
            .records
            .iter()
            .all(|r| r.origin == MutationOrigin::Page));
    }

    #[test]
    fn test_mutate_as_tags_origin_and_flushes() {
        let mut doc = Document::new();
        let mut rx = doc.subscribe();
        let (p, _) = paragraph(&mut doc, "x");
        doc.flush();
        rx.try_recv().unwrap();

        doc.mutate_as(MutationOrigin::Annotator, |doc| {
            let span = doc.create_element("span");
            doc.element_mut(span).unwrap().add_class("marker");
            doc.append_child(p, span)
        })
        .unwrap();

        let batch = rx.try_recv().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].origin, MutationOrigin::Annotator);
        assert!(batch.records[0].added[0].has_class("marker"));

        paragraph(&mut doc, "after");
        assert_eq!(doc.pending_records()[0].origin, MutationOrigin::Page);
    }

    #[test]
    fn test_moving_a_node_records_removal_and_addition() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "x");
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div).unwrap();
        let mut rx = doc.subscribe();

        doc.append_child(div, t).unwrap();
        doc.flush();

        let batch = rx.try_recv().unwrap();
        assert_eq!(batch.records[0].target, p);
        assert_eq!(batch.records[0].removed, vec![t]);
        assert_eq!(batch.records[1].target, div);
        assert!(doc.children(p).is_empty());
    }
}
