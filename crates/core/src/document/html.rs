//! HTML import and serialization for [`Document`].

use scraper::{ElementRef, Html, Node};

use super::tree::{Document, NodeData, NodeId};
use crate::errors::DocumentError;

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text is emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse a full document or a fragment. Fragments end up under a synthesized
/// `<html><head></head><body>` skeleton, as in a browser.
pub fn parse_html(source: &str) -> Result<Document, DocumentError> {
    let html = Html::parse_document(source);
    let mut document = Document::new();
    let root = document.root();
    import_element(&mut document, root, html.root_element())?;
    Ok(document)
}

fn import_element(
    document: &mut Document,
    parent: NodeId,
    source: ElementRef<'_>,
) -> Result<(), DocumentError> {
    let element = document.create_element(source.value().name());
    if let Some(target) = document.element_mut(element) {
        for (name, value) in source.value().attrs() {
            target.set_attribute(name, value);
        }
    }
    document.append_child(parent, element)?;

    for child in source.children() {
        match child.value() {
            Node::Text(text) => {
                let node = document.create_text(text);
                document.append_child(element, node)?;
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    import_element(document, element, child)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Serialize `id` and its subtree.
pub fn outer_html(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(document, id, false, &mut out);
    out
}

/// Serialize the children of `id`.
pub fn inner_html(document: &Document, id: NodeId) -> String {
    let raw = document
        .element(id)
        .is_some_and(|e| RAW_TEXT_ELEMENTS.iter().any(|t| e.is(t)));
    let mut out = String::new();
    for child in document.children(id) {
        write_node(document, *child, raw, &mut out);
    }
    out
}

/// The whole document.
pub fn to_html(document: &Document) -> String {
    inner_html(document, document.root())
}

fn write_node(document: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match document.data(id) {
        Some(NodeData::Text(text)) if raw_text => out.push_str(text),
        Some(NodeData::Text(text)) => escape_into(text, false, out),
        Some(NodeData::Element(element)) => {
            out.push('<');
            out.push_str(element.tag());
            if let Some(class) = element.attribute("class") {
                write_attribute("class", &class, out);
            }
            for (name, value) in element.attributes() {
                write_attribute(name, value, out);
            }
            if let Some(style) = element.attribute("style") {
                write_attribute("style", &style, out);
            }
            out.push('>');

            if VOID_ELEMENTS.iter().any(|t| element.is(t)) {
                return;
            }
            out.push_str(&inner_html(document, id));
            out.push_str("</");
            out.push_str(element.tag());
            out.push('>');
        }
        Some(NodeData::Root) => out.push_str(&inner_html(document, id)),
        None => {}
    }
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(value, true, out);
    out.push('"');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
