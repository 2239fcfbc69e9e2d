use crate::document::{ComputedFont, Document, Element, NodeId};
use crate::errors::DocumentError;

/// Class carried by every element the annotator inserts.
pub const ANNOTATION_CLASS: &str = "currency-conversion-inline";

const ANNOTATION_COLOR: &str = "#10b981";

pub fn is_annotation(element: &Element) -> bool {
    element.has_class(ANNOTATION_CLASS)
}

/// Whether `id` is an annotation element.
pub fn is_annotation_node(document: &Document, id: NodeId) -> bool {
    document.element(id).is_some_and(is_annotation)
}

/// Detached `<span>` reading ` ({label})`, sized and set in the font of the
/// element it annotates.
pub fn create_annotation(
    document: &mut Document,
    label: &str,
    font: &ComputedFont,
) -> Result<NodeId, DocumentError> {
    let mut span = Element::new("span");
    span.add_class(ANNOTATION_CLASS);
    let style = span.style_mut();
    style.set("color", ANNOTATION_COLOR);
    style.set("font-weight", "600");
    style.set(
        "font-size",
        font.font_size.as_deref().unwrap_or("inherit"),
    );
    style.set(
        "font-family",
        font.font_family.as_deref().unwrap_or("inherit"),
    );
    style.set("margin-left", "4px");
    style.set("display", "inline");

    let span = document.create_element_from(span);
    let text = document.create_text(&format!(" ({})", label));
    document.append_child(span, text)?;
    Ok(span)
}
