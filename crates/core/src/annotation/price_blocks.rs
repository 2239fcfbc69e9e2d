//! Price widgets that split one amount across several elements, e.g.
//! `<span class="a-price"><span class="a-price-symbol">$</span>
//! <span class="a-price-whole">19.</span><span class="a-price-fraction">99</span></span>`.
//! No single text node holds the full amount, so the main pass misses them.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::document::{Document, NodeId};
use crate::extraction::currency_for_symbol;

use super::marks::AnnotationMarks;
use super::span::is_annotation_node;

lazy_static! {
    static ref FIRST_NUMBER: Regex =
        Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").expect("Invalid regex pattern");
}

/// A price container ready to be annotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBlock {
    pub container: NodeId,
    pub currency: &'static str,
    pub amount: Decimal,
}

fn class_contains(document: &Document, id: NodeId, needles: &[&str]) -> bool {
    document
        .element(id)
        .map(|e| e.class_name())
        .is_some_and(|class| needles.iter().any(|n| class.contains(n)))
}

/// First element below `container` whose class contains one of `needles`,
/// ignoring annotations.
fn first_with_class(document: &Document, container: NodeId, needles: &[&str]) -> Option<NodeId> {
    document
        .descendants(container)
        .into_iter()
        .find(|d| !is_annotation_node(document, *d) && class_contains(document, *d, needles))
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

fn amount_of(document: &Document, container: NodeId) -> Option<Decimal> {
    let amount = match first_with_class(document, container, &["whole"]) {
        Some(whole) => {
            let whole = digits(&document.text_content(whole));
            let fraction = first_with_class(document, container, &["fraction"])
                .map(|f| digits(&document.text_content(f)))
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| "00".to_string());
            Decimal::from_str(&format!("{}.{}", whole, fraction)).ok()?
        }
        None => {
            let text = document.text_content(container);
            let number = FIRST_NUMBER.find(&text)?.as_str().replace(',', "");
            Decimal::from_str(&number).ok()?
        }
    };
    (amount > Decimal::ZERO).then_some(amount)
}

/// Whether `container` sits in, or holds, something the scan must not touch.
fn is_excluded(document: &Document, container: NodeId, marks: &AnnotationMarks) -> bool {
    marks.is_marked(container)
        || std::iter::once(container)
            .chain(document.ancestors(container))
            .any(|a| document.is_non_content(a) || is_annotation_node(document, a))
        || document
            .descendants(container)
            .into_iter()
            .any(|d| is_annotation_node(document, d))
}

/// Price containers under `root` (class containing `price` or `Price`) with
/// a recognizable symbol element and a positive amount.
pub fn find_price_blocks(
    document: &Document,
    root: NodeId,
    marks: &AnnotationMarks,
) -> Vec<PriceBlock> {
    document
        .find_elements(root, |e| {
            let class = e.class_name();
            class.contains("price") || class.contains("Price")
        })
        .into_iter()
        .filter(|container| !is_excluded(document, *container, marks))
        .filter_map(|container| {
            let symbol = first_with_class(document, container, &["symbol", "currency"])?;
            let currency = currency_for_symbol(document.text_content(symbol).trim())?;
            let amount = amount_of(document, container)?;
            Some(PriceBlock {
                container,
                currency,
                amount,
            })
        })
        .collect()
}
