//! Property-based integration tests for extraction and annotation.
//!
//! Uses `proptest` to check invariants that must hold for any page text.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fxlens_core::annotation::{AnnotationController, NoOpOverlay};
use fxlens_core::conversion::{ConversionResolver, RateLookup};
use fxlens_core::document::{parse_html, shared, to_html};
use fxlens_core::extraction::{extract, is_recognized_code, MentionExtractor};
use fxlens_core::settings::{ExtensionSettings, FixedSettings};
use fxlens_rates::{RateTable, Rates};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// Fixtures
// =============================================================================

/// USD and GBP tables only; everything else is unavailable.
struct TwoTables;

#[async_trait]
impl RateLookup for TwoTables {
    async fn rates_for(&self, base: &str) -> Option<RateTable> {
        let rate = match base {
            "USD" => dec!(0.9),
            "GBP" => dec!(1.15),
            _ => return None,
        };
        let mut rates = Rates::new();
        rates.insert("EUR".to_string(), rate);
        Some(RateTable::new(base, rates, Utc::now()))
    }
}

fn controller(html: &str) -> AnnotationController {
    let settings = ExtensionSettings {
        target_currency: "EUR".to_string(),
        ..Default::default()
    };
    AnnotationController::new(
        shared(parse_html(html).unwrap()),
        Arc::new(ConversionResolver::new(Arc::new(TwoTables))),
        Arc::new(FixedSettings::new(settings)),
        Arc::new(NoOpOverlay),
    )
}

fn html_of(controller: &AnnotationController) -> String {
    to_html(&controller.document().lock().unwrap())
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

/// `1234567` -> `1,234,567`.
fn grouped(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Generators
// =============================================================================

fn arb_symbol() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![
        Just(("$", "USD")),
        Just(("€", "EUR")),
        Just(("£", "GBP")),
        Just(("₹", "INR")),
    ]
}

/// Amount as written plus its value, always with two decimals.
fn arb_amount() -> impl Strategy<Value = (String, Decimal)> {
    (1u32..10_000_000, 0u32..100).prop_map(|(whole, cents)| {
        let written = format!("{}.{:02}", grouped(whole), cents);
        (written, Decimal::new(whole as i64 * 100 + cents as i64, 2))
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z $€£0-9.,]{0,60}"
}

fn arb_paragraphs() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_text(), 1..6)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every mention points at its own text and carries a positive amount
    /// in a recognized currency.
    #[test]
    fn prop_mentions_are_located_and_valid(text in arb_text()) {
        for mention in MentionExtractor::with_implied_currency("CHF").extract(&text) {
            prop_assert_eq!(
                &text[mention.start_offset..mention.end_offset()],
                mention.full_text.as_str()
            );
            prop_assert!(mention.amount > Decimal::ZERO);
            prop_assert!(is_recognized_code(&mention.currency_code));
        }
    }

    /// A symbol followed by a grouped amount is read back exactly.
    #[test]
    fn prop_symbol_amounts_are_read_back(
        (symbol, code) in arb_symbol(),
        (written, value) in arb_amount(),
        filler in "[a-z ]{0,12}",
    ) {
        let text = format!("{} {}{} {}", filler, symbol, written, filler);
        let mentions = extract(&text);

        prop_assert_eq!(mentions.len(), 1);
        prop_assert_eq!(mentions[0].currency_code.as_str(), code);
        prop_assert_eq!(mentions[0].amount, value);
    }

    /// A second scan never changes a page the first scan annotated.
    #[test]
    fn prop_scan_is_idempotent(paragraphs in arb_paragraphs()) {
        let html: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
        let controller = controller(&html);

        let first = block_on(controller.scan()).unwrap();
        let annotated = html_of(&controller);
        let second = block_on(controller.scan()).unwrap();

        prop_assert!(first.annotations_inserted <= paragraphs.len());
        prop_assert_eq!(second.total_inserted(), 0);
        prop_assert_eq!(html_of(&controller), annotated);
    }

    /// Stripping restores the page exactly as it was before scanning.
    #[test]
    fn prop_strip_restores_the_page(paragraphs in arb_paragraphs()) {
        let html: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
        let controller = controller(&html);
        let before = html_of(&controller);

        let report = block_on(controller.scan()).unwrap();
        prop_assert_eq!(controller.strip(), report.total_inserted());
        prop_assert_eq!(html_of(&controller), before);
    }
}
