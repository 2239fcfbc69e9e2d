//! Line-by-line conversion of pasted amounts, one per line.

use futures::future::join_all;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::conversion::{format_amount, ConversionResolver};
use crate::extraction::{currency_in_prefix, display_symbol, parse_amount};
use crate::settings::ExtensionSettings;

/// Prefix assumed when a line starts with the number itself.
const DEFAULT_PREFIX: &str = "$";
const DEFAULT_CURRENCY: &str = "USD";

lazy_static! {
    static ref BATCH_LINE: Regex = Regex::new(r"([^0-9]*?)\s*([0-9][0-9,]*(?:\.[0-9]+)?)")
        .expect("Invalid regex pattern");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRow {
    /// Prefix and number as written, e.g. `€1,200`.
    pub original: String,
    pub source_currency: String,
    pub source_amount: Decimal,
    pub target_amount: Decimal,
    /// `{symbol} {amount}` in the target currency.
    pub converted: String,
}

struct BatchLine {
    prefix: String,
    raw_amount: String,
    currency: &'static str,
    amount: Decimal,
}

fn parse_line(line: &str) -> Option<BatchLine> {
    let caps = BATCH_LINE.captures(line)?;
    let prefix = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let prefix = if prefix.is_empty() { DEFAULT_PREFIX } else { prefix };
    let raw_amount = caps.get(2)?.as_str();
    Some(BatchLine {
        prefix: prefix.to_string(),
        raw_amount: raw_amount.to_string(),
        currency: currency_in_prefix(prefix).unwrap_or(DEFAULT_CURRENCY),
        amount: parse_amount(raw_amount)?,
    })
}

/// Convert every non-empty line of `input` into the target currency.
/// Lines without a number, or whose rate is unavailable, yield no row.
pub async fn convert_batch(
    resolver: &ConversionResolver,
    input: &str,
    settings: &ExtensionSettings,
) -> Vec<BatchRow> {
    let lines: Vec<BatchLine> = input
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(parse_line)
        .collect();

    let conversions = join_all(lines.iter().map(|line| {
        resolver.convert(
            line.amount,
            line.currency,
            &settings.target_currency,
            settings.rate_offset_percent,
        )
    }))
    .await;

    lines
        .into_iter()
        .zip(conversions)
        .filter_map(|(line, conversion)| {
            let Some(conversion) = conversion else {
                debug!("No rate for batch line {}{}", line.prefix, line.raw_amount);
                return None;
            };
            Some(BatchRow {
                original: format!("{}{}", line.prefix, line.raw_amount),
                source_currency: conversion.source_currency,
                source_amount: conversion.source_amount,
                target_amount: conversion.target_amount,
                converted: format!(
                    "{} {}",
                    display_symbol(&conversion.target_currency),
                    format_amount(conversion.target_amount, settings.decimal_places)
                ),
            })
        })
        .collect()
}
