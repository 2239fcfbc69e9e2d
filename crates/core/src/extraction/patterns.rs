//! The five pattern families.
//!
//! Amount grammar shared by every family: a leading group of 1-3 digits,
//! further groups of exactly three digits each preceded by `,` or
//! whitespace, then an optional `.` with 1-4 digits.
//!
//! The `regex` crate has no lookahead, so the pattern alone cannot refuse a
//! match that stops inside a longer digit run (`$1250` would read as
//! `$125`). The shared scan loop therefore checks the character after the
//! amount and drops such candidates instead of reporting a truncated amount.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::mention::{CurrencyMention, PatternKind};
use super::symbols::{currency_for_symbol_or_default, is_recognized_code};

macro_rules! amount {
    () => {
        r"[0-9]{1,3}(?:[,\s][0-9]{3})*(?:\.[0-9]{1,4})?"
    };
}

lazy_static! {
    /// `$100`, `HK$ 20`. Prefixed variants need a word boundary so that
    /// `ABC$5` reads as `$5`.
    static ref SYMBOL_FIRST: Regex = Regex::new(concat!(
        r"(?:\b(HK\$|[CAS]\$)|([€£¥₹₽₩₺$]))\s*(",
        amount!(),
        ")"
    ))
    .expect("Invalid regex pattern");

    /// `100€`
    static ref SYMBOL_LAST: Regex = Regex::new(concat!(
        r"\b(",
        amount!(),
        r")\s*([€£¥₹₽₩₺])"
    ))
    .expect("Invalid regex pattern");

    /// `USD 100`
    static ref CODE_FIRST: Regex = Regex::new(concat!(
        r"\b([A-Z]{3})\s+(",
        amount!(),
        r")\b"
    ))
    .expect("Invalid regex pattern");

    /// `100 USD`
    static ref CODE_LAST: Regex = Regex::new(concat!(
        r"\b(",
        amount!(),
        r")\s+([A-Z]{3})\b"
    ))
    .expect("Invalid regex pattern");

    /// `12.50`: the decimal part is mandatory.
    static ref BARE_NUMBER: Regex =
        Regex::new(r"\b([0-9]{1,3}(?:[,\s][0-9]{3})*\.[0-9]{1,4})\b")
            .expect("Invalid regex pattern");
}

/// A family of currency notations.
pub trait PatternMatcher: Send + Sync {
    fn kind(&self) -> PatternKind;

    /// Every non-overlapping occurrence in `text`, left to right.
    fn find_all(&self, text: &str) -> Vec<CurrencyMention>;
}

/// Strip thousands separators and parse. Only positive amounts are usable.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned)
        .ok()
        .filter(|amount| *amount > Decimal::ZERO)
}

/// Shared scan loop. `currency` resolves the code from the captures or
/// rejects the candidate.
fn scan<F>(
    regex: &Regex,
    text: &str,
    kind: PatternKind,
    amount_group: usize,
    currency: F,
) -> Vec<CurrencyMention>
where
    F: Fn(&Captures<'_>) -> Option<String>,
{
    regex
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let amount_match = caps.get(amount_group)?;

            // Stopped inside a digit run such as "1250.50": not an amount.
            if text[amount_match.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
            {
                return None;
            }

            let amount = parse_amount(amount_match.as_str())?;
            let currency_code = currency(&caps)?;
            Some(CurrencyMention {
                full_text: whole.as_str().to_string(),
                amount,
                currency_code,
                start_offset: whole.start(),
                length: whole.len(),
                pattern_kind: kind,
            })
        })
        .collect()
}

fn recognized(code: &str) -> Option<String> {
    is_recognized_code(code).then(|| code.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolFirst;

impl PatternMatcher for SymbolFirst {
    fn kind(&self) -> PatternKind {
        PatternKind::SymbolFirst
    }

    fn find_all(&self, text: &str) -> Vec<CurrencyMention> {
        scan(&SYMBOL_FIRST, text, self.kind(), 3, |caps| {
            let symbol = caps.get(1).or_else(|| caps.get(2))?;
            Some(currency_for_symbol_or_default(symbol.as_str()).to_string())
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolLast;

impl PatternMatcher for SymbolLast {
    fn kind(&self) -> PatternKind {
        PatternKind::SymbolLast
    }

    fn find_all(&self, text: &str) -> Vec<CurrencyMention> {
        scan(&SYMBOL_LAST, text, self.kind(), 1, |caps| {
            Some(currency_for_symbol_or_default(caps.get(2)?.as_str()).to_string())
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CodeFirst;

impl PatternMatcher for CodeFirst {
    fn kind(&self) -> PatternKind {
        PatternKind::CodeFirst
    }

    fn find_all(&self, text: &str) -> Vec<CurrencyMention> {
        scan(&CODE_FIRST, text, self.kind(), 2, |caps| {
            recognized(caps.get(1)?.as_str())
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CodeLast;

impl PatternMatcher for CodeLast {
    fn kind(&self) -> PatternKind {
        PatternKind::CodeLast
    }

    fn find_all(&self, text: &str) -> Vec<CurrencyMention> {
        scan(&CODE_LAST, text, self.kind(), 1, |caps| {
            recognized(caps.get(2)?.as_str())
        })
    }
}

/// Decimal-bearing numbers without symbol or code.
#[derive(Debug, Clone)]
pub struct BareNumber {
    implied_currency: String,
}

impl BareNumber {
    pub fn new(implied_currency: &str) -> Self {
        Self {
            implied_currency: implied_currency.trim().to_ascii_uppercase(),
        }
    }
}

impl PatternMatcher for BareNumber {
    fn kind(&self) -> PatternKind {
        PatternKind::BareNumber
    }

    fn find_all(&self, text: &str) -> Vec<CurrencyMention> {
        scan(&BARE_NUMBER, text, self.kind(), 1, |_| {
            Some(self.implied_currency.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amounts(matches: Vec<CurrencyMention>) -> Vec<(Decimal, String)> {
        matches
            .into_iter()
            .map(|m| (m.amount, m.currency_code))
            .collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250.50"), Some(dec!(1250.50)));
        assert_eq!(parse_amount("1 000"), Some(dec!(1000)));
        assert_eq!(parse_amount("0.00"), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_symbol_first() {
        let found = SymbolFirst.find_all("Was $1,250.50, now € 99.9 or HK$ 20");
        assert_eq!(
            amounts(found),
            vec![
                (dec!(1250.50), "USD".to_string()),
                (dec!(99.9), "EUR".to_string()),
                (dec!(20), "HKD".to_string()),
            ]
        );
    }

    #[test]
    fn test_prefixed_symbol_needs_word_boundary() {
        let found = SymbolFirst.find_all("ABC$5 and C$7");
        assert_eq!(
            amounts(found),
            vec![(dec!(5), "USD".to_string()), (dec!(7), "CAD".to_string())]
        );
    }

    #[test]
    fn test_truncated_digit_runs_are_rejected() {
        assert!(SymbolFirst.find_all("$1250").is_empty());
        assert!(SymbolFirst.find_all("$1250.50").is_empty());
        assert!(SymbolFirst.find_all("$1.23456").is_empty());
        assert!(SymbolLast.find_all("1250€").is_empty());
    }

    #[test]
    fn test_symbol_last() {
        let found = SymbolLast.find_all("Price: 49,99 no; 49.99€ yes; 1 200 £");
        assert_eq!(
            amounts(found),
            vec![(dec!(49.99), "EUR".to_string()), (dec!(1200), "GBP".to_string())]
        );
    }

    #[test]
    fn test_code_families_check_allow_list() {
        let first = CodeFirst.find_all("THE 100 days; EUR 50.25; USD 7");
        assert_eq!(
            amounts(first),
            vec![(dec!(50.25), "EUR".to_string()), (dec!(7), "USD".to_string())]
        );

        let last = CodeLast.find_all("100 EUR, 20 ABC, 3.5 CHF");
        assert_eq!(
            amounts(last),
            vec![(dec!(100), "EUR".to_string()), (dec!(3.5), "CHF".to_string())]
        );
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        assert!(CodeLast.find_all("100 eur").is_empty());
    }

    #[test]
    fn test_bare_number_requires_decimals() {
        let matcher = BareNumber::new("inr");
        let found = matcher.find_all("qty 3, total 1,499.00");
        assert_eq!(amounts(found), vec![(dec!(1499.00), "INR".to_string())]);
        assert!(matcher.find_all("3 items").is_empty());
    }

    #[test]
    fn test_offsets_are_byte_offsets() {
        let text = "€ sign first: €5";
        let found = SymbolFirst.find_all(text);
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!(&text[m.start_offset..m.end_offset()], "€5");
        assert_eq!(m.full_text, "€5");
    }
}
