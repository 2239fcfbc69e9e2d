//! Currency glyphs and the recognized code universe.

/// Fallback for glyphs without a mapping.
pub const DEFAULT_SYMBOL_CURRENCY: &str = "USD";

/// Prefixed dollar variants. Checked before the bare glyphs, longest first.
pub const PREFIXED_SYMBOLS: &[(&str, &str)] = &[
    ("HK$", "HKD"),
    ("C$", "CAD"),
    ("A$", "AUD"),
    ("S$", "SGD"),
];

/// Single-glyph symbols.
pub const GLYPH_SYMBOLS: &[(&str, &str)] = &[
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₽", "RUB"),
    ("₩", "KRW"),
    ("₺", "TRY"),
];

/// Codes accepted by the code-first and code-last families.
pub const RECOGNIZED_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "INR", "RUB", "KRW", "TRY", "CAD", "AUD", "HKD", "SGD", "CHF",
    "CNY", "SEK", "NZD", "MXN", "ZAR", "BRL", "NOK", "DKK", "PLN", "THB", "MYR",
];

/// Exact symbol lookup.
pub fn currency_for_symbol(symbol: &str) -> Option<&'static str> {
    PREFIXED_SYMBOLS
        .iter()
        .chain(GLYPH_SYMBOLS)
        .find(|(s, _)| *s == symbol)
        .map(|(_, code)| *code)
}

/// Symbol lookup used by the extractor: unmapped symbols read as USD.
pub fn currency_for_symbol_or_default(symbol: &str) -> &'static str {
    currency_for_symbol(symbol).unwrap_or(DEFAULT_SYMBOL_CURRENCY)
}

pub fn is_recognized_code(code: &str) -> bool {
    RECOGNIZED_CODES.contains(&code)
}

/// Prefix shown before a converted amount: the symbol when there is one,
/// otherwise the code itself.
pub fn display_symbol(code: &str) -> &str {
    PREFIXED_SYMBOLS
        .iter()
        .chain(GLYPH_SYMBOLS)
        .find(|(_, c)| *c == code)
        .map(|(s, _)| *s)
        .unwrap_or(code)
}

/// Currency named somewhere in a free-form prefix such as `"HK$ "` or
/// `"EUR "`. Prefixed symbols win over the bare glyphs they contain.
pub fn currency_in_prefix(prefix: &str) -> Option<&'static str> {
    PREFIXED_SYMBOLS
        .iter()
        .chain(GLYPH_SYMBOLS)
        .find(|(s, _)| prefix.contains(s))
        .map(|(_, code)| *code)
        .or_else(|| {
            prefix
                .split(|c: char| !c.is_ascii_alphabetic())
                .find_map(|token| RECOGNIZED_CODES.iter().find(|code| **code == token))
                .copied()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(currency_for_symbol("€"), Some("EUR"));
        assert_eq!(currency_for_symbol("HK$"), Some("HKD"));
        assert_eq!(currency_for_symbol("฿"), None);
        assert_eq!(currency_for_symbol_or_default("฿"), "USD");
    }

    #[test]
    fn test_display_symbol() {
        assert_eq!(display_symbol("USD"), "$");
        assert_eq!(display_symbol("SGD"), "S$");
        assert_eq!(display_symbol("CHF"), "CHF");
    }

    #[test]
    fn test_currency_in_prefix() {
        assert_eq!(currency_in_prefix("HK$"), Some("HKD"));
        assert_eq!(currency_in_prefix("  $"), Some("USD"));
        assert_eq!(currency_in_prefix("price in GBP:"), Some("GBP"));
        assert_eq!(currency_in_prefix("total"), None);
    }
}
