//! Mention Extractor: finds monetary amounts in free text.
//!
//! Five independent pattern families are run in a fixed priority order:
//! symbol-first, symbol-last, code-first, code-last and bare-number.

mod extractor;
mod mention;
mod patterns;
mod symbols;

pub use extractor::MentionExtractor;
pub use mention::{CurrencyMention, PatternKind};
pub use patterns::{
    parse_amount, BareNumber, CodeFirst, CodeLast, PatternMatcher, SymbolFirst, SymbolLast,
};
pub use symbols::{
    currency_for_symbol, currency_for_symbol_or_default, currency_in_prefix, display_symbol,
    is_recognized_code, DEFAULT_SYMBOL_CURRENCY, GLYPH_SYMBOLS, PREFIXED_SYMBOLS,
    RECOGNIZED_CODES,
};

/// Convenience for one-off extraction with the explicit families.
pub fn extract(text: &str) -> Vec<CurrencyMention> {
    MentionExtractor::explicit().extract(text)
}
