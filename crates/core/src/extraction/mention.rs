use rust_decimal::Decimal;
use serde::Serialize;

/// Which pattern family produced a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// `$100`, `€ 50`
    SymbolFirst,
    /// `100€`
    SymbolLast,
    /// `USD 100`
    CodeFirst,
    /// `100 USD`
    CodeLast,
    /// `12.50`, currency implied by the caller
    BareNumber,
}

/// A located monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyMention {
    pub full_text: String,
    /// Always positive.
    pub amount: Decimal,
    pub currency_code: String,
    /// Byte offset into the scanned text.
    pub start_offset: usize,
    /// Byte length of `full_text`.
    pub length: usize,
    pub pattern_kind: PatternKind,
}

impl CurrencyMention {
    /// Byte offset just past the match.
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.length
    }
}
