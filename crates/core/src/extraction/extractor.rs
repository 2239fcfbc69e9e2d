use super::mention::CurrencyMention;
use super::patterns::{BareNumber, CodeFirst, CodeLast, PatternMatcher, SymbolFirst, SymbolLast};

/// Ordered composition of [`PatternMatcher`]s.
///
/// Results are concatenated in family order, not merged by position, so the
/// first element is the best mention of the highest-priority family.
pub struct MentionExtractor {
    matchers: Vec<Box<dyn PatternMatcher>>,
}

impl MentionExtractor {
    pub fn new(matchers: Vec<Box<dyn PatternMatcher>>) -> Self {
        Self { matchers }
    }

    /// Symbol and code families only. Used for in-page annotation.
    pub fn explicit() -> Self {
        Self::new(vec![
            Box::new(SymbolFirst),
            Box::new(SymbolLast),
            Box::new(CodeFirst),
            Box::new(CodeLast),
        ])
    }

    /// Explicit families followed by bare numbers read as `implied_currency`.
    /// Used for selections, where an explicit mention always sorts first.
    pub fn with_implied_currency(implied_currency: &str) -> Self {
        let mut extractor = Self::explicit();
        extractor
            .matchers
            .push(Box::new(BareNumber::new(implied_currency)));
        extractor
    }

    pub fn extract(&self, text: &str) -> Vec<CurrencyMention> {
        self.matchers
            .iter()
            .flat_map(|m| m.find_all(text))
            .collect()
    }

    /// First mention in priority order.
    pub fn first(&self, text: &str) -> Option<CurrencyMention> {
        self.matchers
            .iter()
            .find_map(|m| m.find_all(text).into_iter().next())
    }
}

impl Default for MentionExtractor {
    fn default() -> Self {
        Self::explicit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{PatternKind, RECOGNIZED_CODES};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_paid_example() {
        let mentions = MentionExtractor::explicit().extract("I paid $1,250.50 for it");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].amount, dec!(1250.50));
        assert_eq!(mentions[0].currency_code, "USD");
        assert_eq!(mentions[0].pattern_kind, PatternKind::SymbolFirst);
        assert_eq!(mentions[0].full_text, "$1,250.50");
        assert_eq!(mentions[0].start_offset, 7);
    }

    #[test]
    fn test_priority_order_not_position_order() {
        let mentions = MentionExtractor::explicit().extract("EUR 5 then $10");
        let kinds: Vec<_> = mentions.iter().map(|m| m.pattern_kind).collect();
        assert_eq!(kinds, vec![PatternKind::SymbolFirst, PatternKind::CodeFirst]);
        assert_eq!(
            MentionExtractor::explicit().first("EUR 5 then $10").unwrap().amount,
            dec!(10)
        );
    }

    #[test]
    fn test_bare_numbers_only_when_asked() {
        assert!(MentionExtractor::explicit().extract("19.99").is_empty());

        let selection = MentionExtractor::with_implied_currency("GBP");
        let bare = selection.first("19.99").unwrap();
        assert_eq!(bare.currency_code, "GBP");
        assert_eq!(bare.pattern_kind, PatternKind::BareNumber);

        let explicit = selection.first("19.99 or ¥2,000").unwrap();
        assert_eq!(explicit.currency_code, "JPY");
    }

    #[test]
    fn test_all_mentions_are_positive_and_known() {
        let text = "$0 free, $0.00 too, €3, 4£, USD 5, 6 CHF, XYZ 7, 8 QQQ, £1,000,000.25";
        for mention in MentionExtractor::explicit().extract(text) {
            assert!(mention.amount > Decimal::ZERO, "{:?}", mention);
            assert!(
                RECOGNIZED_CODES.contains(&mention.currency_code.as_str()),
                "{:?}",
                mention
            );
        }
        assert_eq!(MentionExtractor::explicit().extract(text).len(), 5);
    }

    #[test]
    fn test_no_mentions() {
        assert!(MentionExtractor::explicit()
            .extract("Nothing to see here, 2024 was a year")
            .is_empty());
        assert!(MentionExtractor::explicit().first("").is_none());
    }
}
