use rust_decimal::prelude::RoundingStrategy;
use rust_decimal::Decimal;

use crate::extraction::display_symbol;

/// Upper bound on displayed fraction digits.
pub const MAX_DECIMAL_PLACES: u32 = 8;

/// en-US rendering with `,` grouping and exactly `decimal_places` fraction
/// digits, rounding half away from zero.
pub fn format_amount(value: Decimal, decimal_places: u32) -> String {
    let places = decimal_places.min(MAX_DECIMAL_PLACES);
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.*}", places as usize, rounded.abs());

    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + integer.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// `{symbol}{amount}`, e.g. `€1,234.50` or `CHF12.00`.
pub fn format_money(value: Decimal, currency: &str, decimal_places: u32) -> String {
    format!(
        "{}{}",
        display_symbol(currency),
        format_amount(value, decimal_places)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_grouping_and_padding() {
        assert_eq!(format_amount(dec!(1234.5), 2), "1,234.50");
        assert_eq!(format_amount(dec!(1234567.891), 2), "1,234,567.89");
        assert_eq!(format_amount(dec!(999), 0), "999");
        assert_eq!(format_amount(dec!(0.1), 3), "0.100");
        assert_eq!(format_amount(dec!(110), 2), "110.00");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(format_amount(dec!(2.345), 2), "2.35");
        assert_eq!(format_amount(dec!(-2.345), 2), "-2.35");
        assert_eq!(format_amount(dec!(999.995), 2), "1,000.00");
        assert_eq!(format_amount(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1234.5), "EUR", 2), "€1,234.50");
        assert_eq!(format_money(dec!(12), "CHF", 2), "CHF12.00");
    }
}
