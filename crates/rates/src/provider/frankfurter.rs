//! Frankfurter (ECB reference rates).
//!
//! The response has no success flag; a payload is usable when it carries a
//! `rates` object. The base currency itself is not listed, so it is added
//! with a rate of one.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::RatesError;
use crate::models::Rates;
use crate::provider::RateProvider;

const PROVIDER_ID: &str = "FRANKFURTER";

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: Option<Rates>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrankfurterProvider;

impl RateProvider for FrankfurterProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn url(&self, base: &str) -> String {
        format!("https://api.frankfurter.app/latest?from={}", base)
    }

    fn parse(&self, base: &str, body: Value) -> Result<Rates, RatesError> {
        let response: FrankfurterResponse =
            serde_json::from_value(body).map_err(|e| RatesError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        let mut rates = response.rates.ok_or_else(|| RatesError::NoUsableData {
            provider: PROVIDER_ID.to_string(),
            reason: "missing rates".to_string(),
        })?;

        let quoted_base = response.base.unwrap_or_else(|| base.to_string());
        rates.insert(quoted_base, Decimal::ONE);
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_url() {
        assert_eq!(
            FrankfurterProvider.url("GBP"),
            "https://api.frankfurter.app/latest?from=GBP"
        );
    }

    #[test]
    fn test_parse_adds_base() {
        let body = json!({
            "amount": 1.0,
            "base": "EUR",
            "date": "2024-03-01",
            "rates": { "USD": 1.0832, "GBP": 0.8559 }
        });
        let rates = FrankfurterProvider.parse("EUR", body).unwrap();
        assert_eq!(rates.get("EUR"), Some(&Decimal::ONE));
        assert_eq!(rates.get("USD"), Some(&dec!(1.0832)));
    }

    #[test]
    fn test_parse_without_rates_is_unusable() {
        let body = json!({ "message": "not found" });
        let err = FrankfurterProvider.parse("XYZ", body).unwrap_err();
        assert!(matches!(err, RatesError::NoUsableData { .. }));
    }
}
