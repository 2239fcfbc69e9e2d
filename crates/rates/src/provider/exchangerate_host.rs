//! exchangerate.host latest rates.
//!
//! Usable only when the payload's own `success` flag is true.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::RatesError;
use crate::models::Rates;
use crate::provider::RateProvider;

const PROVIDER_ID: &str = "EXCHANGERATE_HOST";

#[derive(Debug, Deserialize)]
struct ExchangeRateHostResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    rates: Option<Rates>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ExchangeRateHostProvider;

impl RateProvider for ExchangeRateHostProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    fn url(&self, base: &str) -> String {
        format!("https://api.exchangerate.host/latest?base={}", base)
    }

    fn parse(&self, _base: &str, body: Value) -> Result<Rates, RatesError> {
        let response: ExchangeRateHostResponse =
            serde_json::from_value(body).map_err(|e| RatesError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        if !response.success {
            return Err(RatesError::NoUsableData {
                provider: PROVIDER_ID.to_string(),
                reason: "success=false".to_string(),
            });
        }

        response
            .rates
            .filter(|rates| !rates.is_empty())
            .ok_or_else(|| RatesError::NoUsableData {
                provider: PROVIDER_ID.to_string(),
                reason: "missing rates".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_success() {
        let body = json!({ "success": true, "base": "USD", "rates": { "USD": 1.0, "EUR": 0.9 } });
        let rates = ExchangeRateHostProvider.parse("USD", body).unwrap();
        assert_eq!(rates.get("EUR"), Some(&dec!(0.9)));
    }

    #[test]
    fn test_success_false_is_unusable() {
        let body = json!({ "success": false, "rates": { "EUR": 0.9 } });
        let err = ExchangeRateHostProvider.parse("USD", body).unwrap_err();
        assert!(matches!(err, RatesError::NoUsableData { .. }));
    }

    #[test]
    fn test_missing_flag_is_unusable() {
        let body = json!({ "rates": { "EUR": 0.9 } });
        assert!(ExchangeRateHostProvider.parse("USD", body).is_err());
    }
}
