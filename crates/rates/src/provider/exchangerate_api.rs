//! ExchangeRate-API open access endpoint.
//!
//! No key required. The payload carries a `result` field that is `"success"`
//! on usable responses.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::RatesError;
use crate::models::Rates;
use crate::provider::RateProvider;

const PROVIDER_ID: &str = "EXCHANGERATE_API";

#[derive(Debug, Deserialize)]
struct OpenErApiResponse {
    result: String,
    #[serde(default)]
    rates: Option<Rates>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ExchangeRateApiProvider;

impl RateProvider for ExchangeRateApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn url(&self, base: &str) -> String {
        format!("https://open.er-api.com/v6/latest/{}", base)
    }

    fn parse(&self, _base: &str, body: Value) -> Result<Rates, RatesError> {
        let response: OpenErApiResponse =
            serde_json::from_value(body).map_err(|e| RatesError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        if response.result != "success" {
            return Err(RatesError::NoUsableData {
                provider: PROVIDER_ID.to_string(),
                reason: format!(
                    "result={} ({})",
                    response.result,
                    response.error_type.as_deref().unwrap_or("no error type")
                ),
            });
        }

        match response.rates {
            Some(rates) if !rates.is_empty() => Ok(rates),
            _ => Err(RatesError::NoUsableData {
                provider: PROVIDER_ID.to_string(),
                reason: "missing rates".to_string(),
            }),
        }
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
            ExchangeRateApiProvider.url("EUR"),
            "https://open.er-api.com/v6/latest/EUR"
        );
    }

    #[test]
    fn test_parse_success() {
        let body = json!({
            "result": "success",
            "base_code": "USD",
            "rates": { "USD": 1, "EUR": 0.92, "JPY": 151.37 }
        });
        let rates = ExchangeRateApiProvider.parse("USD", body).unwrap();
        assert_eq!(rates.get("EUR"), Some(&dec!(0.92)));
        assert_eq!(rates.get("JPY"), Some(&dec!(151.37)));
    }

    #[test]
    fn test_parse_application_error() {
        let body = json!({ "result": "error", "error-type": "unsupported-code" });
        let err = ExchangeRateApiProvider.parse("XYZ", body).unwrap_err();
        assert!(matches!(err, RatesError::NoUsableData { .. }));
    }

    #[test]
    fn test_parse_wrong_shape() {
        let err = ExchangeRateApiProvider
            .parse("USD", json!(["not", "an", "object"]))
            .unwrap_err();
        assert!(matches!(err, RatesError::MalformedResponse { .. }));
    }
}
