//! Rate provider trait definition.

use serde_json::Value;

use crate::errors::RatesError;
use crate::models::Rates;

/// An upstream source of exchange rates.
///
/// A provider is a pair of rules: how to build the request URL for a base
/// currency, and how to turn the JSON body into a rates mapping. Fetching is
/// done by the cache through an [`HttpTransport`](crate::HttpTransport), so
/// providers stay free of I/O.
///
/// # Example
///
/// ```ignore
/// struct MyProvider;
///
/// impl RateProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn url(&self, base: &str) -> String {
///         format!("https://rates.example.com/latest/{}", base)
///     }
///
///     fn parse(&self, base: &str, body: Value) -> Result<Rates, RatesError> {
///         // ...
///     }
/// }
/// ```
pub trait RateProvider: Send + Sync {
    /// Unique identifier, used for logging.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Request URL for rates relative to `base`.
    fn url(&self, base: &str) -> String;

    /// Extract the rates mapping from a response body.
    ///
    /// Must return [`RatesError::NoUsableData`] when the provider signals an
    /// application-level failure, even if the HTTP exchange succeeded.
    fn parse(&self, base: &str, body: Value) -> Result<Rates, RatesError>;
}
