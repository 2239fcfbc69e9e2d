//! Error types for rate resolution.
//!
//! None of these reach callers of [`RateCache::resolve`](crate::RateCache::resolve):
//! provider failures are logged and the next provider is tried, store failures
//! degrade to a cache miss. They surface directly only from the lower-level
//! traits ([`HttpTransport`](crate::HttpTransport), [`CacheStore`](crate::CacheStore))
//! and from the cache maintenance operations.

use thiserror::Error;

/// Errors that can occur while fetching, parsing or storing rate tables.
#[derive(Error, Debug)]
pub enum RatesError {
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Requested URL
        url: String,
        /// Status code returned
        status: u16,
    },

    /// The request could not be sent or the body could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// The body was not valid JSON or did not have the provider's shape.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The provider whose response failed to parse
        provider: String,
        /// Parser message
        message: String,
    },

    /// The provider was reachable but reported an application-level failure
    /// or returned no rates.
    #[error("No usable data from {provider}: {reason}")]
    NoUsableData {
        /// The provider that returned the payload
        provider: String,
        /// What made the payload unusable
        reason: String,
    },

    /// The provider did not answer within the per-attempt timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The persistent cache store failed.
    #[error("Cache store error: {0}")]
    Store(String),

    /// A cached value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RatesError {
    fn from(err: reqwest::Error) -> Self {
        RatesError::Network(err.to_string())
    }
}

impl RatesError {
    /// Whether this error was produced by a single provider attempt.
    ///
    /// Provider failures are recovered locally by trying the next provider.
    pub fn is_provider_failure(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failures_are_classified() {
        assert!(RatesError::Timeout {
            provider: "FRANKFURTER".to_string()
        }
        .is_provider_failure());
        assert!(RatesError::NoUsableData {
            provider: "EXCHANGERATE_HOST".to_string(),
            reason: "success=false".to_string(),
        }
        .is_provider_failure());
        assert!(!RatesError::Store("disk full".to_string()).is_provider_failure());
    }

    #[test]
    fn test_error_display() {
        let error = RatesError::Http {
            url: "https://open.er-api.com/v6/latest/USD".to_string(),
            status: 429,
        };
        assert_eq!(
            format!("{}", error),
            "HTTP 429 from https://open.er-api.com/v6/latest/USD"
        );

        let error = RatesError::NoUsableData {
            provider: "EXCHANGERATE_API".to_string(),
            reason: "result=error".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "No usable data from EXCHANGERATE_API: result=error"
        );
    }
}
