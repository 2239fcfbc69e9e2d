use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Rates;

/// Snapshot of exchange rates relative to one base currency.
///
/// Tables are never mutated after creation; a newer fetch produces a new
/// table that replaces the cached one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub base_currency: String,
    pub rates: Rates,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Builds a table, dropping non-positive rates and pinning the base
    /// currency to exactly one when the provider listed it.
    pub fn new(base_currency: impl Into<String>, rates: Rates, fetched_at: DateTime<Utc>) -> Self {
        let base_currency = base_currency.into();
        let mut rates: Rates = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_sign_positive() && !rate.is_zero())
            .collect();
        if let Some(rate) = rates.get_mut(&base_currency) {
            *rate = Decimal::ONE;
        }
        Self {
            base_currency,
            rates,
            fetched_at,
        }
    }

    /// Rate from the base currency to `currency`, if quoted.
    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// A table is fresh while its age is strictly below the window.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) < window
    }
}
