use std::sync::Arc;

use async_trait::async_trait;
use fxlens_rates::{RateCache, RateTable};
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

/// Source of rate tables for the resolver.
#[async_trait]
pub trait RateLookup: Send + Sync {
    /// Rates relative to `base`, or `None` when unavailable right now.
    async fn rates_for(&self, base: &str) -> Option<RateTable>;
}

#[async_trait]
impl RateLookup for RateCache {
    async fn rates_for(&self, base: &str) -> Option<RateTable> {
        self.resolve(base, false).await
    }
}

/// A converted amount. `target_amount` is never rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub source_amount: Decimal,
    pub source_currency: String,
    pub target_amount: Decimal,
    pub target_currency: String,
    pub rate_used: Decimal,
}

/// `rate * (1 + offset/100)`. A zero offset returns `rate` untouched;
/// `None` when the result does not fit a `Decimal`.
pub fn apply_offset(rate: Decimal, offset_percent: Decimal) -> Option<Decimal> {
    if offset_percent.is_zero() {
        return Some(rate);
    }
    let factor = Decimal::ONE.checked_add(offset_percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    rate.checked_mul(factor)
}

/// Conversion Resolver.
pub struct ConversionResolver {
    rates: Arc<dyn RateLookup>,
}

impl ConversionResolver {
    pub fn new(rates: Arc<dyn RateLookup>) -> Self {
        Self { rates }
    }

    /// Convert `amount` from `from` to `to`. `None` means no rate is available
    /// right now, which callers treat as transient.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        offset_percent: Decimal,
    ) -> Option<ConversionResult> {
        let from = from.trim().to_ascii_uppercase();
        let to = to.trim().to_ascii_uppercase();

        if from == to {
            return Some(ConversionResult {
                source_amount: amount,
                source_currency: from,
                target_amount: amount,
                target_currency: to,
                rate_used: Decimal::ONE,
            });
        }

        let table = self.rates.rates_for(&from).await?;
        let Some(rate) = table.rate(&to) else {
            debug!("No {} rate in the {} table", to, from);
            return None;
        };

        let converted = apply_offset(rate, offset_percent)
            .and_then(|rate_used| Some((rate_used, amount.checked_mul(rate_used)?)));
        let Some((rate_used, target_amount)) = converted else {
            debug!("Converting {} {} to {} overflows", amount, from, to);
            return None;
        };

        Some(ConversionResult {
            source_amount: amount,
            source_currency: from,
            target_amount,
            target_currency: to,
            rate_used,
        })
    }
}
