//! Rate resolution cache.
//!
//! This module provides:
//! - [`RateCache`]: freshness-aware cache with ordered provider fallback
//! - [`FreshnessPolicy`] / [`RateCacheConfig`]: tunables
//! - Bulk pre-fetch of [`MAJOR_CURRENCIES`]

mod freshness;
mod rate_cache;

pub use freshness::{
    FreshnessPolicy, RateCacheConfig, AUTO_UPDATE_WINDOW_MINUTES, MANUAL_UPDATE_WINDOW_MINUTES,
};
pub use rate_cache::{CacheSummary, PrefetchOutcome, RateCache};

/// Base currencies kept warm by the background updater.
pub const MAJOR_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "INR", "JPY", "AUD", "CAD", "CHF", "CNY", "SEK", "NZD", "SGD", "HKD",
    "KRW", "MXN", "BRL", "ZAR",
];
