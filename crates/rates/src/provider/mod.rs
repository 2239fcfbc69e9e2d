//! Rate provider abstractions and implementations.
//!
//! This module contains:
//! - The `RateProvider` trait that all providers implement
//! - Concrete providers for the free upstream endpoints
//!
//! Providers only describe *what* to request and *how* to read the answer;
//! the cache owns the fallback loop and the transport owns the I/O.

mod exchangerate_api;
mod exchangerate_host;
mod frankfurter;
mod traits;

use std::sync::Arc;

pub use exchangerate_api::ExchangeRateApiProvider;
pub use exchangerate_host::ExchangeRateHostProvider;
pub use frankfurter::FrankfurterProvider;
pub use traits::RateProvider;

/// The built-in providers in fallback order.
pub fn default_providers() -> Vec<Arc<dyn RateProvider>> {
    vec![
        Arc::new(ExchangeRateApiProvider),
        Arc::new(FrankfurterProvider),
        Arc::new(ExchangeRateHostProvider),
    ]
}
