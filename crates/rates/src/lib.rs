//! fxlens Rates Crate
//!
//! This crate resolves exchange-rate tables for a base currency, backed by a
//! persistent cache and an ordered list of free rate providers.
//!
//! # Overview
//!
//! - Multiple providers tried in a fixed priority order (first usable wins)
//! - Cache entries keyed by base currency with a configurable freshness window
//! - Bulk pre-fetch of the major currencies with a fixed inter-request pause
//! - Storage- and transport-agnostic: both are traits
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |    RateCache     |  resolve(base, force_refresh)
//! +------------------+
//!     |          |
//!     | fresh?   | miss / stale / forced
//!     v          v
//! +--------+  +------------------+     +------------------+
//! | Cache  |  |  RateProvider[]  | --> |  HttpTransport   |
//! | Store  |  | (url + parse)    |     |  (reqwest)       |
//! +--------+  +------------------+     +------------------+
//!     ^                |
//!     +----------------+  first usable table replaces the entry
//! ```
//!
//! # Core Types
//!
//! - [`RateTable`] - Snapshot of rates relative to one base currency
//! - [`RateCache`] - Freshness-aware cache with provider fallback
//! - [`RateProvider`] - URL and response-parsing rule for one upstream source
//! - [`CacheStore`] - Key/value persistence for cached tables
//! - [`HttpTransport`] - `GET url -> JSON` abstraction

pub mod cache;
pub mod clock;
pub mod errors;
pub mod models;
pub mod provider;
pub mod store;
pub mod transport;

pub use cache::{
    CacheSummary, FreshnessPolicy, PrefetchOutcome, RateCache, RateCacheConfig, MAJOR_CURRENCIES,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::RatesError;
pub use models::{Currency, RateTable, Rates};
pub use provider::{
    default_providers, ExchangeRateApiProvider, ExchangeRateHostProvider, FrankfurterProvider,
    RateProvider,
};
pub use store::{cache_key, CacheStore, InMemoryCacheStore, CACHE_KEY_PREFIX};
pub use transport::{HttpTransport, MockTransport, ReqwestTransport};
