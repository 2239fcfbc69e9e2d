//! Data models for rate resolution.

mod rate_table;

pub use rate_table::RateTable;

use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Currency code (ISO 4217), e.g. "USD".
pub type Currency = String;

/// Rates relative to some base currency.
pub type Rates = BTreeMap<Currency, Decimal>;
