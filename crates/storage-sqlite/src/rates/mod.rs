//! SQLite storage implementation for cached rate tables.

mod model;
mod repository;

pub use model::RateCacheEntryDB;
pub use repository::SqliteCacheStore;

// Re-export trait from rates for convenience
pub use fxlens_rates::CacheStore;
