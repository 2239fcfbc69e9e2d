//! SQLite storage implementation for fxlens.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the persistence traits defined elsewhere in the workspace:
//! - [`CacheStore`](fxlens_rates::CacheStore) from `fxlens-rates`, for cached rate tables
//! - [`SettingsRepositoryTrait`](fxlens_core::settings::SettingsRepositoryTrait) from
//!   `fxlens-core`, for extension settings
//!
//! All writes go through a single writer actor that owns one connection.
//!
//! ```text
//! core (settings)        rates (cache)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod rates;
pub mod schema;
pub mod settings;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, open, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use rates::SqliteCacheStore;
pub use settings::SettingsRepository;
