//! Storage-specific error types for SQLite operations.
//!
//! This module wraps Diesel and r2d2 errors and converts them to the error
//! types of the crates whose traits are implemented here: `fxlens_core::Error`
//! for settings and `fxlens_rates::RatesError` for the rate cache.

use diesel::result::Error as DieselError;
use fxlens_core::errors::Error;
use fxlens_rates::RatesError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage-specific errors that wrap Diesel and r2d2 types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Writer actor stopped")]
    WriterStopped,
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Repository("Record not found".to_string())
            }
            StorageError::SerializationError(e) => {
                Error::Unexpected(format!("Stored value could not be decoded: {}", e))
            }
            e => Error::Repository(e.to_string()),
        }
    }
}

impl From<StorageError> for RatesError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SerializationError(e) => RatesError::Serialization(e),
            e => RatesError::Store(e.to_string()),
        }
    }
}

/// Extension trait for converting storage Results to core Results.
pub trait IntoCore<T> {
    fn into_core(self) -> fxlens_core::Result<T>;
}

impl<T> IntoCore<T> for Result<T> {
    fn into_core(self) -> fxlens_core::Result<T> {
        self.map_err(Error::from)
    }
}
