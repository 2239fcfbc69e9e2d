//! fxlens Core - currency mention extraction and in-place annotation.
//!
//! Finds monetary amounts in text, converts them through a
//! [`conversion::RateLookup`] (normally the `fxlens-rates` cache) and
//! annotates a [`document::Document`] exactly once per element. Settings
//! persistence is behind traits implemented by the `storage-sqlite` crate.

pub mod annotation;
pub mod batch;
pub mod conversion;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
