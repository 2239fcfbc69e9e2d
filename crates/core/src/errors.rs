//! Core error types for fxlens.
//!
//! Storage-specific errors (Diesel, SQLite, etc.) are converted to these types
//! by the storage layer. Failures that are normal control flow (no mention in a
//! fragment, no rate available) are not errors and are represented as `None`.

use fxlens_rates::RatesError;
use thiserror::Error;

use crate::document::NodeId;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Document operation failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Rate operation failed: {0}")]
    Rates(#[from] RatesError),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Structural errors raised by the document tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Node {0} no longer exists")]
    StaleNode(NodeId),

    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    #[error("Node {reference} is not a child of {parent}")]
    NotAChild { parent: NodeId, reference: NodeId },

    #[error("Inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("The root node cannot be moved or removed")]
    RootImmutable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_error_converts() {
        let err: Error = RatesError::Network("refused".to_string()).into();
        assert!(matches!(err, Error::Rates(_)));
        assert!(err.to_string().contains("refused"));
    }
}
