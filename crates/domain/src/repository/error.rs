use common::{AggregateId, Version};
use thiserror::Error;

/// Errors that can occur when storing or loading sales.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Another sale already uses this sale number.
    #[error("Sale number {0} is already in use")]
    DuplicateSaleNumber(String),

    /// A sale with this ID is already stored.
    #[error("Sale {0} already exists")]
    AlreadyExists(AggregateId),

    /// The stored version did not match the version being written over.
    #[error(
        "Concurrency conflict for sale {sale_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        sale_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The sale was not found.
    #[error("Sale not found: {0}")]
    NotFound(AggregateId),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
