//! Domain error types.

use common::AggregateId;
use thiserror::Error;

use crate::repository::RepositoryError;
use crate::sale::{CreateSaleError, SaleError, ValidationErrors};

/// Errors that can occur during sale operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The aggregate rejected the operation.
    #[error("Sale error: {0}")]
    Sale(#[from] SaleError),

    /// The sale broke one or more validation rules.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// An error occurred in the repository.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// No sale with this ID exists.
    #[error("Sale not found: {sale_id}")]
    SaleNotFound { sale_id: AggregateId },
}

impl From<CreateSaleError> for DomainError {
    fn from(e: CreateSaleError) -> Self {
        match e {
            CreateSaleError::Rejected(e) => DomainError::Sale(e),
            CreateSaleError::Invalid(errors) => DomainError::Validation(errors),
        }
    }
}

impl DomainError {
    /// Returns true if the error means a sale or item does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::SaleNotFound { .. }
                | DomainError::Repository(RepositoryError::NotFound(_))
                | DomainError::Sale(SaleError::ItemNotFound { .. })
        )
    }
}
