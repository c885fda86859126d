use async_trait::async_trait;
use common::AggregateId;

use super::{Result, SaleQuery};
use crate::sale::Sale;

/// Persistence contract for sale aggregates.
///
/// Implementations own sale-number uniqueness and optimistic versioning.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Stores a new sale at version 1.
    ///
    /// Fails with `DuplicateSaleNumber` if the sale number is taken.
    async fn create(&self, sale: Sale) -> Result<Sale>;

    /// Loads a sale by ID.
    async fn get_by_id(&self, id: AggregateId) -> Result<Option<Sale>>;

    /// Loads a sale by its business key.
    async fn get_by_sale_number(&self, sale_number: &str) -> Result<Option<Sale>>;

    /// Lists sales matching a query, newest sale date first.
    async fn list(&self, query: SaleQuery) -> Result<Vec<Sale>>;

    /// Replaces a stored sale.
    ///
    /// The sale's version must equal the stored version, otherwise the write
    /// fails with `ConcurrencyConflict`. Returns the sale at its new version.
    async fn update(&self, sale: Sale) -> Result<Sale>;

    /// Deletes a sale. Returns false if it did not exist.
    async fn delete(&self, id: AggregateId) -> Result<bool>;

    /// Returns the number of stored sales.
    async fn count(&self) -> Result<usize>;
}

/// Extension trait providing convenience methods for repositories.
#[async_trait]
pub trait SaleRepositoryExt: SaleRepository {
    /// Checks if a sale exists.
    async fn exists(&self, id: AggregateId) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    /// Checks if a sale number is already taken.
    async fn sale_number_exists(&self, sale_number: &str) -> Result<bool> {
        Ok(self.get_by_sale_number(sale_number).await?.is_some())
    }
}

// Blanket implementation for all SaleRepository implementations
impl<T: SaleRepository + ?Sized> SaleRepositoryExt for T {}
