//! Sale service: loads a sale, applies one operation and stores it.

use common::AggregateId;
use metrics::counter;

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::repository::{RepositoryError, SaleQuery, SaleRepository, SaleRepositoryExt};

use super::{
    AddItem, CancelItem, CancelSale, CreateSale, RemoveItem, Sale, SaleError, UpdateItemQuantity,
    UpdateItemUnitPrice,
};

/// Service for managing sales.
///
/// Each mutating call loads one aggregate, applies a single operation and
/// writes it back with the version it was loaded at, so a concurrent writer
/// surfaces as `RepositoryError::ConcurrencyConflict`. A rejected operation
/// stores nothing.
pub struct SaleService<R: SaleRepository> {
    repository: R,
}

impl<R: SaleRepository> SaleService<R> {
    /// Creates a new sale service over the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Records a new sale with its items.
    #[tracing::instrument(skip(self))]
    pub async fn create_sale(&self, cmd: CreateSale) -> Result<Sale, DomainError> {
        let sale_number = cmd.details.sale_number.trim().to_string();

        if self.repository.sale_number_exists(&sale_number).await? {
            rejected("create_sale");
            return Err(RepositoryError::DuplicateSaleNumber(sale_number).into());
        }

        let sale = Sale::create(cmd.details, cmd.items).inspect_err(|_| rejected("create_sale"))?;
        let sale = self.repository.create(sale).await?;

        counter!("sales_created_total").increment(1);
        tracing::info!(sale_id = %sale.id(), sale_number = %sale_number, "Sale created");
        Ok(sale)
    }

    /// Loads a sale by ID.
    ///
    /// Returns None if the sale doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_sale(&self, sale_id: AggregateId) -> Result<Option<Sale>, DomainError> {
        Ok(self.repository.get_by_id(sale_id).await?)
    }

    /// Loads a sale by its sale number.
    #[tracing::instrument(skip(self))]
    pub async fn get_sale_by_number(&self, sale_number: &str) -> Result<Option<Sale>, DomainError> {
        Ok(self.repository.get_by_sale_number(sale_number.trim()).await?)
    }

    /// Lists sales matching a query.
    #[tracing::instrument(skip(self))]
    pub async fn list_sales(&self, query: SaleQuery) -> Result<Vec<Sale>, DomainError> {
        Ok(self.repository.list(query).await?)
    }

    /// Returns the number of stored sales.
    #[tracing::instrument(skip(self))]
    pub async fn count_sales(&self) -> Result<usize, DomainError> {
        Ok(self.repository.count().await?)
    }

    /// Cancels a sale.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_sale(&self, cmd: CancelSale) -> Result<Sale, DomainError> {
        let sale = self
            .execute(cmd.sale_id, "cancel_sale", |sale| sale.cancel())
            .await?;

        counter!("sales_cancelled_total").increment(1);
        tracing::info!(sale_id = %sale.id(), sale_number = sale.sale_number(), "Sale cancelled");
        Ok(sale)
    }

    /// Adds an item to a sale.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(&self, cmd: AddItem) -> Result<Sale, DomainError> {
        let item = cmd.item;

        let sale = self
            .execute(cmd.sale_id, "add_item", |sale| {
                sale.add_item(
                    &item.product_name,
                    &item.product_code,
                    item.quantity,
                    item.unit_price,
                )
            })
            .await?;

        counter!("sale_items_added_total").increment(1);
        Ok(sale)
    }

    /// Removes an item from a sale.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, cmd: RemoveItem) -> Result<Sale, DomainError> {
        self.execute(cmd.sale_id, "remove_item", |sale| {
            sale.remove_item(&cmd.product_code)
        })
        .await
    }

    /// Updates the quantity of an item in a sale.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(&self, cmd: UpdateItemQuantity) -> Result<Sale, DomainError> {
        self.execute(cmd.sale_id, "update_item_quantity", |sale| {
            sale.update_item_quantity(&cmd.product_code, cmd.new_quantity)
        })
        .await
    }

    /// Updates the unit price of an item in a sale.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_unit_price(
        &self,
        cmd: UpdateItemUnitPrice,
    ) -> Result<Sale, DomainError> {
        self.execute(cmd.sale_id, "update_item_unit_price", |sale| {
            sale.update_item_unit_price(&cmd.product_code, cmd.new_unit_price)
        })
        .await
    }

    /// Cancels a single item in a sale.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_item(&self, cmd: CancelItem) -> Result<Sale, DomainError> {
        let sale = self
            .execute(cmd.sale_id, "cancel_item", |sale| {
                sale.cancel_item(&cmd.product_code)
            })
            .await?;

        tracing::info!(sale_id = %sale.id(), product_code = %cmd.product_code, "Sale item cancelled");
        Ok(sale)
    }

    /// Deletes a sale.
    #[tracing::instrument(skip(self))]
    pub async fn delete_sale(&self, sale_id: AggregateId) -> Result<(), DomainError> {
        if !self.repository.delete(sale_id).await? {
            return Err(DomainError::SaleNotFound { sale_id });
        }

        counter!("sales_deleted_total").increment(1);
        tracing::info!(sale_id = %sale_id, "Sale deleted");
        Ok(())
    }

    /// Loads a sale, applies `operation` and stores the result.
    async fn execute<F>(
        &self,
        sale_id: AggregateId,
        operation: &'static str,
        apply: F,
    ) -> Result<Sale, DomainError>
    where
        F: FnOnce(&mut Sale) -> Result<(), SaleError>,
    {
        let mut sale = self
            .repository
            .get_by_id(sale_id)
            .await?
            .ok_or(DomainError::SaleNotFound { sale_id })?;

        if let Err(e) = apply(&mut sale) {
            rejected(operation);
            tracing::debug!(sale_id = %sale_id, error = %e, "Sale operation rejected");
            return Err(e.into());
        }

        Ok(self.repository.update(sale).await?)
    }
}

fn rejected(operation: &'static str) {
    counter!("sale_operations_rejected_total", "operation" => operation).increment(1);
}
