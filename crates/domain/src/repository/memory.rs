use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, Version};
use tokio::sync::RwLock;

use super::{RepositoryError, Result, SaleQuery, SaleRepository};
use crate::aggregate::Aggregate;
use crate::sale::Sale;

/// In-memory sale repository.
///
/// Clones share the same storage, so one instance can be handed to several
/// services or request handlers.
#[derive(Clone, Default)]
pub struct InMemorySaleRepository {
    sales: Arc<RwLock<HashMap<AggregateId, Sale>>>,
}

impl InMemorySaleRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every stored sale.
    pub async fn clear(&self) {
        self.sales.write().await.clear();
    }
}

#[async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn create(&self, mut sale: Sale) -> Result<Sale> {
        let mut store = self.sales.write().await;

        if store.contains_key(&sale.id()) {
            return Err(RepositoryError::AlreadyExists(sale.id()));
        }
        if store
            .values()
            .any(|s| s.sale_number() == sale.sale_number())
        {
            return Err(RepositoryError::DuplicateSaleNumber(
                sale.sale_number().to_string(),
            ));
        }

        sale.set_version(Version::first());
        store.insert(sale.id(), sale.clone());

        tracing::debug!(sale_id = %sale.id(), sale_number = sale.sale_number(), "Stored new sale");
        Ok(sale)
    }

    async fn get_by_id(&self, id: AggregateId) -> Result<Option<Sale>> {
        Ok(self.sales.read().await.get(&id).cloned())
    }

    async fn get_by_sale_number(&self, sale_number: &str) -> Result<Option<Sale>> {
        let store = self.sales.read().await;
        Ok(store
            .values()
            .find(|s| s.sale_number() == sale_number)
            .cloned())
    }

    async fn list(&self, query: SaleQuery) -> Result<Vec<Sale>> {
        let store = self.sales.read().await;
        let mut sales: Vec<_> = store.values().filter(|s| query.matches(s)).collect();

        // Newest first; ties broken by ID so paging is stable.
        sales.sort_by(|a, b| {
            b.sale_date()
                .cmp(&a.sale_date())
                .then(a.id().as_uuid().cmp(&b.id().as_uuid()))
        });

        let sales: Vec<_> = sales
            .into_iter()
            .skip(query.effective_offset())
            .take(query.effective_limit())
            .cloned()
            .collect();

        tracing::debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    async fn update(&self, mut sale: Sale) -> Result<Sale> {
        let mut store = self.sales.write().await;

        let stored = store
            .get(&sale.id())
            .ok_or(RepositoryError::NotFound(sale.id()))?;

        if stored.version() != sale.version() {
            return Err(RepositoryError::ConcurrencyConflict {
                sale_id: sale.id(),
                expected: sale.version(),
                actual: stored.version(),
            });
        }

        sale.set_version(sale.version().next());
        store.insert(sale.id(), sale.clone());

        tracing::debug!(sale_id = %sale.id(), version = %sale.version(), "Updated sale");
        Ok(sale)
    }

    async fn delete(&self, id: AggregateId) -> Result<bool> {
        let removed = self.sales.write().await.remove(&id).is_some();
        tracing::debug!(sale_id = %id, removed, "Deleted sale");
        Ok(removed)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.sales.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::repository::SaleRepositoryExt;
    use crate::sale::{Money, SaleDetails};

    fn sale(number: &str) -> Sale {
        let mut sale = Sale::new(
            SaleDetails::new(number)
                .customer("Jane Doe", "jane@example.com", "")
                .branch("Downtown", "BR-01"),
        );
        sale.add_item("Widget", "WID-1", 1, Money::from_cents(1000))
            .unwrap();
        sale
    }

    fn dated(number: &str, days_ago: i64) -> Sale {
        Sale::new(
            SaleDetails::new(number)
                .customer("Jane Doe", "jane@example.com", "")
                .branch("Downtown", "BR-01")
                .sale_date(Utc::now() - Duration::days(days_ago)),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemorySaleRepository::new();
        let sale = sale("S-1");
        let id = sale.id();

        let stored = repo.create(sale).await.unwrap();
        assert_eq!(stored.version(), Version::first());

        let loaded = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.sale_number(), "S-1");
        assert_eq!(loaded.version(), Version::first());

        let by_number = repo.get_by_sale_number("S-1").await.unwrap().unwrap();
        assert_eq!(by_number.id(), id);

        assert!(repo.exists(id).await.unwrap());
        assert!(repo.sale_number_exists("S-1").await.unwrap());
        assert!(!repo.sale_number_exists("S-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = InMemorySaleRepository::new();
        assert!(repo.get_by_id(AggregateId::new()).await.unwrap().is_none());
        assert!(repo.get_by_sale_number("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sale_number_rejected() {
        let repo = InMemorySaleRepository::new();
        repo.create(sale("S-1")).await.unwrap();

        let result = repo.create(sale("S-1")).await;
        assert!(matches!(
            result,
            Err(RepositoryError::DuplicateSaleNumber(ref n)) if n == "S-1"
        ));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let repo = InMemorySaleRepository::new();
        let mut sale = repo.create(sale("S-1")).await.unwrap();

        sale.add_item("Gadget", "GAD-1", 2, Money::from_cents(500))
            .unwrap();
        let updated = repo.update(sale).await.unwrap();

        assert_eq!(updated.version(), Version::new(2));
        let loaded = repo.get_by_id(updated.id()).await.unwrap().unwrap();
        assert_eq!(loaded.item_count(), 2);
        assert_eq!(loaded.version(), Version::new(2));
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let repo = InMemorySaleRepository::new();
        let original = repo.create(sale("S-1")).await.unwrap();

        let mut first = original.clone();
        let mut second = original;

        first.cancel().unwrap();
        repo.update(first).await.unwrap();

        second.remove_item("WID-1").unwrap();
        let result = repo.update(second).await;

        assert!(matches!(
            result,
            Err(RepositoryError::ConcurrencyConflict { expected, actual, .. })
                if expected == Version::first() && actual == Version::new(2)
        ));
    }

    #[tokio::test]
    async fn test_update_missing_sale() {
        let repo = InMemorySaleRepository::new();
        let result = repo.update(sale("S-1")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemorySaleRepository::new();
        let stored = repo.create(sale("S-1")).await.unwrap();

        assert!(repo.delete(stored.id()).await.unwrap());
        assert!(!repo.delete(stored.id()).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_sales_newest_first_and_pages() {
        let repo = InMemorySaleRepository::new();
        for (number, days_ago) in [("S-OLD", 3), ("S-NEW", 0), ("S-MID", 1)] {
            repo.create(dated(number, days_ago)).await.unwrap();
        }

        let all = repo.list(SaleQuery::new()).await.unwrap();
        let numbers: Vec<_> = all.iter().map(|s| s.sale_number()).collect();
        assert_eq!(numbers, ["S-NEW", "S-MID", "S-OLD"]);

        let page = repo
            .list(SaleQuery::new().offset(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].sale_number(), "S-MID");
    }

    #[tokio::test]
    async fn test_list_applies_filters() {
        let repo = InMemorySaleRepository::new();
        repo.create(dated("S-1", 0)).await.unwrap();
        let mut cancelled = dated("S-2", 0);
        cancelled.cancel().unwrap();
        repo.create(cancelled).await.unwrap();

        let active = repo
            .list(SaleQuery::new().cancelled(false))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].sale_number(), "S-1");

        let other_branch = repo
            .list(SaleQuery::new().branch_code("BR-99"))
            .await
            .unwrap();
        assert!(other_branch.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemorySaleRepository::new();
        let clone = repo.clone();
        repo.create(sale("S-1")).await.unwrap();

        assert_eq!(clone.count().await.unwrap(), 1);
        clone.clear().await;
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
