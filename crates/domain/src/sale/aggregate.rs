//! Sale aggregate implementation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::{AggregateId, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::item::check_item_arguments;
use super::validation::{ValidationErrors, validate_sale};
use super::{
    CancellationState, CreateSaleError, Money, NewSaleItem, ProductCode, RestoreError, SaleError,
    SaleItem,
};

/// Descriptive fields of a sale, supplied up front when it is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDetails {
    pub sale_number: String,
    /// Defaults to the moment the sale is opened.
    pub sale_date: Option<DateTime<Utc>>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_document: String,
    pub branch_name: String,
    pub branch_code: String,
}

impl SaleDetails {
    /// Starts a set of details for the given sale number.
    pub fn new(sale_number: impl Into<String>) -> Self {
        Self {
            sale_number: sale_number.into(),
            ..Default::default()
        }
    }

    pub fn sale_date(mut self, sale_date: DateTime<Utc>) -> Self {
        self.sale_date = Some(sale_date);
        self
    }

    pub fn customer(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        self.customer_name = name.into();
        self.customer_email = email.into();
        self.customer_document = document.into();
        self
    }

    pub fn branch(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.branch_name = name.into();
        self.branch_code = code.into();
        self
    }
}

/// Sale aggregate root.
///
/// Owns an ordered list of line items, keyed by normalized product code, and
/// keeps `total_amount` equal to the sum of its active items' totals after
/// every change. All item mutation goes through the root.
///
/// Deserializing rebuilds every item and recomputes the total; a stored sale
/// whose amounts disagree with its items is refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SaleRecord")]
pub struct Sale {
    id: AggregateId,

    /// Stored version, owned by the repository.
    #[serde(default)]
    version: Version,

    sale_number: String,
    sale_date: DateTime<Utc>,
    customer_name: String,
    customer_email: String,
    customer_document: String,
    branch_name: String,
    branch_code: String,

    items: Vec<SaleItem>,

    /// Sum of active item totals.
    total_amount: Money,

    state: CancellationState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Aggregate for Sale {
    fn aggregate_type() -> &'static str {
        "Sale"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

// Construction
impl Sale {
    /// Opens an active sale with no items.
    pub fn new(details: SaleDetails) -> Self {
        let now = Utc::now();
        Self {
            id: AggregateId::new(),
            version: Version::initial(),
            sale_number: details.sale_number.trim().to_string(),
            sale_date: details.sale_date.unwrap_or(now),
            customer_name: details.customer_name.trim().to_string(),
            customer_email: details.customer_email.trim().to_string(),
            customer_document: details.customer_document.trim().to_string(),
            branch_name: details.branch_name.trim().to_string(),
            branch_code: details.branch_code.trim().to_string(),
            items: Vec::new(),
            total_amount: Money::zero(),
            state: CancellationState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds a complete sale: opens it, adds every item through `add_item`
    /// and runs `validate`.
    pub fn create(
        details: SaleDetails,
        items: impl IntoIterator<Item = NewSaleItem>,
    ) -> Result<Self, CreateSaleError> {
        let mut sale = Self::new(details);
        for item in items {
            sale.add_item(
                &item.product_name,
                &item.product_code,
                item.quantity,
                item.unit_price,
            )?;
        }
        sale.validate()?;
        Ok(sale)
    }
}

// Query methods
impl Sale {
    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn customer_document(&self) -> &str {
        &self.customer_document
    }

    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    pub fn branch_code(&self) -> &str {
        &self.branch_code
    }

    /// Returns the items in insertion order, cancelled ones included.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    /// Returns an item by product code (normalized before lookup).
    pub fn get_item(&self, product_code: &str) -> Option<&SaleItem> {
        let code = ProductCode::new(product_code);
        self.items.iter().find(|item| item.product_code() == &code)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity over active items.
    pub fn total_quantity(&self) -> u32 {
        self.active_items().map(SaleItem::quantity).sum()
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn state(&self) -> CancellationState {
        self.state
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn active_items(&self) -> impl Iterator<Item = &SaleItem> {
        self.items.iter().filter(|item| !item.is_cancelled())
    }
}

// Command methods
impl Sale {
    /// Adds a line, or merges into the existing line with the same code.
    ///
    /// A merge keeps the existing line's name and unit price. The merged
    /// quantity may not exceed 20.
    pub fn add_item(
        &mut self,
        product_name: &str,
        product_code: &str,
        quantity: u32,
        unit_price: Money,
    ) -> Result<(), SaleError> {
        self.ensure_active("add items to")?;
        check_item_arguments(product_name, product_code, quantity, unit_price)?;

        let code = ProductCode::new(product_code);
        if let Some(existing) = self.item_mut(&code) {
            let merged = existing.quantity() + quantity;
            if merged > super::MAX_ITEM_QUANTITY {
                return Err(SaleError::QuantityLimitExceeded {
                    product_code: code.to_string(),
                    requested: merged,
                });
            }
            existing.update_quantity(merged)?;
        } else {
            let item = SaleItem::new(product_name, product_code, quantity, unit_price)?;
            self.items.push(item);
        }

        self.recalculate_total();
        Ok(())
    }

    /// Removes the line with the given code. Unknown codes are ignored.
    pub fn remove_item(&mut self, product_code: &str) -> Result<(), SaleError> {
        self.ensure_active("remove items from")?;

        let code = ProductCode::new(product_code);
        if let Some(index) = self.items.iter().position(|i| i.product_code() == &code) {
            self.items.remove(index);
            self.recalculate_total();
        }
        Ok(())
    }

    /// Sets the quantity of an existing line.
    pub fn update_item_quantity(
        &mut self,
        product_code: &str,
        new_quantity: u32,
    ) -> Result<(), SaleError> {
        self.ensure_active("update items in")?;
        super::item::check_quantity(new_quantity)?;

        self.find_item_mut(product_code)?
            .update_quantity(new_quantity)?;
        self.recalculate_total();
        Ok(())
    }

    /// Sets the unit price of an existing line.
    pub fn update_item_unit_price(
        &mut self,
        product_code: &str,
        new_unit_price: Money,
    ) -> Result<(), SaleError> {
        self.ensure_active("update items in")?;

        self.find_item_mut(product_code)?
            .update_unit_price(new_unit_price)?;
        self.recalculate_total();
        Ok(())
    }

    /// Cancels one line. The line stays on the sale but stops counting
    /// toward the total.
    pub fn cancel_item(&mut self, product_code: &str) -> Result<(), SaleError> {
        self.ensure_active("cancel items in")?;

        self.find_item_mut(product_code)?.cancel()?;
        self.recalculate_total();
        Ok(())
    }

    /// Cancels the sale. Items are left as they are.
    pub fn cancel(&mut self) -> Result<(), SaleError> {
        if !self.state.can_cancel() {
            return Err(SaleError::AlreadyCancelled);
        }

        self.state = CancellationState::Cancelled;
        self.touch();
        Ok(())
    }

    /// Checks every structural rule against the current time.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_at(Utc::now())
    }

    /// Checks every structural rule, treating `now` as the current time.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        validate_sale(self, now).into_result()
    }
}

// Internal helpers
impl Sale {
    fn ensure_active(&self, action: &'static str) -> Result<(), SaleError> {
        if self.state.is_cancelled() {
            return Err(SaleError::SaleCancelled { action });
        }
        Ok(())
    }

    fn item_mut(&mut self, code: &ProductCode) -> Option<&mut SaleItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_code() == code)
    }

    fn find_item_mut(&mut self, product_code: &str) -> Result<&mut SaleItem, SaleError> {
        let code = ProductCode::new(product_code);
        self.item_mut(&code)
            .ok_or_else(|| SaleError::ItemNotFound {
                product_code: code.to_string(),
            })
    }

    fn active_total(&self) -> Money {
        self.items
            .iter()
            .filter(|item| !item.is_cancelled())
            .map(SaleItem::total_amount)
            .sum()
    }

    fn recalculate_total(&mut self) {
        self.total_amount = self.active_total();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Stored form of a sale. Items restore through `SaleItem`'s own checks.
#[derive(Deserialize)]
struct SaleRecord {
    id: AggregateId,
    #[serde(default)]
    version: Version,
    sale_number: String,
    sale_date: DateTime<Utc>,
    customer_name: String,
    customer_email: String,
    customer_document: String,
    branch_name: String,
    branch_code: String,
    items: Vec<SaleItem>,
    total_amount: Money,
    state: CancellationState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SaleRecord> for Sale {
    type Error = RestoreError;

    fn try_from(record: SaleRecord) -> Result<Self, Self::Error> {
        let mut codes = HashSet::new();
        for item in &record.items {
            if !codes.insert(item.product_code().clone()) {
                return Err(RestoreError::DuplicateItem {
                    product_code: item.product_code().to_string(),
                });
            }
        }

        let mut sale = Sale {
            id: record.id,
            version: record.version,
            sale_number: record.sale_number,
            sale_date: record.sale_date,
            customer_name: record.customer_name,
            customer_email: record.customer_email,
            customer_document: record.customer_document,
            branch_name: record.branch_name,
            branch_code: record.branch_code,
            items: record.items,
            total_amount: Money::zero(),
            state: record.state,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };

        sale.total_amount = sale.active_total();
        if sale.total_amount != record.total_amount {
            return Err(RestoreError::Inconsistent {
                field: "totalAmount",
            });
        }
        Ok(sale)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;

    fn details() -> SaleDetails {
        SaleDetails::new("S-0001")
            .customer("Jane Doe", "jane@example.com", "12345678900")
            .branch("Downtown", "BR-01")
    }

    fn sale() -> Sale {
        Sale::new(details())
    }

    fn price(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    fn item_sum(sale: &Sale) -> Money {
        sale.items()
            .iter()
            .filter(|i| !i.is_cancelled())
            .map(SaleItem::total_amount)
            .sum()
    }

    #[test]
    fn test_new_sale_is_active_and_empty() {
        let sale = sale();
        assert_eq!(sale.state(), CancellationState::Active);
        assert_eq!(sale.item_count(), 0);
        assert_eq!(sale.total_amount(), Money::zero());
        assert_eq!(sale.version(), Version::initial());
        assert_eq!(Sale::aggregate_type(), "Sale");
    }

    #[test]
    fn test_new_trims_details_and_defaults_date() {
        let before = Utc::now();
        let sale = Sale::new(SaleDetails::new("  S-9  ").branch(" Uptown ", " BR-2 "));

        assert_eq!(sale.sale_number(), "S-9");
        assert_eq!(sale.branch_name(), "Uptown");
        assert_eq!(sale.branch_code(), "BR-2");
        assert!(sale.sale_date() >= before);
    }

    #[test]
    fn test_add_item() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();

        assert_eq!(sale.item_count(), 1);
        assert_eq!(sale.total_amount(), price(2000));
    }

    #[test]
    fn test_add_same_code_merges_case_insensitively() {
        let mut sale = sale();
        sale.add_item("Widget", "W1", 5, price(1000)).unwrap();
        sale.add_item("Widget", "w1", 3, price(1000)).unwrap();

        assert_eq!(sale.item_count(), 1);
        let item = sale.get_item("W1").unwrap();
        assert_eq!(item.quantity(), 8);
        assert_eq!(item.discount_percentage(), Decimal::new(10, 2));
        assert_eq!(item.total_amount(), price(7200));
        assert_eq!(sale.total_amount(), price(7200));
    }

    #[test]
    fn test_add_same_item_twice_without_discount() {
        let mut sale = sale();
        sale.add_item("A", "A1", 1, price(10000)).unwrap();
        sale.add_item("A", "A1", 1, price(10000)).unwrap();

        assert_eq!(sale.item_count(), 1);
        let item = sale.get_item("A1").unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.discount_percentage(), Decimal::ZERO);
        assert_eq!(item.total_amount(), price(20000));
        assert_eq!(sale.total_amount(), price(20000));
    }

    #[test]
    fn test_merge_beyond_cap_fails_and_leaves_item() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 15, price(1000)).unwrap();

        let err = sale.add_item("Widget", "WID-1", 10, price(1000)).unwrap_err();
        assert!(matches!(
            err,
            SaleError::QuantityLimitExceeded { requested: 25, .. }
        ));
        assert!(err.is_invalid_state());
        assert!(err.to_string().contains("Cannot sell more than 20 identical items"));

        assert_eq!(sale.get_item("WID-1").unwrap().quantity(), 15);
        assert_eq!(sale.total_amount(), price(12000));
    }

    #[test]
    fn test_merge_up_to_cap_is_allowed() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 15, price(1000)).unwrap();
        sale.add_item("Widget", "WID-1", 5, price(1000)).unwrap();

        assert_eq!(sale.get_item("WID-1").unwrap().quantity(), 20);
        assert_eq!(sale.total_amount(), price(16000));
    }

    #[test]
    fn test_add_item_argument_errors_name_the_field() {
        let mut sale = sale();

        let cases = [
            ("", "WID-1", 1, price(100), "productName"),
            ("Widget", "  ", 1, price(100), "productCode"),
            ("Widget", "WID-1", 0, price(100), "quantity"),
            ("Widget", "WID-1", 21, price(100), "quantity"),
            ("Widget", "WID-1", 1, price(-100), "unitPrice"),
        ];
        for (name, code, quantity, unit_price, field) in cases {
            let err = sale.add_item(name, code, quantity, unit_price).unwrap_err();
            assert!(err.is_argument());
            assert_eq!(err.field(), Some(field));
        }
        assert_eq!(sale.item_count(), 0);
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut sale = sale();
        sale.add_item("Gamma", "C-3", 1, price(100)).unwrap();
        sale.add_item("Alpha", "A-1", 1, price(100)).unwrap();
        sale.add_item("Beta", "B-2", 1, price(100)).unwrap();

        let codes: Vec<_> = sale.items().iter().map(|i| i.product_code().as_str()).collect();
        assert_eq!(codes, ["C-3", "A-1", "B-2"]);
    }

    #[test]
    fn test_remove_item() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();
        sale.add_item("Gadget", "GAD-1", 1, price(500)).unwrap();

        sale.remove_item(" wid-1 ").unwrap();

        assert_eq!(sale.item_count(), 1);
        assert_eq!(sale.total_amount(), price(500));
    }

    #[test]
    fn test_remove_unknown_item_is_noop() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();

        sale.remove_item("NOPE").unwrap();

        assert_eq!(sale.item_count(), 1);
        assert_eq!(sale.total_amount(), price(2000));
    }

    #[test]
    fn test_update_item_quantity() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();

        sale.update_item_quantity("wid-1", 10).unwrap();

        assert_eq!(sale.get_item("WID-1").unwrap().quantity(), 10);
        assert_eq!(sale.total_amount(), price(8000));
    }

    #[test]
    fn test_update_item_quantity_errors() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();

        let err = sale.update_item_quantity("WID-1", 21).unwrap_err();
        assert_eq!(err.field(), Some("quantity"));

        let err = sale.update_item_quantity("MISSING", 3).unwrap_err();
        assert!(matches!(err, SaleError::ItemNotFound { .. }));
        assert!(err.is_invalid_state());

        assert_eq!(sale.get_item("WID-1").unwrap().quantity(), 2);
    }

    #[test]
    fn test_update_item_unit_price() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 5, price(1000)).unwrap();

        sale.update_item_unit_price("WID-1", price(2000)).unwrap();

        assert_eq!(sale.total_amount(), price(9000));
    }

    #[test]
    fn test_cancel_sale() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();

        sale.cancel().unwrap();

        assert!(sale.is_cancelled());
        assert!(sale.is_terminal());
        assert!(!sale.get_item("WID-1").unwrap().is_cancelled());
        assert_eq!(sale.total_amount(), price(2000));
    }

    #[test]
    fn test_cancel_twice_fails() {
        let mut sale = sale();
        sale.cancel().unwrap();

        let err = sale.cancel().unwrap_err();
        assert!(matches!(err, SaleError::AlreadyCancelled));
        assert!(sale.is_cancelled());
    }

    #[test]
    fn test_cancelled_sale_rejects_item_mutation() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();
        sale.cancel().unwrap();
        let items_before = sale.items().to_vec();

        let results = [
            sale.add_item("Gadget", "GAD-1", 1, price(500)),
            sale.add_item("Widget", "WID-1", 1, price(1000)),
            sale.remove_item("WID-1"),
            sale.update_item_quantity("WID-1", 5),
            sale.update_item_unit_price("WID-1", price(1)),
            sale.cancel_item("WID-1"),
        ];
        for result in results {
            let err = result.unwrap_err();
            assert!(matches!(err, SaleError::SaleCancelled { .. }));
            assert!(err.is_invalid_state());
        }

        assert_eq!(sale.items(), items_before.as_slice());
        assert_eq!(sale.total_amount(), price(2000));
    }

    #[test]
    fn test_cancelled_item_is_excluded_from_total() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 5, price(1000)).unwrap();
        sale.add_item("Gadget", "GAD-1", 2, price(2500)).unwrap();
        assert_eq!(sale.total_amount(), price(9500));

        sale.cancel_item("wid-1").unwrap();

        assert_eq!(sale.item_count(), 2);
        assert!(sale.get_item("WID-1").unwrap().is_cancelled());
        assert_eq!(sale.total_amount(), price(5000));
        assert_eq!(sale.total_quantity(), 2);
    }

    #[test]
    fn test_cancelled_item_rejects_merge_and_double_cancel() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 5, price(1000)).unwrap();
        sale.cancel_item("WID-1").unwrap();

        let err = sale.add_item("Widget", "WID-1", 1, price(1000)).unwrap_err();
        assert!(matches!(err, SaleError::ItemCancelled { .. }));

        let err = sale.update_item_quantity("WID-1", 2).unwrap_err();
        assert!(matches!(err, SaleError::ItemCancelled { .. }));

        let err = sale.cancel_item("WID-1").unwrap_err();
        assert!(matches!(err, SaleError::ItemAlreadyCancelled { .. }));

        // Removing a cancelled line is still allowed.
        sale.remove_item("WID-1").unwrap();
        assert_eq!(sale.item_count(), 0);
    }

    #[test]
    fn test_total_tracks_items_after_every_change() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 3, price(999)).unwrap();
        assert_eq!(sale.total_amount(), item_sum(&sale));
        sale.add_item("Gadget", "GAD-1", 12, price(150)).unwrap();
        assert_eq!(sale.total_amount(), item_sum(&sale));
        sale.add_item("Widget", "WID-1", 4, price(999)).unwrap();
        assert_eq!(sale.total_amount(), item_sum(&sale));
        sale.update_item_quantity("GAD-1", 2).unwrap();
        assert_eq!(sale.total_amount(), item_sum(&sale));
        sale.cancel_item("GAD-1").unwrap();
        assert_eq!(sale.total_amount(), item_sum(&sale));
        sale.remove_item("WID-1").unwrap();
        assert_eq!(sale.total_amount(), Money::zero());
    }

    #[test]
    fn test_validate_accepts_complete_sale() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();
        assert!(sale.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_violation() {
        let sale = Sale::new(
            SaleDetails::new("")
                .customer("", "not-an-email", "123456789012345678901")
                .branch("", "BRANCH-CODE-TOO-LONG")
                .sale_date(Utc::now() + Duration::days(2)),
        );

        let errors = sale.validate().unwrap_err();
        let fields: Vec<_> = errors.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "saleNumber",
                "customerName",
                "customerEmail",
                "customerDocument",
                "branchName",
                "branchCode",
                "saleDate",
                "items",
            ]
        );
        assert_eq!(
            errors.violations()[2].message,
            "Customer email must be a valid email address."
        );
    }

    #[test]
    fn test_validate_checks_items() {
        let mut sale = sale();
        sale.add_item("A", "A_1", 1, price(100_000_000)).unwrap();

        let errors = sale.validate().unwrap_err();
        assert!(errors.has_field("items[0].productName"));
        assert!(errors.has_field("items[0].productCode"));
        assert!(errors.has_field("items[0].unitPrice"));
        assert!(!errors.has_field("items[0].quantity"));
    }

    #[test]
    fn test_validate_at_uses_given_clock() {
        let sale_date = Utc::now();
        let mut sale = Sale::new(details().sale_date(sale_date));
        sale.add_item("Widget", "WID-1", 1, price(100)).unwrap();

        assert!(sale.validate_at(sale_date).is_ok());
        let errors = sale
            .validate_at(sale_date - Duration::seconds(1))
            .unwrap_err();
        assert!(errors.has_field("saleDate"));
    }

    #[test]
    fn test_validate_has_no_side_effects() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 2, price(1000)).unwrap();
        let updated_at = sale.updated_at();

        let _ = sale.validate();

        assert_eq!(sale.updated_at(), updated_at);
        assert_eq!(sale.total_amount(), price(2000));
    }

    #[test]
    fn test_create_builds_valid_sale() {
        let sale = Sale::create(
            details(),
            vec![
                NewSaleItem::new("Widget", "wid-1", 5, price(1000)),
                NewSaleItem::new("Widget", "WID-1", 3, price(1000)),
                NewSaleItem::new("Gadget", "GAD-1", 1, price(250)),
            ],
        )
        .unwrap();

        assert_eq!(sale.item_count(), 2);
        assert_eq!(sale.total_amount(), price(7450));
    }

    #[test]
    fn test_create_rejects_bad_item() {
        let result = Sale::create(
            details(),
            vec![NewSaleItem::new("Widget", "WID-1", 25, price(1000))],
        );
        assert!(matches!(
            result,
            Err(CreateSaleError::Rejected(SaleError::InvalidArgument {
                field: "quantity",
                ..
            }))
        ));
    }

    #[test]
    fn test_create_reports_validation_errors() {
        let result = Sale::create(SaleDetails::new("S-1"), Vec::new());
        let Err(CreateSaleError::Invalid(errors)) = result else {
            panic!("expected validation errors");
        };
        assert!(errors.has_field("customerName"));
        assert!(errors.has_field("items"));
    }

    #[test]
    fn test_serialization() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 4, price(1000)).unwrap();
        sale.add_item("Gadget", "GAD-1", 2, price(500)).unwrap();
        sale.cancel_item("GAD-1").unwrap();

        let json = serde_json::to_string(&sale).unwrap();
        let deserialized: Sale = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), sale.id());
        assert_eq!(deserialized.items(), sale.items());
        assert_eq!(deserialized.total_amount(), price(3600));
        assert_eq!(deserialized.updated_at(), sale.updated_at());
    }

    fn serialized_sale() -> serde_json::Value {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 4, price(1000)).unwrap();
        sale.add_item("Gadget", "GAD-1", 1, price(500)).unwrap();
        serde_json::to_value(&sale).unwrap()
    }

    #[test]
    fn test_deserialize_rejects_forged_item_quantity() {
        let mut json = serialized_sale();
        json["items"][0]["quantity"] = serde_json::json!(50);

        let err = serde_json::from_value::<Sale>(json).unwrap_err();
        assert!(err.to_string().contains("Quantity must be between 1 and 20"));
    }

    #[test]
    fn test_deserialize_rejects_forged_total() {
        let mut json = serialized_sale();
        json["total_amount"] = serde_json::json!("1.00");

        let err = serde_json::from_value::<Sale>(json).unwrap_err();
        assert!(err.to_string().contains("Stored totalAmount does not match"));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_codes() {
        let mut json = serialized_sale();
        let first = json["items"][0].clone();
        json["items"][1] = first;
        json["total_amount"] = serde_json::json!("72.00");

        let err = serde_json::from_value::<Sale>(json).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_add_item_rejects_price_above_limit() {
        let mut sale = sale();
        sale.add_item("Widget", "WID-1", 1, price(1000)).unwrap();
        let huge = Money::new(Decimal::MAX / Decimal::TWO);

        for code in ["BIG-1", "BIG-2", "BIG-3"] {
            let err = sale.add_item("Big", code, 1, huge).unwrap_err();
            assert_eq!(err.field(), Some("unitPrice"));
        }
        let err = sale.update_item_unit_price("WID-1", huge).unwrap_err();
        assert_eq!(err.field(), Some("unitPrice"));

        assert_eq!(sale.item_count(), 1);
        assert_eq!(sale.total_amount(), price(1000));
    }

    #[test]
    fn test_total_at_price_limit_does_not_overflow() {
        let mut sale = sale();
        for n in 0..100 {
            sale.add_item("Part", &format!("P-{n}"), 20, price(99_999_998))
                .unwrap();
        }

        assert_eq!(sale.total_amount(), price(159_999_996_800));
        assert_eq!(sale.total_amount(), item_sum(&sale));
        assert!(sale.validate().is_ok());
    }
}
