//! Sale line items and the tiered discount rule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::MAX_UNIT_PRICE_CENTS;
use super::{CancellationState, Money, ProductCode, RestoreError, SaleError, SaleItemId};

/// Smallest quantity a line may carry.
pub const MIN_ITEM_QUANTITY: u32 = 1;

/// Largest quantity of one product a sale may carry.
pub const MAX_ITEM_QUANTITY: u32 = 20;

/// Discount bracket selected by a line's quantity.
///
/// | quantity | tier       | rate |
/// |----------|------------|------|
/// | 1-3      | `None`     | 0%   |
/// | 4-9      | `Standard` | 10%  |
/// | 10-20    | `Bulk`     | 20%  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountTier {
    None,
    Standard,
    Bulk,
}

impl DiscountTier {
    /// Selects the tier for a quantity.
    pub fn for_quantity(quantity: u32) -> Self {
        match quantity {
            0..=3 => DiscountTier::None,
            4..=9 => DiscountTier::Standard,
            _ => DiscountTier::Bulk,
        }
    }

    /// Discount rate as a fraction of the subtotal.
    pub fn rate(&self) -> Decimal {
        match self {
            DiscountTier::None => Decimal::ZERO,
            DiscountTier::Standard => Decimal::new(10, 2),
            DiscountTier::Bulk => Decimal::new(20, 2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountTier::None => "None",
            DiscountTier::Standard => "Standard",
            DiscountTier::Bulk => "Bulk",
        }
    }
}

impl std::fmt::Display for DiscountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn check_quantity(quantity: u32) -> Result<(), SaleError> {
    if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(SaleError::invalid_argument(
            "quantity",
            "Quantity must be between 1 and 20",
        ));
    }
    Ok(())
}

pub(crate) fn check_unit_price(unit_price: Money) -> Result<(), SaleError> {
    if unit_price.is_negative() {
        return Err(SaleError::invalid_argument(
            "unitPrice",
            "Unit price cannot be negative",
        ));
    }
    if unit_price.amount() >= Decimal::new(MAX_UNIT_PRICE_CENTS, 2) {
        return Err(SaleError::invalid_argument(
            "unitPrice",
            "Unit price cannot exceed 999,999.99",
        ));
    }
    Ok(())
}

/// Fail-fast argument checks shared by item construction and `Sale::add_item`.
pub(crate) fn check_item_arguments(
    product_name: &str,
    product_code: &str,
    quantity: u32,
    unit_price: Money,
) -> Result<(), SaleError> {
    if product_name.trim().is_empty() {
        return Err(SaleError::invalid_argument(
            "productName",
            "Product name cannot be empty",
        ));
    }
    if product_code.trim().is_empty() {
        return Err(SaleError::invalid_argument(
            "productCode",
            "Product code cannot be empty",
        ));
    }
    check_quantity(quantity)?;
    check_unit_price(unit_price)
}

/// One priced line of a sale.
///
/// Discount percentage, discount amount and total are derived from quantity
/// and unit price and recomputed whenever either changes. Deserializing
/// rebuilds the line through `SaleItem::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SaleItemRecord")]
pub struct SaleItem {
    id: SaleItemId,
    product_name: String,
    product_code: ProductCode,
    quantity: u32,
    unit_price: Money,
    discount_percentage: Decimal,
    discount_amount: Money,
    total_amount: Money,
    state: CancellationState,
}

impl SaleItem {
    /// Creates an active line item with its amounts already computed.
    pub fn new(
        product_name: &str,
        product_code: &str,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, SaleError> {
        check_item_arguments(product_name, product_code, quantity, unit_price)?;

        let mut item = Self {
            id: SaleItemId::new(),
            product_name: product_name.trim().to_string(),
            product_code: ProductCode::new(product_code),
            quantity,
            unit_price,
            discount_percentage: Decimal::ZERO,
            discount_amount: Money::zero(),
            total_amount: Money::zero(),
            state: CancellationState::Active,
        };
        item.recalculate();
        Ok(item)
    }

    pub fn id(&self) -> SaleItemId {
        self.id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_code(&self) -> &ProductCode {
        &self.product_code
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Quantity times unit price, before discount.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    pub fn discount_tier(&self) -> DiscountTier {
        DiscountTier::for_quantity(self.quantity)
    }

    pub fn discount_percentage(&self) -> Decimal {
        self.discount_percentage
    }

    pub fn discount_amount(&self) -> Money {
        self.discount_amount
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

    /// Changes the quantity and reprices the line.
    pub fn update_quantity(&mut self, new_quantity: u32) -> Result<(), SaleError> {
        self.ensure_active("update quantity of")?;
        check_quantity(new_quantity)?;

        self.quantity = new_quantity;
        self.recalculate();
        Ok(())
    }

    /// Changes the unit price and reprices the line.
    pub fn update_unit_price(&mut self, new_unit_price: Money) -> Result<(), SaleError> {
        self.ensure_active("update price of")?;
        check_unit_price(new_unit_price)?;

        self.unit_price = new_unit_price;
        self.recalculate();
        Ok(())
    }

    /// Cancels the line. Cancellation is terminal.
    pub fn cancel(&mut self) -> Result<(), SaleError> {
        if !self.state.can_cancel() {
            return Err(SaleError::ItemAlreadyCancelled {
                product_code: self.product_code.to_string(),
            });
        }
        self.state = CancellationState::Cancelled;
        Ok(())
    }

    fn ensure_active(&self, action: &'static str) -> Result<(), SaleError> {
        if self.state.is_cancelled() {
            return Err(SaleError::ItemCancelled {
                product_code: self.product_code.to_string(),
                action,
            });
        }
        Ok(())
    }

    fn recalculate(&mut self) {
        let subtotal = self.subtotal();
        let rate = self.discount_tier().rate();

        self.discount_percentage = rate;
        self.discount_amount = subtotal.apply_rate(rate);
        self.total_amount = subtotal - self.discount_amount;
    }
}

/// Stored form of a line item.
#[derive(Deserialize)]
struct SaleItemRecord {
    id: SaleItemId,
    product_name: String,
    product_code: String,
    quantity: u32,
    unit_price: Money,
    discount_percentage: Decimal,
    discount_amount: Money,
    total_amount: Money,
    state: CancellationState,
}

impl TryFrom<SaleItemRecord> for SaleItem {
    type Error = RestoreError;

    fn try_from(record: SaleItemRecord) -> Result<Self, Self::Error> {
        let mut item = SaleItem::new(
            &record.product_name,
            &record.product_code,
            record.quantity,
            record.unit_price,
        )?;
        item.id = record.id;
        item.state = record.state;

        if item.discount_percentage != record.discount_percentage {
            return Err(RestoreError::Inconsistent {
                field: "discountPercentage",
            });
        }
        if item.discount_amount != record.discount_amount {
            return Err(RestoreError::Inconsistent {
                field: "discountAmount",
            });
        }
        if item.total_amount != record.total_amount {
            return Err(RestoreError::Inconsistent {
                field: "totalAmount",
            });
        }
        Ok(item)
    }
}
