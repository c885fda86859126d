//! Sale commands.

use common::AggregateId;

use super::{Money, SaleDetails};

/// A line item to put on a sale.
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_name: String,
    pub product_code: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl NewSaleItem {
    pub fn new(
        product_name: impl Into<String>,
        product_code: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            product_code: product_code.into(),
            quantity,
            unit_price,
        }
    }
}

/// Command to record a new sale with its items.
#[derive(Debug, Clone)]
pub struct CreateSale {
    pub details: SaleDetails,
    pub items: Vec<NewSaleItem>,
}

impl CreateSale {
    /// Creates a new CreateSale command.
    pub fn new(details: SaleDetails, items: Vec<NewSaleItem>) -> Self {
        Self { details, items }
    }
}

/// Command to add an item to a sale (merging into an existing line).
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The sale to add the item to.
    pub sale_id: AggregateId,

    /// The item to add.
    pub item: NewSaleItem,
}

impl AddItem {
    /// Creates a new AddItem command.
    pub fn new(sale_id: AggregateId, item: NewSaleItem) -> Self {
        Self { sale_id, item }
    }
}

/// Command to remove a line from a sale.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    pub sale_id: AggregateId,
    pub product_code: String,
}

impl RemoveItem {
    pub fn new(sale_id: AggregateId, product_code: impl Into<String>) -> Self {
        Self {
            sale_id,
            product_code: product_code.into(),
        }
    }
}

/// Command to set the quantity of a line.
#[derive(Debug, Clone)]
pub struct UpdateItemQuantity {
    pub sale_id: AggregateId,
    pub product_code: String,
    pub new_quantity: u32,
}

impl UpdateItemQuantity {
    pub fn new(sale_id: AggregateId, product_code: impl Into<String>, new_quantity: u32) -> Self {
        Self {
            sale_id,
            product_code: product_code.into(),
            new_quantity,
        }
    }
}

/// Command to set the unit price of a line.
#[derive(Debug, Clone)]
pub struct UpdateItemUnitPrice {
    pub sale_id: AggregateId,
    pub product_code: String,
    pub new_unit_price: Money,
}

impl UpdateItemUnitPrice {
    pub fn new(
        sale_id: AggregateId,
        product_code: impl Into<String>,
        new_unit_price: Money,
    ) -> Self {
        Self {
            sale_id,
            product_code: product_code.into(),
            new_unit_price,
        }
    }
}

/// Command to cancel a single line.
#[derive(Debug, Clone)]
pub struct CancelItem {
    pub sale_id: AggregateId,
    pub product_code: String,
}

impl CancelItem {
    pub fn new(sale_id: AggregateId, product_code: impl Into<String>) -> Self {
        Self {
            sale_id,
            product_code: product_code.into(),
        }
    }
}

/// Command to cancel a whole sale.
#[derive(Debug, Clone)]
pub struct CancelSale {
    pub sale_id: AggregateId,
}

impl CancelSale {
    pub fn new(sale_id: AggregateId) -> Self {
        Self { sale_id }
    }
}
