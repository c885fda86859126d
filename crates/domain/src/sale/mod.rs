//! Sale aggregate and related types.

mod aggregate;
mod commands;
mod item;
mod service;
mod state;
mod validation;
mod value_objects;

pub use aggregate::{Sale, SaleDetails};
pub use commands::*;
pub use item::{DiscountTier, MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY, SaleItem};
pub use service::SaleService;
pub use state::CancellationState;
pub use validation::{FieldViolation, MAX_SALE_ITEMS, ValidationErrors, is_valid_email};
pub use value_objects::{Money, ProductCode, SaleItemId};

use thiserror::Error;

/// Errors raised by the fail-fast sale and item operations.
///
/// Every variant is either an argument error (bad input at the call
/// boundary) or an invalid-state error (operation not allowed right now).
/// In both cases the aggregate is left unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// Malformed input. `field` is the stable camelCase field name.
    #[error("{reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },

    /// The sale is cancelled.
    #[error("Cannot {action} a cancelled sale")]
    SaleCancelled { action: &'static str },

    /// The sale was cancelled before.
    #[error("Sale is already cancelled")]
    AlreadyCancelled,

    /// The line item is cancelled.
    #[error("Cannot {action} cancelled item {product_code}")]
    ItemCancelled {
        product_code: String,
        action: &'static str,
    },

    /// The line item was cancelled before.
    #[error("Item {product_code} is already cancelled")]
    ItemAlreadyCancelled { product_code: String },

    /// Merging would put more than 20 units of one product on the sale.
    #[error("Cannot sell more than 20 identical items ({product_code}: {requested} requested)")]
    QuantityLimitExceeded { product_code: String, requested: u32 },

    /// No line carries the product code.
    #[error("Item not found in sale: {product_code}")]
    ItemNotFound { product_code: String },
}

impl SaleError {
    pub(crate) fn invalid_argument(field: &'static str, reason: &'static str) -> Self {
        SaleError::InvalidArgument { field, reason }
    }

    /// Returns true for malformed-input errors.
    pub fn is_argument(&self) -> bool {
        matches!(self, SaleError::InvalidArgument { .. })
    }

    /// Returns true for errors caused by the aggregate's current state.
    pub fn is_invalid_state(&self) -> bool {
        !self.is_argument()
    }

    /// Returns the offending field for argument errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SaleError::InvalidArgument { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SaleError::InvalidArgument { .. } => "invalid_argument",
            SaleError::SaleCancelled { .. } => "sale_cancelled",
            SaleError::AlreadyCancelled => "already_cancelled",
            SaleError::ItemCancelled { .. } => "item_cancelled",
            SaleError::ItemAlreadyCancelled { .. } => "item_already_cancelled",
            SaleError::QuantityLimitExceeded { .. } => "quantity_limit_exceeded",
            SaleError::ItemNotFound { .. } => "item_not_found",
        }
    }
}

/// Why `Sale::create` refused to build a sale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateSaleError {
    /// An item was rejected while being added.
    #[error(transparent)]
    Rejected(#[from] SaleError),

    /// The assembled sale broke one or more rules.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// Why a stored sale could not be turned back into an aggregate.
///
/// Stored sales are rebuilt through the same constructors and pricing rules
/// as live ones, so a record whose derived amounts disagree with its inputs
/// is refused rather than trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// A stored item breaks an argument rule.
    #[error(transparent)]
    Rejected(#[from] SaleError),

    /// Two stored items share a product code.
    #[error("Stored sale lists product {product_code} more than once")]
    DuplicateItem { product_code: String },

    /// A stored derived amount differs from the recomputed one.
    #[error("Stored {field} does not match the recomputed value")]
    Inconsistent { field: &'static str },
}
