//! Domain layer for the sales system.
//!
//! This crate provides:
//! - The Sale aggregate with its line items, tiered discounts and
//!   cancellation state machine
//! - Batch validation of a sale before it is stored
//! - The SaleRepository contract with an in-memory implementation
//! - SaleService, which loads, mutates and stores sales

pub mod aggregate;
pub mod error;
pub mod repository;
pub mod sale;

pub use aggregate::Aggregate;
pub use error::DomainError;
pub use repository::{
    InMemorySaleRepository, RepositoryError, SaleQuery, SaleRepository, SaleRepositoryExt,
};
pub use sale::{
    AddItem, CancelItem, CancelSale, CancellationState, CreateSale, CreateSaleError,
    DiscountTier, FieldViolation, MAX_ITEM_QUANTITY, Money, NewSaleItem, ProductCode, RemoveItem,
    RestoreError, Sale, SaleDetails, SaleError, SaleItem, SaleItemId, SaleService,
    UpdateItemQuantity, UpdateItemUnitPrice, ValidationErrors,
};
