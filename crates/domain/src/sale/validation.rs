//! Batch validation of a sale before it is persisted.
//!
//! Unlike the fail-fast checks in the mutating methods, these rules collect
//! every violation so that callers can report them together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::{MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY};
use super::{Sale, SaleItem};

/// Most line items a single sale may hold.
pub const MAX_SALE_ITEMS: usize = 100;

/// Exclusive upper bound on a unit price, in cents.
pub const MAX_UNIT_PRICE_CENTS: i64 = 99_999_999;

const MAX_CUSTOMER_DOCUMENT_LEN: usize = 20;
const MAX_BRANCH_CODE_LEN: usize = 10;
const PRODUCT_NAME_LEN: (usize, usize) = (2, 100);
const PRODUCT_CODE_LEN: (usize, usize) = (2, 20);

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every rule a sale failed, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Sale validation failed with {} violation(s)", .violations.len())]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns true if any violation names `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Loose structural email check: one `@`, non-empty parts, a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub(crate) fn validate_sale(sale: &Sale, now: DateTime<Utc>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if sale.sale_number().trim().is_empty() {
        errors.push("saleNumber", "Sale number is required.");
    }

    if sale.customer_name().trim().is_empty() {
        errors.push("customerName", "Customer name is required.");
    }

    let email = sale.customer_email().trim();
    if email.is_empty() {
        errors.push("customerEmail", "Customer email is required.");
    } else if !is_valid_email(email) {
        errors.push(
            "customerEmail",
            "Customer email must be a valid email address.",
        );
    }

    if sale.customer_document().chars().count() > MAX_CUSTOMER_DOCUMENT_LEN {
        errors.push(
            "customerDocument",
            "Customer document cannot be longer than 20 characters.",
        );
    }

    if sale.branch_name().trim().is_empty() {
        errors.push("branchName", "Branch name is required.");
    }

    if sale.branch_code().chars().count() > MAX_BRANCH_CODE_LEN {
        errors.push(
            "branchCode",
            "Branch code cannot be longer than 10 characters.",
        );
    }

    if sale.sale_date() > now {
        errors.push("saleDate", "Sale date cannot be in the future.");
    }

    if sale.total_amount().is_negative() {
        errors.push("totalAmount", "Total amount cannot be negative.");
    }

    let item_count = sale.item_count();
    if item_count == 0 {
        errors.push("items", "Sale must have at least one item.");
    } else if item_count > MAX_SALE_ITEMS {
        errors.push("items", "Sale cannot have more than 100 items.");
    }

    for (index, item) in sale.items().iter().enumerate() {
        validate_item(item, index, &mut errors);
    }

    errors
}

fn validate_item(item: &SaleItem, index: usize, errors: &mut ValidationErrors) {
    let field = |name: &str| format!("items[{index}].{name}");

    let name_len = item.product_name().chars().count();
    if name_len == 0 {
        errors.push(field("productName"), "Product name is required.");
    } else if name_len < PRODUCT_NAME_LEN.0 {
        errors.push(
            field("productName"),
            "Product name must be at least 2 characters long.",
        );
    } else if name_len > PRODUCT_NAME_LEN.1 {
        errors.push(
            field("productName"),
            "Product name cannot be longer than 100 characters.",
        );
    }

    let code = item.product_code().as_str();
    let code_len = code.chars().count();
    if code_len == 0 {
        errors.push(field("productCode"), "Product code is required.");
    } else if code_len < PRODUCT_CODE_LEN.0 {
        errors.push(
            field("productCode"),
            "Product code must be at least 2 characters long.",
        );
    } else if code_len > PRODUCT_CODE_LEN.1 {
        errors.push(
            field("productCode"),
            "Product code cannot be longer than 20 characters.",
        );
    } else if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        errors.push(
            field("productCode"),
            "Product code must contain only uppercase letters, numbers, and hyphens.",
        );
    }

    if item.quantity() < MIN_ITEM_QUANTITY {
        errors.push(field("quantity"), "Quantity must be greater than zero.");
    } else if item.quantity() > MAX_ITEM_QUANTITY {
        errors.push(field("quantity"), "Cannot sell more than 20 identical items.");
    }

    let price = item.unit_price();
    if price.is_negative() {
        errors.push(field("unitPrice"), "Unit price cannot be negative.");
    } else if price.amount() >= Decimal::new(MAX_UNIT_PRICE_CENTS, 2) {
        errors.push(field("unitPrice"), "Unit price cannot exceed 999,999.99.");
    }

    let discount = item.discount_percentage();
    if discount < Decimal::ZERO {
        errors.push(
            field("discountPercentage"),
            "Discount percentage cannot be negative.",
        );
    } else if discount > Decimal::ONE {
        errors.push(
            field("discountPercentage"),
            "Discount percentage cannot exceed 100%.",
        );
    }

    if item.total_amount().is_negative() {
        errors.push(field("totalAmount"), "Total amount cannot be negative.");
    }
}
