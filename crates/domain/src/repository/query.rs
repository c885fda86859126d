use chrono::{DateTime, Utc};

use crate::sale::Sale;

/// Page size used when a query sets no limit.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Builder for filtering and paging sale listings.
///
/// Results are always ordered by sale date, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleQuery {
    /// Case-insensitive substring of the customer name.
    pub customer_name: Option<String>,

    /// Exact branch code.
    pub branch_code: Option<String>,

    /// Sales on or after this date.
    pub from_date: Option<DateTime<Utc>>,

    /// Sales on or before this date.
    pub to_date: Option<DateTime<Utc>>,

    /// Only cancelled (`true`) or only active (`false`) sales.
    pub cancelled: Option<bool>,

    /// Number of sales to skip.
    pub offset: Option<usize>,

    /// Maximum number of sales to return.
    pub limit: Option<usize>,
}

impl SaleQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn branch_code(mut self, code: impl Into<String>) -> Self {
        self.branch_code = Some(code.into());
        self
    }

    pub fn from_date(mut self, date: DateTime<Utc>) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn to_date(mut self, date: DateTime<Utc>) -> Self {
        self.to_date = Some(date);
        self
    }

    pub fn cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Returns true if the sale passes every filter that is set.
    pub fn matches(&self, sale: &Sale) -> bool {
        if let Some(ref name) = self.customer_name
            && !sale
                .customer_name()
                .to_lowercase()
                .contains(&name.to_lowercase())
        {
            return false;
        }
        if let Some(ref code) = self.branch_code
            && sale.branch_code() != code
        {
            return false;
        }
        if let Some(from) = self.from_date
            && sale.sale_date() < from
        {
            return false;
        }
        if let Some(to) = self.to_date
            && sale.sale_date() > to
        {
            return false;
        }
        if let Some(cancelled) = self.cancelled
            && sale.is_cancelled() != cancelled
        {
            return false;
        }
        true
    }
}
