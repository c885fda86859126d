//! Persistence contract for sales and its in-memory implementation.

mod error;
mod memory;
mod query;
mod store;

pub use error::{RepositoryError, Result};
pub use memory::InMemorySaleRepository;
pub use query::{DEFAULT_PAGE_SIZE, SaleQuery};
pub use store::{SaleRepository, SaleRepositoryExt};
