//! Shared identity and versioning types for the sales workspace.

pub mod types;

pub use types::{AggregateId, ParseIdError, Version};
