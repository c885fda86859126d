//! Core aggregate trait.

use common::{AggregateId, Version};

/// Trait for aggregates persisted as whole snapshots of state.
///
/// An aggregate is a cluster of domain objects that can be treated as a single unit.
/// The aggregate root ensures consistency of changes being made within the aggregate.
///
/// The aggregate never changes its own version: the repository sets it when
/// the aggregate is stored, and uses it to detect concurrent writers.
pub trait Aggregate: Send + Sync {
    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str
    where
        Self: Sized;

    /// Returns the aggregate's unique identifier.
    fn id(&self) -> AggregateId;

    /// Returns the stored version of the aggregate.
    ///
    /// Version is 0 until the aggregate is first stored.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    ///
    /// Called by the repository after a successful write.
    fn set_version(&mut self, version: Version);

    /// Returns true if the aggregate is in a terminal state.
    fn is_terminal(&self) -> bool;
}
