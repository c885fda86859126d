//! Cancellation state machine shared by sales and their line items.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a sale or a line item.
///
/// State transitions:
/// ```text
/// Active ──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CancellationState {
    /// Open for modification.
    #[default]
    Active,

    /// Cancelled (terminal state).
    Cancelled,
}

impl CancellationState {
    /// Returns true if this state can move to `Cancelled`.
    pub fn can_cancel(&self) -> bool {
        matches!(self, CancellationState::Active)
    }

    /// Returns true once cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CancellationState::Cancelled)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        self.is_cancelled()
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationState::Active => "Active",
            CancellationState::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for CancellationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
