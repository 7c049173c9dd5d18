#![forbid(unsafe_code)]

//! Runtime error types.

use sitetree_core::TreeError;
use thiserror::Error;

/// Failure reported by a persistence backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend refused the change; the store must not keep it.
    #[error("backend rejected the change: {0}")]
    Rejected(String),
    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid page file: {0}")]
    Json(#[from] serde_json::Error),
    /// The change would break a tree invariant on the backend side.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Why the editor refused or reverted an operation.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A move or edit failed its precondition; nothing was mutated.
    #[error("rejected: {0}")]
    Rejected(#[from] TreeError),
    /// The backend failed; any optimistic change was rolled back.
    #[error("persisting failed: {0}")]
    Persist(#[from] GatewayError),
}

impl EditorError {
    #[must_use]
    pub fn is_rollback(&self) -> bool {
        matches!(self, Self::Persist(_))
    }
}
