//! Errors surfaced by the decision manager.

use intent_primitives::RecordId;
use intent_store::StoreError;
use thiserror::Error;

use crate::lifecycle::LifecycleError;

/// Errors returned by [`crate::DecisionManager`] operations.
///
/// Rejected or review-required verdicts are outcomes, not errors.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// No record exists for the identifier; nothing was written.
    #[error("reasoning record {0} not found")]
    RecordNotFound(RecordId),
    /// The record is not in a state that accepts the operation.
    #[error(transparent)]
    InvalidTransition(#[from] LifecycleError),
    /// The submitted review is malformed.
    #[error("invalid review: {reason}")]
    InvalidReview {
        /// Human-readable reason.
        reason: String,
    },
    /// The storage collaborator failed.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;
