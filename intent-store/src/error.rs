//! Error types for the persistence layer.

use intent_primitives::{QueueId, RecordId};
use serde_json::Error as SerdeError;
use thiserror::Error;

/// Errors emitted by stores and journals.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the identifier.
    #[error("record {0} not found")]
    NotFound(RecordId),
    /// A record with the same identifier was already saved.
    #[error("record {0} already exists")]
    DuplicateRecord(RecordId),
    /// No review queue entry matches the identifier.
    #[error("review queue entry {0} not found")]
    QueueEntryNotFound(QueueId),
    /// Underlying I/O failure while reading or writing journal files.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// Serialization or deserialization error.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: SerdeError,
    },
    /// A storage backend reported an application error.
    #[error("storage backend error: {reason}")]
    Backend {
        /// Human-readable reason describing the failure.
        reason: String,
    },
}

impl StoreError {
    /// Helper to construct backend errors from string-like values.
    #[must_use]
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
