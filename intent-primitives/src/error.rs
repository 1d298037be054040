//! Shared error definitions for IntentCore primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the primitives crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided identifier could not be parsed.
    #[error("invalid identifier: {source}")]
    InvalidId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// A conversation turn or proposed action failed validation.
    #[error("invalid conversation: {reason}")]
    InvalidConversation {
        /// Human-readable reason for rejection.
        reason: String,
    },
}
