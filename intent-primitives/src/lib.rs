//! Core shared types for IntentCore.

#![warn(missing_docs, clippy::pedantic)]

mod conversation;
mod error;
mod ids;

/// Normalised conversation schema consumed by the extractor.
pub use conversation::{Conversation, FunctionCall, ProposedAction, Role, Turn};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifiers for records, review queue entries, and audit events.
pub use ids::{EventId, QueueId, RecordId};
