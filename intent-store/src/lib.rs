//! Persistence for IntentCore.
//!
//! [`DecisionStore`] is the interface the lifecycle manager writes through.
//! [`InMemoryStore`] implements it for tests and single-process deployments
//! and can mirror the audit trail into a [`FileAuditJournal`].

#![warn(missing_docs, clippy::pedantic)]

mod audit;
mod error;
mod journal;
mod memory;
mod queue;
mod store;

pub use audit::{AuditEvent, AuditEventKind};
pub use error::{StoreError, StoreResult};
pub use journal::{AuditJournal, FileAuditJournal};
pub use memory::InMemoryStore;
pub use queue::{ReviewPriority, ReviewQueueEntry, ReviewStatus};
pub use store::{DailyMetrics, DecisionStore, RecordQuery, SummaryStats};
