//! Persistence interface consumed by the lifecycle manager.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use intent_primitives::{QueueId, RecordId};
use intent_reasoning::ReasoningRecord;
use serde::{Deserialize, Serialize};

use crate::StoreResult;
use crate::audit::AuditEvent;
use crate::queue::{ReviewPriority, ReviewQueueEntry};

/// Aggregate counters over all stored records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Records saved.
    pub total_records: usize,
    /// Records flagged for human review.
    pub total_reviews: usize,
    /// Records a reviewer approved.
    pub total_approved: usize,
    /// Records a reviewer rejected.
    pub total_rejected: usize,
    /// Mean completeness score; `None` when no record exists.
    pub avg_completeness: Option<f64>,
}

/// Counters for records captured on one calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    /// Capture date.
    pub date: NaiveDate,
    /// Records captured that day.
    pub total_decisions: usize,
    /// Of those, records flagged for human review.
    pub total_reviews: usize,
    /// Of those, records a reviewer approved.
    pub total_approved: usize,
    /// Of those, records a reviewer rejected.
    pub total_rejected: usize,
    /// Mean completeness score of the day's records.
    pub avg_completeness: f64,
}

impl DailyMetrics {
    pub(crate) const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_decisions: 0,
            total_reviews: 0,
            total_approved: 0,
            total_rejected: 0,
            avg_completeness: 0.0,
        }
    }
}

/// Filter for [`DecisionStore::query_records`]. Unset fields match everything.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    /// Only records produced by this agent.
    pub agent_id: Option<String>,
    /// Only records captured at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only records captured at or before this instant.
    pub until: Option<DateTime<Utc>>,
    /// Only records whose review flag matches.
    pub requires_review: Option<bool>,
    /// Maximum number of records returned.
    pub limit: usize,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            agent_id: None,
            since: None,
            until: None,
            requires_review: None,
            limit: 100,
        }
    }
}

impl RecordQuery {
    /// Returns `true` when `record` satisfies every set filter.
    #[must_use]
    pub fn matches(&self, record: &ReasoningRecord) -> bool {
        self.agent_id
            .as_deref()
            .is_none_or(|agent| agent == record.agent_id())
            && self.since.is_none_or(|since| record.captured_at() >= since)
            && self.until.is_none_or(|until| record.captured_at() <= until)
            && self
                .requires_review
                .is_none_or(|flag| flag == record.requires_review())
    }
}

/// Storage collaborator for records, the review queue, and the audit trail.
///
/// Implementations own retry policy; callers treat every error as final.
#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Persists a new record and returns its identifier.
    async fn save(&self, record: &ReasoningRecord) -> StoreResult<RecordId>;

    /// Loads a record.
    async fn get(&self, id: RecordId) -> StoreResult<Option<ReasoningRecord>>;

    /// Replaces a previously saved record.
    ///
    /// Fails with [`crate::StoreError::NotFound`] when the record was never saved.
    async fn update(&self, record: &ReasoningRecord) -> StoreResult<()>;

    /// Lists records matching `query`, newest first.
    async fn query_records(&self, query: &RecordQuery) -> StoreResult<Vec<ReasoningRecord>>;

    /// Queues a record for human review. Enqueuing a record that already has
    /// an entry returns the existing entry's identifier.
    async fn enqueue_review(
        &self,
        record_id: RecordId,
        priority: ReviewPriority,
    ) -> StoreResult<QueueId>;

    /// Returns the queue entry for a record, if one exists.
    async fn review_for(&self, record_id: RecordId) -> StoreResult<Option<ReviewQueueEntry>>;

    /// Lists queued entries, optionally only those assigned to `assignee`,
    /// ordered by priority score (highest first) then enqueue time.
    async fn list_pending_reviews(&self, assignee: Option<&str>)
    -> StoreResult<Vec<ReviewQueueEntry>>;

    /// Assigns a queue entry to a reviewer.
    async fn assign_review(&self, queue_id: QueueId, assignee: &str) -> StoreResult<()>;

    /// Marks the record's queue entry completed. A record without an entry is
    /// left untouched.
    async fn complete_review(&self, record_id: RecordId) -> StoreResult<()>;

    /// Appends an audit event.
    async fn append_audit_event(&self, event: AuditEvent) -> StoreResult<()>;

    /// Returns audit events in append order, optionally for one record.
    async fn audit_events(&self, record_id: Option<RecordId>) -> StoreResult<Vec<AuditEvent>>;

    /// Computes aggregate counters.
    async fn summary_stats(&self) -> StoreResult<SummaryStats>;

    /// Per-day counters for the `days` most recent days with captured
    /// records, newest first.
    async fn daily_metrics(&self, days: usize) -> StoreResult<Vec<DailyMetrics>>;
}
