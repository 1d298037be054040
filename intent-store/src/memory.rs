//! In-process store backed by hash maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use intent_primitives::{QueueId, RecordId};
use intent_reasoning::{HumanDecision, ReasoningRecord};
use tokio::sync::RwLock;
use tracing::debug;

use crate::audit::AuditEvent;
use crate::journal::AuditJournal;
use crate::queue::{ReviewPriority, ReviewQueueEntry};
use crate::store::{DailyMetrics, DecisionStore, RecordQuery, SummaryStats};
use crate::{StoreError, StoreResult};

#[derive(Default)]
struct StoreInner {
    records: HashMap<RecordId, ReasoningRecord>,
    queue: Vec<ReviewQueueEntry>,
    audit: Vec<AuditEvent>,
}

/// Volatile [`DecisionStore`], optionally mirroring audit events into a
/// durable [`AuditJournal`].
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
    journal: Option<Arc<dyn AuditJournal>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors every appended audit event into `journal`.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<dyn AuditJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Returns the configured journal, if any.
    #[must_use]
    pub fn journal(&self) -> Option<&Arc<dyn AuditJournal>> {
        self.journal.as_ref()
    }
}

#[async_trait]
impl DecisionStore for InMemoryStore {
    async fn save(&self, record: &ReasoningRecord) -> StoreResult<RecordId> {
        let mut guard = self.inner.write().await;
        let id = record.id();
        if guard.records.contains_key(&id) {
            return Err(StoreError::DuplicateRecord(id));
        }
        guard.records.insert(id, record.clone());
        Ok(id)
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<ReasoningRecord>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn update(&self, record: &ReasoningRecord) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        let slot = guard
            .records
            .get_mut(&record.id())
            .ok_or(StoreError::NotFound(record.id()))?;
        *slot = record.clone();
        Ok(())
    }

    async fn query_records(&self, query: &RecordQuery) -> StoreResult<Vec<ReasoningRecord>> {
        let guard = self.inner.read().await;
        let mut records: Vec<ReasoningRecord> = guard
            .records
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.captured_at().cmp(&a.captured_at()));
        records.truncate(query.limit);
        Ok(records)
    }

    async fn enqueue_review(
        &self,
        record_id: RecordId,
        priority: ReviewPriority,
    ) -> StoreResult<QueueId> {
        let mut guard = self.inner.write().await;
        if !guard.records.contains_key(&record_id) {
            return Err(StoreError::NotFound(record_id));
        }
        if let Some(existing) = guard.queue.iter().find(|entry| entry.record_id == record_id) {
            debug!(%record_id, queue_id = %existing.queue_id, "review already queued");
            return Ok(existing.queue_id);
        }
        let entry = ReviewQueueEntry::new(record_id, priority);
        let queue_id = entry.queue_id;
        guard.queue.push(entry);
        Ok(queue_id)
    }

    async fn review_for(&self, record_id: RecordId) -> StoreResult<Option<ReviewQueueEntry>> {
        let guard = self.inner.read().await;
        Ok(guard
            .queue
            .iter()
            .find(|entry| entry.record_id == record_id)
            .cloned())
    }

    async fn list_pending_reviews(
        &self,
        assignee: Option<&str>,
    ) -> StoreResult<Vec<ReviewQueueEntry>> {
        let guard = self.inner.read().await;
        let mut pending: Vec<ReviewQueueEntry> = guard
            .queue
            .iter()
            .filter(|entry| entry.is_pending())
            .filter(|entry| assignee.is_none_or(|who| entry.assignee.as_deref() == Some(who)))
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            b.priority_score
                .cmp(&a.priority_score)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(pending)
    }

    async fn assign_review(&self, queue_id: QueueId, assignee: &str) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        let entry = guard
            .queue
            .iter_mut()
            .find(|entry| entry.queue_id == queue_id)
            .ok_or(StoreError::QueueEntryNotFound(queue_id))?;
        entry.assignee = Some(assignee.to_owned());
        Ok(())
    }

    async fn complete_review(&self, record_id: RecordId) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        if let Some(entry) = guard
            .queue
            .iter_mut()
            .find(|entry| entry.record_id == record_id && entry.is_pending())
        {
            entry.complete();
        }
        Ok(())
    }

    async fn append_audit_event(&self, event: AuditEvent) -> StoreResult<()> {
        // The journal and the in-memory trail share one append order.
        let mut guard = self.inner.write().await;
        if let Some(journal) = &self.journal {
            journal.append(&event).await?;
        }
        guard.audit.push(event);
        Ok(())
    }

    async fn audit_events(&self, record_id: Option<RecordId>) -> StoreResult<Vec<AuditEvent>> {
        let guard = self.inner.read().await;
        Ok(guard
            .audit
            .iter()
            .filter(|event| record_id.is_none_or(|id| event.record_id() == Some(id)))
            .cloned()
            .collect())
    }

    async fn summary_stats(&self) -> StoreResult<SummaryStats> {
        let guard = self.inner.read().await;
        let mut stats = SummaryStats {
            total_records: guard.records.len(),
            ..SummaryStats::default()
        };
        let mut completeness_sum = 0.0;
        for record in guard.records.values() {
            completeness_sum += record.completeness_score();
            if record.requires_review() {
                stats.total_reviews += 1;
            }
            match record.review().map(|review| review.decision) {
                Some(HumanDecision::Approved) => stats.total_approved += 1,
                Some(HumanDecision::Rejected) => stats.total_rejected += 1,
                _ => {}
            }
        }
        if stats.total_records > 0 {
            #[allow(clippy::cast_precision_loss)]
            let count = stats.total_records as f64;
            stats.avg_completeness = Some(completeness_sum / count);
        }
        Ok(stats)
    }

    async fn daily_metrics(&self, days: usize) -> StoreResult<Vec<DailyMetrics>> {
        let guard = self.inner.read().await;
        let mut by_day: BTreeMap<NaiveDate, (DailyMetrics, f64)> = BTreeMap::new();
        for record in guard.records.values() {
            let date = record.captured_at().date_naive();
            let (day, completeness_sum) = by_day
                .entry(date)
                .or_insert_with(|| (DailyMetrics::empty(date), 0.0));
            day.total_decisions += 1;
            *completeness_sum += record.completeness_score();
            if record.requires_review() {
                day.total_reviews += 1;
            }
            match record.review().map(|review| review.decision) {
                Some(HumanDecision::Approved) => day.total_approved += 1,
                Some(HumanDecision::Rejected) => day.total_rejected += 1,
                _ => {}
            }
        }
        Ok(by_day
            .into_values()
            .rev()
            .take(days)
            .map(|(mut day, completeness_sum)| {
                #[allow(clippy::cast_precision_loss)]
                let count = day.total_decisions as f64;
                day.avg_completeness = completeness_sum / count;
                day
            })
            .collect())
    }
}
