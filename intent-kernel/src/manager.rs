//! Decision lifecycle manager.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use intent_config::GovernanceConfig;
use intent_policy::{GovernanceEngine, GovernanceVerdict};
use intent_primitives::{QueueId, RecordId};
use intent_reasoning::{
    ExecutionOutcome, ExecutionStatus, ExtractionRequest, HumanDecision, HumanReview,
    ReasoningExtractor, ReasoningRecord,
};
use intent_store::{
    AuditEvent, AuditEventKind, DailyMetrics, DecisionStore, ReviewPriority, ReviewQueueEntry,
    SummaryStats,
};
use intent_telemetry::{ExtractionMetrics, ExtractionQuality};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{ManagerError, ManagerResult};
use crate::lifecycle::{Lifecycle, LifecycleEvent};
use crate::locks::RecordLocks;
use crate::priority::compute_priority;

/// Outcome of [`DecisionManager::process_decision`].
#[derive(Debug, Clone)]
pub struct ProcessedDecision {
    /// The persisted record with the verdict merged in.
    pub record: ReasoningRecord,
    /// The policy engine's verdict.
    pub verdict: GovernanceVerdict,
    /// Queue entry created for human review, if one was required.
    pub queue_id: Option<QueueId>,
    /// Priority of that queue entry.
    pub priority: Option<ReviewPriority>,
}

/// A reviewer's decision on a queued record.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSubmission {
    reviewer_id: String,
    decision: HumanDecision,
    rationale: Option<String>,
    modification: Option<Map<String, Value>>,
}

impl ReviewSubmission {
    /// Creates a submission without rationale or modification.
    #[must_use]
    pub fn new(reviewer_id: impl Into<String>, decision: HumanDecision) -> Self {
        Self {
            reviewer_id: reviewer_id.into(),
            decision,
            rationale: None,
            modification: None,
        }
    }

    /// Attaches the reviewer's rationale.
    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Attaches parameter overrides for the selected action.
    #[must_use]
    pub fn with_modification(mut self, modification: Map<String, Value>) -> Self {
        self.modification = Some(modification);
        self
    }

    /// Reviewer identifier.
    #[must_use]
    pub fn reviewer_id(&self) -> &str {
        &self.reviewer_id
    }

    /// Decision as submitted.
    #[must_use]
    pub const fn decision(&self) -> HumanDecision {
        self.decision
    }
}

/// Sequences extraction, validation, and policy evaluation, persists the
/// result, and applies human decisions and execution outcomes.
///
/// Writes to an existing record are serialised per record identifier.
pub struct DecisionManager<S>
where
    S: DecisionStore + ?Sized,
{
    extractor: ReasoningExtractor,
    engine: GovernanceEngine,
    config: Arc<GovernanceConfig>,
    store: Arc<S>,
    locks: RecordLocks,
    metrics: Mutex<ExtractionMetrics>,
}

impl<S> DecisionManager<S>
where
    S: DecisionStore + ?Sized,
{
    /// Creates a manager running the built-in checks.
    #[must_use]
    pub fn new(store: Arc<S>, config: impl Into<Arc<GovernanceConfig>>) -> Self {
        Self {
            extractor: ReasoningExtractor::new(),
            engine: GovernanceEngine::new(),
            config: config.into(),
            store,
            locks: RecordLocks::new(),
            metrics: Mutex::new(ExtractionMetrics::new()),
        }
    }

    /// Replaces the policy engine.
    #[must_use]
    pub fn with_engine(mut self, engine: GovernanceEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Returns the governance configuration.
    #[must_use]
    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Returns the storage collaborator.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Extracts, scores, and evaluates a proposed action, persists the
    /// record, and queues it for review when required.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when persistence fails. Rejection and
    /// review routing are reported through the verdict, not as errors.
    pub async fn process_decision(
        &self,
        request: ExtractionRequest,
    ) -> ManagerResult<ProcessedDecision> {
        let started = Instant::now();
        let agent_id = request.agent_id.clone();

        let mut record = self.extractor.extract(request);
        let mut lifecycle = Lifecycle::new(record.id());
        let verdict = self.engine.enforce(&record, &self.config);
        lifecycle.transition(LifecycleEvent::Evaluate)?;
        lifecycle.transition(LifecycleEvent::Route(verdict.decision()))?;
        if verdict.requires_review() {
            lifecycle.transition(LifecycleEvent::Escalate)?;
        }
        record.apply_governance(verdict.outcome());
        let elapsed = started.elapsed();

        let record_id = self.store.save(&record).await?;

        let mut queued = None;
        if verdict.requires_review() {
            let priority = compute_priority(&record, &verdict, &self.config.priority);
            let queue_id = self.store.enqueue_review(record_id, priority).await?;
            queued = Some((queue_id, priority));
        }

        self.metrics.lock().await.record(
            record.completeness_score(),
            elapsed,
            verdict.decision(),
        );

        self.audit(
            AuditEvent::new(
                AuditEventKind::ExtractionCompleted,
                json!({
                    "agent_role": record.provenance().agent_role,
                    "completeness_score": record.completeness_score(),
                    "missing_components": record.missing_components(),
                    "extraction_ms": elapsed.as_secs_f64() * 1_000.0,
                }),
            )
            .for_record(record_id)
            .by_actor(agent_id.as_str()),
        )
        .await?;
        self.audit(
            AuditEvent::new(
                AuditEventKind::GovernanceEnforced,
                json!({
                    "decision": verdict.decision(),
                    "requires_review": verdict.requires_review(),
                    "violations": verdict.violations(),
                    "warnings": verdict.warnings(),
                }),
            )
            .for_record(record_id),
        )
        .await?;
        if let Some((queue_id, priority)) = queued {
            self.audit(
                AuditEvent::new(
                    AuditEventKind::ReviewRequested,
                    json!({"queue_id": queue_id, "priority": priority}),
                )
                .for_record(record_id),
            )
            .await?;
        }

        info!(
            %record_id,
            agent_id = %agent_id,
            decision = ?verdict.decision(),
            requires_review = verdict.requires_review(),
            completeness = record.completeness_score(),
            "decision processed"
        );

        Ok(ProcessedDecision {
            record,
            verdict,
            queue_id: queued.map(|(queue_id, _)| queue_id),
            priority: queued.map(|(_, priority)| priority),
        })
    }

    /// Applies a reviewer's decision to a record awaiting review.
    ///
    /// A non-empty modification yields `modified` regardless of the submitted
    /// label. The record's queue entry is marked completed. Records the policy
    /// engine approved but flagged accept any decision; flagged rejections can
    /// only be confirmed.
    ///
    /// # Errors
    ///
    /// * [`ManagerError::RecordNotFound`] when no record exists.
    /// * [`ManagerError::InvalidReview`] for `modified` without a modification.
    /// * [`ManagerError::InvalidTransition`] when the record is not awaiting review.
    /// * [`ManagerError::Store`] when persistence fails.
    pub async fn submit_human_decision(
        &self,
        record_id: RecordId,
        submission: ReviewSubmission,
    ) -> ManagerResult<ReasoningRecord> {
        let _guard = self.locks.acquire(record_id).await;
        let mut record = self.load(record_id).await?;

        let modification = submission
            .modification
            .filter(|changes| !changes.is_empty());
        let decision = submission
            .decision
            .governance_decision(modification.as_ref())
            .ok_or_else(|| ManagerError::InvalidReview {
                reason: "a modified decision requires a non-empty modification".into(),
            })?;

        let mut lifecycle = Lifecycle::resume(&record);
        if let Err(err) = lifecycle.transition(LifecycleEvent::Review(decision)) {
            warn!(%record_id, error = %err, "human decision refused");
            return Err(err.into());
        }

        let review = HumanReview {
            reviewer_id: submission.reviewer_id,
            reviewed_at: Utc::now(),
            decision: submission.decision,
            rationale: submission.rationale,
            modification,
        };
        let payload = json!({
            "decision": review.decision,
            "governance_decision": decision,
            "rationale": review.rationale,
            "modification": review.modification,
        });
        let reviewer = review.reviewer_id.clone();
        record.apply_review(review, decision);

        self.store.update(&record).await?;
        self.store.complete_review(record_id).await?;
        self.audit(
            AuditEvent::new(AuditEventKind::HumanDecisionSubmitted, payload)
                .for_record(record_id)
                .by_actor(reviewer.as_str()),
        )
        .await?;

        info!(%record_id, reviewer = %reviewer, decision = ?decision, "human decision applied");
        Ok(record)
    }

    /// Records the execution outcome of an approved or modified action.
    ///
    /// # Errors
    ///
    /// * [`ManagerError::RecordNotFound`] when no record exists.
    /// * [`ManagerError::InvalidTransition`] when the record is not cleared for
    ///   execution, its review request is unanswered, the status is `pending`,
    ///   or execution already finished.
    /// * [`ManagerError::Store`] when persistence fails.
    pub async fn record_execution(
        &self,
        record_id: RecordId,
        status: ExecutionStatus,
        result: Option<Value>,
    ) -> ManagerResult<ReasoningRecord> {
        let _guard = self.locks.acquire(record_id).await;
        let mut record = self.load(record_id).await?;

        let mut lifecycle = Lifecycle::resume(&record);
        if let Err(err) = lifecycle.transition(LifecycleEvent::Execute(status)) {
            warn!(%record_id, error = %err, "execution outcome refused");
            return Err(err.into());
        }

        record.apply_execution(ExecutionOutcome {
            status,
            result: result.clone(),
            executed_at: Utc::now(),
        });
        self.store.update(&record).await?;
        self.audit(
            AuditEvent::new(
                AuditEventKind::ExecutionCompleted,
                json!({"status": status, "result": result}),
            )
            .for_record(record_id),
        )
        .await?;

        info!(%record_id, status = %status, "execution recorded");
        Ok(record)
    }

    /// Loads a record.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::RecordNotFound`] or [`ManagerError::Store`].
    pub async fn record(&self, record_id: RecordId) -> ManagerResult<ReasoningRecord> {
        self.load(record_id).await
    }

    /// Lists queued reviews, highest priority first.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when the store fails.
    pub async fn pending_reviews(
        &self,
        assignee: Option<&str>,
    ) -> ManagerResult<Vec<ReviewQueueEntry>> {
        Ok(self.store.list_pending_reviews(assignee).await?)
    }

    /// Assigns a queued review to a reviewer.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when the entry does not exist or the
    /// store fails.
    pub async fn assign_review(&self, queue_id: QueueId, assignee: &str) -> ManagerResult<()> {
        Ok(self.store.assign_review(queue_id, assignee).await?)
    }

    /// Audit trail, optionally for one record.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when the store fails.
    pub async fn audit_trail(&self, record_id: Option<RecordId>) -> ManagerResult<Vec<AuditEvent>> {
        Ok(self.store.audit_events(record_id).await?)
    }

    /// Aggregate counters over stored records.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when the store fails.
    pub async fn summary_stats(&self) -> ManagerResult<SummaryStats> {
        Ok(self.store.summary_stats().await?)
    }

    /// Per-day counters for the most recent `days` days with activity,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when the store fails.
    pub async fn daily_metrics(&self, days: usize) -> ManagerResult<Vec<DailyMetrics>> {
        Ok(self.store.daily_metrics(days).await?)
    }

    /// Snapshot of extraction quality over every processed decision.
    pub async fn metrics(&self) -> ExtractionQuality {
        self.metrics.lock().await.snapshot()
    }

    async fn load(&self, record_id: RecordId) -> ManagerResult<ReasoningRecord> {
        self.store
            .get(record_id)
            .await?
            .ok_or(ManagerError::RecordNotFound(record_id))
    }

    async fn audit(&self, event: AuditEvent) -> ManagerResult<()> {
        Ok(self.store.append_audit_event(event).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_primitives::{Conversation, ProposedAction, Turn};
    use intent_reasoning::GovernanceDecision;
    use intent_store::InMemoryStore;

    fn request(amount: &str) -> ExtractionRequest {
        let conversation = Conversation::new(vec![
            Turn::user("Rebalance the book"),
            Turn::assistant_with_actions(
                Some(
                    "Current Situation:\nAs of today, our portfolio shows NVDA concentration at \
                     32% of the $400M book, exceeding our 25% policy limit.\n\n\
                     Risks:\n- Execution risk: Large order may move the price against us\n\n\
                     Rationale: Reducing the position restores compliance with the mandate."
                        .into(),
                ),
                vec![
                    ProposedAction::new(
                        "call_1",
                        "execute_trade",
                        format!(r#"{{"symbol": "NVDA", "amount": "{amount}"}}"#),
                    )
                    .unwrap(),
                ],
            ),
        ]);
        ExtractionRequest::new("analyst-1", "portfolio_analyst", "Rebalance the book", conversation)
    }

    fn manager() -> DecisionManager<InMemoryStore> {
        DecisionManager::new(Arc::new(InMemoryStore::new()), GovernanceConfig::default())
    }

    #[tokio::test]
    async fn approved_decision_is_not_queued() {
        let manager = manager();
        let processed = manager.process_decision(request("$5M")).await.unwrap();

        assert_eq!(processed.verdict.decision(), GovernanceDecision::Approved);
        assert!(processed.queue_id.is_none());
        assert!(manager.pending_reviews(None).await.unwrap().is_empty());

        let kinds: Vec<AuditEventKind> = manager
            .audit_trail(Some(processed.record.id()))
            .await
            .unwrap()
            .iter()
            .map(AuditEvent::kind)
            .collect();
        assert_eq!(
            kinds,
            [AuditEventKind::ExtractionCompleted, AuditEventKind::GovernanceEnforced]
        );
    }

    #[tokio::test]
    async fn execution_is_recorded_for_approved_decision() {
        let manager = manager();
        let id = manager.process_decision(request("$5M")).await.unwrap().record.id();

        manager
            .record_execution(id, ExecutionStatus::Executing, None)
            .await
            .unwrap();
        let record = manager
            .record_execution(id, ExecutionStatus::Completed, Some(json!({"filled": true})))
            .await
            .unwrap();

        assert_eq!(record.execution_status(), ExecutionStatus::Completed);
        assert_eq!(record.execution().unwrap().result, Some(json!({"filled": true})));
        assert_eq!(manager.audit_trail(Some(id)).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn execution_of_queued_decision_is_refused() {
        let manager = manager();
        let id = manager.process_decision(request("$90M")).await.unwrap().record.id();

        let err = manager
            .record_execution(id, ExecutionStatus::Completed, None)
            .await
            .expect_err("still awaiting review");
        assert!(matches!(err, ManagerError::InvalidTransition(_)));
        assert!(manager.record(id).await.unwrap().execution().is_none());
    }

    #[tokio::test]
    async fn modified_label_requires_changes() {
        let manager = manager();
        let id = manager.process_decision(request("$90M")).await.unwrap().record.id();

        let err = manager
            .submit_human_decision(id, ReviewSubmission::new("officer", HumanDecision::Modified))
            .await
            .expect_err("no modification");
        assert!(matches!(err, ManagerError::InvalidReview { .. }));
        assert_eq!(
            manager.record(id).await.unwrap().governance_decision(),
            GovernanceDecision::ReviewRequired
        );
    }

    #[tokio::test]
    async fn metrics_track_processed_decisions() {
        let manager = manager();
        manager.process_decision(request("$5M")).await.unwrap();
        manager.process_decision(request("$90M")).await.unwrap();

        let quality = manager.metrics().await;
        assert_eq!(quality.extractions, 2);
        assert_eq!(quality.decisions["approved"], 1);
        assert_eq!(quality.decisions["review_required"], 1);
        assert!(quality.completeness_target_met);
    }
}
