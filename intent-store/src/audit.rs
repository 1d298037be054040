//! Append-only audit events.

use std::fmt;

use chrono::{DateTime, Utc};
use intent_primitives::{EventId, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle transition recorded by an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// Reasoning was extracted and the record captured.
    ExtractionCompleted,
    /// Policies were evaluated.
    GovernanceEnforced,
    /// The record was queued for human review.
    ReviewRequested,
    /// A reviewer submitted a decision.
    HumanDecisionSubmitted,
    /// An execution outcome was recorded.
    ExecutionCompleted,
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExtractionCompleted => "extraction_completed",
            Self::GovernanceEnforced => "governance_enforced",
            Self::ReviewRequested => "review_requested",
            Self::HumanDecisionSubmitted => "human_decision_submitted",
            Self::ExecutionCompleted => "execution_completed",
        })
    }
}

/// Immutable record of one lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    id: EventId,
    kind: AuditEventKind,
    payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    record_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actor_id: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event timestamped now.
    #[must_use]
    pub fn new(kind: AuditEventKind, payload: Value) -> Self {
        Self {
            id: EventId::random(),
            kind,
            payload,
            record_id: None,
            actor_id: None,
            recorded_at: Utc::now(),
        }
    }

    /// Associates the event with a record.
    #[must_use]
    pub fn for_record(mut self, record_id: RecordId) -> Self {
        self.record_id = Some(record_id);
        self
    }

    /// Associates the event with an actor (agent or reviewer).
    #[must_use]
    pub fn by_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Event identifier.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Event kind.
    #[must_use]
    pub const fn kind(&self) -> AuditEventKind {
        self.kind
    }

    /// Structured payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Related record, if any.
    #[must_use]
    pub const fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    /// Actor, if any.
    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    /// When the event was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
