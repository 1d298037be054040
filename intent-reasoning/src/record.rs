//! The reasoning record: one structured snapshot per intercepted action.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use intent_primitives::{Conversation, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::SelectedAction;
use crate::governance::{
    ExecutionOutcome, ExecutionStatus, GovernanceDecision, GovernanceOutcome, HumanReview,
    PolicyCheckResult,
};
use crate::validator::{self, Component};

/// Who produced the reasoning and from what input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Agent identifier.
    pub agent_id: String,
    /// Agent role label.
    pub agent_role: String,
    /// Originating task description.
    pub task: String,
    /// Conversation snapshot used for extraction, kept verbatim.
    pub conversation: Conversation,
}

/// Money amounts, percentages, and structured metrics found in the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeFindings {
    /// Dollar amount tokens in encounter order.
    pub amounts: Vec<String>,
    /// Percentage tokens in encounter order.
    pub percentages: Vec<String>,
    /// Key-value pairs merged from structured tool output.
    pub metrics: Map<String, Value>,
}

impl QuantitativeFindings {
    /// Returns `true` when nothing quantitative was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty() && self.percentages.is_empty() && self.metrics.is_empty()
    }
}

/// An alternative the agent considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsideredOption {
    /// Short description.
    pub description: String,
    /// Whether the agent weighed it.
    pub considered: bool,
}

impl ConsideredOption {
    /// Creates an option marked as considered.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            considered: true,
        }
    }
}

/// Fields reconstructed from the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReasoning {
    /// Situation narrative.
    pub situation: String,
    /// Quantitative findings.
    pub findings: QuantitativeFindings,
    /// Alternatives considered.
    pub options: Vec<ConsideredOption>,
    /// Action the agent selected.
    pub selected_action: SelectedAction,
    /// Rationale narrative.
    pub rationale: String,
    /// Distinct identified risks.
    pub risks: Vec<String>,
}

/// Structured snapshot of an agent's reasoning for one proposed action,
/// together with its governance, review, and execution state.
///
/// The completeness score and missing-component list are derived from the
/// extracted fields at construction and again on deserialisation; they cannot
/// be set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordDocument")]
pub struct ReasoningRecord {
    id: RecordId,
    captured_at: DateTime<Utc>,
    provenance: Provenance,
    reasoning: ExtractedReasoning,
    completeness_score: f64,
    missing_components: Vec<Component>,
    governance: GovernanceOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    review: Option<HumanReview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution: Option<ExecutionOutcome>,
}

// Persisted shape. Derived fields present in stored documents are ignored.
#[derive(Deserialize)]
struct RecordDocument {
    id: RecordId,
    captured_at: DateTime<Utc>,
    provenance: Provenance,
    reasoning: ExtractedReasoning,
    #[serde(default)]
    governance: GovernanceOutcome,
    #[serde(default)]
    review: Option<HumanReview>,
    #[serde(default)]
    execution: Option<ExecutionOutcome>,
}

impl From<RecordDocument> for ReasoningRecord {
    fn from(document: RecordDocument) -> Self {
        let mut record = Self::assemble(
            document.id,
            document.captured_at,
            document.provenance,
            document.reasoning,
        );
        record.governance = document.governance;
        record.review = document.review;
        record.execution = document.execution;
        record
    }
}

impl ReasoningRecord {
    /// Captures freshly extracted reasoning under a new identifier.
    #[must_use]
    pub fn capture(provenance: Provenance, reasoning: ExtractedReasoning) -> Self {
        Self::assemble(RecordId::random(), Utc::now(), provenance, reasoning)
    }

    fn assemble(
        id: RecordId,
        captured_at: DateTime<Utc>,
        provenance: Provenance,
        reasoning: ExtractedReasoning,
    ) -> Self {
        let assessment = validator::assess(&reasoning);
        Self {
            id,
            captured_at,
            provenance,
            reasoning,
            completeness_score: assessment.completeness_score,
            missing_components: assessment.missing_components,
            governance: GovernanceOutcome::default(),
            review: None,
            execution: None,
        }
    }

    /// Record identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// When extraction completed.
    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Provenance of the reasoning.
    #[must_use]
    pub const fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Agent identifier.
    #[must_use]
    pub fn agent_id(&self) -> &str {
        &self.provenance.agent_id
    }

    /// Originating task.
    #[must_use]
    pub fn task(&self) -> &str {
        &self.provenance.task
    }

    /// Conversation snapshot.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.provenance.conversation
    }

    /// All extracted fields.
    #[must_use]
    pub const fn reasoning(&self) -> &ExtractedReasoning {
        &self.reasoning
    }

    /// Situation narrative.
    #[must_use]
    pub fn situation(&self) -> &str {
        &self.reasoning.situation
    }

    /// Quantitative findings.
    #[must_use]
    pub const fn findings(&self) -> &QuantitativeFindings {
        &self.reasoning.findings
    }

    /// Considered options.
    #[must_use]
    pub fn options(&self) -> &[ConsideredOption] {
        &self.reasoning.options
    }

    /// Selected action.
    #[must_use]
    pub const fn selected_action(&self) -> &SelectedAction {
        &self.reasoning.selected_action
    }

    /// Rationale narrative.
    #[must_use]
    pub fn rationale(&self) -> &str {
        &self.reasoning.rationale
    }

    /// Identified risks.
    #[must_use]
    pub fn risks(&self) -> &[String] {
        &self.reasoning.risks
    }

    /// Completeness score in `[0, 1]`.
    #[must_use]
    pub const fn completeness_score(&self) -> f64 {
        self.completeness_score
    }

    /// Unsatisfied required components.
    #[must_use]
    pub fn missing_components(&self) -> &[Component] {
        &self.missing_components
    }

    /// Returns `true` when the completeness score reaches `threshold`.
    #[must_use]
    pub fn is_complete(&self, threshold: f64) -> bool {
        self.completeness_score >= threshold
    }

    /// Per-policy check results.
    #[must_use]
    pub const fn policy_results(&self) -> &BTreeMap<String, PolicyCheckResult> {
        &self.governance.policy_results
    }

    /// Whether a human must review the record.
    #[must_use]
    pub const fn requires_review(&self) -> bool {
        self.governance.requires_review
    }

    /// Current governance decision.
    #[must_use]
    pub const fn governance_decision(&self) -> GovernanceDecision {
        self.governance.decision
    }

    /// Human review, once submitted.
    #[must_use]
    pub const fn review(&self) -> Option<&HumanReview> {
        self.review.as_ref()
    }

    /// Execution outcome, once recorded.
    #[must_use]
    pub const fn execution(&self) -> Option<&ExecutionOutcome> {
        self.execution.as_ref()
    }

    /// Execution status; `pending` until an outcome is recorded.
    #[must_use]
    pub fn execution_status(&self) -> ExecutionStatus {
        self.execution
            .as_ref()
            .map_or(ExecutionStatus::Pending, |outcome| outcome.status)
    }

    /// Merges a policy verdict into the record in one step.
    pub fn apply_governance(&mut self, outcome: GovernanceOutcome) {
        self.governance = outcome;
    }

    /// Records a human review and the governance decision it maps to.
    pub fn apply_review(&mut self, review: HumanReview, decision: GovernanceDecision) {
        self.governance.decision = decision;
        self.review = Some(review);
    }

    /// Records an execution outcome.
    pub fn apply_execution(&mut self, outcome: ExecutionOutcome) {
        self.execution = Some(outcome);
    }

    /// Parameters the action should run with: the parsed parameters with any
    /// reviewer modification applied on top. `None` when the action carries
    /// no parsed parameters and no modification exists.
    #[must_use]
    pub fn effective_parameters(&self) -> Option<Map<String, Value>> {
        let base = self
            .reasoning
            .selected_action
            .arguments()
            .and_then(|arguments| arguments.parameters())
            .cloned();
        let modification = self.review.as_ref().and_then(|review| review.modification.as_ref());
        match (base, modification) {
            (Some(mut params), Some(changes)) => {
                params.extend(changes.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(params)
            }
            (None, Some(changes)) => Some(changes.clone()),
            (base, None) => base,
        }
    }

    /// Comma-separated missing components, or `"none"`.
    #[must_use]
    pub fn missing_components_summary(&self) -> String {
        if self.missing_components.is_empty() {
            return "none".to_owned();
        }
        self.missing_components
            .iter()
            .map(|component| component.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Multi-line summary for reviewers.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let action = match &self.reasoning.selected_action {
            SelectedAction::ToolCall { function, .. } => function.clone(),
            SelectedAction::Message { .. } => "message".to_owned(),
            SelectedAction::Unknown => "unknown".to_owned(),
        };
        let _ = writeln!(out, "Record {} ({})", self.id, self.provenance.agent_id);
        let _ = writeln!(out, "Task: {}", self.provenance.task);
        let _ = writeln!(out, "Action: {action}");
        let _ = writeln!(
            out,
            "Completeness: {:.0}% (missing: {})",
            self.completeness_score * 100.0,
            self.missing_components_summary()
        );
        let _ = writeln!(out, "Decision: {}", self.governance.decision);
        if !self.reasoning.situation.is_empty() {
            let _ = writeln!(out, "Situation: {}", self.reasoning.situation);
        }
        if !self.reasoning.rationale.is_empty() {
            let _ = writeln!(out, "Rationale: {}", self.reasoning.rationale);
        }
        for risk in &self.reasoning.risks {
            let _ = writeln!(out, "Risk: {risk}");
        }
        for option in &self.reasoning.options {
            let _ = writeln!(out, "Option: {}", option.description);
        }
        if let Some(review) = &self.review {
            let _ = writeln!(out, "Reviewed by {}: {}", review.reviewer_id, review.decision);
        }
        out
    }
}
