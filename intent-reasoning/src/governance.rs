//! Governance, review, and execution state carried by a reasoning record.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Governance decision attached to a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceDecision {
    /// Policies have not been evaluated yet.
    #[default]
    Pending,
    /// Cleared for execution.
    Approved,
    /// Blocked.
    Rejected,
    /// Waiting on a human reviewer.
    ReviewRequired,
    /// Cleared for execution with reviewer-supplied parameter overrides.
    Modified,
}

impl fmt::Display for GovernanceDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ReviewRequired => "review_required",
            Self::Modified => "modified",
        })
    }
}

/// Severity attached to a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A failure is a violation.
    Error,
    /// A failure is a warning that routes to review.
    Warning,
}

/// Outcome of a single named policy check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCheckResult {
    passed: bool,
    message: String,
    severity: Severity,
    auto_block: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    details: Map<String, Value>,
}

impl PolicyCheckResult {
    /// Creates a check result.
    #[must_use]
    pub fn new(passed: bool, message: impl Into<String>, severity: Severity, auto_block: bool) -> Self {
        Self {
            passed,
            message: message.into(),
            severity,
            auto_block,
            details: Map::new(),
        }
    }

    /// Attaches structured details (limits, measured values).
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    /// Whether the check passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity of the check.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether a failure blocks the action outright.
    #[must_use]
    pub const fn auto_block(&self) -> bool {
        self.auto_block
    }

    /// Structured details.
    #[must_use]
    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}

/// Governance fields merged into a record in one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceOutcome {
    /// Result of every evaluated check, keyed by policy name.
    pub policy_results: BTreeMap<String, PolicyCheckResult>,
    /// Whether a human must review the record.
    pub requires_review: bool,
    /// Routing decision.
    pub decision: GovernanceDecision,
}

/// Decision submitted by a human reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanDecision {
    /// Approve as proposed.
    Approved,
    /// Reject.
    Rejected,
    /// Approve with parameter overrides.
    Modified,
}

impl HumanDecision {
    /// Maps the reviewer's decision onto a governance decision.
    ///
    /// A non-empty modification always yields [`GovernanceDecision::Modified`].
    /// Returns `None` for [`HumanDecision::Modified`] without a modification.
    #[must_use]
    pub fn governance_decision(self, modification: Option<&Map<String, Value>>) -> Option<GovernanceDecision> {
        if modification.is_some_and(|changes| !changes.is_empty()) {
            return Some(GovernanceDecision::Modified);
        }
        match self {
            Self::Approved => Some(GovernanceDecision::Approved),
            Self::Rejected => Some(GovernanceDecision::Rejected),
            Self::Modified => None,
        }
    }
}

impl fmt::Display for HumanDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Modified => "modified",
        })
    }
}

/// Reviewer fields recorded by a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanReview {
    /// Reviewer identifier.
    pub reviewer_id: String,
    /// When the decision was submitted.
    pub reviewed_at: DateTime<Utc>,
    /// Decision as submitted.
    pub decision: HumanDecision,
    /// Reviewer's rationale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Overrides applied to the selected action's parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification: Option<Map<String, Value>>,
}

/// Execution status of the governed action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Not started.
    #[default]
    Pending,
    /// Running.
    Executing,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl ExecutionStatus {
    /// Returns `true` for `completed` and `failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// Execution fields recorded after the action ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Execution status.
    pub status: ExecutionStatus,
    /// Result payload reported by the executor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// When the outcome was recorded.
    pub executed_at: DateTime<Utc>,
}
