//! Governance verdict produced by the engine.

use std::collections::BTreeMap;

use intent_reasoning::{GovernanceDecision, GovernanceOutcome, PolicyCheckResult};
use serde::{Deserialize, Serialize};

/// Routing outcome of a full policy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceVerdict {
    decision: GovernanceDecision,
    requires_review: bool,
    policy_checks: BTreeMap<String, PolicyCheckResult>,
    violations: Vec<String>,
    warnings: Vec<String>,
    reasoning: String,
}

impl GovernanceVerdict {
    pub(crate) fn new(
        decision: GovernanceDecision,
        requires_review: bool,
        policy_checks: BTreeMap<String, PolicyCheckResult>,
        violations: Vec<String>,
        warnings: Vec<String>,
    ) -> Self {
        let reasoning = match decision {
            GovernanceDecision::Rejected => {
                format!("Rejected due to policy violations: {}", violations.join(", "))
            }
            GovernanceDecision::ReviewRequired => {
                let reasons: Vec<&str> = violations
                    .iter()
                    .chain(&warnings)
                    .map(String::as_str)
                    .collect();
                format!("Review required: {}", reasons.join(", "))
            }
            _ => "All policy checks passed. Approved for execution.".to_owned(),
        };
        Self {
            decision,
            requires_review,
            policy_checks,
            violations,
            warnings,
            reasoning,
        }
    }

    /// Routing decision.
    #[must_use]
    pub const fn decision(&self) -> GovernanceDecision {
        self.decision
    }

    /// Whether a human must review the record.
    #[must_use]
    pub const fn requires_review(&self) -> bool {
        self.requires_review
    }

    /// Result of every check, keyed by policy name.
    #[must_use]
    pub const fn policy_checks(&self) -> &BTreeMap<String, PolicyCheckResult> {
        &self.policy_checks
    }

    /// Messages of failed error-severity checks.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Messages of failed warning-severity checks and isolated check errors.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Human-readable explanation of the decision.
    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Returns `true` when at least one error-severity check failed.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Governance fields to merge into the evaluated record.
    #[must_use]
    pub fn outcome(&self) -> GovernanceOutcome {
        GovernanceOutcome {
            policy_results: self.policy_checks.clone(),
            requires_review: self.requires_review,
            decision: self.decision,
        }
    }
}
