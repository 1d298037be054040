//! Policy engine: ordered check evaluation and the decision rule.

use std::collections::BTreeMap;

use intent_config::GovernanceConfig;
use intent_reasoning::{GovernanceDecision, PolicyCheckResult, ReasoningRecord, Severity};
use thiserror::Error;
use tracing::{debug, warn};

use crate::checks::{PolicyCheck, builtin_checks};
use crate::verdict::GovernanceVerdict;

/// Completeness below which a clean evaluation still requires review.
pub const REVIEW_COMPLETENESS: f64 = 0.8;

/// Errors raised by an individual policy check.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// An action parameter has a shape the check cannot interpret.
    #[error("invalid parameter `{key}`: {reason}")]
    InvalidParameter {
        /// Parameter key.
        key: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

/// Result alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Evaluates a fixed, ordered list of checks.
///
/// The engine holds no mutable state and can be shared across concurrent
/// evaluations.
#[derive(Debug)]
pub struct GovernanceEngine {
    checks: Vec<Box<dyn PolicyCheck>>,
}

impl Default for GovernanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceEngine {
    /// Creates an engine running the built-in checks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_checks(builtin_checks())
    }

    /// Creates an engine running `checks` in the given order.
    #[must_use]
    pub fn with_checks(checks: Vec<Box<dyn PolicyCheck>>) -> Self {
        Self { checks }
    }

    /// Names of the configured checks in evaluation order.
    pub fn check_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|check| check.name())
    }

    /// Evaluates every check against `record`.
    ///
    /// A check that errors is recorded as a failed warning and evaluation
    /// continues with the next check.
    #[must_use]
    pub fn enforce(&self, record: &ReasoningRecord, config: &GovernanceConfig) -> GovernanceVerdict {
        let mut policy_checks = BTreeMap::new();
        let mut violations = Vec::new();
        let mut warnings = Vec::new();
        let mut blocked = false;

        for check in &self.checks {
            let name = check.name();
            match check.evaluate(record, config) {
                Ok(outcome) => {
                    if !outcome.passed {
                        match check.severity() {
                            Severity::Error => {
                                blocked |= check.auto_block();
                                violations.push(outcome.message.clone());
                            }
                            Severity::Warning => warnings.push(outcome.message.clone()),
                        }
                    }
                    policy_checks.insert(
                        name.to_owned(),
                        PolicyCheckResult::new(
                            outcome.passed,
                            outcome.message,
                            check.severity(),
                            check.auto_block(),
                        )
                        .with_details(outcome.details),
                    );
                }
                Err(err) => {
                    warn!(record_id = %record.id(), policy = name, error = %err, "policy check failed");
                    let message = format!("policy check failed: {err}");
                    warnings.push(message.clone());
                    policy_checks.insert(
                        name.to_owned(),
                        PolicyCheckResult::new(false, message, Severity::Warning, false),
                    );
                }
            }
        }

        let decision = if blocked {
            GovernanceDecision::Rejected
        } else if !violations.is_empty() || !warnings.is_empty() {
            GovernanceDecision::ReviewRequired
        } else {
            GovernanceDecision::Approved
        };
        let requires_review = !violations.is_empty()
            || !warnings.is_empty()
            || record.completeness_score() < REVIEW_COMPLETENESS;

        debug!(
            record_id = %record.id(),
            decision = ?decision,
            requires_review,
            violations = violations.len(),
            warnings = warnings.len(),
            "governance enforced"
        );

        GovernanceVerdict::new(decision, requires_review, policy_checks, violations, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckOutcome;
    use intent_config::Blacklist;
    use intent_primitives::{Conversation, ProposedAction, Turn};
    use intent_reasoning::{ExtractionRequest, ReasoningExtractor};

    const ANALYSIS: &str = "Current Situation:\nAs of today, our portfolio shows NVDA concentration \
        at 32%, exceeding our 25% policy limit.\n\n\
        Risks:\n- Execution risk: Large order may move the price against us\n\n\
        Rationale: Reducing the position restores compliance with the mandate.";

    fn record_with(task: &str, content: &str, arguments: &str) -> ReasoningRecord {
        let conversation = Conversation::new(vec![
            Turn::user(task),
            Turn::assistant_with_actions(
                Some(content.to_owned()),
                vec![ProposedAction::new("call_1", "execute_trade", arguments).unwrap()],
            ),
        ]);
        ReasoningExtractor::new().extract(ExtractionRequest::new(
            "analyst",
            "portfolio_analyst",
            task,
            conversation,
        ))
    }

    fn trade(amount: &str) -> ReasoningRecord {
        record_with(
            "Rebalance the technology sleeve",
            &format!("{ANALYSIS} Selling {amount} now."),
            &format!(r#"{{"symbol": "NVDA", "action": "SELL", "amount": "{amount}"}}"#),
        )
    }

    #[test]
    fn small_complete_trade_is_approved() {
        let record = trade("$5M");
        assert!((record.completeness_score() - 1.0).abs() < f64::EPSILON);

        let verdict = GovernanceEngine::new().enforce(&record, &GovernanceConfig::default());
        assert_eq!(verdict.decision(), GovernanceDecision::Approved);
        assert!(!verdict.requires_review());
        assert_eq!(verdict.policy_checks().len(), 5);
        assert_eq!(verdict.reasoning(), "All policy checks passed. Approved for execution.");
    }

    #[test]
    fn oversized_trade_is_rejected() {
        let verdict = GovernanceEngine::new().enforce(&trade("$150M"), &GovernanceConfig::default());
        assert_eq!(verdict.decision(), GovernanceDecision::Rejected);
        assert!(verdict.requires_review());
        assert!(
            verdict
                .violations()
                .contains(&"Trade size $150,000,000 exceeds maximum $100,000,000".to_owned())
        );
        assert!(verdict.reasoning().starts_with("Rejected due to policy violations: "));
    }

    #[test]
    fn high_value_trade_requires_review() {
        let verdict = GovernanceEngine::new().enforce(&trade("$90M"), &GovernanceConfig::default());
        assert_eq!(verdict.decision(), GovernanceDecision::ReviewRequired);
        assert_eq!(
            verdict.warnings(),
            ["High-value trade $90,000,000 requires human review (threshold: $50,000,000)"]
        );
        assert!(!verdict.policy_checks()["high_value_review"].passed());
    }

    #[test]
    fn high_value_review_can_be_disabled() {
        let mut config = GovernanceConfig::default();
        config.review_requirements.high_value = false;

        let verdict = GovernanceEngine::new().enforce(&trade("$90M"), &config);
        assert_eq!(verdict.decision(), GovernanceDecision::Approved);
        assert_eq!(
            verdict.policy_checks()["high_value_review"].message(),
            "High value review not required by policy"
        );
    }

    #[test]
    fn blacklisted_symbol_is_rejected() {
        let config = GovernanceConfig {
            blacklist: Blacklist::new(["nvda"], Vec::<String>::new()),
            ..GovernanceConfig::default()
        };
        let verdict = GovernanceEngine::new().enforce(&trade("$5M"), &config);
        assert_eq!(verdict.decision(), GovernanceDecision::Rejected);
        assert_eq!(verdict.violations(), ["Symbol NVDA is blacklisted"]);
    }

    #[test]
    fn restricted_action_is_rejected() {
        let config = GovernanceConfig {
            blacklist: Blacklist::new(Vec::<String>::new(), ["execute_trade"]),
            ..GovernanceConfig::default()
        };
        let verdict = GovernanceEngine::new().enforce(&trade("$5M"), &config);
        assert_eq!(verdict.violations(), ["Action execute_trade is restricted"]);
    }

    #[test]
    fn earnings_mention_in_task_requires_review() {
        let record = record_with(
            "Trim NVDA before earnings",
            &format!("{ANALYSIS} Selling $5M now."),
            r#"{"symbol": "NVDA", "amount": "$5M"}"#,
        );
        let verdict = GovernanceEngine::new().enforce(&record, &GovernanceConfig::default());
        assert_eq!(verdict.decision(), GovernanceDecision::ReviewRequired);
        assert!(verdict.reasoning().contains("before earnings announcement"));
    }

    #[test]
    fn incomplete_reasoning_is_rejected() {
        let record = record_with("Do it", "Selling now.", r#"{"symbol": "AAPL"}"#);
        let verdict = GovernanceEngine::new().enforce(&record, &GovernanceConfig::default());

        assert_eq!(verdict.decision(), GovernanceDecision::Rejected);
        assert_eq!(
            verdict.violations(),
            ["Reasoning completeness 20.0% below minimum 60.0%. Missing: situation, quantitative_analysis, risks, rationale"]
        );
    }

    #[test]
    fn clean_run_below_review_bar_still_requires_review() {
        let record = record_with(
            "Rebalance",
            "Current Situation:\nOur book holds NVDA well above the sector weight of peers.\n\n\
             Rationale: Reducing the position restores compliance with the mandate.\n\
             Selling $5M now.",
            r#"{"symbol": "NVDA", "amount": "$5M"}"#,
        );
        assert!((record.completeness_score() - 0.8).abs() < f64::EPSILON);

        let mut config = GovernanceConfig::default();
        config.review_requirements.high_value = false;
        let verdict = GovernanceEngine::new().enforce(&record, &config);
        assert_eq!(verdict.decision(), GovernanceDecision::Approved);
        assert!(!verdict.requires_review());

        let incomplete = record_with(
            "Rebalance",
            "Current Situation:\nOur book holds NVDA well above the sector weight of peers.\n\n\
             Selling $5M now.",
            r#"{"symbol": "NVDA", "amount": "$5M"}"#,
        );
        assert!((incomplete.completeness_score() - 0.6).abs() < f64::EPSILON);
        let verdict = GovernanceEngine::new().enforce(&incomplete, &config);
        assert_eq!(verdict.decision(), GovernanceDecision::Approved);
        assert!(verdict.requires_review());
    }

    #[test]
    fn malformed_magnitude_is_isolated_as_warning() {
        let record = trade("$5M");
        let mut document = serde_json::to_value(&record).unwrap();
        document["reasoning"]["selected_action"]["arguments"]["parsed"]["amount"] =
            serde_json::json!([1, 2]);
        let record: ReasoningRecord = serde_json::from_value(document).unwrap();

        let verdict = GovernanceEngine::new().enforce(&record, &GovernanceConfig::default());
        assert_eq!(verdict.decision(), GovernanceDecision::ReviewRequired);
        assert_eq!(verdict.warnings().len(), 2);
        assert!(verdict.warnings()[0].starts_with("policy check failed: invalid parameter `amount`"));
        assert_eq!(verdict.policy_checks().len(), 5);
    }

    #[derive(Debug)]
    struct AlwaysFails;

    impl PolicyCheck for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn severity(&self) -> Severity {
            Severity::Error
        }

        fn auto_block(&self) -> bool {
            false
        }

        fn evaluate(&self, _: &ReasoningRecord, _: &GovernanceConfig) -> PolicyResult<CheckOutcome> {
            Ok(CheckOutcome::fail("custom violation"))
        }
    }

    #[test]
    fn non_blocking_violation_routes_to_review() {
        let engine = GovernanceEngine::with_checks(vec![Box::new(AlwaysFails)]);
        let verdict = engine.enforce(&trade("$5M"), &GovernanceConfig::default());
        assert_eq!(verdict.decision(), GovernanceDecision::ReviewRequired);
        assert_eq!(verdict.reasoning(), "Review required: custom violation");
        assert_eq!(engine.check_names().collect::<Vec<_>>(), ["always_fails"]);
    }
}
