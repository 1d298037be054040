//! Review priority assignment.

use intent_config::PriorityThresholds;
use intent_policy::{GovernanceVerdict, trade_magnitude};
use intent_reasoning::ReasoningRecord;
use intent_store::ReviewPriority;

/// Priority for a record entering the review queue.
///
/// `urgent` when the verdict carries any violation; otherwise `high` when the
/// trade magnitude exceeds the high-value threshold or completeness is below
/// the low-completeness threshold; otherwise `normal`. A magnitude that cannot
/// be interpreted counts as absent.
#[must_use]
pub fn compute_priority(
    record: &ReasoningRecord,
    verdict: &GovernanceVerdict,
    thresholds: &PriorityThresholds,
) -> ReviewPriority {
    if verdict.has_violations() {
        return ReviewPriority::Urgent;
    }
    let high_value = trade_magnitude(record.selected_action())
        .ok()
        .flatten()
        .is_some_and(|size| size > thresholds.high_value);
    if high_value || record.completeness_score() < thresholds.low_completeness {
        ReviewPriority::High
    } else {
        ReviewPriority::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_config::GovernanceConfig;
    use intent_policy::GovernanceEngine;
    use intent_primitives::{Conversation, ProposedAction, Turn};
    use intent_reasoning::{ExtractionRequest, ReasoningExtractor};

    fn priority_for(content: &str, amount: &str) -> ReviewPriority {
        let action = ProposedAction::new(
            "call_1",
            "execute_trade",
            format!(r#"{{"symbol": "MSFT", "amount": "{amount}"}}"#),
        )
        .unwrap();
        let conversation = Conversation::new(vec![Turn::assistant_with_actions(
            Some(content.into()),
            vec![action],
        )]);
        let record = ReasoningExtractor::new().extract(ExtractionRequest::new(
            "agent",
            "analyst",
            "Trim MSFT",
            conversation,
        ));
        let config = GovernanceConfig::default();
        let verdict = GovernanceEngine::new().enforce(&record, &config);
        compute_priority(&record, &verdict, &config.priority)
    }

    const FULL: &str = "Current situation: the MSFT allocation has drifted to 18% of the $2B fund \
        against a 12% target weight.\n\nRisk: selling into weakness locks in losses.\n\
        Rationale: bringing the weight back to target keeps tracking error low.";

    #[test]
    fn violations_are_urgent() {
        assert_eq!(priority_for(FULL, "$120M"), ReviewPriority::Urgent);
    }

    #[test]
    fn large_trades_are_high() {
        assert_eq!(priority_for(FULL, "$60M"), ReviewPriority::High);
    }

    #[test]
    fn thin_reasoning_is_high() {
        // Situation, rationale, and action only: 60% complete.
        let thin = "Current situation: the MSFT allocation has drifted well above the target \
            weight for the fund.\n\nRationale: bringing the weight back to target keeps tracking error low.";
        assert_eq!(priority_for(thin, "$1M"), ReviewPriority::High);
    }

    #[test]
    fn incomplete_reasoning_is_urgent() {
        assert_eq!(priority_for("Selling some shares.", "$1M"), ReviewPriority::Urgent);
    }

    #[test]
    fn complete_small_trades_are_normal() {
        assert_eq!(priority_for(FULL, "$1M"), ReviewPriority::Normal);
    }
}
