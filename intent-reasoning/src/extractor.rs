//! Lexical reasoning extraction.
//!
//! The extractor is a pure function of the shared [`PatternTable`] and its
//! input. It never fails: fields it cannot reconstruct are left empty and show
//! up later as missing components.

use intent_primitives::{Conversation, ProposedAction, Turn};
use serde_json::Value;
use tracing::debug;

use crate::action::SelectedAction;
use crate::patterns::{AMOUNT_PATTERN, PERCENT_PATTERN, PatternTable, ReasoningField};
use crate::record::{
    ConsideredOption, ExtractedReasoning, Provenance, QuantitativeFindings, ReasoningRecord,
};

const SITUATION_PARTS: usize = 3;
const RATIONALE_PARTS: usize = 3;
const TOOL_SITUATION_PREFIX: &str = "Tool data: ";
const TOOL_SITUATION_CHARS: usize = 200;
const TOOL_SITUATION_CUES: [&str; 3] = ["current", "latest", "as of"];

/// Input to a single extraction.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Agent identifier.
    pub agent_id: String,
    /// Agent role label.
    pub agent_role: String,
    /// Originating task.
    pub task: String,
    /// Normalised conversation.
    pub conversation: Conversation,
    /// Action being intercepted; treated as ground truth when present.
    pub targeted_action: Option<ProposedAction>,
}

impl ExtractionRequest {
    /// Creates a request without a targeted action.
    #[must_use]
    pub fn new(
        agent_id: impl Into<String>,
        agent_role: impl Into<String>,
        task: impl Into<String>,
        conversation: Conversation,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_role: agent_role.into(),
            task: task.into(),
            conversation,
            targeted_action: None,
        }
    }

    /// Sets the intercepted action.
    #[must_use]
    pub fn with_targeted_action(mut self, action: ProposedAction) -> Self {
        self.targeted_action = Some(action);
        self
    }
}

/// Turns a conversation into a [`ReasoningRecord`].
#[derive(Debug, Clone, Copy)]
pub struct ReasoningExtractor {
    patterns: &'static PatternTable,
}

impl Default for ReasoningExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningExtractor {
    /// Creates an extractor over the shared pattern table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::shared(),
        }
    }

    /// Extracts a record from `request`.
    #[must_use]
    pub fn extract(&self, request: ExtractionRequest) -> ReasoningRecord {
        let reasoning =
            self.extract_reasoning(&request.conversation, request.targeted_action.as_ref());
        let record = ReasoningRecord::capture(
            Provenance {
                agent_id: request.agent_id,
                agent_role: request.agent_role,
                task: request.task,
                conversation: request.conversation,
            },
            reasoning,
        );
        debug!(
            record_id = %record.id(),
            agent_id = record.agent_id(),
            completeness = record.completeness_score(),
            "reasoning extracted"
        );
        record
    }

    /// Extracts the reasoning fields only.
    #[must_use]
    pub fn extract_reasoning(
        &self,
        conversation: &Conversation,
        targeted_action: Option<&ProposedAction>,
    ) -> ExtractedReasoning {
        ExtractedReasoning {
            situation: self.situation(conversation),
            findings: quantitative_findings(conversation),
            options: self
                .reasoning_captures(conversation, ReasoningField::Option)
                .into_iter()
                .map(ConsideredOption::new)
                .collect(),
            selected_action: selected_action(conversation, targeted_action),
            rationale: self
                .reasoning_captures(conversation, ReasoningField::Rationale)
                .into_iter()
                .take(RATIONALE_PARTS)
                .collect::<Vec<_>>()
                .join(" "),
            risks: self.risks(conversation),
        }
    }

    fn situation(&self, conversation: &Conversation) -> String {
        let mut parts = self.reasoning_captures(conversation, ReasoningField::Situation);

        for content in conversation
            .iter()
            .filter(|turn| turn.is_tool())
            .filter_map(Turn::content)
        {
            let lowered = content.to_lowercase();
            if TOOL_SITUATION_CUES.iter().any(|cue| lowered.contains(cue)) {
                let excerpt: String = content.chars().take(TOOL_SITUATION_CHARS).collect();
                parts.push(format!("{TOOL_SITUATION_PREFIX}{excerpt}"));
            }
        }

        parts.truncate(SITUATION_PARTS);
        parts.join("\n\n")
    }

    fn risks(&self, conversation: &Conversation) -> Vec<String> {
        let mut risks: Vec<String> = Vec::new();
        for risk in self.reasoning_captures(conversation, ReasoningField::Risk) {
            if !risks.contains(&risk) {
                risks.push(risk);
            }
        }
        risks
    }

    // Captures from every non-tool turn, in turn order.
    fn reasoning_captures(&self, conversation: &Conversation, field: ReasoningField) -> Vec<String> {
        conversation
            .iter()
            .filter(|turn| !turn.is_tool())
            .filter_map(Turn::content)
            .flat_map(|text| self.patterns.captures(field, text))
            .map(str::to_owned)
            .collect()
    }
}

fn quantitative_findings(conversation: &Conversation) -> QuantitativeFindings {
    let mut findings = QuantitativeFindings::default();
    for turn in conversation {
        let Some(content) = turn.content() else {
            continue;
        };
        findings.amounts.extend(
            AMOUNT_PATTERN
                .find_iter(content)
                .map(|found| found.as_str().to_owned()),
        );
        findings.percentages.extend(
            PERCENT_PATTERN
                .find_iter(content)
                .map(|found| found.as_str().to_owned()),
        );
        if turn.is_tool()
            && let Ok(Value::Object(metrics)) = serde_json::from_str::<Value>(content)
        {
            findings.metrics.extend(metrics);
        }
    }
    findings
}

fn selected_action(
    conversation: &Conversation,
    targeted_action: Option<&ProposedAction>,
) -> SelectedAction {
    if let Some(action) = targeted_action {
        return SelectedAction::from_proposed(action);
    }
    let Some(turn) = conversation.last_assistant() else {
        return SelectedAction::Unknown;
    };
    match turn.proposed_actions().last() {
        Some(action) => SelectedAction::from_proposed(action),
        None => SelectedAction::Message {
            content: turn.content().unwrap_or_default().to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Component;
    use serde_json::json;

    fn rebalance_conversation() -> Conversation {
        Conversation::new(vec![
            Turn::user("Analyze NVDA position and recommend rebalancing before earnings"),
            Turn::tool(r#"{"symbol": "NVDA", "current_price": 487.5, "concentration": 0.32}"#),
            Turn::assistant_with_actions(
                Some(
                    "Current Situation:\nAs of today, our portfolio shows NVDA concentration at 32%, \
                     exceeding our 25% policy limit ahead of earnings.\n\n\
                     Risks:\n- Execution risk: Large order may move the price against us\n\
                     - Timing concern: Earnings announcement could change the picture\n\n\
                     An alternative: hedge the position with put options.\n\n\
                     Rationale: Reducing the position restores compliance with the mandate. \
                     Selling $90M brings concentration to roughly 21.7%."
                        .into(),
                ),
                vec![
                    ProposedAction::new(
                        "call_1",
                        "execute_trade",
                        r#"{"symbol": "NVDA", "action": "SELL", "amount": "$90M"}"#,
                    )
                    .unwrap(),
                ],
            ),
        ])
    }

    #[test]
    fn extracts_every_component() {
        let reasoning = ReasoningExtractor::new().extract_reasoning(&rebalance_conversation(), None);

        assert!(reasoning.situation.starts_with("As of today, our portfolio shows NVDA"));
        assert!(reasoning.situation.contains("Tool data: "));
        assert_eq!(reasoning.findings.amounts, ["$90M"]);
        assert_eq!(reasoning.findings.percentages, ["32%", "25%", "21.7%"]);
        assert_eq!(reasoning.findings.metrics["current_price"], json!(487.5));
        assert_eq!(reasoning.risks.len(), 2);
        assert_eq!(reasoning.options.len(), 1);
        assert!(reasoning.options[0].considered);
        assert!(reasoning.rationale.starts_with("Reducing the position restores"));
        assert_eq!(reasoning.selected_action.function_name(), Some("execute_trade"));
        assert_eq!(
            reasoning.selected_action.parameter("amount"),
            Some(&json!("$90M"))
        );
    }

    #[test]
    fn targeted_action_wins_over_conversation() {
        let targeted = ProposedAction::new("call_9", "hedge_position", "not json").unwrap();
        let reasoning =
            ReasoningExtractor::new().extract_reasoning(&rebalance_conversation(), Some(&targeted));

        assert_eq!(reasoning.selected_action.function_name(), Some("hedge_position"));
        assert_eq!(
            reasoning.selected_action.arguments().and_then(|a| a.raw()),
            Some("not json")
        );
    }

    #[test]
    fn assistant_text_falls_back_to_message() {
        let conversation = Conversation::new(vec![
            Turn::user("Any action?"),
            Turn::assistant("Hold the position for now."),
        ]);
        let reasoning = ReasoningExtractor::new().extract_reasoning(&conversation, None);
        assert_eq!(
            reasoning.selected_action.message(),
            Some("Hold the position for now.")
        );
    }

    #[test]
    fn empty_conversation_degrades_to_empty_record() {
        let record = ReasoningExtractor::new().extract(ExtractionRequest::new(
            "agent",
            "role",
            "task",
            Conversation::default(),
        ));
        assert_eq!(record.selected_action(), &SelectedAction::Unknown);
        assert!(record.completeness_score().abs() < f64::EPSILON);
        assert_eq!(record.missing_components(), Component::ALL);
    }

    #[test]
    fn later_tool_metrics_override_earlier() {
        let conversation = Conversation::new(vec![
            Turn::tool(r#"{"price": 1, "volume": 10}"#),
            Turn::tool(r#"{"price": 2}"#),
            Turn::tool("[1, 2, 3]"),
        ]);
        let findings = quantitative_findings(&conversation);
        assert_eq!(findings.metrics["price"], json!(2));
        assert_eq!(findings.metrics["volume"], json!(10));
    }

    #[test]
    fn duplicate_risks_are_collapsed() {
        let conversation = Conversation::new(vec![
            Turn::user("Risk: liquidity may dry up quickly"),
            Turn::assistant("Risk: liquidity may dry up quickly"),
        ]);
        let reasoning = ReasoningExtractor::new().extract_reasoning(&conversation, None);
        assert_eq!(reasoning.risks, ["liquidity may dry up quickly"]);
    }

    #[test]
    fn extraction_is_repeatable() {
        let extractor = ReasoningExtractor::new();
        let conversation = rebalance_conversation();
        assert_eq!(
            extractor.extract_reasoning(&conversation, None),
            extractor.extract_reasoning(&conversation, None)
        );
    }
}
