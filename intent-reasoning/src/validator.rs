//! Completeness validation of extracted reasoning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{ExtractedReasoning, ReasoningRecord};

/// Number of required reasoning components.
pub const REQUIRED_COMPONENTS: usize = 5;

/// Minimum score for reasoning to count as valid.
pub const VALID_THRESHOLD: f64 = 0.6;

const MIN_SITUATION_CHARS: usize = 50;
const MIN_RATIONALE_CHARS: usize = 20;

const NO_OPTIONS_WARNING: &str = "No alternative options documented (recommended but not required)";

/// Required reasoning component, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Situation narrative longer than 50 characters.
    Situation,
    /// At least one amount or structured metric.
    QuantitativeAnalysis,
    /// At least one identified risk.
    Risks,
    /// Rationale longer than 20 characters.
    Rationale,
    /// Function name or message content.
    Action,
}

impl Component {
    /// All required components in evaluation order.
    pub const ALL: [Self; REQUIRED_COMPONENTS] = [
        Self::Situation,
        Self::QuantitativeAnalysis,
        Self::Risks,
        Self::Rationale,
        Self::Action,
    ];

    /// Stable snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Situation => "situation",
            Self::QuantitativeAnalysis => "quantitative_analysis",
            Self::Risks => "risks",
            Self::Rationale => "rationale",
            Self::Action => "action",
        }
    }

    fn is_satisfied(self, reasoning: &ExtractedReasoning) -> bool {
        match self {
            Self::Situation => reasoning.situation.trim().chars().count() > MIN_SITUATION_CHARS,
            Self::QuantitativeAnalysis => {
                !reasoning.findings.amounts.is_empty() || !reasoning.findings.metrics.is_empty()
            }
            Self::Risks => !reasoning.risks.is_empty(),
            Self::Rationale => reasoning.rationale.trim().chars().count() > MIN_RATIONALE_CHARS,
            Self::Action => reasoning.selected_action.is_specified(),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` when the score reaches [`VALID_THRESHOLD`].
    pub is_valid: bool,
    /// Satisfied required components divided by five.
    pub completeness_score: f64,
    /// Unsatisfied required components, in evaluation order.
    pub missing_components: Vec<Component>,
    /// Advisory findings that do not affect the score.
    pub warnings: Vec<String>,
}

/// Validates the reasoning held by `record`.
#[must_use]
pub fn validate(record: &ReasoningRecord) -> ValidationResult {
    assess(record.reasoning())
}

/// Scores extracted reasoning against the five required components.
#[must_use]
pub fn assess(reasoning: &ExtractedReasoning) -> ValidationResult {
    let missing_components: Vec<Component> = Component::ALL
        .into_iter()
        .filter(|component| !component.is_satisfied(reasoning))
        .collect();

    let satisfied = REQUIRED_COMPONENTS - missing_components.len();
    #[allow(clippy::cast_precision_loss)]
    let completeness_score = satisfied as f64 / REQUIRED_COMPONENTS as f64;

    let mut warnings = Vec::new();
    if reasoning.options.is_empty() {
        warnings.push(NO_OPTIONS_WARNING.to_owned());
    }

    ValidationResult {
        is_valid: completeness_score >= VALID_THRESHOLD,
        completeness_score,
        missing_components,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::SelectedAction;
    use crate::record::{ConsideredOption, QuantitativeFindings};

    fn complete() -> ExtractedReasoning {
        ExtractedReasoning {
            situation: "Portfolio concentration in NVDA stands at 32%, above the 25% policy limit."
                .into(),
            findings: QuantitativeFindings {
                amounts: vec!["$90M".into()],
                ..QuantitativeFindings::default()
            },
            options: vec![ConsideredOption::new("Hedge with options instead of selling")],
            selected_action: SelectedAction::Message {
                content: "Sell NVDA".into(),
            },
            rationale: "Concentration exceeds the mandated policy limit".into(),
            risks: vec!["Market impact from a large order".into()],
        }
    }

    #[test]
    fn complete_reasoning_scores_one() {
        let result = assess(&complete());
        assert!(result.is_valid);
        assert!((result.completeness_score - 1.0).abs() < f64::EPSILON);
        assert!(result.missing_components.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_reasoning_lists_every_component_in_order() {
        let result = assess(&ExtractedReasoning::default());
        assert!(!result.is_valid);
        assert!(result.completeness_score.abs() < f64::EPSILON);
        assert_eq!(result.missing_components, Component::ALL.to_vec());
        assert_eq!(result.warnings, [NO_OPTIONS_WARNING]);
    }

    #[test]
    fn metrics_alone_satisfy_quantitative_analysis() {
        let mut reasoning = complete();
        reasoning.findings.amounts.clear();
        reasoning
            .findings
            .metrics
            .insert("price".into(), serde_json::json!(487.5));
        assert!(assess(&reasoning).missing_components.is_empty());
    }

    #[test]
    fn three_of_five_is_valid() {
        let mut reasoning = complete();
        reasoning.situation = "Too short".into();
        reasoning.risks.clear();
        let result = assess(&reasoning);

        assert!(result.is_valid);
        assert!((result.completeness_score - 0.6).abs() < f64::EPSILON);
        assert_eq!(
            result.missing_components,
            [Component::Situation, Component::Risks]
        );
    }

    #[test]
    fn missing_options_is_only_a_warning() {
        let mut reasoning = complete();
        reasoning.options.clear();
        let result = assess(&reasoning);
        assert!((result.completeness_score - 1.0).abs() < f64::EPSILON);
        assert_eq!(result.warnings.len(), 1);
    }
}
