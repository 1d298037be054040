//! Policy check contract and the built-in financial checks.

use std::fmt;

use intent_config::GovernanceConfig;
use intent_reasoning::{ReasoningRecord, Severity};
use serde_json::{Map, Value};

use crate::engine::PolicyResult;
use crate::magnitude::{format_currency, trade_magnitude};

/// Completeness below which reasoning is rejected outright.
pub const MIN_COMPLETENESS: f64 = 0.6;

const EARNINGS_KEYWORDS: [&str; 4] = ["earnings", "earnings call", "quarterly report", "pre-earnings"];

/// Pass/fail outcome of one check before severity is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable message.
    pub message: String,
    /// Measured values and limits.
    pub details: Map<String, Value>,
}

impl CheckOutcome {
    /// A passing outcome.
    #[must_use]
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// A failing outcome.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Attaches a detail value.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_owned(), value.into());
        self
    }
}

/// A named rule evaluated against a reasoning record.
///
/// Checks are pure: the same record and configuration always produce the same
/// outcome. An `Err` is isolated by the engine and reported as a warning.
pub trait PolicyCheck: fmt::Debug + Send + Sync {
    /// Policy name used as the key in the record's check map.
    fn name(&self) -> &'static str;

    /// Severity of a failure.
    fn severity(&self) -> Severity;

    /// Whether a failure blocks the action outright.
    fn auto_block(&self) -> bool;

    /// Evaluates the check.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::PolicyError`] when the record cannot be evaluated.
    fn evaluate(&self, record: &ReasoningRecord, config: &GovernanceConfig) -> PolicyResult<CheckOutcome>;
}

/// Rejects trades whose magnitude exceeds the single-trade maximum.
#[derive(Debug, Default, Clone, Copy)]
pub struct TradeSizeLimit;

impl PolicyCheck for TradeSizeLimit {
    fn name(&self) -> &'static str {
        "trade_size_limit"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn auto_block(&self) -> bool {
        true
    }

    fn evaluate(&self, record: &ReasoningRecord, config: &GovernanceConfig) -> PolicyResult<CheckOutcome> {
        let Some(size) = trade_magnitude(record.selected_action())? else {
            return Ok(CheckOutcome::pass("No trade size found (non-trading action)"));
        };
        let max = config.trade_limits.single_trade_max;
        if size > max {
            return Ok(CheckOutcome::fail(format!(
                "Trade size {} exceeds maximum {}",
                format_currency(size),
                format_currency(max)
            ))
            .with_detail("trade_size", size)
            .with_detail("limit", max));
        }
        Ok(
            CheckOutcome::pass(format!("Trade size {} within limits", format_currency(size)))
                .with_detail("trade_size", size),
        )
    }
}

/// Rejects blacklisted symbols and restricted action names.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlacklistCheck;

impl PolicyCheck for BlacklistCheck {
    fn name(&self) -> &'static str {
        "blacklist_check"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn auto_block(&self) -> bool {
        true
    }

    fn evaluate(&self, record: &ReasoningRecord, config: &GovernanceConfig) -> PolicyResult<CheckOutcome> {
        let action = record.selected_action();
        if let Some(symbol) = action.parameter("symbol").and_then(Value::as_str) {
            let symbol = symbol.trim().to_uppercase();
            if config.blacklist.contains_symbol(&symbol) {
                return Ok(CheckOutcome::fail(format!("Symbol {symbol} is blacklisted")));
            }
        }
        if let Some(function) = action.function_name()
            && config.blacklist.contains_action(function)
        {
            return Ok(CheckOutcome::fail(format!("Action {function} is restricted")));
        }
        Ok(CheckOutcome::pass("No blacklist violations"))
    }
}

/// Routes trades above the review threshold to a human.
#[derive(Debug, Default, Clone, Copy)]
pub struct HighValueReview;

impl PolicyCheck for HighValueReview {
    fn name(&self) -> &'static str {
        "high_value_review"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn auto_block(&self) -> bool {
        false
    }

    fn evaluate(&self, record: &ReasoningRecord, config: &GovernanceConfig) -> PolicyResult<CheckOutcome> {
        if !config.review_requirements.high_value {
            return Ok(CheckOutcome::pass("High value review not required by policy"));
        }
        let Some(size) = trade_magnitude(record.selected_action())? else {
            return Ok(CheckOutcome::pass("Non-trading action"));
        };
        let threshold = config.trade_limits.review_threshold;
        if size > threshold {
            return Ok(CheckOutcome::fail(format!(
                "High-value trade {} requires human review (threshold: {})",
                format_currency(size),
                format_currency(threshold)
            ))
            .with_detail("trade_size", size)
            .with_detail("threshold", threshold));
        }
        Ok(CheckOutcome::pass(format!(
            "Trade size {} below review threshold",
            format_currency(size)
        )))
    }
}

/// Routes trades mentioning an upcoming earnings event to a human.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreEarningsReview;

impl PolicyCheck for PreEarningsReview {
    fn name(&self) -> &'static str {
        "pre_earnings_review"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn auto_block(&self) -> bool {
        false
    }

    fn evaluate(&self, record: &ReasoningRecord, _config: &GovernanceConfig) -> PolicyResult<CheckOutcome> {
        let text = format!("{} {}", record.situation(), record.task()).to_lowercase();
        if EARNINGS_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
            return Ok(CheckOutcome::fail(
                "Trade occurring before earnings announcement requires additional review",
            ));
        }
        Ok(CheckOutcome::pass("No pre-earnings timing concerns"))
    }
}

/// Rejects reasoning below [`MIN_COMPLETENESS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletenessCheck;

impl PolicyCheck for CompletenessCheck {
    fn name(&self) -> &'static str {
        "completeness_check"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn auto_block(&self) -> bool {
        true
    }

    fn evaluate(&self, record: &ReasoningRecord, _config: &GovernanceConfig) -> PolicyResult<CheckOutcome> {
        let score = record.completeness_score();
        if !record.is_complete(MIN_COMPLETENESS) {
            let missing: Vec<Value> = record
                .missing_components()
                .iter()
                .map(|component| Value::from(component.as_str()))
                .collect();
            return Ok(CheckOutcome::fail(format!(
                "Reasoning completeness {:.1}% below minimum {:.1}%. Missing: {}",
                score * 100.0,
                MIN_COMPLETENESS * 100.0,
                record.missing_components_summary()
            ))
            .with_detail("completeness", score)
            .with_detail("missing", missing));
        }
        Ok(CheckOutcome::pass(format!(
            "Reasoning completeness {:.1}% is acceptable",
            score * 100.0
        ))
        .with_detail("completeness", score))
    }
}

/// The built-in checks in evaluation order.
#[must_use]
pub fn builtin_checks() -> Vec<Box<dyn PolicyCheck>> {
    vec![
        Box::new(TradeSizeLimit),
        Box::new(BlacklistCheck),
        Box::new(HighValueReview),
        Box::new(PreEarningsReview),
        Box::new(CompletenessCheck),
    ]
}
