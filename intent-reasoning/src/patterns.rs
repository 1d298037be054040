//! Compiled lexical cue table shared by every extraction.
//!
//! Each rule maps one regular expression onto one reasoning field. Capture
//! group 1 holds the clause following the cue; captures whose trimmed length
//! (in characters) does not exceed the field's minimum are discarded.

use std::sync::LazyLock;

use regex::Regex;

/// Reasoning field populated by a cue rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasoningField {
    /// Situation narrative.
    Situation,
    /// Identified risk.
    Risk,
    /// Decision rationale.
    Rationale,
    /// Alternative considered.
    Option,
}

impl ReasoningField {
    /// Captures must be strictly longer than this many characters.
    #[must_use]
    pub const fn min_len(self) -> usize {
        match self {
            Self::Situation => 20,
            Self::Risk | Self::Option => 10,
            Self::Rationale => 15,
        }
    }
}

/// One cue rule.
#[derive(Debug)]
pub struct PatternRule {
    field: ReasoningField,
    regex: Regex,
}

impl PatternRule {
    /// Field the rule populates.
    #[must_use]
    pub const fn field(&self) -> ReasoningField {
        self.field
    }

    /// Compiled expression.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Immutable, ordered table of cue rules.
#[derive(Debug)]
pub struct PatternTable {
    rules: Vec<PatternRule>,
}

// Situation cues may span lines; the other fields stop at a period or the end
// of the line.
const RULES: &[(ReasoningField, &str)] = &[
    (
        ReasoningField::Situation,
        r"(?is)(?:current situation|situation|context|currently)[:\s]+(.+?)(?:\n\n|\n[A-Z]|$)",
    ),
    (ReasoningField::Situation, r"(?is)\b(?:as of|upon)[:\s]+(.+?)(?:,|\.|\n)"),
    (
        ReasoningField::Situation,
        r"(?is)portfolio.*?\b(?:is|has|shows)[:\s]+(.+?)(?:\.|$)",
    ),
    (
        ReasoningField::Risk,
        r"(?im)\b(?:risk|concern|caution|warning)[:\s]+(.+?)(?:\.|$)",
    ),
    (
        ReasoningField::Risk,
        r"(?im)\b(?:potential|possible)[:\s]+(?:downside|loss|issue)[:\s]+(.+?)(?:\.|$)",
    ),
    (
        ReasoningField::Rationale,
        r"(?im)\b(?:because|since|given that)[:\s]+(.+?)(?:\.|$)",
    ),
    (
        ReasoningField::Rationale,
        r"(?im)\b(?:reason|rationale)[:\s]+(.+?)(?:\.|$)",
    ),
    (
        ReasoningField::Rationale,
        r"(?im)\b(?:this is|this will)\s+(.+?)\s+(?:in order to|to)\b",
    ),
    (
        ReasoningField::Option,
        r"(?im)\b(?:alternative|option|could also|another approach)[:\s]+(.+?)(?:\.|$)",
    ),
    (
        ReasoningField::Option,
        r"(?im)\b(?:instead|alternatively)[:,\s]+(.+?)(?:\.|$)",
    ),
];

static TABLE: LazyLock<PatternTable> = LazyLock::new(|| PatternTable {
    rules: RULES
        .iter()
        .map(|(field, pattern)| PatternRule {
            field: *field,
            regex: Regex::new(pattern).expect("cue patterns are valid regular expressions"),
        })
        .collect(),
});

/// Dollar amounts: currency symbol, digit groups, optional decimals, optional K/M/B.
pub(crate) static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$[\d,]+(?:\.\d+)?[MBK]?").expect("amount pattern is a valid regular expression")
});

/// Percentage tokens.
pub(crate) static PERCENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.?\d*%").expect("percentage pattern is a valid regular expression")
});

impl PatternTable {
    /// Returns the process-wide table, compiling it on first use.
    #[must_use]
    pub fn shared() -> &'static Self {
        &TABLE
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Collects the clauses captured for `field` in `text`, rule by rule and
    /// match by match, keeping only those longer than the field minimum.
    #[must_use]
    pub fn captures<'t>(&self, field: ReasoningField, text: &'t str) -> Vec<&'t str> {
        let min_len = field.min_len();
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .flat_map(|rule| rule.regex.captures_iter(text))
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|found| found.as_str().trim())
            .filter(|clause| clause.chars().count() > min_len)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_compiles_every_rule() {
        assert_eq!(PatternTable::shared().rules().len(), RULES.len());
    }

    #[test]
    fn risk_clause_stops_at_line_end() {
        let text = "- Execution risk: Large trade size may impact price\n- Timing risk: short";
        let risks = PatternTable::shared().captures(ReasoningField::Risk, text);
        assert_eq!(risks, ["Large trade size may impact price"]);
    }

    #[test]
    fn situation_stops_at_blank_line() {
        let text = "Current Situation:\nThe book holds 32% NVDA against a 25% limit\n\nNext";
        let situation = PatternTable::shared().captures(ReasoningField::Situation, text);
        assert_eq!(situation[0], "The book holds 32% NVDA against a 25% limit");
    }

    #[test]
    fn short_captures_are_dropped() {
        let text = "Because: too short.";
        assert!(PatternTable::shared()
            .captures(ReasoningField::Rationale, text)
            .is_empty());
    }

    #[test]
    fn amount_and_percentage_tokens() {
        let text = "Sell $90M of $1,250.50 stock, 21.7% of book";
        let amounts: Vec<_> = AMOUNT_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
        let percents: Vec<_> = PERCENT_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
        assert_eq!(amounts, ["$90M", "$1,250.50"]);
        assert_eq!(percents, ["21.7%"]);
    }
}
