//! Strongly typed governance configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Complete policy configuration shared by the policy engine and the
/// lifecycle manager. Treated as an immutable value once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Trade magnitude limits.
    pub trade_limits: TradeLimits,
    /// Restricted symbols and actions.
    pub blacklist: Blacklist,
    /// Timing restrictions.
    pub timing_restrictions: TimingRestrictions,
    /// Concentration limits.
    pub risk_limits: RiskLimits,
    /// Switches gating review-oriented checks.
    pub review_requirements: ReviewRequirements,
    /// Thresholds used to prioritise queued reviews.
    pub priority: PriorityThresholds,
}

/// Trade magnitude limits in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeLimits {
    /// Trades above this magnitude are rejected outright.
    pub single_trade_max: f64,
    /// Trades above this magnitude require human review.
    pub review_threshold: f64,
    /// Trades at or below this magnitude are candidates for auto-approval.
    pub auto_approve_max: f64,
}

impl Default for TradeLimits {
    fn default() -> Self {
        Self {
            single_trade_max: 100_000_000.0,
            review_threshold: 50_000_000.0,
            auto_approve_max: 10_000_000.0,
        }
    }
}

/// Restricted symbols and action names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blacklist {
    #[serde(deserialize_with = "uppercase_symbols")]
    symbols: BTreeSet<String>,
    actions: BTreeSet<String>,
}

impl Blacklist {
    /// Creates a blacklist; symbols are normalised to upper case.
    #[must_use]
    pub fn new<S, A>(symbols: S, actions: A) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            symbols: symbols
                .into_iter()
                .map(|symbol| symbol.as_ref().trim().to_uppercase())
                .filter(|symbol| !symbol.is_empty())
                .collect(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` when the symbol (compared case-insensitively) is restricted.
    #[must_use]
    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.trim().to_uppercase())
    }

    /// Returns `true` when the action name is restricted.
    #[must_use]
    pub fn contains_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    /// Restricted symbols, upper case.
    #[must_use]
    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }

    /// Restricted action names.
    #[must_use]
    pub fn actions(&self) -> &BTreeSet<String> {
        &self.actions
    }
}

/// Timing restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingRestrictions {
    /// Days before an earnings release during which trades are restricted.
    pub pre_earnings_days: u32,
    /// Volatility index level above which trades warrant extra review.
    pub high_volatility_threshold: f64,
}

impl Default for TimingRestrictions {
    fn default() -> Self {
        Self {
            pre_earnings_days: 1,
            high_volatility_threshold: 30.0,
        }
    }
}

/// Portfolio concentration limits expressed as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    /// Maximum weight of a single position.
    pub max_position_concentration: f64,
    /// Maximum weight of a single sector.
    pub max_sector_concentration: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_concentration: 0.25,
            max_sector_concentration: 0.40,
        }
    }
}

/// Switches gating which review-oriented checks are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReviewRequirements {
    /// Require review for trades above the review threshold.
    pub high_value: bool,
    /// Require review for situations not seen before.
    pub new_patterns: bool,
    /// Require review when the agent's confidence is low.
    pub low_confidence: bool,
}

impl Default for ReviewRequirements {
    fn default() -> Self {
        Self {
            high_value: true,
            new_patterns: true,
            low_confidence: true,
        }
    }
}

/// Thresholds used when assigning a priority to a queued review.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityThresholds {
    /// Trade magnitude above which a review is `high` priority.
    pub high_value: f64,
    /// Completeness score below which a review is `high` priority.
    pub low_completeness: f64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            high_value: 50_000_000.0,
            low_completeness: 0.7,
        }
    }
}

fn uppercase_symbols<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let symbols = Vec::<String>::deserialize(deserializer)?;
    Ok(symbols
        .into_iter()
        .map(|symbol| symbol.trim().to_uppercase())
        .filter(|symbol| !symbol.is_empty())
        .collect())
}
