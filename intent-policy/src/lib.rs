//! Governance policy evaluation for reasoning records.
//!
//! [`GovernanceEngine::enforce`] runs an ordered list of [`PolicyCheck`]s and
//! folds their results into a [`GovernanceVerdict`]:
//!
//! 1. `trade_size_limit` (error, blocking)
//! 2. `blacklist_check` (error, blocking)
//! 3. `high_value_review` (warning)
//! 4. `pre_earnings_review` (warning)
//! 5. `completeness_check` (error, blocking)
//!
//! Any failed blocking check rejects the action; any other failure routes it
//! to human review.

#![warn(missing_docs, clippy::pedantic)]

mod checks;
mod engine;
mod magnitude;
mod verdict;

pub use checks::{
    BlacklistCheck, CheckOutcome, CompletenessCheck, HighValueReview, MIN_COMPLETENESS,
    PolicyCheck, PreEarningsReview, TradeSizeLimit, builtin_checks,
};
pub use engine::{GovernanceEngine, PolicyError, PolicyResult, REVIEW_COMPLETENESS};
pub use magnitude::{MAGNITUDE_KEYS, format_currency, parse_magnitude, trade_magnitude};
pub use verdict::GovernanceVerdict;
