//! Governance configuration for IntentCore.
//!
//! A single [`GovernanceConfig`] value drives both the policy engine's
//! blocking limits and the lifecycle manager's review prioritisation.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::CONFIG_PATH_ENV;
pub use schema::{
    Blacklist, GovernanceConfig, PriorityThresholds, ReviewRequirements, RiskLimits,
    TimingRestrictions, TradeLimits,
};
