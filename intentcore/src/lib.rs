//! IntentCore facade.
//!
//! Captures the reasoning behind an agent's proposed action, scores it, runs
//! governance checks, and tracks the decision through human review and
//! execution. The component crates are bundled behind feature flags; the
//! default set enables everything.

#![warn(missing_docs, clippy::pedantic)]

/// Identifiers and the conversation schema.
pub use intent_primitives as primitives;

/// Reasoning records, extraction, and completeness scoring.
pub use intent_reasoning as reasoning;

/// Governance configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use intent_config as config;

/// Policy checks and verdicts (enabled by `policy` feature).
#[cfg(feature = "policy")]
pub use intent_policy as policy;

/// Persistence, review queue, and audit trail (enabled by `store` feature).
#[cfg(feature = "store")]
pub use intent_store as store;

/// Tracing bootstrap and extraction metrics (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use intent_telemetry as telemetry;

/// Decision lifecycle manager (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use intent_kernel as kernel;
