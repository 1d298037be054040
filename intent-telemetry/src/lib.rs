//! Observability utilities for IntentCore.

#![warn(missing_docs, clippy::pedantic)]

pub mod metrics;
pub mod tracing_support;

pub use metrics::{COMPLETENESS_TARGET, ExtractionMetrics, ExtractionQuality, LATENCY_TARGET};
pub use tracing_support::init_tracing;
