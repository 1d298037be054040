//! Extraction quality metrics.
//!
//! [`ExtractionMetrics`] is a plain accumulator owned by whoever runs
//! extractions; there is no process-wide counter.

use std::collections::HashMap;
use std::time::Duration;

use intent_reasoning::GovernanceDecision;
use serde::Serialize;

/// Average completeness the extractor is expected to reach.
pub const COMPLETENESS_TARGET: f64 = 0.8;

/// Average extraction latency the extractor is expected to stay under.
pub const LATENCY_TARGET: Duration = Duration::from_millis(100);

/// Running totals over processed decisions.
#[derive(Debug, Clone, Default)]
pub struct ExtractionMetrics {
    extractions: u64,
    completeness_sum: f64,
    latency_sum: Duration,
    latency_min: Option<Duration>,
    latency_max: Duration,
    decisions: HashMap<GovernanceDecision, u64>,
}

impl ExtractionMetrics {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one extraction.
    pub fn record(&mut self, completeness: f64, latency: Duration, decision: GovernanceDecision) {
        self.extractions += 1;
        self.completeness_sum += completeness;
        self.latency_sum += latency;
        self.latency_min = Some(self.latency_min.map_or(latency, |min| min.min(latency)));
        self.latency_max = self.latency_max.max(latency);
        *self.decisions.entry(decision).or_default() += 1;
    }

    /// Clears all totals.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of recorded extractions.
    #[must_use]
    pub const fn extractions(&self) -> u64 {
        self.extractions
    }

    /// Summarises the totals.
    #[must_use]
    pub fn snapshot(&self) -> ExtractionQuality {
        if self.extractions == 0 {
            return ExtractionQuality::default();
        }

        #[allow(clippy::cast_precision_loss)]
        let count = self.extractions as f64;
        let avg_completeness = self.completeness_sum / count;
        let avg_latency_ms = millis(self.latency_sum) / count;

        ExtractionQuality {
            extractions: self.extractions,
            avg_completeness,
            avg_latency_ms,
            min_latency_ms: self.latency_min.map_or(0.0, millis),
            max_latency_ms: millis(self.latency_max),
            decisions: self
                .decisions
                .iter()
                .map(|(decision, count)| (decision.to_string(), *count))
                .collect(),
            completeness_target_met: avg_completeness >= COMPLETENESS_TARGET,
            latency_target_met: avg_latency_ms < millis(LATENCY_TARGET),
        }
    }
}

/// Point-in-time view of [`ExtractionMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionQuality {
    /// Number of extractions.
    pub extractions: u64,
    /// Mean completeness score.
    pub avg_completeness: f64,
    /// Mean extraction latency in milliseconds.
    pub avg_latency_ms: f64,
    /// Fastest extraction in milliseconds.
    pub min_latency_ms: f64,
    /// Slowest extraction in milliseconds.
    pub max_latency_ms: f64,
    /// Count per governance decision.
    pub decisions: HashMap<String, u64>,
    /// Mean completeness reached [`COMPLETENESS_TARGET`].
    pub completeness_target_met: bool,
    /// Mean latency stayed under [`LATENCY_TARGET`].
    pub latency_target_met: bool,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_meets_no_target() {
        let quality = ExtractionMetrics::new().snapshot();
        assert_eq!(quality.extractions, 0);
        assert!(!quality.completeness_target_met);
        assert!(!quality.latency_target_met);
    }

    #[test]
    fn averages_and_bounds() {
        let mut metrics = ExtractionMetrics::new();
        metrics.record(1.0, Duration::from_millis(10), GovernanceDecision::Approved);
        metrics.record(0.6, Duration::from_millis(30), GovernanceDecision::ReviewRequired);
        metrics.record(0.8, Duration::from_millis(20), GovernanceDecision::ReviewRequired);

        let quality = metrics.snapshot();
        assert_eq!(quality.extractions, 3);
        assert!((quality.avg_completeness - 0.8).abs() < 1e-9);
        assert!((quality.avg_latency_ms - 20.0).abs() < 1e-9);
        assert!((quality.min_latency_ms - 10.0).abs() < 1e-9);
        assert!((quality.max_latency_ms - 30.0).abs() < 1e-9);
        assert_eq!(quality.decisions["review_required"], 2);
        assert!(quality.latency_target_met);
    }

    #[test]
    fn slow_or_incomplete_extractions_miss_targets() {
        let mut metrics = ExtractionMetrics::new();
        metrics.record(0.4, Duration::from_millis(250), GovernanceDecision::Rejected);
        let quality = metrics.snapshot();
        assert!(!quality.completeness_target_met);
        assert!(!quality.latency_target_met);

        metrics.reset();
        assert_eq!(metrics.extractions(), 0);
    }
}
