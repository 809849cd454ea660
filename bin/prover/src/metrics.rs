//! Prometheus metrics for the prover.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking
//! and management.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Aggregated metrics for the prover.
///
/// Metric descriptions are registered with the global registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "prover_withdrawals_scanned_total",
            "Total number of pending withdrawals discovered while scanning"
        );
        describe_counter!(
            "prover_withdrawals_proven_total",
            "Total number of withdrawals successfully proven on L1"
        );
        describe_counter!(
            "prover_withdrawals_finalized_total",
            "Total number of withdrawals successfully finalized on L1"
        );
        describe_counter!(
            "prover_prove_failures_total",
            "Total number of failed prove attempts"
        );
        describe_counter!(
            "prover_finalize_failures_total",
            "Total number of failed finalize attempts"
        );
        describe_histogram!(
            "prover_finalization_wait_seconds",
            "Time spent waiting for output publication and finalization"
        );
    }

    pub fn record_scanned(&self, count: usize) {
        counter!("prover_withdrawals_scanned_total").increment(count as u64);
    }

    pub fn record_proven(&self) {
        counter!("prover_withdrawals_proven_total").increment(1);
    }

    pub fn record_finalized(&self) {
        counter!("prover_withdrawals_finalized_total").increment(1);
    }

    pub fn record_prove_failure(&self) {
        counter!("prover_prove_failures_total").increment(1);
    }

    pub fn record_finalize_failure(&self) {
        counter!("prover_finalize_failures_total").increment(1);
    }

    pub fn record_finalization_wait(&self, duration: Duration) {
        histogram!("prover_finalization_wait_seconds").record(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording_does_not_panic_without_recorder() {
        // With no global recorder installed these are no-ops.
        let metrics = Metrics::new();
        metrics.record_scanned(3);
        metrics.record_proven();
        metrics.record_finalized();
        metrics.record_prove_failure();
        metrics.record_finalize_failure();
        metrics.record_finalization_wait(Duration::from_secs(1));
    }
}
