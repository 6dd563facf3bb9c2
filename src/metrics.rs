//! Throughput metrics: relocation counts, round latency, update rate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::RoundReport;

/// Accumulates per-round measurements for one benchmark run.
///
/// Owned by the benchmark loop and fed explicitly after every round.
#[derive(Debug, Clone)]
pub struct UpdateMetrics {
    round_latencies_us: Vec<f64>,
    total_elapsed: Duration,
    total_relocations: u64,
    total_succeeded: u64,
    total_anomalies: u64,
}

/// Serializable snapshot of [`UpdateMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub rounds: usize,
    pub total_relocations: u64,
    pub total_succeeded: u64,
    pub total_anomalies: u64,
    pub total_elapsed_ms: f64,
    pub relocations_per_second: f64,
    pub avg_round_latency_us: f64,
    pub p50_round_latency_us: f64,
    pub p99_round_latency_us: f64,
}

impl UpdateMetrics {
    pub fn new() -> Self {
        Self {
            round_latencies_us: Vec::new(),
            total_elapsed: Duration::ZERO,
            total_relocations: 0,
            total_succeeded: 0,
            total_anomalies: 0,
        }
    }

    /// Record a finished round and the time spent applying it.
    pub fn record_round(&mut self, report: &RoundReport, elapsed: Duration) {
        self.round_latencies_us.push(elapsed.as_secs_f64() * 1e6);
        self.total_elapsed += elapsed;
        self.total_relocations += report.requested as u64;
        self.total_succeeded += report.succeeded as u64;
        self.total_anomalies += report.anomalies.len() as u64;
    }

    pub fn rounds(&self) -> usize {
        self.round_latencies_us.len()
    }

    /// Relocations requested across all rounds.
    pub fn total_relocations(&self) -> u64 {
        self.total_relocations
    }

    pub fn total_succeeded(&self) -> u64 {
        self.total_succeeded
    }

    pub fn total_anomalies(&self) -> u64 {
        self.total_anomalies
    }

    /// Time spent inside timed regions only.
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Relocations processed per second of timed work.
    pub fn relocations_per_second(&self) -> f64 {
        let secs = self.total_elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_relocations as f64 / secs
    }

    /// Average round latency in microseconds.
    pub fn avg_round_latency_us(&self) -> f64 {
        if self.round_latencies_us.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.round_latencies_us.iter().sum();
        sum / self.round_latencies_us.len() as f64
    }

    /// Get a percentile of round latency (e.g., 50.0, 95.0, 99.0).
    pub fn percentile_round_latency_us(&self, percentile: f64) -> f64 {
        if self.round_latencies_us.is_empty() {
            return 0.0;
        }

        let mut sorted = self.round_latencies_us.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            rounds: self.rounds(),
            total_relocations: self.total_relocations,
            total_succeeded: self.total_succeeded,
            total_anomalies: self.total_anomalies,
            total_elapsed_ms: self.total_elapsed.as_secs_f64() * 1e3,
            relocations_per_second: self.relocations_per_second(),
            avg_round_latency_us: self.avg_round_latency_us(),
            p50_round_latency_us: self.percentile_round_latency_us(50.0),
            p99_round_latency_us: self.percentile_round_latency_us(99.0),
        }
    }
}

impl Default for UpdateMetrics {
    fn default() -> Self {
        Self::new()
    }
}
