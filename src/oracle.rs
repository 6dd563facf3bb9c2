//! Benchmark loop and correctness oracle.
//!
//! A [`Benchmark`] owns one index, the reference mirror and the batch builder.
//! Every round builds its batch outside the timed region, times only the
//! relocations, and then applies the configured [`AnomalyPolicy`].

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::adapter::{RelocatableIndex, Strategy};
use crate::config::{AnomalyPolicy, BenchConfig};
use crate::driver::{run_round, Anomaly, RoundReport};
use crate::error::{RelocationError, Result};
use crate::metrics::{MetricsSummary, UpdateMetrics};
use crate::point::Identity;
use crate::workload::{generate_population, BatchBuilder, ReferenceMirror};

/// Result of a full sweep comparing the index against the reference mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub population: usize,
    /// Identities not found at their mirror position
    pub missing: usize,
    /// Logical entries actually stored in the index
    pub entries: usize,
    /// Size reported by the engine (distinct coordinates for the bucketed strategy)
    pub keys: usize,
    pub empty_buckets: usize,
}

impl Verification {
    pub fn is_consistent(&self) -> bool {
        self.missing == 0 && self.entries == self.population && self.empty_buckets == 0
    }
}

/// Final report of one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub strategy: Strategy,
    pub population: usize,
    pub dimension: usize,
    pub batch_size: usize,
    pub metrics: MetricsSummary,
    pub verification: Verification,
}

/// One strategy driven through a seeded relocation workload.
#[derive(Debug)]
pub struct Benchmark {
    config: BenchConfig,
    index: Box<dyn RelocatableIndex>,
    mirror: ReferenceMirror,
    batches: BatchBuilder,
}

impl Benchmark {
    /// Generate the population and load it into a fresh index of `strategy`.
    pub fn new(config: BenchConfig, strategy: Strategy) -> Result<Self> {
        config.validate()?;
        info!(
            population = config.population,
            dimension = config.dimension,
            %strategy,
            "setting up world"
        );

        let mut rng = StdRng::seed_from_u64(config.seed);
        let points = generate_population(
            config.population,
            config.dimension,
            config.distribution,
            config.lower_bound,
            config.upper_bound,
            config.collision_fraction,
            &mut rng,
        )?;

        let mut index = strategy.build(config.dimension);
        for (i, point) in points.iter().enumerate() {
            index.insert(point.clone(), i as Identity)?;
        }
        let mirror = ReferenceMirror::new(points);
        let batches = BatchBuilder::new(
            config.seed.wrapping_add(1),
            config.move_distances.clone(),
            config.batch_size,
        )?;

        info!(
            keys = index.size(),
            entries = index.entry_count(),
            "world setup complete"
        );
        Ok(Self {
            config,
            index,
            mirror,
            batches,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn strategy(&self) -> Strategy {
        self.index.strategy()
    }

    /// Get a reference to the index under test.
    pub fn index(&self) -> &dyn RelocatableIndex {
        self.index.as_ref()
    }

    pub fn mirror(&self) -> &ReferenceMirror {
        &self.mirror
    }

    /// Run one round and record it into `metrics`.
    pub fn step(&mut self, metrics: &mut UpdateMetrics) -> Result<RoundReport> {
        let ops = self.batches.build(&self.mirror);

        let start = Instant::now();
        let report = run_round(
            self.index.as_mut(),
            &ops,
            &mut self.mirror,
            self.config.population,
        )?;
        let elapsed = start.elapsed();

        metrics.record_round(&report, elapsed);
        self.enforce(&report.anomalies)?;
        Ok(report)
    }

    /// Run every configured round, then verify the index against the mirror.
    pub fn run(&mut self) -> Result<BenchReport> {
        let mut metrics = UpdateMetrics::new();
        for round in 0..self.config.rounds {
            let report = self.step(&mut metrics)?;
            debug!(
                round,
                succeeded = report.succeeded,
                size = report.size_after,
                "round complete"
            );
        }

        let verification = self.verify();
        if !verification.is_consistent() {
            let anomaly = Anomaly::MirrorDivergence {
                missing: verification.missing,
                entries: verification.entries,
                population: verification.population,
            };
            error!(%anomaly, "index diverged from reference mirror");
            self.enforce(std::slice::from_ref(&anomaly))?;
        }

        let summary = metrics.summary();
        info!(
            strategy = %self.strategy(),
            total = summary.total_relocations,
            rate = summary.relocations_per_second,
            anomalies = summary.total_anomalies,
            "benchmark complete"
        );
        Ok(BenchReport {
            strategy: self.strategy(),
            population: self.config.population,
            dimension: self.config.dimension,
            batch_size: self.config.batch_size,
            metrics: summary,
            verification,
        })
    }

    /// Full sweep: every identity at its mirror position, one entry per identity,
    /// no empty buckets.
    pub fn verify(&self) -> Verification {
        let missing = self
            .mirror
            .iter()
            .filter(|(id, point)| !self.index.contains(point, *id))
            .count();
        Verification {
            population: self.config.population,
            missing,
            entries: self.index.entries().len(),
            keys: self.index.size(),
            empty_buckets: self.index.empty_buckets(),
        }
    }

    fn enforce(&self, anomalies: &[Anomaly]) -> Result<()> {
        match (self.config.policy, anomalies.first()) {
            (AnomalyPolicy::Fail, Some(anomaly)) => {
                Err(RelocationError::InvariantViolated(anomaly.clone()))
            }
            _ => Ok(()),
        }
    }
}

/// Run every strategy against the same seeded workload.
pub fn compare(config: &BenchConfig) -> Result<Vec<BenchReport>> {
    Strategy::ALL
        .iter()
        .map(|&strategy| Benchmark::new(config.clone(), strategy)?.run())
        .collect()
}
