//! Benchmark configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RelocationError, Result};
use crate::workload::{check_bounds, Distribution};

/// Relocations applied per round by default.
pub const UPDATES_PER_ROUND: usize = 1000;

/// Upper coordinate bound used by default.
pub const GLOBAL_MAX: f64 = 10_000.0;

/// What to do when a round reports an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyPolicy {
    /// Log and count, keep running. Suited to long performance runs.
    Log,
    /// Stop at the first anomaly and return it as an error. Suited to tests.
    Fail,
}

/// Parameters for one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Number of entries in the index
    pub population: usize,
    /// Dimensionality of every point
    pub dimension: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Fraction of the population placed on an already used coordinate
    pub collision_fraction: f64,
    pub distribution: Distribution,
    /// Per-dimension offsets, consumed cyclically within a batch
    pub move_distances: Vec<f64>,
    /// Relocations per round
    pub batch_size: usize,
    pub rounds: usize,
    pub seed: u64,
    pub policy: AnomalyPolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            population: 1000,
            dimension: 3,
            lower_bound: 0.0,
            upper_bound: GLOBAL_MAX,
            collision_fraction: 0.1,
            distribution: Distribution::Cube,
            move_distances: vec![0.0, 1.0, 10.0],
            batch_size: UPDATES_PER_ROUND,
            rounds: 100,
            seed: 0,
            policy: AnomalyPolicy::Log,
        }
    }
}

impl BenchConfig {
    /// Parse a configuration from a JSON file without validating it.
    ///
    /// Missing fields take their defaults. Use this when more values are
    /// layered on top before the benchmark is built.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters describe a runnable benchmark.
    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(RelocationError::invalid_config("population must be at least 1"));
        }
        if self.dimension == 0 {
            return Err(RelocationError::invalid_config("dimension must be at least 1"));
        }
        check_bounds(self.lower_bound, self.upper_bound)?;
        if !(0.0..1.0).contains(&self.collision_fraction) {
            return Err(RelocationError::invalid_config(format!(
                "collision fraction {} must be in [0, 1)",
                self.collision_fraction
            )));
        }
        if self.move_distances.is_empty() || self.move_distances.iter().any(|d| !d.is_finite()) {
            return Err(RelocationError::invalid_config(
                "move distances must be a non-empty list of finite values",
            ));
        }
        if self.batch_size == 0 {
            return Err(RelocationError::invalid_config("batch size must be at least 1"));
        }
        Ok(())
    }
}
