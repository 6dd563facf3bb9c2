//! Update driver: applies one round of relocations and checks the index afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::adapter::RelocatableIndex;
use crate::error::{RelocationError, Result};
use crate::point::{Identity, Point};
use crate::workload::{ReferenceMirror, RelocationOp};

/// A recoverable problem detected while running a round.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    #[error("Invalid update count: {actual}/{expected}")]
    UpdateCountMismatch { expected: usize, actual: usize },

    #[error("Invalid index size after update: {actual} (population {population}, before round {before})")]
    IndexSizeInvariantViolation {
        actual: usize,
        population: usize,
        before: usize,
    },

    #[error("No bucket at {old} while relocating identity {id}")]
    Consistency { id: Identity, old: Point },

    #[error("Index diverged from reference: {missing} identities misplaced, {entries}/{population} entries")]
    MirrorDivergence {
        missing: usize,
        entries: usize,
        population: usize,
    },
}

/// Outcome of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub requested: usize,
    pub succeeded: usize,
    pub size_before: usize,
    pub size_after: usize,
    pub anomalies: Vec<Anomaly>,
}

impl RoundReport {
    /// Whether the round finished without any anomaly.
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Apply `ops` to `index` strictly in order and check the round's invariants.
///
/// Each successful op is committed to `mirror` right after the index reports
/// success; failed ops leave the mirror untouched. A consistency error from the
/// index fails that op and is recorded as an anomaly. Any other error aborts
/// the round.
pub fn run_round<I: RelocatableIndex + ?Sized>(
    index: &mut I,
    ops: &[RelocationOp],
    mirror: &mut ReferenceMirror,
    population: usize,
) -> Result<RoundReport> {
    let size_before = index.size();
    let mut succeeded = 0;
    let mut anomalies = Vec::new();

    for op in ops {
        match index.relocate(&op.old, &op.new, op.id) {
            Ok(true) => {
                mirror.commit(op);
                succeeded += 1;
            }
            Ok(false) => {}
            Err(RelocationError::Consistency { id, old }) => {
                warn!(id, %old, "relocation found no bucket at old coordinate");
                anomalies.push(Anomaly::Consistency { id, old });
            }
            Err(e) => return Err(e),
        }
    }

    if succeeded != ops.len() {
        error!(expected = ops.len(), actual = succeeded, "invalid update count");
        anomalies.push(Anomaly::UpdateCountMismatch {
            expected: ops.len(),
            actual: succeeded,
        });
    }

    // The bucketed index reports distinct coordinates, so its size may sit
    // below the population, but one round cannot shrink it by more than the batch.
    let size_after = index.size();
    if size_after > population || size_after + ops.len() < size_before {
        error!(
            actual = size_after,
            population,
            before = size_before,
            "invalid index size after update"
        );
        anomalies.push(Anomaly::IndexSizeInvariantViolation {
            actual: size_after,
            population,
            before: size_before,
        });
    }

    Ok(RoundReport {
        requested: ops.len(),
        succeeded,
        size_before,
        size_after,
        anomalies,
    })
}
