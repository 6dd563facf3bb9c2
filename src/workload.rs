//! Workload generation: initial populations, relocation batches and the reference mirror.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{RelocationError, Result};
use crate::point::{Identity, Point};

/// Number of cluster centres used by [`Distribution::Cluster`].
pub const CLUSTER_COUNT: usize = 100;

/// Shape of a generated point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Uniform in the box `[lower, upper)^D`
    Cube,
    /// Dense clusters around uniformly placed centres, also inside `[lower, upper)`
    Cluster,
}

/// A request to move the entry `id` from `old` to `new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocationOp {
    pub id: Identity,
    pub old: Point,
    pub new: Point,
}

/// Generate `count` points of dimension `dimension` inside `[lower, upper)`.
///
/// `floor(count * collision_fraction)` of the points are exact copies of another
/// generated point. The output is fully determined by the state of `rng`.
pub fn generate_population<R: Rng + ?Sized>(
    count: usize,
    dimension: usize,
    distribution: Distribution,
    lower: f64,
    upper: f64,
    collision_fraction: f64,
    rng: &mut R,
) -> Result<Vec<Point>> {
    if dimension == 0 {
        return Err(RelocationError::invalid_config("dimension must be at least 1"));
    }
    check_bounds(lower, upper)?;
    if !(0.0..1.0).contains(&collision_fraction) {
        return Err(RelocationError::invalid_config(format!(
            "collision fraction {} must be in [0, 1)",
            collision_fraction
        )));
    }

    let duplicates = (count as f64 * collision_fraction).floor() as usize;
    let unique = count - duplicates;

    let mut points = match distribution {
        Distribution::Cube => cube(unique, dimension, lower, upper, rng),
        Distribution::Cluster => cluster(unique, dimension, lower, upper, rng),
    };

    for _ in 0..duplicates {
        let source = rng.gen_range(0..points.len());
        points.push(points[source].clone());
    }
    points.shuffle(rng);

    Ok(points)
}

/// Bounds must be finite, ordered, and span a finite width.
pub(crate) fn check_bounds(lower: f64, upper: f64) -> Result<()> {
    if !lower.is_finite() || !upper.is_finite() || lower >= upper || !(upper - lower).is_finite() {
        return Err(RelocationError::invalid_config(format!(
            "invalid bounds [{}, {}): must be finite, ordered and of finite width",
            lower, upper
        )));
    }
    Ok(())
}

fn cube<R: Rng + ?Sized>(
    count: usize,
    dimension: usize,
    lower: f64,
    upper: f64,
    rng: &mut R,
) -> Vec<Point> {
    (0..count)
        .map(|_| Point::new((0..dimension).map(|_| rng.gen_range(lower..upper)).collect()))
        .collect()
}

fn cluster<R: Rng + ?Sized>(
    count: usize,
    dimension: usize,
    lower: f64,
    upper: f64,
    rng: &mut R,
) -> Vec<Point> {
    let centres = cube(CLUSTER_COUNT.min(count), dimension, lower, upper, rng);
    let spread = (upper - lower) / 1000.0;
    (0..count)
        .map(|i| {
            let centre = &centres[i % centres.len()];
            Point::new(
                centre
                    .as_slice()
                    .iter()
                    .map(|&c| {
                        if spread <= 0.0 {
                            return c;
                        }
                        // Stay inside [lower, upper); fall back to the centre itself.
                        let x = c + rng.gen_range(-spread..spread);
                        if (lower..upper).contains(&x) {
                            x
                        } else {
                            c
                        }
                    })
                    .collect(),
            )
        })
        .collect()
}

/// Shadow mapping from identity to its current coordinate.
///
/// Identity `i` is the `i`-th point of the population it was built from.
#[derive(Debug, Clone)]
pub struct ReferenceMirror {
    positions: Vec<Point>,
}

impl ReferenceMirror {
    pub fn new(positions: Vec<Point>) -> Self {
        Self { positions }
    }

    /// The last committed position of `id`.
    pub fn position(&self, id: Identity) -> Option<&Point> {
        self.positions.get(id as usize)
    }

    /// Record that `op` was applied. Returns `false` for an unknown identity.
    pub fn commit(&mut self, op: &RelocationOp) -> bool {
        match self.positions.get_mut(op.id as usize) {
            Some(position) => {
                *position = op.new.clone();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate over all (identity, position) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Identity, &Point)> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| (i as Identity, p))
    }
}

/// Build a batch of `batch_size` relocations against the committed positions in `mirror`.
///
/// Identities are drawn uniformly with replacement. An identity drawn twice
/// chains: the second op starts where the first one ends. The move distances
/// are consumed cyclically, starting from the first one, and each distance is
/// added to every dimension.
pub fn generate_relocation_batch<R: Rng + ?Sized>(
    batch_size: usize,
    mirror: &ReferenceMirror,
    move_distances: &[f64],
    rng: &mut R,
) -> Vec<RelocationOp> {
    if mirror.is_empty() || move_distances.is_empty() {
        return Vec::new();
    }

    let mut pending: HashMap<Identity, Point> = HashMap::new();
    let mut ops = Vec::with_capacity(batch_size);
    for distance in move_distances.iter().cycle().take(batch_size) {
        let id = rng.gen_range(0..mirror.len()) as Identity;
        let old = match pending.get(&id) {
            Some(p) => p.clone(),
            None => mirror.positions[id as usize].clone(),
        };
        let new = old.offset(*distance);
        pending.insert(id, new.clone());
        ops.push(RelocationOp { id, old, new });
    }
    ops
}

/// Seeded source of relocation batches.
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    rng: StdRng,
    move_distances: Vec<f64>,
    batch_size: usize,
}

impl BatchBuilder {
    pub fn new(seed: u64, move_distances: Vec<f64>, batch_size: usize) -> Result<Self> {
        if move_distances.is_empty() {
            return Err(RelocationError::invalid_config("move distances must not be empty"));
        }
        if move_distances.iter().any(|d| !d.is_finite()) {
            return Err(RelocationError::invalid_config("move distances must be finite"));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            move_distances,
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Build the next batch.
    pub fn build(&mut self, mirror: &ReferenceMirror) -> Vec<RelocationOp> {
        generate_relocation_batch(self.batch_size, mirror, &self.move_distances, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn population(count: usize, distribution: Distribution, seed: u64) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_population(count, 3, distribution, 0.0, 10_000.0, 0.1, &mut rng).unwrap()
    }

    #[test]
    fn test_population_has_requested_collisions() {
        for distribution in [Distribution::Cube, Distribution::Cluster] {
            let points = population(1000, distribution, 1);
            assert_eq!(points.len(), 1000);
            let distinct: HashSet<_> = points.iter().collect();
            assert_eq!(distinct.len(), 900);
        }
    }

    #[test]
    fn test_population_within_bounds() {
        for distribution in [Distribution::Cube, Distribution::Cluster] {
            for p in population(500, distribution, 2) {
                assert_eq!(p.dimension(), 3);
                assert!(p.as_slice().iter().all(|x| (0.0..10_000.0).contains(x)));
            }
        }
    }

    #[test]
    fn test_population_is_deterministic() {
        assert_eq!(
            population(200, Distribution::Cube, 7),
            population(200, Distribution::Cube, 7)
        );
        assert_ne!(
            population(200, Distribution::Cube, 7),
            population(200, Distribution::Cube, 8)
        );
    }

    #[test]
    fn test_population_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_population(10, 0, Distribution::Cube, 0.0, 1.0, 0.1, &mut rng).is_err());
        assert!(generate_population(10, 2, Distribution::Cube, 1.0, 1.0, 0.1, &mut rng).is_err());
        assert!(generate_population(10, 2, Distribution::Cube, 0.0, 1.0, 1.0, &mut rng).is_err());
        assert!(generate_population(10, 2, Distribution::Cube, 0.0, 1.0, -0.1, &mut rng).is_err());
    }

    #[test]
    fn test_population_rejects_overflowing_width() {
        let mut rng = StdRng::seed_from_u64(0);
        for distribution in [Distribution::Cube, Distribution::Cluster] {
            let result =
                generate_population(10, 3, distribution, -1e308, 1e308, 0.1, &mut rng);
            assert!(matches!(result, Err(RelocationError::InvalidConfig { .. })));
        }
    }

    #[test]
    fn test_cluster_with_tiny_box() {
        let lower = 0.0;
        // Smallest subnormal: the cluster spread underflows to zero.
        let upper = 5e-324;
        let mut rng = StdRng::seed_from_u64(5);
        let points =
            generate_population(50, 2, Distribution::Cluster, lower, upper, 0.0, &mut rng).unwrap();
        assert_eq!(points.len(), 50);
        for p in points {
            assert!(p.as_slice().iter().all(|x| (lower..upper).contains(x)));
        }
    }

    #[test]
    fn test_cluster_stays_below_upper_bound() {
        let mut rng = StdRng::seed_from_u64(13);
        let points =
            generate_population(2000, 2, Distribution::Cluster, 0.0, 1.0, 0.0, &mut rng).unwrap();
        assert!(points
            .iter()
            .all(|p| p.as_slice().iter().all(|x| (0.0..1.0).contains(x))));
    }

    #[test]
    fn test_batch_cycles_move_distances() {
        let mirror = ReferenceMirror::new(vec![Point::from([0.0, 0.0]); 1000]);
        let mut rng = StdRng::seed_from_u64(3);
        let ops = generate_relocation_batch(6, &mirror, &[0.0, 1.0, 10.0], &mut rng);
        assert_eq!(ops.len(), 6);

        for (k, op) in ops.iter().enumerate() {
            let d = [0.0, 1.0, 10.0][k % 3];
            assert_eq!(op.new, op.old.offset(d));
        }
    }

    #[test]
    fn test_batch_chains_repeated_identity() {
        let mirror = ReferenceMirror::new(vec![Point::from([0.0, 0.0, 0.0]); 3]);
        let mut rng = StdRng::seed_from_u64(11);
        let ops = generate_relocation_batch(50, &mirror, &[1.0], &mut rng);

        let mut last: HashMap<Identity, Point> = HashMap::new();
        for op in &ops {
            let expected = last
                .get(&op.id)
                .cloned()
                .unwrap_or_else(|| mirror.position(op.id).unwrap().clone());
            assert_eq!(op.old, expected);
            last.insert(op.id, op.new.clone());
        }
        // The mirror itself is untouched until ops are committed.
        assert!(mirror.iter().all(|(_, p)| *p == Point::from([0.0, 0.0, 0.0])));
    }

    #[test]
    fn test_mirror_commit() {
        let mut mirror = ReferenceMirror::new(vec![Point::from([0.0]); 2]);
        let op = RelocationOp {
            id: 1,
            old: Point::from([0.0]),
            new: Point::from([4.0]),
        };
        assert!(mirror.commit(&op));
        assert_eq!(mirror.position(1), Some(&Point::from([4.0])));
        assert!(!mirror.commit(&RelocationOp { id: 5, ..op }));
    }

    #[test]
    fn test_builder_rejects_empty_distances() {
        assert!(BatchBuilder::new(0, vec![], 10).is_err());
        assert!(BatchBuilder::new(0, vec![f64::NAN], 10).is_err());
        let mut builder = BatchBuilder::new(0, vec![1.0], 10).unwrap();
        let mirror = ReferenceMirror::new(vec![Point::from([0.0])]);
        assert_eq!(builder.build(&mirror).len(), 10);
    }
}
