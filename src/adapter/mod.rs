//! Relocation strategies over duplicate-tolerant point indexes.
//!
//! Two adapters expose the same [`RelocatableIndex`] interface:
//!
//! - [`BucketedIndex`] stores a set of identities per coordinate and simulates
//!   a move with insert-into-new-bucket followed by erase-from-old-bucket.
//! - [`NativeRelocatableIndex`] stores (coordinate, identity) entries and hands
//!   the move to the engine's own relocate primitive.
//!
//! The strategy is chosen at construction time through [`Strategy::build`].

pub mod bucketed;
pub mod native;

pub use bucketed::{Bucket, BucketedIndex};
pub use native::NativeRelocatableIndex;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RelocationError, Result};
use crate::point::{Identity, Point};

/// An index of (coordinate, identity) entries that supports moving an entry.
pub trait RelocatableIndex: fmt::Debug {
    /// Which strategy this index implements.
    fn strategy(&self) -> Strategy;

    /// The dimension of the points stored in this index.
    fn dimension(&self) -> usize;

    /// Insert the entry `(point, id)`. Returns `false` if it already existed.
    fn insert(&mut self, point: Point, id: Identity) -> Result<bool>;

    /// Move the entry for `id` from `old` to `new`.
    ///
    /// `Ok(true)` on success, including the no-op case `old == new`.
    /// `Ok(false)` when the move did not fully happen.
    fn relocate(&mut self, old: &Point, new: &Point, id: Identity) -> Result<bool>;

    /// Whether the entry `(point, id)` exists.
    fn contains(&self, point: &Point, id: Identity) -> bool;

    /// Identities stored at exactly `point`, in ascending order.
    fn identities_at(&self, point: &Point) -> Vec<Identity>;

    /// The size reported by the underlying engine.
    ///
    /// For the bucketed strategy this is the number of distinct coordinates,
    /// which is lower than the entry count when coordinates collide.
    fn size(&self) -> usize;

    /// The number of logical (coordinate, identity) entries.
    fn entry_count(&self) -> usize;

    /// All entries, ordered by coordinate then identity.
    fn entries(&self) -> Vec<(Point, Identity)>;

    /// Number of coordinate keys holding no identity. Always zero for a healthy index.
    fn empty_buckets(&self) -> usize {
        0
    }
}

/// Relocation strategy, selected when the index is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Set of identities per coordinate, move = insert + erase
    Bucketed,
    /// One entry per (coordinate, identity), move = engine relocate
    Native,
}

impl Strategy {
    /// Every strategy, in reporting order.
    pub const ALL: [Strategy; 2] = [Strategy::Bucketed, Strategy::Native];

    /// Build an empty index of this strategy for points of `dimension`.
    pub fn build(self, dimension: usize) -> Box<dyn RelocatableIndex> {
        match self {
            Strategy::Bucketed => Box::new(BucketedIndex::new(dimension)),
            Strategy::Native => Box::new(NativeRelocatableIndex::new(dimension)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Bucketed => "bucketed",
            Strategy::Native => "native",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

pub(crate) fn check_dimension(expected: usize, point: &Point) -> Result<()> {
    if point.dimension() != expected {
        return Err(RelocationError::DimensionMismatch {
            expected,
            actual: point.dimension(),
        });
    }
    Ok(())
}
