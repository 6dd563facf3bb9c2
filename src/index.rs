//! Engine traits: the contract the relocation adapters consume from a point index.
//!
//! How an engine partitions space is its own business; adapters only rely on
//! exact-coordinate lookups and the operations below.

use crate::point::{Identity, Point};

/// A point index storing one value per distinct coordinate.
pub trait PointMap<V> {
    /// Return the value at `point`, inserting `V::default()` if the key is absent.
    /// The flag is `true` when a new key was created.
    fn emplace(&mut self, point: Point) -> (&mut V, bool)
    where
        V: Default;

    /// Look up the value stored at exactly `point`.
    fn find(&self, point: &Point) -> Option<&V>;

    /// Mutable lookup of the value stored at exactly `point`.
    fn find_mut(&mut self, point: &Point) -> Option<&mut V>;

    /// Remove the key at `point`. Returns the number of keys removed (0 or 1).
    fn erase(&mut self, point: &Point) -> usize;

    /// The number of distinct coordinates (keys) in this index.
    fn len(&self) -> usize;

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all (coordinate, value) pairs.
    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a Point, &'a V)> + 'a>
    where
        V: 'a;
}

/// A point index where (coordinate, identity) is one entry and coordinates may repeat.
pub trait PointMultiMap {
    /// Insert the entry `(point, id)`. Returns `false` if it already existed.
    fn insert(&mut self, point: Point, id: Identity) -> bool;

    /// Whether the entry `(point, id)` exists.
    fn contains(&self, point: &Point, id: Identity) -> bool;

    /// Move the entry `(old, id)` to `(new, id)` as a single operation.
    /// Returns `false` and leaves the index untouched if `(old, id)` does not exist.
    fn relocate(&mut self, old: &Point, new: &Point, id: Identity) -> bool;

    /// Remove the entry `(point, id)`. Returns the number of entries removed.
    fn erase(&mut self, point: &Point, id: Identity) -> usize;

    /// Number of entries stored at exactly `point`.
    fn count_at(&self, point: &Point) -> usize;

    /// Identities stored at exactly `point`, in ascending order.
    fn identities_at(&self, point: &Point) -> Vec<Identity>;

    /// The number of entries in this index.
    fn len(&self) -> usize;

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all entries.
    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a Point, Identity)> + 'a>;
}
