//! Native strategy: the engine moves a (coordinate, identity) entry itself.

use std::fmt;

use crate::adapter::{check_dimension, RelocatableIndex, Strategy};
use crate::engine::PointTreeMultiMap;
use crate::error::Result;
use crate::index::PointMultiMap;
use crate::point::{Identity, Point};

/// A point index over a multimap engine with a first-class relocate.
pub struct NativeRelocatableIndex<M: PointMultiMap = PointTreeMultiMap> {
    map: M,
    dimension: usize,
}

impl NativeRelocatableIndex {
    /// Create a new empty index backed by an ordered multimap.
    pub fn new(dimension: usize) -> Self {
        Self::with_map(PointTreeMultiMap::new(dimension), dimension)
    }
}

impl<M: PointMultiMap> NativeRelocatableIndex<M> {
    /// Create a native index over an empty engine.
    pub fn with_map(map: M, dimension: usize) -> Self {
        debug_assert!(map.is_empty());
        Self { map, dimension }
    }

    /// Get a reference to the underlying engine.
    pub fn map(&self) -> &M {
        &self.map
    }
}

impl<M: PointMultiMap> fmt::Debug for NativeRelocatableIndex<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRelocatableIndex")
            .field("dimension", &self.dimension)
            .field("entries", &self.map.len())
            .finish()
    }
}

impl<M: PointMultiMap> RelocatableIndex for NativeRelocatableIndex<M> {
    fn strategy(&self) -> Strategy {
        Strategy::Native
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn insert(&mut self, point: Point, id: Identity) -> Result<bool> {
        check_dimension(self.dimension, &point)?;
        Ok(self.map.insert(point, id))
    }

    fn relocate(&mut self, old: &Point, new: &Point, id: Identity) -> Result<bool> {
        check_dimension(self.dimension, old)?;
        check_dimension(self.dimension, new)?;
        Ok(self.map.relocate(old, new, id))
    }

    fn contains(&self, point: &Point, id: Identity) -> bool {
        self.map.contains(point, id)
    }

    fn identities_at(&self, point: &Point) -> Vec<Identity> {
        self.map.identities_at(point)
    }

    fn size(&self) -> usize {
        self.map.len()
    }

    fn entry_count(&self) -> usize {
        self.map.len()
    }

    fn entries(&self) -> Vec<(Point, Identity)> {
        self.map.iter().map(|(point, id)| (point.clone(), id)).collect()
    }
}
