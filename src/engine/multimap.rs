//! Ordered point multimap with a native relocate

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::index::PointMultiMap;
use crate::point::{Identity, Point};

/// A multimap storing (coordinate, identity) pairs as single entries.
#[derive(Debug, Clone)]
pub struct PointTreeMultiMap {
    entries: BTreeSet<(Point, Identity)>,
    dimension: usize,
}

impl PointTreeMultiMap {
    /// Create a new empty multimap for points of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: BTreeSet::new(),
            dimension,
        }
    }

    /// The dimension of the points stored in this multimap.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn at(point: &Point) -> RangeInclusive<(Point, Identity)> {
        (point.clone(), Identity::MIN)..=(point.clone(), Identity::MAX)
    }
}

impl PointMultiMap for PointTreeMultiMap {
    fn insert(&mut self, point: Point, id: Identity) -> bool {
        debug_assert_eq!(point.dimension(), self.dimension);
        self.entries.insert((point, id))
    }

    fn contains(&self, point: &Point, id: Identity) -> bool {
        // BTreeSet has no borrowed-tuple lookup
        self.entries.contains(&(point.clone(), id))
    }

    fn relocate(&mut self, old: &Point, new: &Point, id: Identity) -> bool {
        if old == new {
            return self.contains(old, id);
        }
        if !self.entries.remove(&(old.clone(), id)) {
            return false;
        }
        self.entries.insert((new.clone(), id));
        true
    }

    fn erase(&mut self, point: &Point, id: Identity) -> usize {
        usize::from(self.entries.remove(&(point.clone(), id)))
    }

    fn count_at(&self, point: &Point) -> usize {
        self.entries.range(Self::at(point)).count()
    }

    fn identities_at(&self, point: &Point) -> Vec<Identity> {
        self.entries.range(Self::at(point)).map(|(_, id)| *id).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a Point, Identity)> + 'a> {
        Box::new(self.entries.iter().map(|(p, id)| (p, *id)))
    }
}
