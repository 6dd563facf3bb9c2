//! Ordered single-value point map

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::index::PointMap;
use crate::point::Point;

/// A point map holding one value per distinct coordinate.
#[derive(Debug, Clone)]
pub struct PointTreeMap<V> {
    entries: BTreeMap<Point, V>,
    dimension: usize,
}

impl<V> PointTreeMap<V> {
    /// Create a new empty map for points of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            dimension,
        }
    }

    /// The dimension of the points stored in this map.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl<V> PointMap<V> for PointTreeMap<V> {
    fn emplace(&mut self, point: Point) -> (&mut V, bool)
    where
        V: Default,
    {
        debug_assert_eq!(point.dimension(), self.dimension);
        match self.entries.entry(point) {
            Entry::Vacant(e) => (e.insert(V::default()), true),
            Entry::Occupied(e) => (e.into_mut(), false),
        }
    }

    fn find(&self, point: &Point) -> Option<&V> {
        self.entries.get(point)
    }

    fn find_mut(&mut self, point: &Point) -> Option<&mut V> {
        self.entries.get_mut(point)
    }

    fn erase(&mut self, point: &Point) -> usize {
        usize::from(self.entries.remove(point).is_some())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a Point, &'a V)> + 'a>
    where
        V: 'a,
    {
        Box::new(self.entries.iter())
    }
}
