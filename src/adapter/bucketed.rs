//! Bucketed strategy: one identity set per coordinate.

use std::collections::BTreeSet;
use std::fmt;

use crate::adapter::{check_dimension, RelocatableIndex, Strategy};
use crate::engine::PointTreeMap;
use crate::error::{RelocationError, Result};
use crate::index::PointMap;
use crate::point::{Identity, Point};

/// Identities sharing one coordinate.
pub type Bucket = BTreeSet<Identity>;

/// A point index whose value at each coordinate is a [`Bucket`].
///
/// Relocation is not atomic: between inserting into the new bucket and erasing
/// from the old one, the entry is present at both coordinates. Nothing in this
/// crate observes that window, but callers sharing the index must not assume
/// otherwise.
pub struct BucketedIndex<M: PointMap<Bucket> = PointTreeMap<Bucket>> {
    map: M,
    dimension: usize,
    entries: usize,
}

impl BucketedIndex {
    /// Create a new empty index backed by an ordered point map.
    pub fn new(dimension: usize) -> Self {
        Self::with_map(PointTreeMap::new(dimension), dimension)
    }
}

impl<M: PointMap<Bucket>> BucketedIndex<M> {
    /// Create a bucketed index over an empty engine.
    pub fn with_map(map: M, dimension: usize) -> Self {
        debug_assert!(map.is_empty());
        Self {
            map,
            dimension,
            entries: 0,
        }
    }

    /// The bucket stored at exactly `point`, if any.
    pub fn bucket(&self, point: &Point) -> Option<&Bucket> {
        self.map.find(point)
    }

    /// Get a reference to the underlying engine.
    pub fn map(&self) -> &M {
        &self.map
    }
}

impl<M: PointMap<Bucket>> fmt::Debug for BucketedIndex<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketedIndex")
            .field("dimension", &self.dimension)
            .field("keys", &self.map.len())
            .field("entries", &self.entries)
            .finish()
    }
}

impl<M: PointMap<Bucket>> RelocatableIndex for BucketedIndex<M> {
    fn strategy(&self) -> Strategy {
        Strategy::Bucketed
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn insert(&mut self, point: Point, id: Identity) -> Result<bool> {
        check_dimension(self.dimension, &point)?;
        let (bucket, _) = self.map.emplace(point);
        let inserted = bucket.insert(id);
        if inserted {
            self.entries += 1;
        }
        Ok(inserted)
    }

    fn relocate(&mut self, old: &Point, new: &Point, id: Identity) -> Result<bool> {
        check_dimension(self.dimension, old)?;
        check_dimension(self.dimension, new)?;

        let (bucket, _) = self.map.emplace(new.clone());
        if !bucket.insert(id) {
            // Already at `new`: only happens for old == new.
            return Ok(true);
        }
        self.entries += 1;

        // The entry is now present at both coordinates until the erase below.
        let Some(old_bucket) = self.map.find_mut(old) else {
            return Err(RelocationError::Consistency {
                id,
                old: old.clone(),
            });
        };
        let mut success = old_bucket.remove(&id);
        if success {
            self.entries -= 1;
        }
        if old_bucket.is_empty() {
            success &= self.map.erase(old) != 0;
        }
        Ok(success)
    }

    fn contains(&self, point: &Point, id: Identity) -> bool {
        self.map
            .find(point)
            .map_or(false, |bucket| bucket.contains(&id))
    }

    fn identities_at(&self, point: &Point) -> Vec<Identity> {
        self.map
            .find(point)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    fn size(&self) -> usize {
        self.map.len()
    }

    fn entry_count(&self) -> usize {
        self.entries
    }

    fn entries(&self) -> Vec<(Point, Identity)> {
        self.map
            .iter()
            .flat_map(|(point, bucket)| bucket.iter().map(move |id| (point.clone(), *id)))
            .collect()
    }

    fn empty_buckets(&self) -> usize {
        self.map.iter().filter(|(_, bucket)| bucket.is_empty()).count()
    }
}
