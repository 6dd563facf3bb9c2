//! Point and identity types

use crate::error::{RelocationError, Result};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;

/// Opaque token naming one logical entry. Stable across relocations.
pub type Identity = u64;

/// A coordinate in D-dimensional space.
///
/// Equality is exact and component-wise. Points are totally ordered and
/// hashable so they can key both ordered and hashed maps; `-0.0` and `0.0`
/// compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    data: Vec<f64>,
}

impl Point {
    /// Create a new point from its components
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Create a new point, rejecting NaN components
    pub fn try_new(data: Vec<f64>) -> Result<Self> {
        if let Some(d) = data.iter().position(|x| x.is_nan()) {
            return Err(RelocationError::InvalidPoint {
                reason: format!("NaN in dimension {}", d),
            });
        }
        Ok(Self { data })
    }

    /// Get the dimension of the point
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the components as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Add the same scalar to every component.
    pub fn offset(&self, delta: f64) -> Point {
        Point::new(self.data.iter().map(|x| x + delta).collect())
    }

    /// Parse a point from a comma-separated string, e.g. `"1.0, 2.5, -3"`
    pub fn from_str(s: &str) -> Result<Self> {
        let data: Result<Vec<f64>> = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f64>()
                    .map_err(|_| RelocationError::InvalidPoint {
                        reason: format!("Invalid float: {}", x),
                    })
            })
            .collect();
        Point::try_new(data?)
    }

    fn key(&self) -> impl Iterator<Item = OrderedFloat<f64>> + '_ {
        self.data.iter().copied().map(OrderedFloat)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key().eq(other.key())
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(other.key())
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.len().hash(state);
        for x in self.key() {
            x.hash(state);
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<f64>> for Point {
    fn from(data: Vec<f64>) -> Self {
        Point::new(data)
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(data: [f64; N]) -> Self {
        Point::new(data.to_vec())
    }
}

impl Add for &Point {
    type Output = Result<Point>;

    fn add(self, other: Self) -> Result<Point> {
        if self.dimension() != other.dimension() {
            return Err(RelocationError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }
        Ok(Point::new(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a + b)
                .collect(),
        ))
    }
}
