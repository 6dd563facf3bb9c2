//! Reference engines implementing the [`crate::index`] contracts.
//!
//! Both are ordered maps keyed by exact coordinate. They exist so the harness
//! has something concrete to drive; relocation cost differences between the
//! strategies come from the adapters, not from the engines.

pub mod map;
pub mod multimap;

pub use map::PointTreeMap;
pub use multimap::PointTreeMultiMap;
