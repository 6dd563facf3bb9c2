//! # Relocation Bench
//!
//! A correctness and throughput harness for moving entries inside point
//! indexes that allow several entries on the same coordinate.
//!
//! This library provides:
//! - Point and identity types
//! - Seeded workload generation with a controlled share of coordinate collisions
//! - Two relocation strategies behind one interface: per-coordinate buckets and
//!   a native multimap relocate
//! - A round driver with post-round invariant checks and an end-of-run oracle
//! - Throughput metrics
//!
//! ## Example
//!
//! ```rust
//! use relocation_bench::{Point, RelocatableIndex, Strategy};
//!
//! let mut index = Strategy::Bucketed.build(3);
//! index.insert(Point::from([3.0, 3.0, 3.0]), 7).unwrap();
//! index.insert(Point::from([3.0, 3.0, 3.0]), 9).unwrap();
//!
//! // Move identity 7 away from the shared coordinate
//! let moved = index
//!     .relocate(&Point::from([3.0, 3.0, 3.0]), &Point::from([4.0, 3.0, 3.0]), 7)
//!     .unwrap();
//! assert!(moved);
//! assert_eq!(index.identities_at(&Point::from([3.0, 3.0, 3.0])), vec![9]);
//! ```

pub mod adapter;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod index;
pub mod metrics;
pub mod oracle;
pub mod point;
pub mod workload;

pub use adapter::{Bucket, BucketedIndex, NativeRelocatableIndex, RelocatableIndex, Strategy};
pub use config::{AnomalyPolicy, BenchConfig};
pub use driver::{run_round, Anomaly, RoundReport};
pub use engine::{PointTreeMap, PointTreeMultiMap};
pub use error::{RelocationError, Result};
pub use index::{PointMap, PointMultiMap};
pub use metrics::{MetricsSummary, UpdateMetrics};
pub use oracle::{compare, BenchReport, Benchmark, Verification};
pub use point::{Identity, Point};
pub use workload::{
    generate_population, generate_relocation_batch, BatchBuilder, Distribution, ReferenceMirror,
    RelocationOp,
};
