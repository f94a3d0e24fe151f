//! arbor: approximate nearest-neighbor search over a random-projection
//! forest.
//!
//! The index owns a set of dense `f64` vectors and a forest of binary
//! trees. Each tree recursively partitions the points with hyperplanes
//! estimated by randomized two-means clustering; a query explores all
//! trees at once through a single best-first priority queue, then ranks
//! the gathered candidates by a pluggable [`DistanceMeasure`].
//!
//! Approximation knobs:
//!
//! - **More roots** ([`VectorIndex::new`]'s `num_roots`): independent
//!   trees vote on candidates; more trees, better recall, linear build
//!   cost.
//! - **Wider candidate pool** (`bucket_scale` at query time): the search
//!   keeps expanding subtrees until `k * bucket_scale` distinct
//!   candidates are gathered. [`DEFAULT_BUCKET_SCALE`] is a reasonable
//!   starting point.
//! - **Leaf capacity** (`max_items_per_leaf`): smaller leaves give finer
//!   partitions and deeper trees.
//!
//! # Usage
//!
//! ```
//! use arbor::{CosineDistance, DataPoint, VectorIndex};
//!
//! # fn main() -> arbor::Result<()> {
//! let points = vec![
//!     DataPoint::new(0, vec![0.0, 1.0]),
//!     DataPoint::new(1, vec![1.0, 0.0]),
//!     DataPoint::new(2, vec![0.8, 0.6]),
//! ];
//!
//! let mut index = VectorIndex::new(2, 2, 1, points, CosineDistance)?;
//! index.build();
//!
//! let neighbors = index.search_by_vector(&[0.0, 1.0], 2, 10.0)?;
//! assert_eq!(neighbors.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! The forest is ephemeral: there is no persistence, no deletion, and no
//! exactness guarantee. Build and insert fan out one task per root;
//! queries are sequential and lock-light.

pub mod distance;
pub mod error;
pub mod forest;
pub mod math;

pub use distance::{CosineDistance, DistanceMeasure, EuclideanDistance};
pub use error::{IndexError, Result};
pub use forest::{DataPoint, SearchResult, VectorIndex, DEFAULT_BUCKET_SCALE};
