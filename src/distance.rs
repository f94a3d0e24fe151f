//! Distance measures for dense vectors.
//!
//! A [`DistanceMeasure`] turns two vectors into a scalar where **smaller
//! means closer**. The measure only ranks candidates; it never shapes the
//! forest itself, which always partitions by signed dot product against a
//! node's normal vector.
//!
//! ## Important nuance
//!
//! [`CosineDistance`] is the *negated dot product*. The index performs no
//! normalization, so it orders vectors by true cosine similarity only when
//! inputs are L2-normalized. Callers that want exact cosine ranking
//! normalize their embeddings before insertion.

use crate::math;

/// Scalar distance between two vectors; smaller is closer.
///
/// Implementations must be pure, total, and cheap to call: a query computes
/// one distance per candidate, and the two-means estimator calls the
/// measure inside its sampling loop.
pub trait DistanceMeasure: Send + Sync {
    /// Compute the distance between two vectors of equal length.
    ///
    /// For mismatched or empty inputs the built-in measures return `0.0`;
    /// the index boundary validates dimensionality so searches never hit
    /// that case.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;
}

/// Negated dot product, the default measure for cosine-like ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDistance;

impl DistanceMeasure for CosineDistance {
    #[inline]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        -math::dot(a, b)
    }
}

/// Euclidean (L2) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceMeasure for EuclideanDistance {
    #[inline]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        math::l2_distance(a, b)
    }
}
