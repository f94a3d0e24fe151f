//! Portable vector operations.
//!
//! The tree geometry (hyperplane side tests, frontier priorities) is always
//! defined in terms of the plain dot product, independent of whichever
//! [`DistanceMeasure`](crate::distance::DistanceMeasure) ranks the final
//! candidates.

/// Dot product of two vectors.
///
/// Iterates over the shorter of the two inputs; the index boundary
/// guarantees equal lengths for every internal caller.
#[inline]
#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm of a vector.
#[inline]
#[must_use]
pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// L2 (Euclidean) distance between two vectors.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    l2_distance_squared(a, b).sqrt()
}

/// L2 distance squared (faster when only comparing distances).
#[inline]
#[must_use]
pub fn l2_distance_squared(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
