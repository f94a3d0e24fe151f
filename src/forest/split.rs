//! Two-means hyperplane estimation.
//!
//! Produces the normal of a hyperplane separating a point set into two
//! clusters, approximating the direction between two cluster centroids.
//! The clustering is stochastic: centroids start as two distinct random
//! members and are refined from small random samples, so repeated calls
//! give different (equally valid) hyperplanes unless the caller seeds the
//! RNG.

use rand::rngs::StdRng;
use rand::Rng;

use crate::distance::DistanceMeasure;
use crate::forest::DataPoint;

const MAX_ITERATIONS: usize = 200;
const MAX_SAMPLES: usize = 100;
const BALANCE_THRESHOLD: f64 = 0.7;
const CENTROID_SAMPLE_RATIO: f64 = 0.0001;

/// Estimate a separating hyperplane normal for `points`.
///
/// Fewer than two points cannot seed two centroids; the zero normal is
/// returned instead, which routes every point to the right child and lets
/// the degenerate-split guard turn the node into a leaf.
pub(crate) fn estimate_normal<K, M: DistanceMeasure>(
    points: &[&DataPoint<K>],
    dimensions: usize,
    measure: &M,
    rng: &mut StdRng,
) -> Vec<f64> {
    let n = points.len();
    if n < 2 {
        return vec![0.0; dimensions];
    }

    let (mut c0, mut c1) = random_centroids(points, rng);

    for _ in 0..MAX_ITERATIONS {
        let samples = MAX_SAMPLES.min(n);
        let mut cluster0: Vec<&[f64]> = Vec::new();
        let mut cluster1: Vec<&[f64]> = Vec::new();

        // Assignment rule: a sample joins cluster 0 when its distance to
        // c0 exceeds its distance to c1. Under the negated-dot measure
        // this reads as "more similar to c0"; the rule is kept as-is for
        // every measure so different measures produce comparable forests.
        for _ in 0..samples {
            let v = points[rng.random_range(0..n)].embedding.as_slice();
            if measure.distance(&c0, v) > measure.distance(&c1, v) {
                cluster0.push(v);
            } else {
                cluster1.push(v);
            }
        }

        let ratio0 = cluster0.len() as f64 / samples as f64;
        let ratio1 = cluster1.len() as f64 / samples as f64;
        if ratio0 <= BALANCE_THRESHOLD && ratio1 <= BALANCE_THRESHOLD {
            break;
        }

        if cluster0.is_empty() || cluster1.is_empty() {
            let (a, b) = random_centroids(points, rng);
            c0 = a;
            c1 = b;
            continue;
        }

        // Partial stochastic averages: only ~|S|/10000 draws per centroid.
        // Zero draws leaves the zero vector, matching the published
        // behavior for small point sets.
        let draws = (n as f64 * CENTROID_SAMPLE_RATIO) as usize;
        c0 = partial_average(&cluster0, dimensions, draws, rng);
        c1 = partial_average(&cluster1, dimensions, draws + 1, rng);
    }

    c0.iter().zip(c1.iter()).map(|(a, b)| a - b).collect()
}

/// Pick two distinct members of `points` as initial centroids.
fn random_centroids<K>(points: &[&DataPoint<K>], rng: &mut StdRng) -> (Vec<f64>, Vec<f64>) {
    let n = points.len();
    let k = rng.random_range(0..n);
    let mut l = rng.random_range(0..n - 1);
    if l == k {
        l += 1;
    }
    (points[k].embedding.clone(), points[l].embedding.clone())
}

/// Average `draws` uniform draws (with replacement) from `members`.
fn partial_average(
    members: &[&[f64]],
    dimensions: usize,
    draws: usize,
    rng: &mut StdRng,
) -> Vec<f64> {
    let mut centroid = vec![0.0; dimensions];
    for _ in 0..draws {
        let v = members[rng.random_range(0..members.len())];
        for (c, x) in centroid.iter_mut().zip(v.iter()) {
            *c += x / draws as f64;
        }
    }
    centroid
}
