//! End-to-end tests for the random-projection forest.
//!
//! Exercises the public API the way a caller would: build over a corpus,
//! query, insert, query again. Recall expectations mirror the workload
//! the index was designed around (normalized random vectors, negated-dot
//! ranking).

use arbor::{CosineDistance, DataPoint, DistanceMeasure, EuclideanDistance, IndexError, VectorIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn random_unit_vector(rng: &mut StdRng, dim: usize) -> Vec<f64> {
    let mut v: Vec<f64> = (0..dim).map(|_| rng.random::<f64>() - 0.5).collect();
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    for x in &mut v {
        *x /= norm;
    }
    v
}

fn random_corpus(n: usize, dim: usize, seed: u64) -> Vec<DataPoint<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|id| DataPoint::new(id, random_unit_vector(&mut rng, dim)))
        .collect()
}

// =============================================================================
// Recall
// =============================================================================

#[test]
fn recall_against_exact_top_200() {
    let dim = 20;
    let n = 10_000;
    let search_num = 200;

    let corpus = random_corpus(n, dim, 42);
    let mut index = VectorIndex::new(20, dim, 2, corpus.clone(), CosineDistance)
        .unwrap()
        .with_seed(42);
    index.build();

    let mut query = vec![0.0; dim];
    query[0] = 0.1;

    let mut exact: Vec<(usize, f64)> = corpus
        .iter()
        .map(|dp| (dp.id, CosineDistance.distance(&dp.embedding, &query)))
        .collect();
    exact.sort_by(|a, b| a.1.total_cmp(&b.1));
    let expected: HashSet<usize> = exact.iter().take(search_num).map(|(id, _)| *id).collect();

    let hits = index.search_by_vector(&query, search_num, 20.0).unwrap();
    assert_eq!(hits.len(), search_num);

    let found = hits.iter().filter(|h| expected.contains(&h.id)).count();
    let ratio = found as f64 / search_num as f64;
    assert!(
        ratio >= 0.90,
        "too few exact neighbors in approximate result: {found} / {search_num} = {ratio}"
    );
}

// =============================================================================
// Insert after build
// =============================================================================

#[test]
fn inserted_query_vector_becomes_top_hit() {
    let dim = 8;
    let corpus = random_corpus(200, dim, 7);
    let mut index = VectorIndex::new(4, dim, 4, corpus, CosineDistance)
        .unwrap()
        .with_seed(7);
    index.build();

    let mut rng = StdRng::seed_from_u64(1234);
    let query = random_unit_vector(&mut rng, dim);
    index
        .add_data_point(DataPoint::new(999, query.clone()))
        .unwrap();

    // Budget covers the whole corpus, so the search is exhaustive and the
    // freshly inserted duplicate of the query must rank first.
    let hits = index.search_by_vector(&query, 5, 50.0).unwrap();
    assert_eq!(hits.len(), 5);
    assert_eq!(hits[0].id, 999);
}

#[test]
fn inserts_stay_searchable_across_many_additions() {
    let dim = 5;
    let corpus = random_corpus(100, dim, 21);
    let mut index = VectorIndex::new(3, dim, 4, corpus, CosineDistance)
        .unwrap()
        .with_seed(21);
    index.build();

    let mut rng = StdRng::seed_from_u64(4321);
    let extra: Vec<DataPoint<usize>> = (0..10)
        .map(|i| DataPoint::new(1000 + i, random_unit_vector(&mut rng, dim)))
        .collect();
    for dp in &extra {
        index.add_data_point(dp.clone()).unwrap();
    }

    for dp in &extra {
        let hits = index.search_by_vector(&dp.embedding, 3, 40.0).unwrap();
        assert!(
            hits.iter().any(|h| h.id == dp.id),
            "inserted point {} not found near itself",
            dp.id
        );
    }
}

// =============================================================================
// Generic id types
// =============================================================================

#[test]
fn string_ids_search_like_integer_ids() {
    let dim = 10;
    let mut rng = StdRng::seed_from_u64(33);
    let corpus: Vec<DataPoint<String>> = (0..500)
        .map(|i| DataPoint::new(i.to_string(), random_unit_vector(&mut rng, dim)))
        .collect();

    let mut index = VectorIndex::new(5, dim, 4, corpus.clone(), CosineDistance)
        .unwrap()
        .with_seed(33);
    index.build();

    let query = corpus[17].embedding.clone();
    let hits = index.search_by_vector(&query, 10, 60.0).unwrap();
    assert_eq!(hits.len(), 10);
    assert!(hits.iter().any(|h| h.id == "17"));

    // Ranked ascending by the configured distance.
    for pair in hits.windows(2) {
        let d0 = CosineDistance.distance(&pair[0].embedding, &query);
        let d1 = CosineDistance.distance(&pair[1].embedding, &query);
        assert!(d0 <= d1);
    }
}

// =============================================================================
// Bucket saturation and degenerate corpora
// =============================================================================

#[test]
fn identical_points_saturate_the_bucket() {
    let corpus: Vec<DataPoint<usize>> = (0..10)
        .map(|id| DataPoint::new(id, vec![0.25, -0.5, 0.75]))
        .collect();
    let mut index = VectorIndex::new(2, 3, 2, corpus, EuclideanDistance)
        .unwrap()
        .with_seed(9);
    index.build();

    let hits = index.search_by_vector(&[0.0, 0.0, 0.0], 5, 1.0).unwrap();
    assert_eq!(hits.len(), 5);
    let first = hits[0].distance;
    assert!(hits.iter().all(|h| h.distance == first));
}

#[test]
fn k_larger_than_corpus_returns_everything() {
    let corpus = random_corpus(5, 4, 55);
    let mut index = VectorIndex::new(2, 4, 2, corpus, CosineDistance)
        .unwrap()
        .with_seed(55);
    index.build();

    let hits = index.search_by_vector(&[0.5, 0.5, 0.0, 0.0], 20, 10.0).unwrap();
    assert_eq!(hits.len(), 5);
}

#[test]
fn empty_index_searches_empty() {
    let mut index = VectorIndex::<usize, _>::new(3, 4, 2, Vec::new(), CosineDistance).unwrap();
    index.build();
    let hits = index.search_by_vector(&[0.0; 4], 5, 10.0).unwrap();
    assert!(hits.is_empty());
}

// =============================================================================
// Shape validation
// =============================================================================

#[test]
fn construction_with_wrong_dimensionality_fails() {
    let corpus = vec![
        DataPoint::new(0usize, vec![1.0, 2.0, 3.0]),
        DataPoint::new(1, vec![1.0, 2.0]),
    ];
    assert_eq!(
        VectorIndex::new(2, 3, 2, corpus, CosineDistance).unwrap_err(),
        IndexError::ShapeMismatch {
            expected: 3,
            actual: 2
        }
    );
}

#[test]
fn query_with_wrong_dimensionality_fails() {
    let mut index = VectorIndex::new(2, 2, 2, random_corpus(10, 2, 3), CosineDistance).unwrap();
    index.build();
    assert_eq!(
        index.search_by_vector(&[1.0, 2.0, 3.0], 2, 10.0).unwrap_err(),
        IndexError::ShapeMismatch {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn insert_with_wrong_dimensionality_fails_without_state_change() {
    let mut index = VectorIndex::new(2, 3, 2, random_corpus(10, 3, 13), CosineDistance)
        .unwrap()
        .with_seed(13);
    index.build();

    let err = index
        .add_data_point(DataPoint::new(100, vec![1.0, 2.0]))
        .unwrap_err();
    assert_eq!(
        err,
        IndexError::ShapeMismatch {
            expected: 3,
            actual: 2
        }
    );
    assert_eq!(index.num_points(), 10);
}
