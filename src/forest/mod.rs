//! Random-projection forest index.
//!
//! A forest of binary trees over one shared set of data points. Each tree
//! recursively halves the space with hyperplanes estimated by randomized
//! two-means clustering; each leaf holds the ids of the points that fell
//! into its subspace. Queries run a single best-first frontier across all
//! roots, expanding whichever queued subtree has the largest aligned
//! margin, then rank the gathered leaf candidates by the configured
//! distance measure.
//!
//! # Algorithm
//!
//! - **Build**: one task per root. A node with more than `max_leaf_items`
//!   points splits them by the sign of `dot(normal, embedding)`; a split
//!   that leaves either side under the leaf capacity is abandoned and the
//!   node becomes a leaf (this guard is what terminates recursion on
//!   pathological data).
//! - **Insert**: walk each tree to the matching leaf and append; a leaf
//!   pushed past capacity is rebuilt in place, reusing its stored normal,
//!   which may split it further.
//! - **Query**: a max-heap seeded with every root at `-inf`. Internal
//!   nodes push both children, carrying `max(parent priority, ±margin)`
//!   so the priority stays the worst-case margin along the path. Leaves
//!   pour their ids into a dedupe set until `k * bucket_scale` distinct
//!   candidates are gathered, then exact distances decide the top k.
//!
//! # References
//!
//! - Bernhardsson's annoy (random projection forests for ANN)
//! - Dasgupta & Freund (2008): "Random projection trees and low
//!   dimensional manifolds"

mod node;
mod search;
mod split;

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::distance::{CosineDistance, DistanceMeasure};
use crate::error::{IndexError, Result};
use crate::math;
use node::{NodeId, SharedNode, TreeNode};
use search::QueueItem;

/// Default candidate-pool multiplier for [`VectorIndex::search_by_vector`].
pub const DEFAULT_BUCKET_SCALE: f64 = 10.0;

/// Fewer points than this and there is nothing to cluster; `build` leaves
/// the forest empty and searches return no candidates.
const MIN_BUILD_POINTS: usize = 2;

/// A vector with its caller-assigned identifier.
///
/// Immutable once handed to the index. The id type is generic; integer
/// and string keys are both exercised by the test suite.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint<K> {
    pub id: K,
    pub embedding: Vec<f64>,
}

impl<K> DataPoint<K> {
    pub fn new(id: K, embedding: Vec<f64>) -> Self {
        Self { id, embedding }
    }
}

/// A single k-NN hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<K> {
    pub id: K,
    /// Absolute value of the configured distance to the query. The
    /// absolute value normalizes measures that are negative by
    /// convention, like the negated dot product.
    pub distance: f64,
    pub embedding: Vec<f64>,
}

/// Approximate nearest-neighbor index: a forest of random-projection
/// trees sharing one point set and one distance measure.
///
/// `K` is the data-point id type; `M` ranks candidates and steers the
/// two-means estimator, while tree geometry always uses the plain dot
/// product.
#[derive(Debug)]
pub struct VectorIndex<K, M = CosineDistance> {
    num_roots: usize,
    dimensions: usize,
    max_leaf_items: usize,
    points: Vec<DataPoint<K>>,
    by_id: HashMap<K, usize>,
    roots: Vec<SharedNode<K>>,
    /// Node-id lookup table for the search frontier. Not an ownership
    /// edge; parents own their children.
    nodes: RwLock<HashMap<NodeId, SharedNode<K>>>,
    measure: M,
    seed: u64,
    next_node_id: AtomicU64,
    insert_epoch: AtomicU64,
}

impl<K, M> VectorIndex<K, M>
where
    K: Clone + Eq + Hash + Send + Sync,
    M: DistanceMeasure,
{
    /// Create an index over `points`.
    ///
    /// Every embedding must have exactly `dimensions` components; the
    /// first offender fails the whole construction with
    /// [`IndexError::ShapeMismatch`] and no index is produced. An empty
    /// point set is accepted; [`build`](Self::build) is then a no-op.
    pub fn new(
        num_roots: usize,
        dimensions: usize,
        max_leaf_items: usize,
        points: Vec<DataPoint<K>>,
        measure: M,
    ) -> Result<Self> {
        if num_roots == 0 || dimensions == 0 || max_leaf_items == 0 {
            return Err(IndexError::InvalidParameter(
                "num_roots, dimensions, and max_items_per_leaf must all be at least 1".to_string(),
            ));
        }
        for dp in &points {
            if dp.embedding.len() != dimensions {
                return Err(IndexError::ShapeMismatch {
                    expected: dimensions,
                    actual: dp.embedding.len(),
                });
            }
        }

        let by_id = points
            .iter()
            .enumerate()
            .map(|(slot, dp)| (dp.id.clone(), slot))
            .collect();

        Ok(Self {
            num_roots,
            dimensions,
            max_leaf_items,
            points,
            by_id,
            roots: Vec::new(),
            nodes: RwLock::new(HashMap::new()),
            measure,
            seed: rand::rng().random(),
            next_node_id: AtomicU64::new(0),
            insert_epoch: AtomicU64::new(0),
        })
    }

    /// Configure a deterministic seed for the forest's randomness.
    ///
    /// When set, `build` (and subsequent inserts) produce identical
    /// forests on identical inputs, independent of thread scheduling:
    /// every parallel task derives its own RNG stream from this seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Declared dimensionality of the index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of trees in the forest.
    pub fn num_roots(&self) -> usize {
        self.num_roots
    }

    /// Number of data points currently owned by the index.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Build the forest, replacing any previous one.
    ///
    /// Roots get their normals estimated over the entire point set, one
    /// after another from the seed RNG; the recursive partition of each
    /// root then runs in parallel, one task per root.
    pub fn build(&mut self) {
        self.roots.clear();
        self.nodes.write().clear();
        if self.points.len() < MIN_BUILD_POINTS {
            return;
        }

        let all: Vec<&DataPoint<K>> = self.points.iter().collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.roots = (0..self.num_roots)
            .map(|_| {
                self.alloc_node(split::estimate_normal(
                    &all,
                    self.dimensions,
                    &self.measure,
                    &mut rng,
                ))
            })
            .collect();

        self.roots.par_iter().enumerate().for_each(|(i, root)| {
            let mut rng = StdRng::seed_from_u64(task_seed(self.seed, 1, i as u64));
            let points: Vec<&DataPoint<K>> = self.points.iter().collect();
            self.build_node(root, &points, &mut rng);
        });
    }

    /// Insert one data point into every tree of a built forest.
    ///
    /// Not transactional across roots: the fan-out assumes its tasks run
    /// to completion, and a panicking task leaves the point present in
    /// only a subset of trees.
    pub fn add_data_point(&mut self, point: DataPoint<K>) -> Result<()> {
        if point.embedding.len() != self.dimensions {
            return Err(IndexError::ShapeMismatch {
                expected: self.dimensions,
                actual: point.embedding.len(),
            });
        }

        let slot = self.points.len();
        self.by_id.insert(point.id.clone(), slot);
        self.points.push(point);

        let epoch = self.insert_epoch.fetch_add(1, Ordering::Relaxed);
        let added = &self.points[slot];
        self.roots.par_iter().enumerate().for_each(|(i, root)| {
            let mut rng = StdRng::seed_from_u64(task_seed(self.seed, 2 + epoch, i as u64));
            self.insert_into_tree(root, added, &mut rng);
        });

        Ok(())
    }

    /// Return up to `k` points near `query`, ranked by the configured
    /// distance measure (ascending).
    ///
    /// `bucket_scale >= 1` widens the candidate pool: the frontier keeps
    /// expanding subtrees until `k * bucket_scale` distinct candidates
    /// are gathered or the forest is exhausted. Larger values trade
    /// latency for recall.
    pub fn search_by_vector(
        &self,
        query: &[f64],
        k: usize,
        bucket_scale: f64,
    ) -> Result<Vec<SearchResult<K>>> {
        if query.len() != self.dimensions {
            return Err(IndexError::ShapeMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let budget = (k as f64 * bucket_scale) as usize;
        let mut frontier: BinaryHeap<QueueItem> = self
            .roots
            .iter()
            .map(|root| QueueItem {
                node: root.read().id,
                priority: f64::NEG_INFINITY,
            })
            .collect();
        let mut candidates: HashSet<K> = HashSet::new();

        while candidates.len() < budget {
            let item = match frontier.pop() {
                Some(item) => item,
                None => break,
            };
            let node = self
                .nodes
                .read()
                .get(&item.node)
                .cloned()
                .ok_or(IndexError::InvalidIndex)?;

            let n = node.read();
            match (&n.left, &n.right) {
                (Some(left), Some(right)) => {
                    let margin = math::dot(&n.normal, query);
                    frontier.push(QueueItem {
                        node: left.read().id,
                        priority: item.priority.max(margin),
                    });
                    frontier.push(QueueItem {
                        node: right.read().id,
                        priority: item.priority.max(-margin),
                    });
                }
                _ => {
                    for id in &n.items {
                        candidates.insert(id.clone());
                    }
                }
            }
        }

        let mut ranked: Vec<(K, f64)> = candidates
            .into_iter()
            .map(|id| {
                let dist = self
                    .measure
                    .distance(&self.points[self.by_id[&id]].embedding, query);
                (id, dist)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(id, dist)| SearchResult {
                embedding: self.points[self.by_id[&id]].embedding.clone(),
                id,
                distance: dist.abs(),
            })
            .collect())
    }

    /// Mint a node, register it in the lookup table, hand back the owning
    /// handle. The table's write lock covers only the O(1) insertion.
    fn alloc_node(&self, normal: Vec<f64>) -> SharedNode<K> {
        let id = NodeId(self.next_node_id.fetch_add(1, Ordering::Relaxed));
        let node = Arc::new(RwLock::new(TreeNode::new(id, normal)));
        self.nodes.write().insert(id, Arc::clone(&node));
        node
    }

    /// Recursively populate `node` from `points`: small sets become
    /// leaves, larger ones split.
    fn build_node(&self, node: &SharedNode<K>, points: &[&DataPoint<K>], rng: &mut StdRng) {
        if points.len() <= self.max_leaf_items {
            node.write().items = points.iter().map(|dp| dp.id.clone()).collect();
            return;
        }
        self.split_node(node, points, rng);
    }

    fn split_node(&self, node: &SharedNode<K>, points: &[&DataPoint<K>], rng: &mut StdRng) {
        let normal = node.read().normal.clone();
        let (left_points, right_points): (Vec<&DataPoint<K>>, Vec<&DataPoint<K>>) = points
            .iter()
            .copied()
            .partition(|dp| math::dot(&normal, &dp.embedding) < 0.0);

        // Degenerate split: an undersized bucket would recurse forever on
        // points that keep falling on the same side, so the whole set
        // stays here as a leaf.
        if left_points.len() < self.max_leaf_items || right_points.len() < self.max_leaf_items {
            node.write().items = points.iter().map(|dp| dp.id.clone()).collect();
            return;
        }

        let left = self.alloc_node(split::estimate_normal(
            &left_points,
            self.dimensions,
            &self.measure,
            rng,
        ));
        self.build_node(&left, &left_points, rng);

        let right = self.alloc_node(split::estimate_normal(
            &right_points,
            self.dimensions,
            &self.measure,
            rng,
        ));
        self.build_node(&right, &right_points, rng);

        let mut n = node.write();
        n.items.clear();
        n.left = Some(left);
        n.right = Some(right);
    }

    /// Walk one tree to the leaf matching `point`, append its id, and
    /// rebuild the leaf in place if it overflowed.
    fn insert_into_tree(&self, root: &SharedNode<K>, point: &DataPoint<K>, rng: &mut StdRng) {
        let mut current = Arc::clone(root);
        loop {
            let next = {
                let n = current.read();
                match (&n.left, &n.right) {
                    (Some(left), Some(right)) => {
                        if math::dot(&n.normal, &point.embedding) < 0.0 {
                            Arc::clone(left)
                        } else {
                            Arc::clone(right)
                        }
                    }
                    _ => break,
                }
            };
            current = next;
        }

        let spilled = {
            let mut leaf = current.write();
            leaf.items.push(point.id.clone());
            if leaf.items.len() <= self.max_leaf_items {
                return;
            }
            std::mem::take(&mut leaf.items)
        };

        // Overflow: rebuild this node from its members. The stored normal
        // drives the first split, so the leaf may turn internal or, under
        // the degenerate guard, stay an oversized leaf.
        let members: Vec<&DataPoint<K>> = spilled
            .iter()
            .map(|id| &self.points[self.by_id[id]])
            .collect();
        self.build_node(&current, &members, rng);
    }
}

/// Derive an independent RNG stream for one parallel task.
fn task_seed(base: u64, stream: u64, index: u64) -> u64 {
    base ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ index.wrapping_mul(0xA24B_AED4_963E_E407)
}
