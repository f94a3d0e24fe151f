//! Tree nodes and shared node handles.

use parking_lot::RwLock;
use std::sync::Arc;

/// Process-unique identifier for a tree node, minted from a monotonic
/// counter on the owning index. The search frontier queues these instead
/// of node references and resolves them through the index's lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) u64);

/// Shared handle to a tree node.
///
/// Parent-to-child edges own their `Arc`s and form a tree; the index's
/// lookup table holds one extra handle per node so the frontier can
/// resolve queued ids. Leaves mutate after build (incremental inserts), so
/// every handle carries its own lock.
pub(crate) type SharedNode<K> = Arc<RwLock<TreeNode<K>>>;

/// A binary node of one random-projection tree.
///
/// The normal vector defines the hyperplane splitting this node's subspace
/// into the left (negative side) and right (non-negative side) children. A
/// node is a leaf exactly when both children are absent; leaves carry the
/// ids of the data points that fell into their subspace. The normal
/// estimated when the node was created is kept on leaves too: if a leaf
/// overflows during insertion, that stored normal drives the first split.
#[derive(Debug)]
pub(crate) struct TreeNode<K> {
    pub(crate) id: NodeId,
    pub(crate) normal: Vec<f64>,
    pub(crate) left: Option<SharedNode<K>>,
    pub(crate) right: Option<SharedNode<K>>,
    pub(crate) items: Vec<K>,
}

impl<K> TreeNode<K> {
    pub(crate) fn new(id: NodeId, normal: Vec<f64>) -> Self {
        Self {
            id,
            normal,
            left: None,
            right: None,
            items: Vec::new(),
        }
    }
}
