//! Search frontier for best-first multi-tree traversal.

use super::node::NodeId;

/// Entry in the search frontier.
///
/// The priority is the worst-case aligned margin accumulated along the
/// path into the subtree; larger margins mean the subtree more likely
/// lies on the query's side of every hyperplane crossed so far. Duplicate
/// node ids may appear transiently across different paths; re-processing
/// one is harmless because the candidate set deduplicates.
#[derive(Clone, PartialEq)]
pub(crate) struct QueueItem {
    pub(crate) node: NodeId,
    pub(crate) priority: f64,
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap: larger margin = more promising subtree.
        // total_cmp gives IEEE 754 total ordering (-inf and NaN safe).
        self.priority.total_cmp(&other.priority)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
