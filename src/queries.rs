//! Query implementations for [`KdTree`]: nearest neighbor, bounded k-nearest
//! with branch-and-bound pruning, distance-bounded search and batch
//! reordering for cache locality.
//!
//! All queries are synchronous, CPU-bound and read-only; a built tree can be
//! queried from many threads at once as long as each thread owns its
//! [`QueryPolicy`].

use crate::error::Error;
use crate::point::{PointId, distance_sq};
use crate::policy::QueryPolicy;
use crate::tree::{KdTree, Node, NodeId};

/// A query result: the slot of a stored point and its squared Euclidean
/// distance to the query position.
///
/// Pass `slot` to [`KdTree::point`] to recover the position and payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Stable storage slot of the matched point.
    pub slot: PointId,
    /// Squared distance to the query position, always `>= 0`.
    pub dist_sq: f64,
}

impl<const D: usize, const P: usize> KdTree<D, P> {
    /// Finds the single nearest stored point to `query`.
    ///
    /// Returns `None` only for an empty tree. Among points at exactly equal
    /// distance the winner is the first one encountered in traversal order,
    /// which is deterministic for a fixed tree.
    ///
    /// # Examples
    /// ```
    /// use kdindex::prelude::*;
    ///
    /// let points = [Point::new([0.0, 0.0], []), Point::new([3.0, 4.0], [])];
    /// let tree = KdTree::build(&points, &BuildPolicy::default()).unwrap();
    ///
    /// let hit = tree.nearest(&[3.0, 3.0]).unwrap();
    /// assert_eq!(tree.point(hit.slot).position, [3.0, 4.0]);
    /// assert_eq!(hit.dist_sq, 1.0);
    ///
    /// assert!(KdTree::<2, 0>::new().nearest(&[0.0, 0.0]).is_none());
    /// ```
    pub fn nearest(&self, query: &[f64; D]) -> Option<Neighbor> {
        let root = self.root()?;
        let mut best = Neighbor {
            slot: 0,
            dist_sq: f64::INFINITY,
        };
        self.nearest_node(root, query, &mut best);
        Some(best)
    }

    /// Finds the `k` nearest stored points to `query`, using `policy` as
    /// reusable scratch storage.
    ///
    /// The returned slice borrows the policy's storage and is valid until the
    /// policy's next use. Results are unsorted unless the policy requests
    /// [`sort_by_distance`](QueryPolicy::sort_by_distance). `k = 0` returns
    /// an empty slice without traversing; `k >= len()` returns all points;
    /// an empty tree returns an empty slice.
    ///
    /// # Errors
    /// [`Error::PolicyTooSmall`] if the policy is pinned to fewer than `k`
    /// neighbors; detected before any traversal.
    ///
    /// # Examples
    /// ```
    /// use kdindex::prelude::*;
    ///
    /// let points = [
    ///     Point::new([0.0, 0.0], []),
    ///     Point::new([10.0, 0.0], []),
    ///     Point::new([0.0, 10.0], []),
    ///     Point::new([10.0, 10.0], []),
    /// ];
    /// let tree = KdTree::build(&points, &BuildPolicy::default()).unwrap();
    ///
    /// let mut policy = QueryPolicy::new().sort_by_distance(true);
    /// let neighbors = tree.nearest_k(&[1.0, 1.0], 2, &mut policy).unwrap();
    /// assert_eq!(neighbors.len(), 2);
    /// assert_eq!(neighbors[0].dist_sq, 2.0);
    /// assert_eq!(neighbors[1].dist_sq, 82.0);
    /// ```
    pub fn nearest_k<'p>(
        &self,
        query: &[f64; D],
        k: usize,
        policy: &'p mut QueryPolicy,
    ) -> Result<&'p [Neighbor], Error> {
        if let Some(capacity) = policy.pinned {
            if k > capacity {
                return Err(Error::PolicyTooSmall {
                    capacity,
                    requested: k,
                });
            }
        }
        policy.heap.clear();
        if k == 0 {
            return Ok(&policy.heap);
        }
        let Some(root) = self.root() else {
            return Ok(&policy.heap);
        };
        self.nearest_k_node(root, query, k, &mut policy.heap);
        if policy.sort {
            policy.heap.sort_by(|a, b| a.dist_sq.total_cmp(&b.dist_sq));
        }
        Ok(&policy.heap)
    }

    /// Collects all stored points within squared distance `radius_sq` of
    /// `query` into `results` (cleared first), unsorted.
    ///
    /// A negative or non-finite radius yields no results, as does an empty
    /// tree.
    pub fn within(&self, query: &[f64; D], radius_sq: f64, results: &mut Vec<Neighbor>) {
        results.clear();
        if radius_sq < 0.0 || !radius_sq.is_finite() {
            return;
        }
        let Some(root) = self.root() else {
            return;
        };
        self.within_node(root, query, radius_sq, results);
    }

    /// Computes a cache-friendly processing order for a batch of queries.
    ///
    /// Returns one `(original_index, order_key)` pair per query; the key is
    /// the arena id of the leaf the query position descends to, so sorting
    /// the batch by `(order_key, original_index)` groups queries that land in
    /// the same region of the tree. Purely a performance hint: processing
    /// order never changes any query's result.
    ///
    /// A pure function of the tree and the positions; the tree is not
    /// touched. Against an empty tree every key is 0.
    ///
    /// # Examples
    /// ```
    /// use kdindex::prelude::*;
    ///
    /// let points: Vec<Point<2, 0>> =
    ///     (0..100).map(|i| Point::new([f64::from(i), 0.0], [])).collect();
    /// let policy = BuildPolicy { bucket_size: 4, ..BuildPolicy::default() };
    /// let tree = KdTree::build(&points, &policy).unwrap();
    ///
    /// let queries = [[90.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
    /// let mut order = tree.order_for_locality(&queries);
    /// order.sort_by_key(|&(index, key)| (key, index));
    ///
    /// // The two queries near x = 1..2 end up adjacent.
    /// let ranks: Vec<usize> = order.iter().map(|&(index, _)| index).collect();
    /// assert_eq!(ranks, vec![1, 2, 0]);
    /// ```
    pub fn order_for_locality(&self, queries: &[[f64; D]]) -> Vec<(usize, u32)> {
        queries
            .iter()
            .enumerate()
            .map(|(index, query)| (index, self.leaf_for(query)))
            .collect()
    }

    /// Arena id of the leaf `query` descends to (no backtracking).
    fn leaf_for(&self, query: &[f64; D]) -> NodeId {
        let Some(mut id) = self.root() else {
            return 0;
        };
        loop {
            match self.nodes[id as usize] {
                Node::Leaf { .. } => return id,
                Node::Split {
                    dim,
                    value,
                    left,
                    right,
                } => {
                    id = if query[dim as usize] <= value {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn nearest_node(&self, id: NodeId, query: &[f64; D], best: &mut Neighbor) {
        match self.nodes[id as usize] {
            Node::Leaf { start, end } => {
                for slot in start..end {
                    let dist_sq = distance_sq(query, &self.points[slot as usize].position);
                    if dist_sq < best.dist_sq {
                        *best = Neighbor { slot, dist_sq };
                    }
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = query[dim as usize] - value;
                let (near, far) = if diff <= 0.0 { (left, right) } else { (right, left) };
                self.nearest_node(near, query, best);
                // A subtree whose splitting hyperplane is already farther
                // than the current best cannot hold a closer point.
                if diff * diff < best.dist_sq {
                    self.nearest_node(far, query, best);
                }
            }
        }
    }

    fn nearest_k_node(&self, id: NodeId, query: &[f64; D], k: usize, heap: &mut Vec<Neighbor>) {
        match self.nodes[id as usize] {
            Node::Leaf { start, end } => {
                for slot in start..end {
                    let dist_sq = distance_sq(query, &self.points[slot as usize].position);
                    heap_offer(heap, k, Neighbor { slot, dist_sq });
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = query[dim as usize] - value;
                let (near, far) = if diff <= 0.0 { (left, right) } else { (right, left) };
                self.nearest_k_node(near, query, k, heap);
                // Prune against the k-th best distance found so far, or
                // against infinity while fewer than k candidates exist.
                let bound = if heap.len() == k {
                    heap[0].dist_sq
                } else {
                    f64::INFINITY
                };
                if diff * diff < bound {
                    self.nearest_k_node(far, query, k, heap);
                }
            }
        }
    }

    fn within_node(
        &self,
        id: NodeId,
        query: &[f64; D],
        radius_sq: f64,
        results: &mut Vec<Neighbor>,
    ) {
        match self.nodes[id as usize] {
            Node::Leaf { start, end } => {
                for slot in start..end {
                    let dist_sq = distance_sq(query, &self.points[slot as usize].position);
                    if dist_sq <= radius_sq {
                        results.push(Neighbor { slot, dist_sq });
                    }
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = query[dim as usize] - value;
                let (near, far) = if diff <= 0.0 { (left, right) } else { (right, left) };
                self.within_node(near, query, radius_sq, results);
                if diff * diff <= radius_sq {
                    self.within_node(far, query, radius_sq, results);
                }
            }
        }
    }
}

/// Offers a candidate to a bounded max-heap of at most `k` entries, worst
/// candidate at the root.
fn heap_offer(heap: &mut Vec<Neighbor>, k: usize, candidate: Neighbor) {
    if heap.len() < k {
        heap.push(candidate);
        sift_up(heap);
    } else if candidate.dist_sq < heap[0].dist_sq {
        heap[0] = candidate;
        sift_down(heap);
    }
}

/// Restores the heap property after a push at the last position.
fn sift_up(heap: &mut [Neighbor]) {
    let mut i = heap.len() - 1;
    while i > 0 {
        let parent = (i - 1) / 2;
        if heap[i].dist_sq <= heap[parent].dist_sq {
            break;
        }
        heap.swap(i, parent);
        i = parent;
    }
}

/// Restores the heap property after replacing the root.
fn sift_down(heap: &mut [Neighbor]) {
    let len = heap.len();
    let mut i = 0;
    loop {
        let left = 2 * i + 1;
        let right = left + 1;
        let mut largest = i;
        if left < len && heap[left].dist_sq > heap[largest].dist_sq {
            largest = left;
        }
        if right < len && heap[right].dist_sq > heap[largest].dist_sq {
            largest = right;
        }
        if largest == i {
            break;
        }
        heap.swap(i, largest);
        i = largest;
    }
}
