//! Static k-d tree: point store, node arena and the median-split partitioner.
//!
//! The tree is bulk-built once and immutable afterwards. Nodes live in a
//! single flat arena and reference each other only by index, never by
//! pointer. Points are copied into an owned contiguous store and permuted in
//! place during partitioning; a point's final slot is its stable identifier.

use rand::{Rng, RngCore};

use crate::error::Error;
use crate::point::{Point, PointId};
use crate::policy::{BuildPolicy, PivotRule, SplitRule};

/// Index of a node in the tree's arena.
pub type NodeId = u32;

/// A node of the tree, stored in a flat arena and addressed by [`NodeId`].
///
/// The root of a non-empty tree is always node 0; children are emitted in
/// depth-first order (left subtree before right), so nearby leaves get
/// nearby arena ids.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Node {
    /// Internal split: points with `position[dim] <= value` are in the left
    /// subtree, points with `position[dim] >= value` in the right. Points
    /// equal to the split value may appear on either side.
    Split {
        /// Split dimension, `0 <= dim < D`.
        dim: u32,
        /// Split coordinate value.
        value: f64,
        /// Arena id of the left child.
        left: NodeId,
        /// Arena id of the right child.
        right: NodeId,
    },
    /// Leaf: a half-open slot range `[start, end)` into the point store,
    /// holding at least 1 and at most `bucket_size` points.
    Leaf {
        /// First slot of the range.
        start: PointId,
        /// One past the last slot of the range.
        end: PointId,
    },
}

/// Sentinel parent id for the root range during construction.
const NO_PARENT: u32 = u32::MAX;

/// A pending range of slots to partition, kept on an explicit work stack so
/// degenerate inputs (e.g. all-equal coordinates with bucket size 1) cannot
/// overflow the call stack.
struct PendingRange {
    lo: u32,
    hi: u32,
    parent: u32,
    left_child: bool,
    depth: u32,
}

/// A static, bulk-built k-d tree over `D`-dimensional points, each carrying
/// an opaque `P`-byte payload.
///
/// Build once with [`KdTree::build`] (or rebuild in place with
/// [`KdTree::construct`]), then issue any number of read-only queries.
/// The tree is plain data: once built it is `Send + Sync` and safe for
/// concurrent queries from many threads, as long as each thread uses its own
/// [`QueryPolicy`](crate::QueryPolicy). Rebuilding takes `&mut self`, so the
/// borrow checker rules out rebuilds racing in-flight queries.
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
/// let nearest = tree.nearest(&[1.0, 1.0]).unwrap();
/// assert_eq!(tree.point(nearest.slot).position, [0.0, 0.0]);
/// assert_eq!(nearest.dist_sq, 2.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct KdTree<const D: usize, const P: usize> {
    /// Owned point store, permuted in place during construction.
    pub(crate) points: Vec<Point<D, P>>,
    /// Node arena; node 0 is the root of a non-empty tree.
    pub(crate) nodes: Vec<Node>,
}

impl<const D: usize, const P: usize> KdTree<D, P> {
    /// Creates an empty tree. Use [`construct`](KdTree::construct) to fill
    /// it; an empty tree answers every query with "no result".
    pub fn new() -> Self {
        KdTree {
            points: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Creates an empty tree with point storage preallocated for `capacity`
    /// points.
    pub fn with_capacity(capacity: usize) -> Self {
        KdTree {
            points: Vec::with_capacity(capacity),
            nodes: Vec::new(),
        }
    }

    /// Builds a tree from a slice of points.
    ///
    /// The points are copied into an owned store and partitioned according
    /// to `policy`. An empty slice yields a valid empty tree. Construction is
    /// deterministic for a fixed policy and input order; a policy using
    /// [`PivotRule::Sampled`](crate::PivotRule::Sampled) must go through
    /// [`build_with_rng`](KdTree::build_with_rng) instead.
    ///
    /// # Errors
    /// [`Error::InvalidPolicy`] for a malformed policy,
    /// [`Error::TooManyPoints`] for more than `u32::MAX` points.
    pub fn build(points: &[Point<D, P>], policy: &BuildPolicy) -> Result<Self, Error> {
        let mut tree = KdTree::new();
        tree.construct_impl(points, policy, None)?;
        Ok(tree)
    }

    /// Builds a tree using `rng` as the random source for sampled pivot
    /// selection. A fixed-seed rng makes construction reproducible.
    ///
    /// # Errors
    /// Same as [`build`](KdTree::build).
    pub fn build_with_rng<R: RngCore>(
        points: &[Point<D, P>],
        policy: &BuildPolicy,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let mut tree = KdTree::new();
        tree.construct_impl(points, policy, Some(rng as &mut dyn RngCore))?;
        Ok(tree)
    }

    /// Rebuilds this tree in place from a new point set, reusing the point
    /// and node allocations of the previous build.
    ///
    /// Prior contents are fully discarded: slot ids and query results from
    /// before the rebuild are invalid afterwards. Requires exclusive access,
    /// so no query can observe a half-built tree.
    ///
    /// # Errors
    /// Same as [`build`](KdTree::build); on error the tree is left unchanged.
    pub fn construct(
        &mut self,
        points: &[Point<D, P>],
        policy: &BuildPolicy,
    ) -> Result<(), Error> {
        self.construct_impl(points, policy, None)
    }

    /// In-place rebuild with a caller-supplied random source, for policies
    /// using sampled pivot selection.
    ///
    /// # Errors
    /// Same as [`build`](KdTree::build); on error the tree is left unchanged.
    pub fn construct_with_rng<R: RngCore>(
        &mut self,
        points: &[Point<D, P>],
        policy: &BuildPolicy,
        rng: &mut R,
    ) -> Result<(), Error> {
        self.construct_impl(points, policy, Some(rng as &mut dyn RngCore))
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of nodes in the arena (splits plus leaves).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Arena id of the root node, or `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() { None } else { Some(0) }
    }

    /// Read-only access to a node by arena id.
    ///
    /// # Panics
    /// Panics if `id` is out of range; ids obtained from this tree since its
    /// last rebuild are always in range.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// The stored point occupying `slot`, with its position and payload.
    ///
    /// # Panics
    /// Panics if `slot` is out of range; slots reported by queries against
    /// this tree since its last rebuild are always in range.
    pub fn point(&self, slot: PointId) -> &Point<D, P> {
        &self.points[slot as usize]
    }

    /// All stored points in slot order.
    pub fn points(&self) -> &[Point<D, P>] {
        &self.points
    }

    /// Maximum node depth of the tree (0 for an empty tree, 1 for a single
    /// leaf). Diagnostic only; a healthy tree is within O(log N) of balanced.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };
        let mut max_depth = 0;
        let mut stack = vec![(root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = self.nodes[id as usize] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    fn construct_impl(
        &mut self,
        source: &[Point<D, P>],
        policy: &BuildPolicy,
        mut rng: Option<&mut dyn RngCore>,
    ) -> Result<(), Error> {
        // All argument checks happen before any mutation.
        policy.validate()?;
        if D == 0 {
            return Err(Error::InvalidPolicy {
                reason: "dimension must be at least 1",
            });
        }
        if matches!(policy.pivot_rule, PivotRule::Sampled { .. }) && rng.is_none() {
            return Err(Error::InvalidPolicy {
                reason: "sampled pivot selection requires a random source, use build_with_rng",
            });
        }
        if source.len() > u32::MAX as usize {
            return Err(Error::TooManyPoints { len: source.len() });
        }

        self.points.clear();
        self.points.extend_from_slice(source);
        self.nodes.clear();
        if self.points.is_empty() {
            return Ok(());
        }

        let mut stack = vec![PendingRange {
            lo: 0,
            hi: self.points.len() as u32,
            parent: NO_PARENT,
            left_child: false,
            depth: 0,
        }];

        // Right child is pushed before left, so nodes come out in
        // depth-first preorder and the root lands at arena id 0.
        while let Some(range) = stack.pop() {
            let id = self.nodes.len() as u32;
            if range.parent != NO_PARENT {
                match &mut self.nodes[range.parent as usize] {
                    Node::Split { left, right, .. } => {
                        if range.left_child {
                            *left = id;
                        } else {
                            *right = id;
                        }
                    }
                    Node::Leaf { .. } => {
                        unreachable!("leaf node recorded as a parent during construction")
                    }
                }
            }

            let (lo, hi) = (range.lo as usize, range.hi as usize);
            debug_assert!(lo < hi, "empty range reached the partitioner");
            if hi - lo <= policy.bucket_size {
                self.nodes.push(Node::Leaf {
                    start: range.lo,
                    end: range.hi,
                });
                continue;
            }

            let dim = match policy.split_rule {
                SplitRule::MaxSpread => max_spread_dim(&self.points[lo..hi]),
                SplitRule::RoundRobin => (range.depth as usize) % D,
            };
            let mid = lo + (hi - lo) / 2;
            select_nth(
                &mut self.points[lo..hi],
                mid - lo,
                dim,
                policy.pivot_rule,
                rng.as_deref_mut(),
            );
            let value = self.points[mid].position[dim];

            // Child ids are patched in when the children are emitted.
            self.nodes.push(Node::Split {
                dim: dim as u32,
                value,
                left: 0,
                right: 0,
            });
            stack.push(PendingRange {
                lo: mid as u32,
                hi: range.hi,
                parent: id,
                left_child: false,
                depth: range.depth + 1,
            });
            stack.push(PendingRange {
                lo: range.lo,
                hi: mid as u32,
                parent: id,
                left_child: true,
                depth: range.depth + 1,
            });
        }

        Ok(())
    }
}

/// Dimension with the greatest coordinate spread across `points`, ties
/// broken by the lowest dimension index.
fn max_spread_dim<const D: usize, const P: usize>(points: &[Point<D, P>]) -> usize {
    let mut best_dim = 0;
    let mut best_spread = f64::NEG_INFINITY;
    for dim in 0..D {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for point in points {
            let v = point.position[dim];
            lo = lo.min(v);
            hi = hi.max(v);
        }
        let spread = hi - lo;
        if spread > best_spread {
            best_spread = spread;
            best_dim = dim;
        }
    }
    best_dim
}

/// Quickselect on `points`, keyed by coordinate `dim`.
///
/// Places the `nth` order statistic at index `nth` with everything before it
/// `<=` and everything after it `>=` at that coordinate. Non-strict, so
/// duplicate coordinate values terminate fine.
fn select_nth<const D: usize, const P: usize>(
    points: &mut [Point<D, P>],
    nth: usize,
    dim: usize,
    pivot_rule: PivotRule,
    mut rng: Option<&mut (dyn RngCore + '_)>,
) {
    let mut lo = 0;
    let mut hi = points.len();
    while hi - lo > 1 {
        let pivot_idx = match pivot_rule {
            PivotRule::MedianOfThree => median_of_three(points, lo, hi, dim),
            PivotRule::Sampled { samples } => {
                let Some(rng) = rng.as_deref_mut() else {
                    unreachable!("sampled pivot selection without a random source")
                };
                sampled_pivot(points, lo, hi, dim, samples, rng)
            }
        };
        points.swap(pivot_idx, hi - 1);
        let pivot = points[hi - 1].position[dim];

        let mut store = lo;
        for i in lo..hi - 1 {
            if points[i].position[dim] < pivot {
                points.swap(i, store);
                store += 1;
            }
        }
        points.swap(store, hi - 1);

        if store == nth {
            return;
        }
        if nth < store {
            hi = store;
        } else {
            lo = store + 1;
        }
    }
}

/// Index of the median of the first, middle and last coordinate in
/// `[lo, hi)`.
fn median_of_three<const D: usize, const P: usize>(
    points: &[Point<D, P>],
    lo: usize,
    hi: usize,
    dim: usize,
) -> usize {
    let mid = lo + (hi - lo) / 2;
    let a = points[lo].position[dim];
    let b = points[mid].position[dim];
    let c = points[hi - 1].position[dim];
    if (a <= b && b <= c) || (c <= b && b <= a) {
        mid
    } else if (b <= a && a <= c) || (c <= a && a <= b) {
        lo
    } else {
        hi - 1
    }
}

/// Index of the median coordinate among `samples` randomly drawn points in
/// `[lo, hi)`.
fn sampled_pivot<const D: usize, const P: usize>(
    points: &[Point<D, P>],
    lo: usize,
    hi: usize,
    dim: usize,
    samples: usize,
    rng: &mut dyn RngCore,
) -> usize {
    let len = hi - lo;
    let count = samples.min(len);
    let mut picks: Vec<(f64, usize)> = (0..count)
        .map(|_| {
            let i = lo + rng.random_range(0..len);
            (points[i].position[dim], i)
        })
        .collect();
    picks.sort_by(|a, b| a.0.total_cmp(&b.0));
    picks[count / 2].1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[[f64; 2]]) -> Vec<Point<2, 0>> {
        coords.iter().map(|&c| Point::new(c, [])).collect()
    }

    #[test]
    fn select_nth_places_order_statistic() {
        let mut points = pts(&[[5.0, 0.0], [1.0, 0.0], [4.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
        select_nth(&mut points, 2, 0, PivotRule::MedianOfThree, None);
        assert_eq!(points[2].position[0], 3.0);
        for p in &points[..2] {
            assert!(p.position[0] <= 3.0);
        }
        for p in &points[3..] {
            assert!(p.position[0] >= 3.0);
        }
    }

    #[test]
    fn select_nth_all_equal_terminates() {
        let mut points = pts(&[[7.0, 7.0]; 9]);
        select_nth(&mut points, 4, 0, PivotRule::MedianOfThree, None);
        assert_eq!(points[4].position[0], 7.0);
    }

    #[test]
    fn max_spread_picks_widest_dimension() {
        let points = pts(&[[0.0, 0.0], [1.0, 10.0], [2.0, 5.0]]);
        assert_eq!(max_spread_dim(&points), 1);
    }

    #[test]
    fn max_spread_ties_break_to_lowest_dimension() {
        let points = pts(&[[0.0, 0.0], [3.0, 3.0]]);
        assert_eq!(max_spread_dim(&points), 0);
    }
}
