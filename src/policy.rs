//! Construction and query policies.
//!
//! [`BuildPolicy`] controls how the tree is partitioned; [`QueryPolicy`] is a
//! caller-owned scratch object that lets repeated `nearest_k` calls reuse the
//! same bounded-heap storage instead of reallocating per call.

use crate::error::Error;
use crate::queries::Neighbor;

/// Default leaf bucket size. Leaves hold at most this many points.
pub const DEFAULT_BUCKET_SIZE: usize = 16;

/// How the partitioner picks the split dimension for a range of points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitRule {
    /// The dimension with the greatest coordinate spread across the range,
    /// ties broken by the lowest dimension index. One O(len) scan per split.
    MaxSpread,
    /// Cycle through dimensions by node depth.
    RoundRobin,
}

/// How the partitioner picks the quickselect pivot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PivotRule {
    /// Median of the first, middle and last coordinate in the range.
    /// Deterministic for a fixed input order.
    MedianOfThree,
    /// Median coordinate of `samples` randomly drawn points. Requires a
    /// caller-supplied random source (`build_with_rng` / `construct_with_rng`);
    /// a fixed-seed source makes construction reproducible.
    Sampled {
        /// Number of points to sample per split, at least 1.
        samples: usize,
    },
}

/// Parameters controlling tree construction.
///
/// The default policy (bucket size 16, max-spread splits, median-of-three
/// pivots) is deterministic and a good fit for most point sets.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildPolicy {
    /// Maximum number of points per leaf, at least 1.
    pub bucket_size: usize,
    /// Split dimension selection rule.
    pub split_rule: SplitRule,
    /// Quickselect pivot selection rule.
    pub pivot_rule: PivotRule,
}

impl BuildPolicy {
    /// Checks the policy parameters, without touching any tree state.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.bucket_size < 1 {
            return Err(Error::InvalidPolicy {
                reason: "bucket size must be at least 1",
            });
        }
        if let PivotRule::Sampled { samples } = self.pivot_rule {
            if samples < 1 {
                return Err(Error::InvalidPolicy {
                    reason: "sampled pivot selection needs at least 1 sample",
                });
            }
        }
        Ok(())
    }
}

impl Default for BuildPolicy {
    fn default() -> Self {
        BuildPolicy {
            bucket_size: DEFAULT_BUCKET_SIZE,
            split_rule: SplitRule::MaxSpread,
            pivot_rule: PivotRule::MedianOfThree,
        }
    }
}

/// Reusable scratch storage for k-nearest-neighbor queries.
///
/// The policy owns the bounded max-heap that `nearest_k` fills, so a policy
/// kept across calls makes repeated queries allocation-free once warm. A
/// fresh `QueryPolicy::new()` per call is always valid, just slower.
///
/// Policies must not be shared between in-flight queries: `nearest_k` takes
/// the policy by exclusive borrow, so each querying thread owns its own
/// instance.
#[derive(Clone, Debug, Default)]
pub struct QueryPolicy {
    /// Bounded max-heap storage, worst candidate at the root.
    pub(crate) heap: Vec<Neighbor>,
    /// Sort results by ascending distance after traversal.
    pub(crate) sort: bool,
    /// If set, the heap never grows past this many entries and queries with
    /// a larger `k` are rejected.
    pub(crate) pinned: Option<usize>,
}

impl QueryPolicy {
    /// Creates an empty, growable policy.
    pub fn new() -> Self {
        QueryPolicy::default()
    }

    /// Creates a growable policy with storage preallocated for `capacity`
    /// neighbors.
    pub fn with_capacity(capacity: usize) -> Self {
        QueryPolicy {
            heap: Vec::with_capacity(capacity),
            sort: false,
            pinned: None,
        }
    }

    /// Creates a policy whose storage is pinned to exactly `capacity`
    /// neighbors. Queries requesting `k > capacity` fail with
    /// [`Error::PolicyTooSmall`] instead of reallocating.
    pub fn pinned(capacity: usize) -> Self {
        QueryPolicy {
            heap: Vec::with_capacity(capacity),
            sort: false,
            pinned: Some(capacity),
        }
    }

    /// Requests that results be sorted by ascending squared distance.
    /// Off by default; unsorted queries skip the sorting pass.
    #[must_use]
    pub fn sort_by_distance(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }
}
