//! # kdindex - Static k-d Tree Spatial Index
//!
//! A Rust library providing a bulk-built k-d tree for exact nearest-neighbor
//! and k-nearest-neighbor queries over fixed-dimension points, each carrying
//! an opaque fixed-size payload.
//!
//! ## Features
//!
//! - **Compile-Time Layout**: dimension `D` and payload size `P` are const
//!   generics, so points stay flat and contiguous with no per-point allocation
//! - **Arena Node Storage**: all nodes live in one flat array and reference
//!   each other by integer index, never by pointer
//! - **Branch-and-Bound Search**: exact nearest and k-nearest queries with
//!   bounding-hyperplane pruning
//! - **Reusable Query Scratch**: a caller-owned [`QueryPolicy`] keeps the
//!   bounded-heap storage alive across queries, so repeated k-nearest calls
//!   do not reallocate
//! - **Batch Reordering**: [`KdTree::order_for_locality`] groups a query
//!   batch by tree locality for cache-friendly bulk querying
//! - **Static Optimization**: built once, immutable afterwards; rebuild in
//!   place to reuse storage when the point set changes
//!
//! ## Quick Start
//!
//! ```rust
//! use kdindex::prelude::*;
//!
//! // Four corners of a square, no payload.
//! let points = [
//!     Point::new([0.0, 0.0], []),
//!     Point::new([10.0, 0.0], []),
//!     Point::new([0.0, 10.0], []),
//!     Point::new([10.0, 10.0], []),
//! ];
//!
//! // Build the index once (required before querying).
//! let tree = KdTree::build(&points, &BuildPolicy::default()).unwrap();
//!
//! // Single nearest neighbor.
//! let hit = tree.nearest(&[1.0, 1.0]).unwrap();
//! assert_eq!(tree.point(hit.slot).position, [0.0, 0.0]);
//! assert_eq!(hit.dist_sq, 2.0);
//!
//! // k nearest, reusing the policy's scratch storage across queries.
//! let mut policy = QueryPolicy::new().sort_by_distance(true);
//! let neighbors = tree.nearest_k(&[1.0, 1.0], 2, &mut policy).unwrap();
//! assert_eq!(neighbors[0].dist_sq, 2.0);
//! assert_eq!(neighbors[1].dist_sq, 82.0);
//! ```
//!
//! ## How It Works
//!
//! Construction copies the points into an owned store and recursively
//! median-splits them in place: each split picks a dimension (greatest
//! coordinate spread by default), quickselects the median coordinate, and
//! partitions the range around it, until ranges fit in a leaf bucket. The
//! resulting tree is within O(log N) of balanced regardless of input order.
//!
//! Queries descend the tree visiting the child on the query's side of each
//! split first, and skip the other side whenever the squared distance to the
//! splitting hyperplane already exceeds the best (or k-th best) squared
//! distance found so far, which keeps exact search far below linear cost on
//! well-spread data.
//!
//! Once built, the tree is plain immutable data: concurrent queries from
//! many threads need no locking, as long as each thread owns its own
//! [`QueryPolicy`].

pub mod error;
pub mod point;
pub mod policy;
pub mod prelude;
pub mod queries;
pub mod tree;

pub use error::Error;
pub use point::{Point, PointId, distance_sq};
pub use policy::{BuildPolicy, DEFAULT_BUCKET_SIZE, PivotRule, QueryPolicy, SplitRule};
pub use queries::Neighbor;
pub use tree::{KdTree, Node, NodeId};

#[cfg(test)]
mod integration_test;
