//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the crate.
//! Users can import everything they need with:
//!
//! ```
//! use kdindex::prelude::*;
//! ```

pub use crate::error::Error;
pub use crate::point::{Point, PointId};
pub use crate::policy::{BuildPolicy, PivotRule, QueryPolicy, SplitRule};
pub use crate::queries::Neighbor;
pub use crate::tree::{KdTree, Node, NodeId};
