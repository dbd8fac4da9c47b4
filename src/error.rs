//! Error type for invalid construction and query arguments.
//!
//! Invalid arguments are detected eagerly, before any tree state is touched.
//! Internal invariant violations (a corrupted arena or partition) are bugs,
//! not errors, and panic instead of returning a variant from here.

use std::error;
use std::fmt;

/// Errors reported for malformed arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The construction policy is malformed (e.g. a bucket size of zero, or
    /// a sampled pivot rule without a random source).
    InvalidPolicy {
        /// What is wrong with the policy.
        reason: &'static str,
    },
    /// A pinned query policy's backing storage is smaller than the requested
    /// `k`.
    PolicyTooSmall {
        /// Pinned capacity of the policy.
        capacity: usize,
        /// The `k` requested by the query.
        requested: usize,
    },
    /// The point source exceeds the index's `u32` slot addressing.
    TooManyPoints {
        /// Number of points supplied.
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPolicy { reason } => {
                write!(f, "invalid construction policy: {reason}")
            }
            Error::PolicyTooSmall {
                capacity,
                requested,
            } => {
                write!(
                    f,
                    "pinned query policy holds {capacity} neighbors but k = {requested} were requested"
                )
            }
            Error::TooManyPoints { len } => {
                write!(f, "point source has {len} points, more than u32 slots can address")
            }
        }
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::InvalidPolicy {
            reason: "bucket size must be at least 1",
        };
        assert!(err.to_string().contains("bucket size"));

        let err = Error::PolicyTooSmall {
            capacity: 4,
            requested: 9,
        };
        assert!(err.to_string().contains('4'));
        assert!(err.to_string().contains('9'));
    }
}
