//! Point type and the squared-distance metric used throughout the index.

/// Stable identifier of a stored point: its slot in the tree's point store.
///
/// Slots are assigned during construction (the store is permuted in place by
/// the partitioner) and remain valid until the next rebuild.
pub type PointId = u32;

/// A fixed-dimension position with an opaque fixed-size payload.
///
/// `D` is the dimensionality of the position, `P` the payload size in bytes.
/// Payload bytes are carried through the index untouched; the index never
/// inspects them. Use `P = 0` (payload `[]`) when no payload is needed;
/// it adds no per-point memory.
///
/// Points are plain values: copied into the tree on construction, flat and
/// contiguous in memory, never heap-allocated individually.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<const D: usize, const P: usize> {
    /// Position coordinates. Must be finite for queries to be meaningful.
    pub position: [f64; D],
    /// Opaque caller data, round-tripped byte-for-byte.
    pub payload: [u8; P],
}

impl<const D: usize, const P: usize> Point<D, P> {
    /// Creates a point from a position and payload.
    ///
    /// # Examples
    /// ```
    /// use kdindex::Point;
    ///
    /// let plain = Point::new([1.0, 2.0], []);
    /// let tagged = Point::new([1.0, 2.0], *b"tag!");
    /// assert_eq!(plain.position, tagged.position);
    /// assert_eq!(&tagged.payload, b"tag!");
    /// ```
    #[inline]
    pub fn new(position: [f64; D], payload: [u8; P]) -> Self {
        Point { position, payload }
    }
}

/// Squared Euclidean distance between two positions.
///
/// Queries report this value directly; take a square root only if an actual
/// distance is needed.
#[inline]
pub fn distance_sq<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    let mut sum = 0.0;
    for i in 0..D {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}
