//! Nearest-neighbor index over fixed-dimension vectors
//!
//! Positions are assigned in insertion order starting at 0 and are the only
//! identity a vector has; the knowledge base maps them back to chunk text.
//!
//! # Search Semantics
//!
//! - Distance is squared Euclidean (L2²); smaller is closer
//! - Results are ascending by distance, ties resolved to the lower position
//! - `k` larger than the index returns everything; an empty index returns nothing
//!
//! [`FlatIndex`] answers these exactly with a linear scan, so the same
//! question against the same index always yields the same passages. Any
//! approximate backend must implement [`VectorIndex`] and give up that
//! guarantee knowingly.

use std::cmp::Ordering;

use crate::Result;

/// A search hit: where the vector sits and how far it is from the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position (0-based)
    pub position: usize,
    /// Squared Euclidean distance to the query
    pub distance: f32,
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Closer first; equal distances fall back to insertion order.
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// Trait for vector index backends
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored vector has
    fn dimension(&self) -> usize;

    /// Append a vector and return its position.
    ///
    /// Fails only if the vector's length differs from [`dimension`](Self::dimension).
    fn add(&mut self, vector: &[f32]) -> Result<usize>;

    /// Up to `k` nearest neighbors of `query`, nearest first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// The stored vector at `position`
    fn vector(&self, position: usize) -> Option<&[f32]>;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Squared Euclidean distance between two vectors of equal length.
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

mod flat;

pub use flat::*;
