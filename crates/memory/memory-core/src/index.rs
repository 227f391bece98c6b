//! # Vector Index
//!
//! The [`VectorIndex`] trait is the seam between the long-term store and its nearest-neighbor
//! search. Positions are dense and assigned in insertion order: the Nth vector added is at
//! position N, which is how the store keeps vectors aligned with their records.
//!
//! [`FlatIndex`] is the exact (exhaustive) implementation: every query scores every candidate
//! with squared Euclidean distance. An approximate index can replace it as long as it honours
//! the same contract (ascending distance, candidate filter applied before ranking).

use crate::error::{MemoryError, MemoryResult};

/// Squared Euclidean distance between two vectors of equal length.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Position-addressed vector index with filtered k-nearest-neighbor search.
pub trait VectorIndex: Send + Sync {
    /// Fixed dimension of every vector in the index.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a vector at position `len()`.
    ///
    /// Fails with [`MemoryError::Embedding`] if the vector has the wrong dimension.
    fn add(&mut self, vector: Vec<f32>) -> MemoryResult<()>;

    /// Drops every vector at position `len` and above.
    fn truncate(&mut self, len: usize);

    /// Vector stored at `position`.
    fn vector(&self, position: usize) -> Option<&[f32]>;

    /// Returns up to `k` `(position, distance)` pairs ordered by ascending distance.
    ///
    /// Only positions for which `filter` returns true are ranked. Equal distances are
    /// ordered by position.
    fn search(&self, query: &[f32], k: usize, filter: &dyn Fn(usize) -> bool) -> Vec<(usize, f32)>;
}

/// Exact index over a contiguous buffer of vectors.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Creates an empty index. `dimension` must be positive.
    pub fn new(dimension: usize) -> MemoryResult<Self> {
        if dimension == 0 {
            return Err(MemoryError::Configuration(
                "vector index dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn add(&mut self, vector: Vec<f32>) -> MemoryResult<()> {
        if vector.len() != self.dimension {
            return Err(MemoryError::Embedding(format!(
                "expected vector of dimension {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        self.data.extend_from_slice(&vector);
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        self.data.truncate(len.saturating_mul(self.dimension));
    }

    fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    fn search(&self, query: &[f32], k: usize, filter: &dyn Fn(usize) -> bool) -> Vec<(usize, f32)> {
        if k == 0 || query.len() != self.dimension {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .filter(|(position, _)| filter(*position))
            .map(|(position, vector)| (position, squared_euclidean(query, vector)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }
}
