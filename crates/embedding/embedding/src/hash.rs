//! Deterministic local embedding based on feature hashing.
//!
//! Each lower-cased alphanumeric word is hashed with 64-bit FNV-1a. The low bits pick a bucket
//! in `0..dimension`, the top bit picks the sign. The bucket vector is L2-normalised, so two
//! texts with the same words map to the same unit vector on every run and every platform.

use async_trait::async_trait;
use tracing::debug;

use crate::EmbeddingService;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Bag-of-words embedding that needs no model and no network.
#[derive(Debug, Clone)]
pub struct HashEmbedding {
    dimension: usize,
}

impl HashEmbedding {
    /// Creates a hash embedding producing vectors of `dimension` values.
    pub fn new(dimension: usize) -> anyhow::Result<Self> {
        if dimension == 0 {
            anyhow::bail!("hash embedding dimension must be greater than zero");
        }
        Ok(Self { dimension })
    }

    fn vectorize(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut words = 0usize;

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = fnv1a(word.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
            words += 1;
        }

        if words == 0 {
            anyhow::bail!("cannot embed text without any words");
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            // Every word cancelled out; fall back to a fixed unit vector so output stays finite.
            vector[0] = 1.0;
        } else {
            for v in &mut vector {
                *v /= norm;
            }
        }

        debug!(dimension = self.dimension, words, "hash embedding computed");
        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingService for HashEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        self.vectorize(text)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
