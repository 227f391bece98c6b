//! # Text Embeddings
//!
//! This crate defines the embedding service interface for turning text into fixed-length
//! vectors, plus the env-based embedding configuration and [`HashEmbedding`], a deterministic
//! local implementation that needs no network. Model-backed services live in their own crates
//! (`fastembed-embedding`, `openai-embedding`).
//!
//! Implementations must be deterministic for identical input within a process and must fail
//! explicitly on empty or otherwise unembeddable input rather than return a malformed vector.

use async_trait::async_trait;

mod config;
mod hash;

pub use config::{
    EmbeddingConfig, EmbeddingProvider, EnvEmbeddingConfig, DEFAULT_LOCAL_DIMENSION,
    DEFAULT_OPENAI_MODEL,
};
pub use hash::HashEmbedding;

/// Service for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts.
    ///
    /// Defaults to one `embed` call per text; remote services override this with a single
    /// batched request.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of every vector this service produces.
    fn dimension(&self) -> usize;
}
