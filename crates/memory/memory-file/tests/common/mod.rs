//! Shared helpers for file store integration tests.

use async_trait::async_trait;
use embedding::{EmbeddingService, HashEmbedding};
use memory_file::{FileStoreConfig, FileVectorStore};
use std::path::Path;
use std::sync::Arc;

pub const DIMENSION: usize = 64;

pub fn hash_embedding() -> Arc<dyn EmbeddingService> {
    Arc::new(HashEmbedding::new(DIMENSION).expect("dimension"))
}

pub async fn open_store(dir: &Path, collection: &str) -> FileVectorStore {
    FileVectorStore::open(FileStoreConfig::new(dir, collection), hash_embedding())
        .await
        .expect("open store")
}

/// Embedding service that always fails, standing in for an unavailable model.
pub struct FailingEmbedding;

#[async_trait]
impl EmbeddingService for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        anyhow::bail!("embedding model unavailable")
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}
