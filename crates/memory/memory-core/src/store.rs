//! # Long-Term Store
//!
//! The [`LongTermStore`] trait is the single interface over every long-term backend. A
//! deployment picks one concrete backend at construction time; callers only see this trait.
//!
//! ## Contract
//!
//! - `insert` embeds the content, appends the record and its vector, persists, and returns
//!   the new id. A failed durable write leaves the store exactly as it was before the call.
//! - `query` returns up to `k` records ordered by ascending squared Euclidean distance. A
//!   category restricts ranking to that category before the top `k` are taken.
//! - An empty store answers every query with an empty sequence.
//! - Inserts are serialized; a concurrent reader sees a record fully present or not at all.
//!
//! ## Example
//!
//! ```rust,ignore
//! use memory_core::LongTermStore;
//!
//! async fn example(store: &dyn LongTermStore) -> memory_core::MemoryResult<()> {
//!     let id = store.insert("I was born in Flea Bottom", "origin", 9, Default::default()).await?;
//!     let hits = store.query("where were you born?", 3, Some("origin")).await?;
//!     assert!(hits.iter().any(|h| h.record.id == id));
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use embedding::EmbeddingService;

use crate::error::{MemoryError, MemoryResult};
use crate::types::{MemoryRecord, ScoredRecord, Tags};

/// Embedding-indexed, persistent collection of memory records.
#[async_trait]
pub trait LongTermStore: Send + Sync {
    /// Collection name this store is bound to.
    fn collection(&self) -> &str;

    /// Fixed embedding dimension of this store.
    fn dimension(&self) -> usize;

    /// Embeds `content`, appends a new record, persists it and returns its id.
    async fn insert(
        &self,
        content: &str,
        category: &str,
        importance: i32,
        tags: Tags,
    ) -> MemoryResult<String>;

    /// k-nearest-neighbor search over stored records, closest first.
    async fn query(
        &self,
        text: &str,
        k: usize,
        category: Option<&str>,
    ) -> MemoryResult<Vec<ScoredRecord>>;

    /// Category-restricted form of [`LongTermStore::query`].
    async fn query_in(
        &self,
        text: &str,
        k: usize,
        category: &str,
    ) -> MemoryResult<Vec<ScoredRecord>> {
        self.query(text, k, Some(category)).await
    }

    /// Number of stored records.
    async fn count(&self) -> usize;

    /// Most recently inserted records, newest first.
    async fn list(&self, limit: usize) -> MemoryResult<Vec<MemoryRecord>>;
}

/// Embeds text through `service`, mapping every failure to [`MemoryError::Embedding`].
///
/// Rejects vectors whose length differs from `dimension` or that contain NaN/infinity.
pub async fn embed_text(
    service: &dyn EmbeddingService,
    text: &str,
    dimension: usize,
) -> MemoryResult<Vec<f32>> {
    let vector = service
        .embed(text)
        .await
        .map_err(|e| MemoryError::Embedding(e.to_string()))?;
    if vector.len() != dimension {
        return Err(MemoryError::Embedding(format!(
            "embedding service returned dimension {}, expected {}",
            vector.len(),
            dimension
        )));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(MemoryError::Embedding(
            "embedding service returned non-finite values".to_string(),
        ));
    }
    Ok(vector)
}

/// Validates a collection name: non-empty, ASCII alphanumerics, `_` and `-` only.
pub fn validate_collection_name(name: &str) -> MemoryResult<()> {
    if name.is_empty() {
        return Err(MemoryError::Configuration(
            "collection name must not be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(MemoryError::Configuration(format!(
            "collection name {:?} may only contain letters, digits, '_' and '-'",
            name
        )));
    }
    Ok(())
}
