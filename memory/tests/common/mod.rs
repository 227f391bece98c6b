//! Shared helpers for memory facade tests.

use embedding::{EmbeddingService, HashEmbedding};
use memory::{EnvMemoryConfig, MemoryManager, StoreKind};
use std::path::Path;
use std::sync::Arc;

pub fn embedder() -> Arc<dyn EmbeddingService> {
    Arc::new(HashEmbedding::new(128).expect("dimension"))
}

pub fn config(dir: &Path, kind: StoreKind, stm_max_tokens: usize) -> EnvMemoryConfig {
    EnvMemoryConfig {
        stm_max_tokens,
        ltm_collection_name: "test_memories".to_string(),
        memory_store_type: kind,
        memory_data_dir: dir.join("snapshots"),
        memory_sqlite_path: dir.join("memory.db"),
    }
}

pub async fn manager(dir: &Path, kind: StoreKind, stm_max_tokens: usize) -> MemoryManager {
    MemoryManager::from_config(&config(dir, kind, stm_max_tokens), embedder())
        .await
        .expect("memory manager")
}
