//! Construction of the configured long-term backend and embedding service.

use embedding::{EmbeddingConfig, EmbeddingProvider, EmbeddingService, HashEmbedding};
use fastembed_embedding::FastEmbedding;
use memory_core::{LongTermStore, MemoryError, MemoryResult};
use memory_file::{FileStoreConfig, FileVectorStore};
use memory_sqlite::{SqliteStoreConfig, SqliteVectorStore};
use openai_embedding::OpenAIEmbedding;
use std::sync::Arc;
use tracing::info;

use crate::config::{MemoryConfig, StoreKind};

/// Opens the long-term store selected by `config.store_kind()`.
///
/// Callers only ever see the returned trait object; the backend is never consulted again.
pub async fn open_store(
    config: &dyn MemoryConfig,
    embedder: Arc<dyn EmbeddingService>,
) -> MemoryResult<Arc<dyn LongTermStore>> {
    let kind = config.store_kind();
    info!(backend = %kind, collection = %config.collection_name(), "opening long-term store");

    let store: Arc<dyn LongTermStore> = match kind {
        StoreKind::File => Arc::new(
            FileVectorStore::open(
                FileStoreConfig::new(config.data_dir(), config.collection_name()),
                embedder,
            )
            .await?,
        ),
        StoreKind::Sqlite => Arc::new(
            SqliteVectorStore::open(
                SqliteStoreConfig::new(config.sqlite_path(), config.collection_name()),
                embedder,
            )
            .await?,
        ),
    };
    Ok(store)
}

/// Builds the embedding service named by `config.provider()`.
///
/// `EmbeddingProvider::FastEmbed` loads its model here, which downloads it on first use.
pub fn embedding_service_from_config(
    config: &dyn EmbeddingConfig,
) -> MemoryResult<Arc<dyn EmbeddingService>> {
    let service: Arc<dyn EmbeddingService> = match config.provider() {
        EmbeddingProvider::Local => Arc::new(
            HashEmbedding::new(config.local_dimension())
                .map_err(|e| MemoryError::Configuration(e.to_string()))?,
        ),
        EmbeddingProvider::FastEmbed => Arc::new(
            FastEmbedding::from_config(config)
                .map_err(|e| MemoryError::Configuration(e.to_string()))?,
        ),
        EmbeddingProvider::OpenAI => {
            if config.openai_api_key().is_empty() {
                return Err(MemoryError::Configuration(
                    "EMBEDDING_PROVIDER=openai requires OPENAI_API_KEY to be set".to_string(),
                ));
            }
            Arc::new(OpenAIEmbedding::from_config(config))
        }
    };
    info!(
        provider = ?config.provider(),
        dimension = service.dimension(),
        "embedding service ready"
    );
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvMemoryConfig;
    use embedding::EnvEmbeddingConfig;
    use tempfile::tempdir;

    #[test]
    fn test_local_embedding_from_config() {
        let config = EnvEmbeddingConfig {
            embedding_dim: Some(32),
            ..EnvEmbeddingConfig::default()
        };
        assert_eq!(embedding_service_from_config(&config).unwrap().dimension(), 32);

        let zero = EnvEmbeddingConfig {
            embedding_dim: Some(0),
            ..EnvEmbeddingConfig::default()
        };
        assert!(matches!(
            embedding_service_from_config(&zero),
            Err(MemoryError::Configuration(_))
        ));
    }

    #[test]
    fn test_openai_embedding_requires_key() {
        let config = EnvEmbeddingConfig {
            embedding_provider: EmbeddingProvider::OpenAI,
            ..EnvEmbeddingConfig::default()
        };
        assert!(embedding_service_from_config(&config).is_err());

        let config = EnvEmbeddingConfig {
            openai_api_key: "sk-test".to_string(),
            ..config
        };
        assert_eq!(embedding_service_from_config(&config).unwrap().dimension(), 1536);
    }

    /// An OpenAI-compatible endpoint serving a model outside the per-model table.
    #[test]
    fn test_openai_dimension_from_config() {
        let config = EnvEmbeddingConfig {
            embedding_provider: EmbeddingProvider::OpenAI,
            embedding_model: Some("bge-m3".to_string()),
            embedding_dim: Some(1024),
            openai_api_key: "sk-test".to_string(),
            openai_base_url: Some("http://localhost:8080/v1".to_string()),
        };
        assert_eq!(embedding_service_from_config(&config).unwrap().dimension(), 1024);
    }

    #[test]
    fn test_fastembed_config_errors_are_configuration() {
        let config = EnvEmbeddingConfig {
            embedding_provider: EmbeddingProvider::FastEmbed,
            embedding_model: Some("text-embedding-3-small".to_string()),
            ..EnvEmbeddingConfig::default()
        };
        assert!(matches!(
            embedding_service_from_config(&config),
            Err(MemoryError::Configuration(_))
        ));
    }

    /// **Test: A second handle on an open file collection is refused.**
    #[tokio::test]
    async fn test_open_store_twice_refused_for_file() {
        let dir = tempdir().unwrap();
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbedding::new(16).unwrap());
        let config = EnvMemoryConfig {
            memory_store_type: StoreKind::File,
            memory_data_dir: dir.path().join("snapshots"),
            ..EnvMemoryConfig::default()
        };

        let first = open_store(&config, Arc::clone(&embedder)).await.unwrap();
        let second = open_store(&config, Arc::clone(&embedder)).await;
        assert!(matches!(second, Err(MemoryError::Configuration(_))));

        drop(first);
        assert!(open_store(&config, embedder).await.is_ok());
    }

    #[tokio::test]
    async fn test_open_store_per_kind() {
        let dir = tempdir().unwrap();
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbedding::new(16).unwrap());

        for kind in [StoreKind::File, StoreKind::Sqlite] {
            let config = EnvMemoryConfig {
                memory_store_type: kind,
                memory_data_dir: dir.path().join("snapshots"),
                memory_sqlite_path: dir.path().join("memory.db"),
                ..EnvMemoryConfig::default()
            };
            let store = open_store(&config, Arc::clone(&embedder)).await.unwrap();
            assert_eq!(store.collection(), "agent_memories");
            assert_eq!(store.dimension(), 16);
            assert_eq!(store.count().await, 0);
        }
        assert!(dir.path().join("snapshots").is_dir());
        assert!(dir.path().join("memory.db").is_file());
    }
}
