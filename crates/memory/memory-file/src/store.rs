//! File-backed [`LongTermStore`] implementation.

use async_trait::async_trait;
use chrono::Utc;
use embedding::EmbeddingService;
use memory_core::{
    embed_text, generate_record_id, validate_collection_name, IndexedCollection, LongTermStore,
    MemoryError, MemoryRecord, MemoryResult, ScoredRecord, Tags,
};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::FileStoreConfig;
use crate::snapshot;

/// Long-term store over a flat vector index with a JSON snapshot per collection.
///
/// The collection sits behind a `RwLock`: inserts hold the write lock from embedding through
/// the durable write, queries take the read lock only for the search itself.
///
/// Each handle rewrites the whole snapshot from its own view, so a handle owns its collection
/// exclusively through an OS lock on `<collection>.lock`, released when the handle drops.
pub struct FileVectorStore {
    config: FileStoreConfig,
    embedder: Arc<dyn EmbeddingService>,
    inner: RwLock<IndexedCollection>,
    _lock: File,
}

impl std::fmt::Debug for FileVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileVectorStore")
            .field("config", &self.config)
            .finish()
    }
}

impl FileVectorStore {
    /// Opens (or creates) the collection described by `config`.
    ///
    /// # Errors
    ///
    /// - [`MemoryError::Configuration`] for an invalid collection name, when the persisted
    ///   dimension differs from `embedder.dimension()`, or when another handle already holds
    ///   the collection open
    /// - [`MemoryError::Persistence`] when the data directory cannot be created or the
    ///   snapshot cannot be read or is corrupt
    pub async fn open(
        config: FileStoreConfig,
        embedder: Arc<dyn EmbeddingService>,
    ) -> MemoryResult<Self> {
        validate_collection_name(&config.collection)?;
        let dimension = embedder.dimension();

        tokio::fs::create_dir_all(&config.data_dir).await.map_err(|e| {
            MemoryError::Persistence(format!(
                "cannot create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;

        let lock = acquire_lock(&config)?;

        let temp_path = config.temp_path();
        if tokio::fs::try_exists(&temp_path).await.unwrap_or(false) {
            warn!(path = %temp_path.display(), "removing incomplete snapshot write");
            tokio::fs::remove_file(&temp_path).await?;
        }

        let snapshot_path = config.snapshot_path();
        let collection = match tokio::fs::read(&snapshot_path).await {
            Ok(bytes) => {
                let snapshot = snapshot::decode(&bytes)?;
                if snapshot.collection != config.collection {
                    warn!(
                        stored = %snapshot.collection,
                        expected = %config.collection,
                        "snapshot was written under another collection name"
                    );
                }
                if snapshot.dimension != dimension {
                    return Err(MemoryError::Configuration(format!(
                        "collection {:?} was built with dimension {}, embedding service produces {}",
                        config.collection, snapshot.dimension, dimension
                    )));
                }
                IndexedCollection::from_parts(dimension, snapshot.records, snapshot.vectors)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexedCollection::flat(dimension)?,
            Err(e) => {
                return Err(MemoryError::Persistence(format!(
                    "cannot read snapshot {}: {}",
                    snapshot_path.display(),
                    e
                )))
            }
        };

        info!(
            collection = %config.collection,
            path = %snapshot_path.display(),
            records = collection.len(),
            dimension,
            "opened file vector store"
        );

        Ok(Self {
            config,
            embedder,
            inner: RwLock::new(collection),
            _lock: lock,
        })
    }

    /// Writes the whole collection to the temp file, syncs it, then renames it over the
    /// current snapshot.
    async fn persist(&self, collection: &IndexedCollection) -> MemoryResult<()> {
        let bytes = snapshot::encode(&self.config.collection, collection)?;
        let temp_path = self.config.temp_path();

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&temp_path, self.config.snapshot_path()).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        debug!(bytes = bytes.len(), records = collection.len(), "snapshot written");
        Ok(())
    }
}

fn acquire_lock(config: &FileStoreConfig) -> MemoryResult<File> {
    let path = config.lock_path();
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| {
            MemoryError::Persistence(format!("cannot open lock file {}: {}", path.display(), e))
        })?;

    match FileExt::try_lock_exclusive(&file) {
        Ok(()) => Ok(file),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
            Err(MemoryError::Configuration(format!(
                "collection {:?} in {} is already open by another store handle",
                config.collection,
                config.data_dir.display()
            )))
        }
        Err(e) => Err(MemoryError::Persistence(format!(
            "cannot lock {}: {}",
            path.display(),
            e
        ))),
    }
}

#[async_trait]
impl LongTermStore for FileVectorStore {
    fn collection(&self) -> &str {
        &self.config.collection
    }

    fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    #[instrument(skip(self, content, tags), fields(collection = %self.config.collection, content_len = content.len()))]
    async fn insert(
        &self,
        content: &str,
        category: &str,
        importance: i32,
        tags: Tags,
    ) -> MemoryResult<String> {
        let mut collection = self.inner.write().await;
        let vector = embed_text(self.embedder.as_ref(), content, collection.dimension()).await?;

        let record = MemoryRecord {
            id: generate_record_id(category),
            content: content.to_string(),
            category: category.to_string(),
            importance,
            created_at: Utc::now(),
            tags,
        };
        let id = record.id.clone();

        let before = collection.len();
        collection.push(record, vector)?;
        if let Err(e) = self.persist(&collection).await {
            collection.rollback_to(before);
            warn!(error = %e, id = %id, "snapshot write failed, insert rolled back");
            return Err(e);
        }

        info!(id = %id, category, importance, records = collection.len(), "memory inserted");
        Ok(id)
    }

    #[instrument(skip(self, text), fields(collection = %self.config.collection, text_len = text.len()))]
    async fn query(
        &self,
        text: &str,
        k: usize,
        category: Option<&str>,
    ) -> MemoryResult<Vec<ScoredRecord>> {
        let vector = embed_text(self.embedder.as_ref(), text, self.embedder.dimension()).await?;
        let collection = self.inner.read().await;
        let hits = collection.search(&vector, k, category);
        debug!(k, category = ?category, hits = hits.len(), "memory query");
        Ok(hits)
    }

    async fn count(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn list(&self, limit: usize) -> MemoryResult<Vec<MemoryRecord>> {
        Ok(self.inner.read().await.recent(limit))
    }
}
