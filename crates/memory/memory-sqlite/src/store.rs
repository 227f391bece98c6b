//! SQLite-backed [`LongTermStore`] implementation.

use async_trait::async_trait;
use chrono::Utc;
use embedding::EmbeddingService;
use memory_core::{
    embed_text, generate_record_id, validate_collection_name, IndexedCollection, LongTermStore,
    MemoryError, MemoryRecord, MemoryResult, ScoredRecord, Tags,
};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::codec;

const METRIC: &str = "squared_euclidean";

fn db_error(err: sqlx::Error) -> MemoryError {
    MemoryError::Persistence(format!("sqlite: {}", err))
}

/// Where the database lives and which collection to bind.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    pub database_path: PathBuf,
    pub collection: String,
}

impl SqliteStoreConfig {
    pub fn new(database_path: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            collection: collection.into(),
        }
    }
}

/// Long-term store whose durable copy is a SQLite table, searched through an in-memory index.
///
/// Inserts write the row inside a transaction and append to the index only after commit, so
/// a failed write never leaves a record visible to queries.
pub struct SqliteVectorStore {
    pool: SqlitePool,
    collection_name: String,
    embedder: Arc<dyn EmbeddingService>,
    inner: RwLock<IndexedCollection>,
}

impl std::fmt::Debug for SqliteVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteVectorStore")
            .field("collection", &self.collection_name)
            .finish()
    }
}

impl SqliteVectorStore {
    /// Opens the database (creating it if missing) and loads the bound collection.
    ///
    /// # Errors
    ///
    /// - [`MemoryError::Configuration`] for an invalid collection name, or when the collection
    ///   was created with a different embedding dimension
    /// - [`MemoryError::Persistence`] when the database cannot be opened or a row is corrupt
    pub async fn open(
        config: SqliteStoreConfig,
        embedder: Arc<dyn EmbeddingService>,
    ) -> MemoryResult<Self> {
        validate_collection_name(&config.collection)?;
        let dimension = embedder.dimension();

        if let Some(parent) = config.database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MemoryError::Persistence(format!(
                    "cannot create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let pool = connect(&config.database_path).await?;
        init_schema(&pool).await?;
        register_collection(&pool, &config.collection, dimension).await?;
        let collection = load_collection(&pool, &config.collection, dimension).await?;

        info!(
            collection = %config.collection,
            path = %config.database_path.display(),
            records = collection.len(),
            dimension,
            "opened sqlite vector store"
        );

        Ok(Self {
            pool,
            collection_name: config.collection,
            embedder,
            inner: RwLock::new(collection),
        })
    }

    async fn write_record(&self, record: &MemoryRecord, vector: &[f32]) -> MemoryResult<()> {
        let tags = codec::encode_tags(&record.tags)?;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            r#"
            INSERT INTO memory_records (id, collection, content, category, importance, created_at, tags, embedding)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&self.collection_name)
        .bind(&record.content)
        .bind(&record.category)
        .bind(record.importance)
        .bind(record.created_at.to_rfc3339())
        .bind(tags)
        .bind(codec::encode_embedding(vector))
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)
    }
}

async fn connect(path: &Path) -> MemoryResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .create_if_missing(true)
        .filename(path);
    SqlitePool::connect_with(options).await.map_err(db_error)
}

async fn init_schema(pool: &SqlitePool) -> MemoryResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            dimension INTEGER NOT NULL,
            metric TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(db_error)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS memory_records (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            collection TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL,
            importance INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            tags TEXT NOT NULL,
            embedding BLOB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(db_error)?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_memory_records_collection ON memory_records(collection, seq)",
    )
    .execute(pool)
    .await
    .map_err(db_error)?;

    Ok(())
}

/// Records the collection's dimension on first open; later opens must match it.
async fn register_collection(pool: &SqlitePool, name: &str, dimension: usize) -> MemoryResult<()> {
    let existing = sqlx::query("SELECT dimension, metric FROM collections WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?;

    match existing {
        Some(row) => {
            let stored: i64 = row.try_get("dimension").map_err(db_error)?;
            let metric: String = row.try_get("metric").map_err(db_error)?;
            if metric != METRIC {
                return Err(MemoryError::Configuration(format!(
                    "collection {:?} uses metric {:?}, expected {:?}",
                    name, metric, METRIC
                )));
            }
            if stored != dimension as i64 {
                return Err(MemoryError::Configuration(format!(
                    "collection {:?} was built with dimension {}, embedding service produces {}",
                    name, stored, dimension
                )));
            }
        }
        None => {
            sqlx::query(
                "INSERT INTO collections (name, dimension, metric, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(name)
            .bind(dimension as i64)
            .bind(METRIC)
            .bind(Utc::now().to_rfc3339())
            .execute(pool)
            .await
            .map_err(db_error)?;
            info!(collection = %name, dimension, "registered new collection");
        }
    }
    Ok(())
}

async fn load_collection(
    pool: &SqlitePool,
    name: &str,
    dimension: usize,
) -> MemoryResult<IndexedCollection> {
    let rows = sqlx::query(
        r#"
        SELECT id, content, category, importance, created_at, tags, embedding
        FROM memory_records
        WHERE collection = ?
        ORDER BY seq ASC
        "#,
    )
    .bind(name)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut vectors = Vec::with_capacity(rows.len());
    for row in rows {
        let importance: i64 = row.try_get("importance").map_err(db_error)?;
        let created_at: String = row.try_get("created_at").map_err(db_error)?;
        let tags: String = row.try_get("tags").map_err(db_error)?;
        let blob: Vec<u8> = row.try_get("embedding").map_err(db_error)?;

        records.push(MemoryRecord {
            id: row.try_get("id").map_err(db_error)?,
            content: row.try_get("content").map_err(db_error)?,
            category: row.try_get("category").map_err(db_error)?,
            importance: i32::try_from(importance).map_err(|_| {
                MemoryError::Persistence(format!("importance {} out of range", importance))
            })?,
            created_at: codec::parse_timestamp(&created_at)?,
            tags: codec::decode_tags(&tags)?,
        });
        vectors.push(codec::decode_embedding(&blob)?);
    }

    IndexedCollection::from_parts(dimension, records, vectors)
}

#[async_trait]
impl LongTermStore for SqliteVectorStore {
    fn collection(&self) -> &str {
        &self.collection_name
    }

    fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    #[instrument(skip(self, content, tags), fields(collection = %self.collection_name, content_len = content.len()))]
    async fn insert(
        &self,
        content: &str,
        category: &str,
        importance: i32,
        tags: Tags,
    ) -> MemoryResult<String> {
        let mut collection = self.inner.write().await;
        let vector = embed_text(self.embedder.as_ref(), content, collection.dimension()).await?;
        collection.check_embedding(&vector)?;

        let record = MemoryRecord {
            id: generate_record_id(category),
            content: content.to_string(),
            category: category.to_string(),
            importance,
            created_at: Utc::now(),
            tags,
        };
        let id = record.id.clone();

        if let Err(e) = self.write_record(&record, &vector).await {
            warn!(error = %e, id = %id, "sqlite insert failed, record not added");
            return Err(e);
        }
        collection.push(record, vector)?;

        info!(id = %id, category, importance, records = collection.len(), "memory inserted");
        Ok(id)
    }

    #[instrument(skip(self, text), fields(collection = %self.collection_name, text_len = text.len()))]
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
