//! Integration tests for [`memory_sqlite::SqliteVectorStore`].
//!
//! Every test uses a real database file in a temp dir so reopen behaviour is exercised.

use embedding::{EmbeddingService, HashEmbedding};
use memory_core::{LongTermStore, MemoryError, Tags};
use memory_sqlite::{SqliteStoreConfig, SqliteVectorStore};
use serde_json::json;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const DIMENSION: usize = 64;

fn embedder(dimension: usize) -> Arc<dyn EmbeddingService> {
    Arc::new(HashEmbedding::new(dimension).unwrap())
}

async fn open(path: &Path, collection: &str) -> SqliteVectorStore {
    SqliteVectorStore::open(SqliteStoreConfig::new(path, collection), embedder(DIMENSION))
        .await
        .unwrap()
}

/// **Test: Records, tags and order survive a reopen.**
///
/// **Setup:** Insert two records (one tagged) and drop the store.
/// **Action:** Reopen the same database and collection.
/// **Expected:** Both records load with identical fields; self-query distance ≈ 0.
#[tokio::test]
async fn test_round_trip_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("memory.db");

    let mut tags = Tags::new();
    tags.insert("role".to_string(), json!("user"));
    let (first, second) = {
        let store = open(&path, "knight").await;
        let first = store
            .insert("Egg is really Prince Aegon Targaryen", "relationships", 10, tags.clone())
            .await
            .unwrap();
        let second = store
            .insert("I cannot read or write", "traits", 7, Tags::new())
            .await
            .unwrap();
        (first, second)
    };

    let store = open(&path, "knight").await;
    assert_eq!(store.count().await, 2);

    let listed = store.list(10).await.unwrap();
    assert_eq!(listed[0].id, second);
    assert_eq!(listed[1].id, first);
    assert_eq!(listed[1].tags, tags);
    assert_eq!(listed[1].importance, 10);

    let hits = store
        .query("Egg is really Prince Aegon Targaryen", 1, None)
        .await
        .unwrap();
    assert_eq!(hits[0].record.id, first);
    assert!(hits[0].distance.abs() < 1e-6);
}

/// **Test: Category pre-filter returns up to k records of that category.**
#[tokio::test]
async fn test_category_filter() {
    let dir = tempdir().unwrap();
    let store = open(&dir.path().join("memory.db"), "filter").await;

    store.insert("honor above all", "values", 9, Tags::new()).await.unwrap();
    store.insert("orphan of flea bottom", "origin", 9, Tags::new()).await.unwrap();
    store.insert("squire to ser arlan", "origin", 8, Tags::new()).await.unwrap();

    let hits = store.query_in("honor above all", 2, "origin").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.record.category == "origin"));

    assert!(store.query("honor", 3, Some("missing")).await.unwrap().is_empty());
}

/// **Test: Collections sharing one database are isolated.**
#[tokio::test]
async fn test_collections_share_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memory.db");
    let a = open(&path, "alpha").await;
    let b = open(&path, "beta").await;

    a.insert("alpha only fact", "fact", 5, Tags::new()).await.unwrap();
    assert_eq!(a.count().await, 1);
    assert_eq!(b.count().await, 0);

    drop(b);
    let b = open(&path, "beta").await;
    assert_eq!(b.count().await, 0);
}

/// **Test: Reopening with another embedding dimension is a ConfigurationError.**
#[tokio::test]
async fn test_dimension_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memory.db");
    drop(open(&path, "dims").await);

    let err = SqliteVectorStore::open(SqliteStoreConfig::new(&path, "dims"), embedder(DIMENSION / 2))
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Configuration(_)));
}

/// **Test: A rejected row write leaves the store unchanged.**
///
/// **Setup:** Install a trigger (through a second connection) that aborts every insert.
/// **Expected:** Insert fails with PersistenceError; count and query results are unchanged.
#[tokio::test]
async fn test_failed_write_is_not_visible() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memory.db");
    let store = open(&path, "rollback").await;
    store.insert("kept memory", "fact", 5, Tags::new()).await.unwrap();

    let pool = SqlitePool::connect_with(SqliteConnectOptions::new().filename(&path))
        .await
        .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_insert BEFORE INSERT ON memory_records BEGIN SELECT RAISE(ABORT, 'write rejected'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = store
        .insert("lost memory", "fact", 5, Tags::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Persistence(_)));
    assert_eq!(store.count().await, 1);
    let hits = store.query("lost memory", 5, None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.content, "kept memory");
}

/// **Test: Empty content is an EmbeddingError and writes nothing.**
#[tokio::test]
async fn test_empty_content_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memory.db");
    let store = open(&path, "empty").await;

    let err = store.insert("", "fact", 5, Tags::new()).await.unwrap_err();
    assert!(matches!(err, MemoryError::Embedding(_)));
    assert_eq!(store.count().await, 0);

    drop(store);
    assert_eq!(open(&path, "empty").await.count().await, 0);
}
