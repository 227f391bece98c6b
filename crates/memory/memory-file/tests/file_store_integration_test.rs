//! Integration tests for [`memory_file::FileVectorStore`].
//!
//! Covers insert/query, the category pre-filter, full persistence round-trip across reopen,
//! rollback on a failed durable write, and fail-fast open on bad snapshots.

mod common;

use memory_core::{LongTermStore, MemoryError, Tags};
use memory_file::{FileStoreConfig, FileVectorStore};
use std::sync::Arc;
use tempfile::tempdir;

/// **Test: Query against an empty store returns an empty sequence.**
#[tokio::test]
async fn test_empty_store_query_returns_empty() {
    let dir = tempdir().unwrap();
    let store = common::open_store(dir.path(), "empty").await;

    let hits = store.query("anything at all", 5, None).await.unwrap();
    assert!(hits.is_empty());
    assert_eq!(store.count().await, 0);
}

/// **Test: Inserted record is its own nearest neighbor, and survives reopen.**
///
/// **Setup:** Insert three records, query with the first content, drop the store.
/// **Action:** Reopen under the same collection name and repeat the query.
/// **Expected:** Record is first with distance ≈ 0 both times; results are identical.
#[tokio::test]
async fn test_round_trip_across_reopen() {
    let dir = tempdir().unwrap();
    let content = "I was knighted by Ser Arlan of Pennytree on his deathbed";

    let (id, before) = {
        let store = common::open_store(dir.path(), "knight").await;
        let id = store.insert(content, "origin", 10, Tags::new()).await.unwrap();
        store
            .insert("My horse Thunder is a chestnut destrier", "possessions", 6, Tags::new())
            .await
            .unwrap();
        store
            .insert("Prince Baelor died saving my life", "defining_moment", 10, Tags::new())
            .await
            .unwrap();
        let before = store.query(content, 3, None).await.unwrap();
        (id, before)
    };

    let reopened = common::open_store(dir.path(), "knight").await;
    assert_eq!(reopened.count().await, 3);

    let after = reopened.query(content, 3, None).await.unwrap();
    assert_eq!(after[0].record.id, id);
    assert!(after[0].distance.abs() < 1e-6);
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.record, a.record);
        assert!((b.distance - a.distance).abs() < 1e-6);
    }
}

/// **Test: Category filter restricts ranking to the category.**
///
/// **Setup:** Categories {"origin","values","origin"}.
/// **Action:** Query with category "origin", k = 2.
/// **Expected:** Exactly the two origin records, nearest first.
#[tokio::test]
async fn test_category_prefilter_returns_k_matches() {
    let dir = tempdir().unwrap();
    let store = common::open_store(dir.path(), "categories").await;

    let near = store
        .insert("born in flea bottom an orphan", "origin", 9, Tags::new())
        .await
        .unwrap();
    store
        .insert("born in flea bottom I value honor", "values", 8, Tags::new())
        .await
        .unwrap();
    let far = store
        .insert("squire to a hedge knight on the road", "origin", 7, Tags::new())
        .await
        .unwrap();

    let hits = store.query("born in flea bottom", 2, Some("origin")).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.record.category == "origin"));
    assert_eq!(hits[0].record.id, near);
    assert_eq!(hits[1].record.id, far);
    assert!(hits[0].distance <= hits[1].distance);

    let via_query_in = store.query_in("born in flea bottom", 2, "origin").await.unwrap();
    assert_eq!(via_query_in, hits);
}

/// **Test: Results are non-decreasing in distance and capped at k.**
#[tokio::test]
async fn test_results_are_ordered_and_capped() {
    let dir = tempdir().unwrap();
    let store = common::open_store(dir.path(), "ordering").await;
    for text in [
        "the tourney at ashford meadow",
        "a trial of seven at ashford",
        "egg shaves his silver hair",
        "thunder my old destrier",
        "the falling star on my shield",
    ] {
        store.insert(text, "fact", 5, Tags::new()).await.unwrap();
    }

    let hits = store.query("ashford tourney trial", 3, None).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));

    assert!(store.query("ashford", 0, None).await.unwrap().is_empty());
    assert_eq!(store.query("ashford", 50, None).await.unwrap().len(), 5);
}

/// **Test: Empty content fails with EmbeddingError and leaves the store untouched.**
#[tokio::test]
async fn test_empty_content_is_embedding_error() {
    let dir = tempdir().unwrap();
    let store = common::open_store(dir.path(), "embedding_errors").await;

    let err = store.insert("", "origin", 5, Tags::new()).await.unwrap_err();
    assert!(matches!(err, MemoryError::Embedding(_)));
    assert_eq!(store.count().await, 0);
    assert!(!dir.path().join("embedding_errors.json").exists());

    let err = store.query("   ", 3, None).await.unwrap_err();
    assert!(matches!(err, MemoryError::Embedding(_)));
}

/// **Test: Failing embedding service surfaces as EmbeddingError.**
#[tokio::test]
async fn test_failing_embedding_service() {
    let dir = tempdir().unwrap();
    let store = FileVectorStore::open(
        FileStoreConfig::new(dir.path(), "failing"),
        Arc::new(common::FailingEmbedding),
    )
    .await
    .unwrap();

    let err = store.insert("hello", "origin", 5, Tags::new()).await.unwrap_err();
    assert!(matches!(err, MemoryError::Embedding(_)));
    assert_eq!(store.count().await, 0);
}

/// **Test: A failed durable write rolls back the in-memory append.**
///
/// **Setup:** Open a store in a sub-directory, insert one record, then replace the
/// directory with a plain file so the next snapshot write fails.
/// **Expected:** Insert fails with PersistenceError; count and query results are unchanged.
#[tokio::test]
async fn test_persistence_failure_rolls_back() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = common::open_store(&data_dir, "rollback").await;

    store
        .insert("the first memory survives", "origin", 5, Tags::new())
        .await
        .unwrap();

    std::fs::remove_dir_all(&data_dir).unwrap();
    std::fs::write(&data_dir, b"not a directory").unwrap();

    let err = store
        .insert("the second memory is lost", "origin", 5, Tags::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Persistence(_)));
    assert_eq!(store.count().await, 1);

    let hits = store.query("the second memory is lost", 5, None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.content, "the first memory survives");
}

/// **Test: Reopening with a different embedding dimension is a ConfigurationError.**
#[tokio::test]
async fn test_dimension_mismatch_on_reopen() {
    let dir = tempdir().unwrap();
    {
        let store = common::open_store(dir.path(), "dims").await;
        store.insert("some fact", "origin", 5, Tags::new()).await.unwrap();
    }

    let other = Arc::new(embedding::HashEmbedding::new(common::DIMENSION * 2).unwrap());
    let err = FileVectorStore::open(FileStoreConfig::new(dir.path(), "dims"), other)
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Configuration(_)));
}

/// **Test: A corrupt snapshot fails at open instead of behaving as empty.**
#[tokio::test]
async fn test_corrupt_snapshot_fails_fast() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), b"{ truncated").unwrap();

    let err = FileVectorStore::open(FileStoreConfig::new(dir.path(), "broken"), common::hash_embedding())
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Persistence(_)));
}

/// **Test: Invalid collection names are rejected at open.**
#[tokio::test]
async fn test_invalid_collection_name() {
    let dir = tempdir().unwrap();
    let err = FileVectorStore::open(FileStoreConfig::new(dir.path(), "../escape"), common::hash_embedding())
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Configuration(_)));
}

/// **Test: Collections are isolated by name within one data directory.**
#[tokio::test]
async fn test_collections_isolated_by_name() {
    let dir = tempdir().unwrap();
    let a = common::open_store(dir.path(), "alpha").await;
    let b = common::open_store(dir.path(), "beta").await;

    a.insert("only in alpha", "origin", 5, Tags::new()).await.unwrap();
    assert_eq!(a.count().await, 1);
    assert_eq!(b.count().await, 0);
    assert!(b.query("only in alpha", 3, None).await.unwrap().is_empty());
}

/// **Test: Concurrent inserts are serialized and all persisted.**
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_stay_consistent() {
    let dir = tempdir().unwrap();
    let store = Arc::new(common::open_store(dir.path(), "shared").await);

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .insert(&format!("shared fact number {}", i), "shared", 5, Tags::new())
                .await
                .unwrap()
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    assert_eq!(store.count().await, 16);

    drop(store);
    let reopened = common::open_store(dir.path(), "shared").await;
    assert_eq!(reopened.count().await, 16);
    let listed = reopened.list(3).await.unwrap();
    assert_eq!(listed.len(), 3);
}

/// **Test: A second handle on an open collection is refused instead of overwriting it.**
///
/// **Setup:** Open "shared" and insert one record.
/// **Action:** Open "shared" again while the first handle is alive, then after dropping it.
/// **Expected:** The concurrent open is a ConfigurationError. Once the first handle is gone
/// the collection reopens with the acknowledged record, and further inserts add to it.
#[tokio::test]
async fn test_second_handle_refused_while_open() {
    let dir = tempdir().unwrap();
    let first = common::open_store(dir.path(), "shared").await;
    first.insert("acknowledged by the first handle", "origin", 5, Tags::new()).await.unwrap();

    let err = FileVectorStore::open(FileStoreConfig::new(dir.path(), "shared"), common::hash_embedding())
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Configuration(_)));

    // other collections in the same directory are unaffected
    let other = common::open_store(dir.path(), "private").await;
    assert_eq!(other.count().await, 0);

    drop(first);
    let second = common::open_store(dir.path(), "shared").await;
    assert_eq!(second.count().await, 1);
    second.insert("added by the second handle", "origin", 5, Tags::new()).await.unwrap();
    drop(second);

    let reopened = common::open_store(dir.path(), "shared").await;
    assert_eq!(reopened.count().await, 2);
}
