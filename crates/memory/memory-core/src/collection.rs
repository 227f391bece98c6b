//! # Indexed Collection
//!
//! An ordered sequence of [`MemoryRecord`]s and a [`VectorIndex`] over their embeddings, kept
//! in lock-step: the vector at index position N belongs to `records[N]`. Every mutation goes
//! through [`IndexedCollection::push`] or [`IndexedCollection::rollback_to`], which touch both
//! sides together.
//!
//! Backends wrap one collection in a lock and add persistence around it.

use crate::error::{MemoryError, MemoryResult};
use crate::index::{FlatIndex, VectorIndex};
use crate::types::{MemoryRecord, ScoredRecord};
use tracing::debug;

/// Records plus the vector index over their embeddings.
pub struct IndexedCollection {
    records: Vec<MemoryRecord>,
    index: Box<dyn VectorIndex>,
}

impl std::fmt::Debug for IndexedCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedCollection")
            .field("len", &self.records.len())
            .field("dimension", &self.index.dimension())
            .finish()
    }
}

impl IndexedCollection {
    /// Creates an empty collection over the given index.
    ///
    /// Fails if the index already holds vectors, since there would be no records for them.
    pub fn new(index: Box<dyn VectorIndex>) -> MemoryResult<Self> {
        if !index.is_empty() {
            return Err(MemoryError::Configuration(
                "cannot build a collection over a non-empty index".to_string(),
            ));
        }
        Ok(Self {
            records: Vec::new(),
            index,
        })
    }

    /// Creates an empty collection backed by an exact [`FlatIndex`].
    pub fn flat(dimension: usize) -> MemoryResult<Self> {
        Self::new(Box::new(FlatIndex::new(dimension)?))
    }

    /// Rebuilds a flat collection from persisted parallel sequences.
    ///
    /// Mismatched lengths or vector dimensions mean the durable copy is corrupt and are
    /// reported as [`MemoryError::Persistence`].
    pub fn from_parts(
        dimension: usize,
        records: Vec<MemoryRecord>,
        vectors: Vec<Vec<f32>>,
    ) -> MemoryResult<Self> {
        if records.len() != vectors.len() {
            return Err(MemoryError::Persistence(format!(
                "stored index has {} vectors for {} records",
                vectors.len(),
                records.len()
            )));
        }
        let mut collection = Self::flat(dimension)?;
        for (position, (record, vector)) in records.into_iter().zip(vectors).enumerate() {
            if vector.len() != dimension {
                return Err(MemoryError::Persistence(format!(
                    "stored vector {} has dimension {}, expected {}",
                    position,
                    vector.len(),
                    dimension
                )));
            }
            collection.push(record, vector)?;
        }
        Ok(collection)
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    /// Embedding stored for the record at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.index.vector(position)
    }

    /// Checks that an embedding has this collection's dimension and only finite values.
    pub fn check_embedding(&self, vector: &[f32]) -> MemoryResult<()> {
        if vector.len() != self.dimension() {
            return Err(MemoryError::Embedding(format!(
                "embedding has dimension {}, store expects {}",
                vector.len(),
                self.dimension()
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(MemoryError::Embedding(
                "embedding contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Appends a record and its embedding at the tail.
    pub fn push(&mut self, record: MemoryRecord, vector: Vec<f32>) -> MemoryResult<()> {
        self.check_embedding(&vector)?;
        self.index.add(vector)?;
        self.records.push(record);
        Ok(())
    }

    /// Drops every record (and vector) at position `len` and above.
    pub fn rollback_to(&mut self, len: usize) {
        if len < self.records.len() {
            debug!(from = self.records.len(), to = len, "collection rolled back");
        }
        self.records.truncate(len);
        self.index.truncate(len);
    }

    /// k-nearest-neighbor search, closest first.
    ///
    /// With a category, only records of that category are ranked, so up to `k` of them are
    /// returned even when closer records of other categories exist.
    pub fn search(&self, query: &[f32], k: usize, category: Option<&str>) -> Vec<ScoredRecord> {
        let records = &self.records;
        let filter = |position: usize| match category {
            Some(category) => records
                .get(position)
                .map(|r| r.category == category)
                .unwrap_or(false),
            None => true,
        };

        self.index
            .search(query, k, &filter)
            .into_iter()
            .filter_map(|(position, distance)| {
                records.get(position).map(|record| ScoredRecord {
                    record: record.clone(),
                    distance,
                })
            })
            .collect()
    }

    /// Most recently inserted records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<MemoryRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tags;
    use chrono::Utc;

    fn record(id: &str, category: &str) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            content: format!("content of {}", id),
            category: category.to_string(),
            importance: 5,
            created_at: Utc::now(),
            tags: Tags::new(),
        }
    }

    fn sample() -> IndexedCollection {
        let mut c = IndexedCollection::flat(2).unwrap();
        c.push(record("a", "origin"), vec![0.0, 0.0]).unwrap();
        c.push(record("b", "values"), vec![0.1, 0.0]).unwrap();
        c.push(record("c", "origin"), vec![1.0, 0.0]).unwrap();
        c
    }

    #[test]
    fn test_push_keeps_lock_step() {
        let c = sample();
        assert_eq!(c.len(), 3);
        assert_eq!(c.records()[2].id, "c");
        assert_eq!(c.vector(2), Some(&[1.0, 0.0][..]));
    }

    #[test]
    fn test_push_rejects_bad_embedding_without_side_effects() {
        let mut c = sample();
        assert!(matches!(
            c.push(record("d", "origin"), vec![1.0]),
            Err(MemoryError::Embedding(_))
        ));
        assert!(matches!(
            c.push(record("d", "origin"), vec![f32::NAN, 0.0]),
            Err(MemoryError::Embedding(_))
        ));
        assert_eq!(c.len(), 3);
        assert_eq!(c.vector(3), None);
    }

    #[test]
    fn test_rollback_truncates_both_sides() {
        let mut c = sample();
        c.rollback_to(1);
        assert_eq!(c.len(), 1);
        assert_eq!(c.vector(1), None);
        c.push(record("e", "values"), vec![2.0, 2.0]).unwrap();
        assert_eq!(c.vector(1), Some(&[2.0, 2.0][..]));
        assert_eq!(c.records()[1].id, "e");
    }

    #[test]
    fn test_search_category_prefilter() {
        let c = sample();
        let hits = c.search(&[0.1, 0.0], 2, Some("origin"));
        let ids: Vec<&str> = hits.iter().map(|h| h.record.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(hits.iter().all(|h| h.record.category == "origin"));
    }

    #[test]
    fn test_search_unknown_category_is_empty() {
        let c = sample();
        assert!(c.search(&[0.0, 0.0], 3, Some("missing")).is_empty());
    }

    #[test]
    fn test_from_parts_detects_corruption() {
        let err = IndexedCollection::from_parts(2, vec![record("a", "x")], vec![]).unwrap_err();
        assert!(matches!(err, MemoryError::Persistence(_)));

        let err =
            IndexedCollection::from_parts(2, vec![record("a", "x")], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, MemoryError::Persistence(_)));
    }

    #[test]
    fn test_recent_newest_first() {
        let c = sample();
        let ids: Vec<String> = c.recent(2).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
