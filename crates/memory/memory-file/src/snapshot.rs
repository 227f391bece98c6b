//! On-disk snapshot format.

use memory_core::{IndexedCollection, MemoryError, MemoryRecord, MemoryResult};
use serde::{Deserialize, Serialize};

pub(crate) const SNAPSHOT_VERSION: u32 = 1;
pub(crate) const METRIC: &str = "squared_euclidean";

/// Borrowed view written to disk.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    collection: &'a str,
    metric: &'static str,
    dimension: usize,
    records: &'a [MemoryRecord],
    vectors: Vec<&'a [f32]>,
}

/// Owned form read back from disk.
#[derive(Deserialize)]
pub(crate) struct Snapshot {
    pub version: u32,
    pub collection: String,
    pub metric: String,
    pub dimension: usize,
    pub records: Vec<MemoryRecord>,
    pub vectors: Vec<Vec<f32>>,
}

/// Serializes a collection into snapshot bytes.
pub(crate) fn encode(collection_name: &str, collection: &IndexedCollection) -> MemoryResult<Vec<u8>> {
    let mut vectors = Vec::with_capacity(collection.len());
    for position in 0..collection.len() {
        let vector = collection.vector(position).ok_or_else(|| {
            MemoryError::Persistence(format!("missing vector for record {}", position))
        })?;
        vectors.push(vector);
    }

    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        collection: collection_name,
        metric: METRIC,
        dimension: collection.dimension(),
        records: collection.records(),
        vectors,
    };
    Ok(serde_json::to_vec(&snapshot)?)
}

/// Parses snapshot bytes and checks the header.
pub(crate) fn decode(bytes: &[u8]) -> MemoryResult<Snapshot> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)
        .map_err(|e| MemoryError::Persistence(format!("corrupt snapshot: {}", e)))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(MemoryError::Persistence(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }
    if snapshot.metric != METRIC {
        return Err(MemoryError::Configuration(format!(
            "snapshot uses metric {:?}, store uses {:?}",
            snapshot.metric, METRIC
        )));
    }
    Ok(snapshot)
}
