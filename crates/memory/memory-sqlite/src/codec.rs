//! Row value encoding for embeddings, timestamps and tags.

use chrono::{DateTime, Utc};
use memory_core::{MemoryError, MemoryResult, Tags};

pub(crate) fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub(crate) fn decode_embedding(blob: &[u8]) -> MemoryResult<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(MemoryError::Persistence(format!(
            "embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

pub(crate) fn parse_timestamp(raw: &str) -> MemoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MemoryError::Persistence(format!("invalid created_at {:?}: {}", raw, e)))
}

pub(crate) fn encode_tags(tags: &Tags) -> MemoryResult<String> {
    Ok(serde_json::to_string(tags)?)
}

pub(crate) fn decode_tags(raw: &str) -> MemoryResult<Tags> {
    Ok(serde_json::from_str(raw)?)
}
