//! Memory error types.
//!
//! Used by the long-term store backends and surfaced unchanged through the memory facade.

use thiserror::Error;

/// Errors that can occur in long-term store and facade operations.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// Input could not be vectorized, or the embedding service returned a malformed vector.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Durable read or write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid construction parameters (token budget, collection name, dimension mismatch).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<std::io::Error> for MemoryError {
    fn from(err: std::io::Error) -> Self {
        MemoryError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        MemoryError::Persistence(err.to_string())
    }
}

pub type MemoryResult<T> = std::result::Result<T, MemoryError>;
