//! # File Vector Store
//!
//! Long-term store backed by an in-process [`memory_core::FlatIndex`] and a JSON snapshot on
//! disk, one snapshot file per collection:
//!
//! ```text
//! <data_dir>/<collection>.json      current snapshot
//! <data_dir>/<collection>.json.tmp  in-flight write, renamed over the snapshot when complete
//! ```
//!
//! The snapshot holds the records and their vectors as two parallel sequences. Every insert
//! rewrites it through the temp file and a rename, so a crash mid-write leaves the previous
//! snapshot intact. A failed write rolls the in-memory append back.
//!
//! ## Example
//!
//! ```rust,ignore
//! use embedding::HashEmbedding;
//! use memory_file::{FileStoreConfig, FileVectorStore};
//! use std::sync::Arc;
//!
//! let config = FileStoreConfig::new("./data/memory", "agent_memories");
//! let store = FileVectorStore::open(config, Arc::new(HashEmbedding::new(384)?)).await?;
//! ```

mod config;
mod snapshot;
mod store;

pub use config::FileStoreConfig;
pub use store::FileVectorStore;
