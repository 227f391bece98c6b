//! # memory-core
//!
//! Core types and traits shared by the short-term buffer, the long-term store backends
//! and the memory facade.
//!
//! ## Modules
//!
//! - [`types`] - `Role`, `Turn`, `MemoryRecord`, `ScoredRecord`, `Tags`
//! - [`error`] - `MemoryError` taxonomy (embedding / persistence / configuration)
//! - [`tokens`] - Token measure used for budgeting and reporting
//! - [`id`] - Record id generation
//! - [`index`] - `VectorIndex` trait and the exact `FlatIndex`
//! - [`collection`] - `IndexedCollection`: records and index kept in lock-step
//! - [`store`] - `LongTermStore` trait implemented by every backend
//!
//! ## External Interactions
//!
//! - **memory-file / memory-sqlite**: implement [`LongTermStore`] on top of [`IndexedCollection`]
//! - **memory**: composes a `ShortTermBuffer` of [`Turn`]s with a [`LongTermStore`]

pub mod collection;
pub mod error;
pub mod id;
pub mod index;
pub mod store;
pub mod tokens;
pub mod types;

pub use collection::IndexedCollection;
pub use error::{MemoryError, MemoryResult};
pub use id::generate_record_id;
pub use index::{squared_euclidean, FlatIndex, VectorIndex};
pub use store::{embed_text, validate_collection_name, LongTermStore};
pub use tokens::estimate_tokens;
pub use types::{MemoryRecord, Role, ScoredRecord, Tags, Turn, IMPORTANCE_TAG};
