//! # Memory Crate
//!
//! Two memory tiers for a conversational agent, composed behind one facade.
//!
//! ## Modules
//!
//! - [`short_term`] - [`ShortTermBuffer`], the token-budgeted FIFO of recent turns
//! - [`manager`] - [`MemoryManager`], the facade over both tiers (record, recall, consolidate)
//! - [`config`] - [`MemoryConfig`] and its env-based implementation
//! - [`factory`] - construction of the configured long-term backend and embedding service
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memory::{EnvMemoryConfig, MemoryManager, Role};
//! use embedding::HashEmbedding;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), memory::MemoryError> {
//! let config = EnvMemoryConfig::from_env()?;
//! let embedder = Arc::new(HashEmbedding::new(384).map_err(|e| memory::MemoryError::Configuration(e.to_string()))?);
//! let manager = MemoryManager::from_config(&config, embedder).await?;
//!
//! manager.record_turn(Role::User, "Who is your squire?").await;
//! let memories = manager.recall("Who is your squire?", 3).await?;
//! let stats = manager.stats().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod factory;
pub mod manager;
pub mod short_term;


pub use config::{EnvMemoryConfig, MemoryConfig, StoreKind};
pub use factory::{embedding_service_from_config, open_store};
pub use manager::{MemoryManager, MemoryStats, CONSOLIDATION_CATEGORY, CONSOLIDATION_THRESHOLD};
pub use short_term::ShortTermBuffer;

pub use memory_core::{
    estimate_tokens, LongTermStore, MemoryError, MemoryRecord, MemoryResult, Role, ScoredRecord,
    Tags, Turn, IMPORTANCE_TAG,
};
