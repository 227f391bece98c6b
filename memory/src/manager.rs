//! # Memory Facade
//!
//! [`MemoryManager`] owns one [`ShortTermBuffer`] and shares one [`LongTermStore`]. Turns are
//! recorded into the buffer only; the store is written by explicit [`MemoryManager::remember`]
//! calls and by [`MemoryManager::consolidate`], which promotes a turn whose `importance` tag
//! reaches [`CONSOLIDATION_THRESHOLD`].
//!
//! Long-term errors are returned to the caller unchanged and never retried here.

use embedding::EmbeddingService;
use memory_core::{
    LongTermStore, MemoryRecord, MemoryResult, Role, ScoredRecord, Tags, Turn,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::MemoryConfig;
use crate::factory::open_store;
use crate::short_term::ShortTermBuffer;

/// Minimum `importance` tag for a turn to be consolidated.
pub const CONSOLIDATION_THRESHOLD: i32 = 7;

/// Category under which consolidated turns are stored.
pub const CONSOLIDATION_CATEGORY: &str = "conversation";

/// Counters over both tiers, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub stm_message_count: usize,
    pub stm_token_count: usize,
    pub stm_capacity: usize,
    pub ltm_record_count: usize,
}

/// Facade over the short-term buffer and the long-term store.
pub struct MemoryManager {
    short_term: RwLock<ShortTermBuffer>,
    long_term: Arc<dyn LongTermStore>,
}

impl MemoryManager {
    /// Creates a manager with an empty buffer of `stm_max_tokens` over `long_term`.
    pub fn new(stm_max_tokens: usize, long_term: Arc<dyn LongTermStore>) -> MemoryResult<Self> {
        let short_term = ShortTermBuffer::new(stm_max_tokens)?;
        Ok(Self {
            short_term: RwLock::new(short_term),
            long_term,
        })
    }

    /// Opens the configured long-term store and builds a manager over it.
    pub async fn from_config(
        config: &dyn MemoryConfig,
        embedder: Arc<dyn EmbeddingService>,
    ) -> MemoryResult<Self> {
        let stm = ShortTermBuffer::new(config.stm_max_tokens())?;
        let long_term = open_store(config, embedder).await?;
        info!(
            stm_capacity = stm.capacity(),
            collection = %long_term.collection(),
            ltm_records = long_term.count().await,
            "memory manager ready"
        );
        Ok(Self {
            short_term: RwLock::new(stm),
            long_term,
        })
    }

    /// Shared handle to the long-term store.
    pub fn long_term(&self) -> &Arc<dyn LongTermStore> {
        &self.long_term
    }

    /// Appends an untagged turn to the short-term buffer.
    pub async fn record_turn(&self, role: Role, content: &str) -> Turn {
        self.record_turn_with_tags(role, content, Tags::new()).await
    }

    /// Appends a tagged turn (e.g. carrying `importance`) to the short-term buffer.
    pub async fn record_turn_with_tags(&self, role: Role, content: &str, tags: Tags) -> Turn {
        let mut stm = self.short_term.write().await;
        let turn = stm.append(role, content, tags);
        debug!(
            role = %role,
            tokens = turn.tokens(),
            stm_messages = stm.len(),
            stm_tokens = stm.token_count(),
            "turn recorded"
        );
        turn
    }

    /// Nearest long-term memories to `query`, unfiltered.
    pub async fn recall(&self, query: &str, k: usize) -> MemoryResult<Vec<ScoredRecord>> {
        self.long_term.query(query, k, None).await
    }

    /// Nearest long-term memories to `query` within `category`.
    pub async fn recall_in(
        &self,
        query: &str,
        k: usize,
        category: &str,
    ) -> MemoryResult<Vec<ScoredRecord>> {
        self.long_term.query_in(query, k, category).await
    }

    /// Promotes `turn` into the long-term store when its importance reaches the threshold.
    ///
    /// Returns the new record id, or `None` when the turn is below threshold or carries no
    /// numeric importance.
    #[instrument(skip(self, turn), fields(role = %turn.role, importance = ?turn.importance()))]
    pub async fn consolidate(&self, turn: &Turn) -> MemoryResult<Option<String>> {
        let importance = match turn.importance() {
            Some(i) if i >= CONSOLIDATION_THRESHOLD => i,
            _ => {
                debug!("below consolidation threshold, skipped");
                return Ok(None);
            }
        };

        let mut tags = turn.tags.clone();
        tags.insert("role".to_string(), json!(turn.role.as_str()));
        tags.insert("turn_created_at".to_string(), json!(turn.created_at.to_rfc3339()));

        let id = self
            .long_term
            .insert(&turn.content, CONSOLIDATION_CATEGORY, importance, tags)
            .await?;
        info!(id = %id, importance, "turn consolidated");
        Ok(Some(id))
    }

    /// Inserts a fact straight into the long-term store.
    pub async fn remember(
        &self,
        content: &str,
        category: &str,
        importance: i32,
        tags: Tags,
    ) -> MemoryResult<String> {
        self.long_term.insert(content, category, importance, tags).await
    }

    /// Last `k` short-term turns, oldest first.
    pub async fn recent(&self, k: usize) -> Vec<Turn> {
        self.short_term.read().await.recent(k)
    }

    /// Most recent long-term records, newest first.
    pub async fn list(&self, limit: usize) -> MemoryResult<Vec<MemoryRecord>> {
        self.long_term.list(limit).await
    }

    /// Empties the short-term buffer. The long-term store is untouched.
    pub async fn clear(&self) {
        self.short_term.write().await.clear();
        info!("short-term memory cleared");
    }

    pub async fn stats(&self) -> MemoryStats {
        let (stm_message_count, stm_token_count, stm_capacity) = {
            let stm = self.short_term.read().await;
            (stm.len(), stm.token_count(), stm.capacity())
        };
        MemoryStats {
            stm_message_count,
            stm_token_count,
            stm_capacity,
            ltm_record_count: self.long_term.count().await,
        }
    }
}
