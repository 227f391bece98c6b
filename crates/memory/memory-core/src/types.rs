//! # Core Types
//!
//! This module defines the core types for agent memory.
//!
//! ## Role
//!
//! Represents the author of a conversation turn.
//!
//! ### Variants
//!
//! - `User`: Message sent by the user
//! - `Assistant`: Message sent by the agent
//!
//! ## Turn
//!
//! One exchange unit held in the short-term buffer. Immutable once stored: eviction removes
//! the whole turn, it never edits one.
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `role` | `Role` | Who produced the turn |
//! | `content` | `String` | Turn text |
//! | `created_at` | `DateTime<Utc>` | Set at insertion |
//! | `tags` | `Tags` | Caller-defined tags (e.g. `importance`) |
//!
//! ## MemoryRecord
//!
//! One fact held in the long-term store.
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `id` | `String` | `<category>_<unix-nanos>`, unique within the process |
//! | `content` | `String` | Fact text |
//! | `category` | `String` | Free-form label used by the category filter |
//! | `importance` | `i32` | Caller supplied, conventionally 1-10 |
//! | `created_at` | `DateTime<Utc>` | Set at insertion |
//! | `tags` | `Tags` | Caller-defined tags |
//!
//! The embedding of a record lives in the store's vector index at the same position as the
//! record, see [`crate::collection::IndexedCollection`].
//!
//! ## Example
//!
//! ```rust
//! use memory_core::{Role, Tags, Turn};
//!
//! let mut tags = Tags::new();
//! tags.insert("importance".to_string(), serde_json::json!(8));
//! let turn = Turn::new(Role::User, "Remember that I like tea", tags);
//! assert_eq!(turn.importance(), Some(8));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::tokens::estimate_tokens;

/// Tag key carrying the consolidation importance of a turn.
pub const IMPORTANCE_TAG: &str = "importance";

/// Open string-keyed extension map for caller-defined tags.
pub type Tags = BTreeMap<String, serde_json::Value>;

/// Represents the author of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation turn held in the short-term buffer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub tags: Tags,
}

impl Turn {
    /// Creates a new turn stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>, tags: Tags) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
            tags,
        }
    }

    /// Token measure of `content`.
    pub fn tokens(&self) -> usize {
        estimate_tokens(&self.content)
    }

    /// Importance carried in `tags["importance"]`, if it is numeric.
    ///
    /// Floats are truncated toward zero.
    pub fn importance(&self) -> Option<i32> {
        let value = self.tags.get(IMPORTANCE_TAG)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
            .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }
}

/// One fact held in the long-term store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub id: String,
    pub content: String,
    pub category: String,
    pub importance: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Tags,
}

/// A record returned by a similarity query with its distance to the query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: MemoryRecord,
    /// Squared Euclidean distance; smaller is closer.
    pub distance: f32,
}
