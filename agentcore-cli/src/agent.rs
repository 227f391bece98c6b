//! Agent turn loop over the memory facade.
//!
//! One message: record the user turn, recall [`RECALL_K`] memories, take the last
//! [`RECENT_TURNS`] turns, generate a reply, record the reply.

use memory::{MemoryManager, MemoryResult, Role, ScoredRecord, Tags, Turn, IMPORTANCE_TAG};
use serde_json::json;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::responder::ResponseGenerator;
use crate::seed::SeedMemory;

/// Memories recalled per message.
pub const RECALL_K: usize = 3;

/// Recent turns included in the prompt context.
pub const RECENT_TURNS: usize = 5;

/// Importance attached to turns the user explicitly asks to remember.
pub const REMEMBER_IMPORTANCE: i32 = 8;

/// Opening line of the default persona, also used to answer "who are you".
pub const KNIGHT_GREETING: &str = "Well met, friend. I am Ser Duncan the Tall, a hedge knight sworn to \
    uphold chivalry and honor. Though I come from humble beginnings, I serve the realm as best I can. \
    How may I be of service to you this day?";

/// Who the agent speaks as.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub name: String,
    pub system_prompt: String,
    pub greeting: String,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            name: "Ser Duncan".to_string(),
            system_prompt: "You are Ser Duncan the Tall, a hedge knight of the Seven Kingdoms. \
                Draw on your memories to answer in the plain, humble voice of an honorable knight."
                .to_string(),
            greeting: KNIGHT_GREETING.to_string(),
        }
    }
}

/// Everything the response generator sees for one message.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub system_prompt: String,
    pub user_message: String,
    /// Oldest first; ends with the user turn being answered.
    pub recent_turns: Vec<Turn>,
    /// Closest first.
    pub memories: Vec<ScoredRecord>,
}

impl PromptContext {
    /// Renders the context as a plain-text prompt.
    pub fn render(&self) -> String {
        let mut out = format!("SYSTEM: {}\n\n", self.system_prompt);
        if !self.memories.is_empty() {
            out.push_str("RELEVANT MEMORIES:\n");
            for hit in &self.memories {
                let _ = writeln!(
                    out,
                    "- {} (importance: {})",
                    hit.record.content, hit.record.importance
                );
            }
            out.push('\n');
        }
        out.push_str("RECENT CONVERSATION:\n");
        for turn in &self.recent_turns {
            let _ = writeln!(out, "{}: {}", turn.role.as_str().to_uppercase(), turn.content);
        }
        out
    }
}

pub struct Agent {
    memory: Arc<MemoryManager>,
    responder: Arc<dyn ResponseGenerator>,
    profile: AgentProfile,
}

impl Agent {
    pub fn new(
        memory: Arc<MemoryManager>,
        responder: Arc<dyn ResponseGenerator>,
        profile: AgentProfile,
    ) -> Self {
        Self {
            memory,
            responder,
            profile,
        }
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Answers one user message, recording both sides of the exchange.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn process_message(&self, text: &str) -> anyhow::Result<String> {
        self.memory.record_turn(Role::User, text).await;
        let memories = self.memory.recall(text, RECALL_K).await?;
        let context = PromptContext {
            system_prompt: self.profile.system_prompt.clone(),
            user_message: text.to_string(),
            recent_turns: self.memory.recent(RECENT_TURNS).await,
            memories,
        };

        let reply = self.responder.generate(&context).await?;
        self.memory.record_turn(Role::Assistant, &reply).await;
        info!(memories = context.memories.len(), reply_len = reply.len(), "message processed");
        Ok(reply)
    }

    /// Records `text` as a user turn with importance [`REMEMBER_IMPORTANCE`] and consolidates it.
    pub async fn remember_turn(&self, text: &str) -> MemoryResult<Option<String>> {
        let mut tags = Tags::new();
        tags.insert(IMPORTANCE_TAG.to_string(), json!(REMEMBER_IMPORTANCE));
        let turn = self.memory.record_turn_with_tags(Role::User, text, tags).await;
        self.memory.consolidate(&turn).await
    }

    /// Inserts every seed memory. Returns the number inserted.
    pub async fn seed(&self, memories: &[SeedMemory]) -> MemoryResult<usize> {
        for m in memories {
            self.memory
                .remember(&m.content, &m.category, m.importance, Tags::new())
                .await?;
        }
        info!(count = memories.len(), "seed memories inserted");
        Ok(memories.len())
    }

    /// Seeds only when the long-term store is empty, so reopening never duplicates the seed.
    pub async fn seed_if_empty(&self, memories: &[SeedMemory]) -> MemoryResult<usize> {
        let existing = self.memory.stats().await.ltm_record_count;
        if existing > 0 {
            info!(existing, "long-term store already populated, seed skipped");
            return Ok(0);
        }
        self.seed(memories).await
    }
}
