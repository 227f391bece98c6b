//! Reply generation behind the [`ResponseGenerator`] trait.
//!
//! [`TemplateResponder`] is the offline implementation: keyword rules pick an opening line and
//! the closest recalled memory, if any, is quoted after it.

use async_trait::async_trait;

use crate::agent::{PromptContext, KNIGHT_GREETING};

/// Turns a prompt context (user message, recent turns, recalled memories) into reply text.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, context: &PromptContext) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
struct Rule {
    keywords: Vec<String>,
    reply: String,
    quote_memory: bool,
}

/// Deterministic keyword-rule responder.
#[derive(Debug, Clone)]
pub struct TemplateResponder {
    rules: Vec<Rule>,
    fallback: String,
    recall_prefix: String,
}

impl Default for TemplateResponder {
    fn default() -> Self {
        Self::new("I hear your words, friend. I strive to serve with honor and protect those who cannot protect themselves.")
            .with_rule(
                &["honor", "duty", "knight", "chivalry"],
                "Aye, honor and duty are the foundation of knighthood. A knight's worth is measured by his deeds, not his name or castle.",
            )
            .with_rule(
                &["egg", "aegon", "squire", "prince"],
                "You speak of my squire, young Egg. He is clever and brave, and I am proud to have him at my side.",
            )
            .with_rule(
                &["fight", "battle", "combat", "war"],
                "I have seen my share of battles. A knight must defend the innocent, but I take no joy in killing.",
            )
            .with_rule(
                &["arlan", "master", "mentor"],
                "Ser Arlan of Pennytree was the only father I ever knew. He taught me everything I know about being a knight.",
            )
            .with_rule(
                &["ashford", "tourney", "trial"],
                "The Tourney at Ashford Meadow changed my life.",
            )
            .with_rule(
                &["tall", "height", "size"],
                "I'm nearly seven feet tall, which is how I got my name. People remember Dunk the Tall.",
            )
            .with_rule(
                &["shield", "sigil", "falling star", "elm"],
                "My shield bears a falling star and an elm tree on a sunset field.",
            )
            .with_rule(
                &["flea bottom", "orphan", "lowborn"],
                "I grew up in Flea Bottom, the poorest part of King's Landing. Those years taught me never to look down on the smallfolk.",
            )
            .with_rule(
                &["thunder", "horse", "destrier"],
                "Thunder is my destrier, a chestnut stallion I inherited from Ser Arlan.",
            )
            .with_rule(
                &["who are you", "tell me about yourself", "introduce"],
                KNIGHT_GREETING,
            )
            .without_memory_quote()
            .with_rule(
                &["hedge knight", "wandering", "travel"],
                "We hedge knights have no lands or keeps, just our honor and our swords.",
            )
    }
}

impl TemplateResponder {
    /// Creates a responder with no rules that always answers `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback: fallback.into(),
            recall_prefix: "I recall:".to_string(),
        }
    }

    /// Adds a rule; the first rule with a keyword contained in the message wins.
    pub fn with_rule(mut self, keywords: &[&str], reply: impl Into<String>) -> Self {
        self.rules.push(Rule {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            reply: reply.into(),
            quote_memory: true,
        });
        self
    }

    /// Makes the last added rule answer with its reply alone, without quoting a memory.
    pub fn without_memory_quote(mut self) -> Self {
        if let Some(rule) = self.rules.last_mut() {
            rule.quote_memory = false;
        }
        self
    }

    pub fn with_recall_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.recall_prefix = prefix.into();
        self
    }

    fn matching_rule(&self, message: &str) -> Option<&Rule> {
        let message = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| message.contains(k.as_str())))
    }
}

#[async_trait]
impl ResponseGenerator for TemplateResponder {
    async fn generate(&self, context: &PromptContext) -> anyhow::Result<String> {
        let rule = self.matching_rule(&context.user_message);
        let opening = rule.map(|r| r.reply.as_str()).unwrap_or(&self.fallback);
        let quote = rule.map_or(true, |r| r.quote_memory);
        Ok(match context.memories.first() {
            Some(closest) if quote => {
                format!("{} {} {}", opening, self.recall_prefix, closest.record.content)
            }
            _ => opening.to_string(),
        })
    }
}
