//! # Short-Term Buffer
//!
//! Ordered log of recent turns bounded by a token budget. After every append the oldest turns
//! are evicted while the total exceeds the budget and more than one turn remains, so a single
//! turn larger than the whole budget is kept intact.
//!
//! Eviction is FIFO on insertion order; reading the buffer never affects it.

use memory_core::{MemoryError, MemoryResult, Role, Tags, Turn};
use std::collections::VecDeque;
use tracing::debug;

/// Token-budgeted FIFO of conversation turns.
#[derive(Debug, Clone)]
pub struct ShortTermBuffer {
    turns: VecDeque<Turn>,
    budget: usize,
    token_count: usize,
}

impl ShortTermBuffer {
    /// Creates an empty buffer with the given token budget.
    ///
    /// # Errors
    ///
    /// [`MemoryError::Configuration`] when `budget` is zero.
    pub fn new(budget: usize) -> MemoryResult<Self> {
        if budget == 0 {
            return Err(MemoryError::Configuration(
                "short-term token budget must be positive".to_string(),
            ));
        }
        Ok(Self {
            turns: VecDeque::new(),
            budget,
            token_count: 0,
        })
    }

    /// Appends a turn at the tail, evicts, and returns a copy of the stored turn.
    pub fn append(&mut self, role: Role, content: impl Into<String>, tags: Tags) -> Turn {
        let turn = Turn::new(role, content, tags);
        self.push(turn.clone());
        turn
    }

    /// Appends an already built turn, then evicts. Returns how many turns were evicted.
    ///
    /// The turn is measured from its content here, so the running count always equals the
    /// token measure summed over the stored turns.
    pub(crate) fn push(&mut self, turn: Turn) -> usize {
        self.token_count += turn.tokens();
        self.turns.push_back(turn);
        self.evict()
    }

    fn evict(&mut self) -> usize {
        let mut evicted = 0;
        while self.token_count > self.budget && self.turns.len() > 1 {
            if let Some(oldest) = self.turns.pop_front() {
                self.token_count -= oldest.tokens();
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(
                evicted,
                remaining = self.turns.len(),
                remaining_tokens = self.token_count,
                budget = self.budget,
                "short-term eviction"
            );
        }
        evicted
    }

    /// Last `k` turns in insertion order, copied.
    pub fn recent(&self, k: usize) -> Vec<Turn> {
        let skip = self.turns.len().saturating_sub(k);
        self.turns.iter().skip(skip).cloned().collect()
    }

    /// Drops every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.token_count = 0;
    }

    /// Sum of the token measure over every stored turn.
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Configured token budget.
    pub fn capacity(&self) -> usize {
        self.budget
    }
}
