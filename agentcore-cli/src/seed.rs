//! Seed memories: a JSON array of `{content, category, importance}` objects.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMemory {
    pub content: String,
    pub category: String,
    pub importance: i32,
}

pub fn parse_seed(json: &str) -> Result<Vec<SeedMemory>> {
    let memories: Vec<SeedMemory> = serde_json::from_str(json).context("parse seed memories")?;
    if let Some(pos) = memories.iter().position(|m| m.content.trim().is_empty()) {
        anyhow::bail!("seed memory #{} has empty content", pos);
    }
    Ok(memories)
}

pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<SeedMemory>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read seed file {}", path.display()))?;
    parse_seed(&raw).with_context(|| format!("seed file {}", path.display()))
}
