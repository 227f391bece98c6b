//! Memory configuration: trait and env-based implementation.

use memory_core::{validate_collection_name, MemoryError, MemoryResult};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_STM_MAX_TOKENS: usize = 2000;
pub const DEFAULT_COLLECTION_NAME: &str = "agent_memories";
pub const DEFAULT_DATA_DIR: &str = "./data/memory";
pub const DEFAULT_SQLITE_PATH: &str = "./data/memory.db";

/// Long-term backend, chosen once when the store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// JSON snapshot per collection under a data directory.
    File,
    /// One SQLite database holding every collection.
    Sqlite,
}

impl StoreKind {
    /// Parses `MEMORY_STORE_TYPE`: file (default) | sqlite.
    pub fn parse(value: &str) -> MemoryResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "file" => Ok(StoreKind::File),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(MemoryError::Configuration(format!(
                "unknown MEMORY_STORE_TYPE {:?} (expected file or sqlite)",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::File => write!(f, "file"),
            StoreKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Memory tier configuration interface.
pub trait MemoryConfig: Send + Sync {
    /// Short-term token budget.
    fn stm_max_tokens(&self) -> usize;
    /// Long-term collection name.
    fn collection_name(&self) -> &str;
    fn store_kind(&self) -> StoreKind;
    /// Snapshot directory for [`StoreKind::File`].
    fn data_dir(&self) -> &Path;
    /// Database file for [`StoreKind::Sqlite`].
    fn sqlite_path(&self) -> &Path;
}

/// Memory config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvMemoryConfig {
    pub stm_max_tokens: usize,
    pub ltm_collection_name: String,
    pub memory_store_type: StoreKind,
    pub memory_data_dir: PathBuf,
    pub memory_sqlite_path: PathBuf,
}

impl Default for EnvMemoryConfig {
    fn default() -> Self {
        Self {
            stm_max_tokens: DEFAULT_STM_MAX_TOKENS,
            ltm_collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            memory_store_type: StoreKind::File,
            memory_data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            memory_sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
        }
    }
}

impl MemoryConfig for EnvMemoryConfig {
    fn stm_max_tokens(&self) -> usize {
        self.stm_max_tokens
    }
    fn collection_name(&self) -> &str {
        &self.ltm_collection_name
    }
    fn store_kind(&self) -> StoreKind {
        self.memory_store_type
    }
    fn data_dir(&self) -> &Path {
        &self.memory_data_dir
    }
    fn sqlite_path(&self) -> &Path {
        &self.memory_sqlite_path
    }
}

impl EnvMemoryConfig {
    /// Load from environment variables.
    pub fn from_env() -> MemoryResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load through an arbitrary key lookup; unset and blank values take the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MemoryResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let stm_max_tokens = match get("STM_MAX_TOKENS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(MemoryError::Configuration(format!(
                        "STM_MAX_TOKENS {:?} must be a positive integer",
                        raw
                    )))
                }
            },
            None => defaults.stm_max_tokens,
        };

        let ltm_collection_name = get("LTM_COLLECTION_NAME")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.ltm_collection_name);

        let memory_store_type = match get("MEMORY_STORE_TYPE") {
            Some(raw) => StoreKind::parse(&raw)?,
            None => defaults.memory_store_type,
        };

        let config = Self {
            stm_max_tokens,
            ltm_collection_name,
            memory_store_type,
            memory_data_dir: get("MEMORY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.memory_data_dir),
            memory_sqlite_path: get("MEMORY_SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.memory_sqlite_path),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate config (positive budget, well-formed collection name).
    pub fn validate(&self) -> MemoryResult<()> {
        if self.stm_max_tokens == 0 {
            return Err(MemoryError::Configuration(
                "STM_MAX_TOKENS must be positive".to_string(),
            ));
        }
        validate_collection_name(&self.ltm_collection_name)
    }
}
