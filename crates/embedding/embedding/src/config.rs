//! Embedding configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;

/// Default dimension of the local hash embedding.
pub const DEFAULT_LOCAL_DIMENSION: usize = 384;

/// Default OpenAI embedding model.
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// Embedding service provider. Matches .env `EMBEDDING_PROVIDER`: local | fastembed | openai.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Deterministic hash embedding, no model download.
    Local,
    /// Sentence-embedding model run locally through ONNX.
    FastEmbed,
    OpenAI,
}

impl EmbeddingProvider {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "local" | "hash" => Ok(EmbeddingProvider::Local),
            "fastembed" => Ok(EmbeddingProvider::FastEmbed),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            other => anyhow::bail!(
                "unknown EMBEDDING_PROVIDER {:?} (expected local, fastembed or openai)",
                other
            ),
        }
    }
}

/// Embedding service configuration interface.
pub trait EmbeddingConfig: Send + Sync {
    fn provider(&self) -> EmbeddingProvider;
    /// Model name (EMBEDDING_MODEL). `None` selects the provider's default model.
    fn model(&self) -> Option<&str>;
    /// Explicit vector dimension (EMBEDDING_DIM). Overrides the provider's per-model table.
    fn dimension(&self) -> Option<usize>;
    /// API key for OpenAI-compatible embedding (OPENAI_API_KEY).
    fn openai_api_key(&self) -> &str;
    /// Optional base URL for OpenAI-compatible embedding (OPENAI_BASE_URL).
    fn openai_base_url(&self) -> Option<&str>;

    /// Vector dimension of the local hash embedding.
    fn local_dimension(&self) -> usize {
        self.dimension().unwrap_or(DEFAULT_LOCAL_DIMENSION)
    }
}

/// Embedding config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvEmbeddingConfig {
    pub embedding_provider: EmbeddingProvider,
    pub embedding_model: Option<String>,
    pub embedding_dim: Option<usize>,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
}

impl Default for EnvEmbeddingConfig {
    fn default() -> Self {
        Self {
            embedding_provider: EmbeddingProvider::Local,
            embedding_model: None,
            embedding_dim: None,
            openai_api_key: String::new(),
            openai_base_url: None,
        }
    }
}

impl EmbeddingConfig for EnvEmbeddingConfig {
    fn provider(&self) -> EmbeddingProvider {
        self.embedding_provider
    }
    fn model(&self) -> Option<&str> {
        self.embedding_model.as_deref().filter(|s| !s.trim().is_empty())
    }
    fn dimension(&self) -> Option<usize> {
        self.embedding_dim
    }
    fn openai_api_key(&self) -> &str {
        &self.openai_api_key
    }
    fn openai_base_url(&self) -> Option<&str> {
        self.openai_base_url.as_deref().filter(|s| !s.is_empty())
    }
}

impl EnvEmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let embedding_provider =
            EmbeddingProvider::parse(&lookup("EMBEDDING_PROVIDER").unwrap_or_default())?;
        let embedding_model = lookup("EMBEDDING_MODEL").filter(|s| !s.trim().is_empty());
        let embedding_dim = match lookup("EMBEDDING_DIM").filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|e| anyhow::anyhow!("EMBEDDING_DIM {:?} is not a number: {}", raw, e))?,
            ),
            None => None,
        };
        let openai_api_key = lookup("OPENAI_API_KEY").unwrap_or_default();
        let openai_base_url = lookup("OPENAI_BASE_URL").filter(|s| !s.trim().is_empty());
        let config = Self {
            embedding_provider,
            embedding_model,
            embedding_dim,
            openai_api_key,
            openai_base_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate config (openai requires OPENAI_API_KEY, an explicit dimension must be positive).
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == Some(0) {
            anyhow::bail!("EMBEDDING_DIM must be greater than zero");
        }
        if self.embedding_provider == EmbeddingProvider::OpenAI && self.openai_api_key.is_empty() {
            anyhow::bail!("EMBEDDING_PROVIDER=openai requires OPENAI_API_KEY to be set");
        }
        Ok(())
    }
}
