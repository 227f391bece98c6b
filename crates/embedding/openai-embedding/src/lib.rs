//! # OpenAI Embedding Service
//!
//! This crate provides an implementation of the `EmbeddingService` trait using OpenAI's
//! embedding API (or any OpenAI-compatible endpoint via a base URL).
//!
//! ## Example
//!
//! ```rust,no_run
//! use openai_embedding::OpenAIEmbedding;
//! use embedding::EmbeddingService;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let service = OpenAIEmbedding::new("sk-...".to_string(), "text-embedding-3-small".to_string());
//!     let embedding = service.embed("Hello world").await?;
//!     assert_eq!(embedding.len(), service.dimension());
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Models
//!
//! - `text-embedding-3-small`: 1536 dimensions
//! - `text-embedding-3-large`: 3072 dimensions
//! - `text-embedding-ada-002`: 1536 dimensions (legacy model)
//!
//! The dimension is fixed per model, which is what lets a long-term store detect that a
//! collection was built with a different model. Models outside this table, typically behind
//! an OpenAI-compatible base URL, need their dimension set explicitly through
//! [`OpenAIEmbedding::with_dimension`] or `EMBEDDING_DIM`.

use async_openai::{types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use embedding::{EmbeddingConfig, EmbeddingService};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const EMBED_TIMEOUT: Duration = Duration::from_secs(30);
const EMBED_BATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Returns the output dimension of an OpenAI embedding model, assuming 1536 for unknown names.
pub fn dimension_for_model(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

/// OpenAI embedding service implementation. Holds the async-openai client and model name.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedding {
    client: Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl OpenAIEmbedding {
    /// Creates a new OpenAI embedding service.
    ///
    /// If `api_key` is empty, OPENAI_API_KEY is read from the environment.
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, None)
    }

    /// Creates a new OpenAI embedding service with an optional OpenAI-compatible base URL.
    pub fn new_with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let api_key = if api_key.is_empty() {
            std::env::var("OPENAI_API_KEY").unwrap_or_default()
        } else {
            api_key
        };

        let mut openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url.filter(|s| !s.is_empty()) {
            openai_config = openai_config.with_api_base(url);
        }
        let client = Client::with_config(openai_config);
        let dimension = dimension_for_model(&model);

        Self {
            client,
            model,
            dimension,
        }
    }

    /// Overrides the per-model dimension table.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Creates a service with the default model `text-embedding-3-small`.
    pub fn with_api_key(api_key: String) -> Self {
        Self::new(api_key, embedding::DEFAULT_OPENAI_MODEL.to_string())
    }

    /// Creates a service from an [`EmbeddingConfig`] (model, key, base URL, dimension).
    pub fn from_config(config: &dyn EmbeddingConfig) -> Self {
        let service = Self::new_with_base_url(
            config.openai_api_key().to_string(),
            config
                .model()
                .unwrap_or(embedding::DEFAULT_OPENAI_MODEL)
                .to_string(),
            config.openai_base_url(),
        );
        match config.dimension() {
            Some(dimension) => service.with_dimension(dimension),
            None => service,
        }
    }

    /// Returns the embedding model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

fn reject_blank(text: &str) -> Result<(), anyhow::Error> {
    if text.trim().is_empty() {
        anyhow::bail!("cannot embed empty text");
    }
    Ok(())
}

#[async_trait]
impl EmbeddingService for OpenAIEmbedding {
    /// Generates an embedding vector for a single text string using OpenAI's API.
    ///
    /// Blank input is rejected before any request is sent. The request is bounded by a
    /// 30 second timeout.
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        reject_blank(text)?;

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(vec![text])
            .build()?;

        let embeddings = self.client.embeddings();
        let response = match tokio::time::timeout(EMBED_TIMEOUT, embeddings.create(request)).await {
            Ok(Ok(r)) => {
                debug!("OpenAI embed response received");
                r
            }
            Ok(Err(e)) => {
                warn!(error = %e, "OpenAI embed request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout_secs = EMBED_TIMEOUT.as_secs(), "OpenAI embed request timed out");
                return Err(anyhow::anyhow!(
                    "OpenAI embed request timed out after {} seconds",
                    EMBED_TIMEOUT.as_secs()
                ));
            }
        };

        let embedding = match response.data.into_iter().next() {
            Some(item) => item.embedding,
            None => {
                warn!("OpenAI embed response has no embedding data");
                return Err(anyhow::anyhow!("No embedding in response"));
            }
        };

        info!(dimension = embedding.len(), "OpenAI embed done");
        Ok(embedding)
    }

    /// Generates embedding vectors for multiple texts in a single API call.
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            debug!("OpenAI embed_batch empty input, skipping");
            return Ok(vec![]);
        }
        for text in texts {
            reject_blank(text)?;
        }

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(inputs)
            .build()?;

        let embeddings = self.client.embeddings();
        let response =
            match tokio::time::timeout(EMBED_BATCH_TIMEOUT, embeddings.create(request)).await {
                Ok(Ok(r)) => r,
                Ok(Err(e)) => {
                    warn!(error = %e, "OpenAI embed_batch request failed");
                    return Err(e.into());
                }
                Err(_) => {
                    warn!(
                        timeout_secs = EMBED_BATCH_TIMEOUT.as_secs(),
                        "OpenAI embed_batch request timed out"
                    );
                    return Err(anyhow::anyhow!(
                        "OpenAI embed_batch request timed out after {} seconds",
                        EMBED_BATCH_TIMEOUT.as_secs()
                    ));
                }
            };

        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|item| item.embedding).collect();

        if embeddings.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = embeddings.len(),
                "OpenAI embed_batch response count mismatch"
            );
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ));
        }

        info!(count = embeddings.len(), "OpenAI embed_batch done");
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// Unit/integration tests live in tests/openai_embedding_test.rs
