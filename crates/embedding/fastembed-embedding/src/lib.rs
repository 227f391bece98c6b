//! # FastEmbed Embedding Service
//!
//! [`EmbeddingService`] over a sentence-embedding model run locally with ONNX runtime
//! through `fastembed`. The model is downloaded into the fastembed cache on first use and
//! loaded once per service; no network is needed afterwards.
//!
//! ## Supported Models
//!
//! | `EMBEDDING_MODEL` | Dimension |
//! |-------------------|-----------|
//! | `all-MiniLM-L6-v2` (default) | 384 |
//! | `bge-small-en-v1.5` | 384 |
//! | `bge-base-en-v1.5` | 768 |
//! | `bge-large-en-v1.5` | 1024 |
//!
//! Names are matched case-insensitively, with or without the `sentence-transformers/` or
//! `BAAI/` prefix.

use async_trait::async_trait;
use embedding::{EmbeddingConfig, EmbeddingService};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Model used when `EMBEDDING_MODEL` is unset.
pub const DEFAULT_FASTEMBED_MODEL: &str = "all-MiniLM-L6-v2";

/// A supported model and the length of the vectors it produces.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: &'static str,
    pub model: EmbeddingModel,
    pub dimension: usize,
}

/// Looks up a model by name.
pub fn model_spec(name: &str) -> anyhow::Result<ModelSpec> {
    let lowered = name.trim().to_lowercase();
    let short = lowered
        .strip_prefix("sentence-transformers/")
        .or_else(|| lowered.strip_prefix("baai/"))
        .unwrap_or(&lowered);
    let spec = match short {
        "all-minilm-l6-v2" => ModelSpec {
            name: "all-MiniLM-L6-v2",
            model: EmbeddingModel::AllMiniLML6V2,
            dimension: 384,
        },
        "bge-small-en-v1.5" => ModelSpec {
            name: "bge-small-en-v1.5",
            model: EmbeddingModel::BGESmallENV15,
            dimension: 384,
        },
        "bge-base-en-v1.5" => ModelSpec {
            name: "bge-base-en-v1.5",
            model: EmbeddingModel::BGEBaseENV15,
            dimension: 768,
        },
        "bge-large-en-v1.5" => ModelSpec {
            name: "bge-large-en-v1.5",
            model: EmbeddingModel::BGELargeENV15,
            dimension: 1024,
        },
        _ => anyhow::bail!(
            "unsupported fastembed model {:?} (expected all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5 or bge-large-en-v1.5)",
            name
        ),
    };
    Ok(spec)
}

/// Local sentence-embedding service.
///
/// Inference is CPU-bound and runs on the blocking pool; the model sits behind a mutex
/// because a session is driven by one caller at a time.
#[derive(Clone)]
pub struct FastEmbedding {
    model: Arc<Mutex<TextEmbedding>>,
    spec: ModelSpec,
}

impl std::fmt::Debug for FastEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedding")
            .field("model", &self.spec.name)
            .field("dimension", &self.spec.dimension)
            .finish()
    }
}

impl FastEmbedding {
    /// Loads `model_name`, downloading it into `cache_dir` (or fastembed's default cache)
    /// when it is not there yet. Blocks while the model is fetched and loaded.
    pub fn new(model_name: &str, cache_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let spec = model_spec(model_name)?;
        let mut options = InitOptions::new(spec.model.clone()).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }
        let model = TextEmbedding::try_new(options)
            .map_err(|e| anyhow::anyhow!("cannot load fastembed model {}: {}", spec.name, e))?;
        info!(model = spec.name, dimension = spec.dimension, "fastembed model loaded");
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            spec,
        })
    }

    /// Loads the model named by `config.model()`, or [`DEFAULT_FASTEMBED_MODEL`].
    ///
    /// An explicit `config.dimension()` must agree with the model's own dimension.
    pub fn from_config(config: &dyn EmbeddingConfig) -> anyhow::Result<Self> {
        let name = config.model().unwrap_or(DEFAULT_FASTEMBED_MODEL);
        let spec = model_spec(name)?;
        if let Some(dimension) = config.dimension() {
            if dimension != spec.dimension {
                anyhow::bail!(
                    "EMBEDDING_DIM={} does not match model {} ({} dimensions)",
                    dimension,
                    spec.name,
                    spec.dimension
                );
            }
        }
        Self::new(spec.name, None)
    }

    /// Canonical name of the loaded model.
    pub fn model(&self) -> &str {
        self.spec.name
    }

    async fn run(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        for text in &texts {
            if text.trim().is_empty() {
                anyhow::bail!("cannot embed empty text");
            }
        }
        let model = Arc::clone(&self.model);
        let expected = texts.len();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| anyhow::anyhow!("fastembed model lock poisoned"))?;
            model
                .embed(texts, None)
                .map_err(|e| anyhow::anyhow!("fastembed inference failed: {}", e))
        })
        .await
        .map_err(|e| anyhow::anyhow!("fastembed task failed: {}", e))??;

        if vectors.len() != expected {
            anyhow::bail!("expected {} embeddings, got {}", expected, vectors.len());
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingService for FastEmbedding {
    #[instrument(skip(self, text), fields(model = self.spec.name, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let mut vectors = self.run(vec![text.to_string()]).await?;
        let vector = vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no embedding returned"))?;
        debug!(dimension = vector.len(), "fastembed embed done");
        Ok(vector)
    }

    #[instrument(skip(self, texts), fields(model = self.spec.name, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        self.run(texts.to_vec()).await
    }

    fn dimension(&self) -> usize {
        self.spec.dimension
    }
}
