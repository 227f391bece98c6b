//! Tests for the fastembed embedding service.
//!
//! Tests that load a model are marked with `#[ignore]`: the first run downloads the model
//! into the fastembed cache. Run them with: `cargo test -p fastembed-embedding -- --ignored`.

use embedding::{EmbeddingProvider, EmbeddingService, EnvEmbeddingConfig};
use fastembed_embedding::{FastEmbedding, DEFAULT_FASTEMBED_MODEL};

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn config(model: Option<&str>, dim: Option<usize>) -> EnvEmbeddingConfig {
    EnvEmbeddingConfig {
        embedding_provider: EmbeddingProvider::FastEmbed,
        embedding_model: model.map(str::to_string),
        embedding_dim: dim,
        ..EnvEmbeddingConfig::default()
    }
}

/// **Test: Config is checked before any model is loaded.**
///
/// **Expected:** An unknown model or a dimension that disagrees with the model fails fast.
#[test]
fn test_from_config_rejects_mismatch() {
    assert!(FastEmbedding::from_config(&config(Some("no-such-model"), None)).is_err());

    let err = FastEmbedding::from_config(&config(None, Some(1536))).unwrap_err();
    assert!(err.to_string().contains("does not match"));
}

/// **Test: Recall is semantic, not lexical.**
///
/// **Setup:** Load the default model.
/// **Action:** Embed a question and two facts, one of which answers it with different words.
/// **Expected:** Vectors have 384 dimensions, identical input is deterministic, and the
/// answering fact is closer to the question than the unrelated one.
#[tokio::test]
#[ignore]
async fn test_semantic_similarity() {
    let service = FastEmbedding::from_config(&config(None, None)).expect("load model");
    assert_eq!(service.model(), DEFAULT_FASTEMBED_MODEL);
    assert_eq!(service.dimension(), 384);

    let question = service.embed("Who rides beside you as your attendant?").await.unwrap();
    let answer = service.embed("My squire Egg travels with me everywhere.").await.unwrap();
    let unrelated = service.embed("Rain fell on the harbour all night.").await.unwrap();
    assert_eq!(question.len(), 384);

    assert!(squared_distance(&question, &answer) < squared_distance(&question, &unrelated));

    let again = service.embed("Who rides beside you as your attendant?").await.unwrap();
    assert!(squared_distance(&question, &again) < 1e-6);

    let batch = service
        .embed_batch(&["first fact".to_string(), "second fact".to_string()])
        .await
        .unwrap();
    assert_eq!(batch.len(), 2);

    assert!(service.embed("   ").await.is_err());
}
