pub mod cache;
pub mod config;
pub mod hash_embedder;
pub mod similarity;
pub mod tokenizer;

use std::sync::Arc;

pub use cache::CachedEmbedder;
pub use config::{EmbedderBackend, EmbeddingConfig, EmbeddingConfigError};
pub use hash_embedder::HashEmbedder;
pub use similarity::{DimensionMismatch, cosine_similarity};

/// Result of asking a provider for a vector.
///
/// `Unavailable` is an ordinary value: the ranker checks it and switches the whole
/// request to keyword matching. It is never retried here.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingOutcome {
    Embedded(Vec<f32>),
    Unavailable { reason: String },
}

impl EmbeddingOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        EmbeddingOutcome::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Text embedding capability.
///
/// Implementations:
/// - `HashEmbedder`: feature hashing, deterministic, no model
/// - `UnavailableEmbedder`: always `Unavailable` (embeddings switched off)
/// - `CachedEmbedder<P>`: normalized-text cache in front of any provider
///
/// A remote-backed provider applies its own timeout and reports a timeout as
/// `Unavailable`. Job vectors in the store must come from the same provider
/// (same `name()` and `version()`) as query vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Backend name, e.g. "hash"
    fn name(&self) -> &'static str;

    /// Model generation; re-embed the job store when this changes
    fn version(&self) -> &str;

    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> EmbeddingOutcome;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn version(&self) -> &str {
        (**self).version()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&self, text: &str) -> EmbeddingOutcome {
        (**self).embed(text)
    }
}

/// Provider used when embeddings are switched off.
pub struct UnavailableEmbedder {
    dimension: usize,
    reason: String,
}

impl UnavailableEmbedder {
    pub fn new(dimension: usize, reason: impl Into<String>) -> Self {
        Self {
            dimension,
            reason: reason.into(),
        }
    }
}

impl EmbeddingProvider for UnavailableEmbedder {
    fn name(&self) -> &'static str {
        "none"
    }

    fn version(&self) -> &str {
        "v0"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, _text: &str) -> EmbeddingOutcome {
        EmbeddingOutcome::unavailable(self.reason.clone())
    }
}

/// Build the configured provider, cached unless the config turns caching off.
pub fn create_embedder(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingConfigError> {
    config.validate()?;

    let provider: Arc<dyn EmbeddingProvider> = match (config.backend, config.cache_enabled) {
        (EmbedderBackend::Hash, true) => {
            Arc::new(CachedEmbedder::new(HashEmbedder::new(config.dimension)))
        }
        (EmbedderBackend::Hash, false) => Arc::new(HashEmbedder::new(config.dimension)),
        (EmbedderBackend::Disabled, _) => Arc::new(UnavailableEmbedder::new(
            config.dimension,
            "embedding backend disabled",
        )),
    };

    Ok(provider)
}
