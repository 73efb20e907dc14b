//! Process-local embedding cache keyed by the fingerprint of the normalized text.

use dashmap::DashMap;
use tracing::trace;

use super::{EmbeddingOutcome, EmbeddingProvider};
use crate::normalize::text_fingerprint;

/// Wraps a provider and remembers successful embeddings.
///
/// `Unavailable` is never cached so a provider that recovers is used on the next
/// request. Concurrent misses on the same key may both call the inner provider;
/// the last write wins, which is harmless because entries for equal text are equal.
pub struct CachedEmbedder<P> {
    inner: P,
    entries: DashMap<String, Vec<f32>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn version(&self) -> &str {
        self.inner.version()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn embed(&self, text: &str) -> EmbeddingOutcome {
        let key = text_fingerprint(text);
        if let Some(hit) = self.entries.get(&key) {
            trace!(key = %&key[..12], "embedding cache hit");
            return EmbeddingOutcome::Embedded(hit.value().clone());
        }

        let outcome = self.inner.embed(text);
        if let EmbeddingOutcome::Embedded(vector) = &outcome {
            self.entries.insert(key, vector.clone());
            trace!(entries = self.len(), "embedding cached");
        }
        outcome
    }
}
