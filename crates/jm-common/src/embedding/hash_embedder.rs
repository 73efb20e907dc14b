use super::{EmbeddingOutcome, EmbeddingProvider, tokenizer};
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// Fixed seeds keep vectors stable across Rust releases and processes.
/// Changing them changes every embedding: bump `version()` and re-embed the job store.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

/// Feature-hashing embedder.
///
/// - No training, no model files
/// - O(n) in token count
/// - Pure function of the normalized text, so it doubles as the deterministic test double
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_feature(&self, feature: &str, salt: u8) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        feature.hash(&mut hasher);
        salt.hash(&mut hasher);
        hasher.finish()
    }

    /// Signed feature hashing followed by L2 normalization. Text without tokens
    /// yields the zero vector.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for (feature, weight) in tokenizer::weighted_features(text) {
            let idx = (self.hash_feature(&feature, 0) % self.dimension as u64) as usize;
            let sign = if self.hash_feature(&feature, 1) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[idx] += sign * weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn version(&self) -> &str {
        // Bump when tokenization or hashing changes.
        "v1"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> EmbeddingOutcome {
        EmbeddingOutcome::Embedded(self.vectorize(text))
    }
}
