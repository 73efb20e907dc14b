use serde::{Deserialize, Serialize};

use crate::{
    embedding::EmbeddingProvider,
    matching::{MatchResult, RankOutcome, SimilaritySource},
};

/// Ranked list plus the metadata a caller needs to tell "no matches" from
/// "degraded" or "cut short".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub results: Vec<MatchResult>,
    /// Cancellation stopped scoring early; `results` is incomplete
    pub partial: bool,
    pub similarity_source: SimilaritySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub embedder: String,
    pub embedder_version: String,
    /// Jobs that survived the hard filter
    pub candidates: usize,
    pub excluded: usize,
}

impl MatchResponse {
    /// Truncates after ranking, so ranks stay 1-based and contiguous.
    pub fn from_outcome(
        outcome: RankOutcome,
        embedder: &dyn EmbeddingProvider,
        limit: Option<usize>,
    ) -> Self {
        let mut results = outcome.results;
        if let Some(limit) = limit {
            results.truncate(limit);
        }

        Self {
            results,
            partial: outcome.partial,
            similarity_source: outcome.similarity_source,
            fallback_reason: outcome.fallback_reason,
            embedder: embedder.name().to_string(),
            embedder_version: embedder.version().to_string(),
            candidates: outcome.candidates,
            excluded: outcome.excluded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
