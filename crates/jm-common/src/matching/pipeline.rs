use std::{
    collections::HashMap,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, field, info, info_span, warn};

use super::{
    component::{Component, ComponentScore},
    filter::HardFilter,
    keyword::KeywordMatcher,
    scoring::{FactorConfig, FactorScorer},
    weights::{Weights, WeightsError},
};
use crate::{
    JobRecord, MatchQuery,
    embedding::{
        EmbeddingConfig, EmbeddingConfigError, EmbeddingOutcome, EmbeddingProvider,
        cosine_similarity, create_embedder,
    },
};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid weights: {0}")]
    Weights(#[from] WeightsError),
    #[error("invalid embedding configuration: {0}")]
    EmbeddingConfig(#[from] EmbeddingConfigError),
    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
    #[error(
        "embedding dimension mismatch for job {job_id}: query has {query_dimension}, job has {job_dimension}"
    )]
    DimensionMismatch {
        job_id: String,
        query_dimension: usize,
        job_dimension: usize,
    },
    #[error("failed to build scoring pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// How components without data enter the overall score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingComponentPolicy {
    /// Left out of both numerator and denominator
    #[default]
    Exclude,
    /// Counted as 0 with full weight
    #[serde(rename = "zero")]
    ScoreAsZero,
}

impl FromStr for MissingComponentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(MissingComponentPolicy::Exclude),
            "zero" | "score_as_zero" => Ok(MissingComponentPolicy::ScoreAsZero),
            other => Err(format!("unknown missing component policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchingEngineConfig {
    /// Worker threads for the per-job map
    pub max_concurrency: usize,
    /// Surviving corpus size at which scoring goes parallel
    pub parallel_threshold: usize,
    pub missing_component_policy: MissingComponentPolicy,
    pub infer_experience_band: bool,
}

impl Default for MatchingEngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            parallel_threshold: 64,
            missing_component_policy: MissingComponentPolicy::Exclude,
            infer_experience_band: false,
        }
    }
}

impl MatchingEngineConfig {
    /// Read the `JM_*` engine settings; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, MatchError> {
        let defaults = Self::default();

        let max_concurrency = match env_value("JM_MAX_CONCURRENCY") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(MatchError::InvalidSetting {
                        key: "JM_MAX_CONCURRENCY",
                        value: raw,
                    });
                }
            },
            None => defaults.max_concurrency,
        };
        let parallel_threshold = match env_value("JM_PARALLEL_THRESHOLD") {
            Some(raw) => raw.parse().map_err(|_| MatchError::InvalidSetting {
                key: "JM_PARALLEL_THRESHOLD",
                value: raw,
            })?,
            None => defaults.parallel_threshold,
        };
        let missing_component_policy = match env_value("JM_MISSING_COMPONENT_POLICY") {
            Some(raw) => raw.parse().map_err(|_| MatchError::InvalidSetting {
                key: "JM_MISSING_COMPONENT_POLICY",
                value: raw,
            })?,
            None => defaults.missing_component_policy,
        };
        let infer_experience_band = env_value("JM_INFER_EXPERIENCE_BAND")
            .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.infer_experience_band);

        Ok(Self {
            max_concurrency,
            parallel_threshold,
            missing_component_policy,
            infer_experience_band,
        })
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Request-scoped stop signal. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Where a request's similarity component came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilaritySource {
    Embedding,
    Keyword,
    None,
}

impl SimilaritySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilaritySource::Embedding => "embedding",
            SimilaritySource::Keyword => "keyword",
            SimilaritySource::None => "none",
        }
    }
}

/// Similarity route, decided once per request and shared read-only by every job.
#[derive(Debug, Clone)]
enum SimilarityPath {
    Embedded(Vec<f32>),
    Fallback(KeywordMatcher),
    NotApplicable,
}

impl SimilarityPath {
    fn source(&self) -> SimilaritySource {
        match self {
            SimilarityPath::Embedded(_) => SimilaritySource::Embedding,
            SimilarityPath::Fallback(_) => SimilaritySource::Keyword,
            SimilarityPath::NotApplicable => SimilaritySource::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job_id: String,
    pub overall_score: f64,
    /// Always in `Component::ALL` order
    pub components: Vec<ComponentScore>,
    /// 1-based
    pub rank: usize,
}

impl MatchResult {
    pub fn component(&self, component: Component) -> Option<&ComponentScore> {
        self.components.iter().find(|c| c.component == component)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    pub results: Vec<MatchResult>,
    /// Set when cancellation stopped scoring before every candidate was done
    pub partial: bool,
    pub similarity_source: SimilaritySource,
    /// Why the request fell back to keywords, if it did
    pub fallback_reason: Option<String>,
    /// Jobs that survived the hard filter
    pub candidates: usize,
    pub excluded: usize,
}

/// Filters, scores and orders a job corpus against one query.
pub struct MatchingEngine {
    config: MatchingEngineConfig,
    factors: FactorScorer,
    embedder: Arc<dyn EmbeddingProvider>,
    pool: rayon::ThreadPool,
}

impl MatchingEngine {
    pub fn new(
        config: MatchingEngineConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, MatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_concurrency.max(1))
            .thread_name(|i| format!("jm-score-{i}"))
            .build()?;
        let factors = FactorScorer::new(FactorConfig {
            infer_experience_band: config.infer_experience_band,
        });

        Ok(Self {
            config,
            factors,
            embedder,
            pool,
        })
    }

    /// Engine and embedder both configured from `JM_*` variables.
    pub fn from_env() -> Result<Self, MatchError> {
        let config = MatchingEngineConfig::from_env()?;
        let embedder = create_embedder(&EmbeddingConfig::from_env()?)?;
        Self::new(config, embedder)
    }

    pub fn config(&self) -> &MatchingEngineConfig {
        &self.config
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Weights given as `{component: weight}`; see `Weights::from_map`.
    pub fn rank_with_map(
        &self,
        corpus: &[JobRecord],
        query: &MatchQuery,
        weights: &HashMap<String, f64>,
        cancel: &CancellationFlag,
    ) -> Result<RankOutcome, MatchError> {
        let weights = Weights::from_map(weights)?;
        self.rank(corpus, query, &weights, cancel)
    }

    /// Hard filter, then score every survivor, then sort by overall score desc with
    /// job id asc as the tie-break, then assign 1-based ranks.
    ///
    /// Errors only on invalid weights or an embedding dimension mismatch. Missing job
    /// data degrades single components. A cancelled request returns what was scored
    /// with `partial` set.
    pub fn rank(
        &self,
        corpus: &[JobRecord],
        query: &MatchQuery,
        weights: &Weights,
        cancel: &CancellationFlag,
    ) -> Result<RankOutcome, MatchError> {
        self.rank_until(corpus, query, weights, || cancel.is_cancelled())
    }

    /// `should_stop` is polled once before embedding and once before each job.
    fn rank_until<S>(
        &self,
        corpus: &[JobRecord],
        query: &MatchQuery,
        weights: &Weights,
        should_stop: S,
    ) -> Result<RankOutcome, MatchError>
    where
        S: Fn() -> bool + Sync,
    {
        weights.validate()?;

        let span = info_span!(
            "rank",
            corpus = corpus.len(),
            similarity = field::Empty
        );
        let _enter = span.enter();

        let filtered = HardFilter::from_query(query).apply(corpus);
        for (job, exclusion) in &filtered.excluded {
            debug!(job_id = %job.id, reason = %exclusion.reason(), "hard filter excluded job");
        }
        let candidates = filtered.kept.len();
        let excluded = filtered.excluded.len();

        if should_stop() {
            warn!("request cancelled before scoring");
            return Ok(RankOutcome {
                results: Vec::new(),
                partial: candidates > 0,
                similarity_source: SimilaritySource::None,
                fallback_reason: None,
                candidates,
                excluded,
            });
        }

        let (path, fallback_reason) = self.resolve_similarity(query);
        span.record("similarity", path.source().as_str());

        let score_one = |job: &&JobRecord| -> Result<Option<MatchResult>, MatchError> {
            if should_stop() {
                return Ok(None);
            }
            self.score_job(job, query, &path, weights).map(Some)
        };

        let scored: Vec<Option<MatchResult>> = if candidates >= self.config.parallel_threshold {
            self.pool.install(|| {
                filtered
                    .kept
                    .par_iter()
                    .map(score_one)
                    .collect::<Result<Vec<_>, MatchError>>()
            })?
        } else {
            filtered
                .kept
                .iter()
                .map(score_one)
                .collect::<Result<Vec<_>, MatchError>>()?
        };

        let mut results: Vec<MatchResult> = scored.into_iter().flatten().collect();
        let partial = results.len() < candidates;
        if partial {
            warn!(
                scored = results.len(),
                candidates, "request cancelled; returning partial results"
            );
        }

        results.sort_by(|a, b| {
            b.overall_score
                .total_cmp(&a.overall_score)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        for (index, result) in results.iter_mut().enumerate() {
            result.rank = index + 1;
        }

        info!(
            candidates,
            excluded,
            returned = results.len(),
            partial,
            "ranking complete"
        );

        Ok(RankOutcome {
            results,
            partial,
            similarity_source: path.source(),
            fallback_reason,
            candidates,
            excluded,
        })
    }

    /// Embeds the query text exactly once. `Unavailable` routes the whole request to
    /// keyword matching; it is not retried.
    fn resolve_similarity(&self, query: &MatchQuery) -> (SimilarityPath, Option<String>) {
        let Some(text) = query.text_form() else {
            return (SimilarityPath::NotApplicable, None);
        };

        let outcome = match self.embedder.embed(text) {
            EmbeddingOutcome::Embedded(vector) => match self.unusable_reason(&vector) {
                Some(reason) => EmbeddingOutcome::Unavailable { reason },
                None => EmbeddingOutcome::Embedded(vector),
            },
            unavailable => unavailable,
        };

        match outcome {
            EmbeddingOutcome::Embedded(vector) => (SimilarityPath::Embedded(vector), None),
            EmbeddingOutcome::Unavailable { reason } => {
                warn!(
                    embedder = self.embedder.name(),
                    %reason,
                    "embedding unavailable; using keyword matching for this request"
                );
                let path = match KeywordMatcher::new(text) {
                    Some(matcher) => SimilarityPath::Fallback(matcher),
                    None => SimilarityPath::NotApplicable,
                };
                (path, Some(reason))
            }
        }
    }

    /// A query vector is only usable when it has the provider's dimension and
    /// finite, not-all-zero entries.
    fn unusable_reason(&self, vector: &[f32]) -> Option<String> {
        let expected = self.embedder.dimension();
        if vector.len() != expected {
            return Some(format!(
                "query vector has {} dimensions, provider declares {expected}",
                vector.len()
            ));
        }
        if !vector.iter().all(|x| x.is_finite()) {
            return Some("query vector has non-finite entries".to_string());
        }
        if vector.iter().all(|x| *x == 0.0) {
            return Some("query vector is all zeros".to_string());
        }
        None
    }

    fn score_job(
        &self,
        job: &JobRecord,
        query: &MatchQuery,
        path: &SimilarityPath,
        weights: &Weights,
    ) -> Result<MatchResult, MatchError> {
        let similarity = similarity_component(job, path)?;

        let mut components = Vec::with_capacity(Component::ALL.len());
        components.push(similarity);
        components.extend(self.factors.score(query, job).into_vec());

        let overall_score = overall_score(
            &components,
            weights,
            self.config.missing_component_policy,
        );

        Ok(MatchResult {
            job_id: job.id.clone(),
            overall_score,
            components,
            rank: 0,
        })
    }
}

fn similarity_component(
    job: &JobRecord,
    path: &SimilarityPath,
) -> Result<ComponentScore, MatchError> {
    match path {
        SimilarityPath::Embedded(query_vector) => {
            let Some(job_vector) = job.embedding.as_deref() else {
                debug!(job_id = %job.id, "job has no embedding");
                return Ok(ComponentScore::not_applicable(
                    Component::Similarity,
                    "job has no embedding",
                ));
            };
            let value = cosine_similarity(query_vector, job_vector).map_err(|mismatch| {
                error!(
                    job_id = %job.id,
                    query_dimension = mismatch.left,
                    job_dimension = mismatch.right,
                    "embedding dimension mismatch"
                );
                MatchError::DimensionMismatch {
                    job_id: job.id.clone(),
                    query_dimension: mismatch.left,
                    job_dimension: mismatch.right,
                }
            })?;
            Ok(ComponentScore::scored(
                Component::Similarity,
                f64::from(value),
                format!("cosine similarity {value:.3}"),
            ))
        }
        SimilarityPath::Fallback(matcher) => Ok(matcher.score(job)),
        SimilarityPath::NotApplicable => Ok(ComponentScore::not_applicable(
            Component::Similarity,
            "query has no free text",
        )),
    }
}

/// Weighted average over the components the policy admits; 0 when their total weight is 0.
///
/// Weights are divided by the largest admitted weight first, so only their ratios
/// matter and huge finite weights cannot overflow the sums.
pub fn overall_score(
    components: &[ComponentScore],
    weights: &Weights,
    policy: MissingComponentPolicy,
) -> f64 {
    let admitted: Vec<(f64, f64)> = components
        .iter()
        .filter(|c| c.applicable || policy == MissingComponentPolicy::ScoreAsZero)
        .map(|c| {
            let value = if c.applicable { c.value } else { 0.0 };
            (weights.get(c.component), value)
        })
        .collect();

    let largest = admitted.iter().map(|(w, _)| *w).fold(0.0_f64, f64::max);
    if largest <= 0.0 {
        return 0.0;
    }

    let (weighted, total) = admitted
        .iter()
        .fold((0.0, 0.0), |(weighted, total), (weight, value)| {
            let weight = weight / largest;
            (weighted + weight * value, total + weight)
        });

    let score = weighted / total;
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
