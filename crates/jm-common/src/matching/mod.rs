pub mod component;
pub mod experience;
pub mod filter;
pub mod keyword;
pub mod location;
pub mod pipeline;
pub mod salary;
pub mod scoring;
pub mod skills;
pub mod weights;

pub use component::{Component, ComponentScore};
pub use filter::{Exclusion, HardFilter, HardFilterResult, filter_jobs};
pub use keyword::KeywordMatcher;
pub use pipeline::{
    CancellationFlag, MatchError, MatchResult, MatchingEngine, MatchingEngineConfig,
    MissingComponentPolicy, RankOutcome, SimilaritySource, overall_score,
};
pub use scoring::{FactorConfig, FactorScorer, FactorScores};
pub use weights::{DEFAULT_WEIGHTS, Weights, WeightsError};
