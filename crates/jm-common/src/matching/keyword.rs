use std::collections::BTreeSet;

use super::component::{Component, ComponentScore};
use crate::{JobRecord, embedding::tokenizer::token_set};

/// Lexical stand-in for embedding similarity.
///
/// Precision-style: |query ∩ job| / |query|. Long descriptions are not penalized.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    query_tokens: BTreeSet<String>,
}

impl KeywordMatcher {
    /// `None` when the query text has no tokens; similarity is then not applicable.
    pub fn new(query_text: &str) -> Option<Self> {
        let query_tokens = token_set(query_text);
        if query_tokens.is_empty() {
            return None;
        }
        Some(Self { query_tokens })
    }

    /// Only the description is the job's text; the title is not tokenized.
    pub fn score(&self, job: &JobRecord) -> ComponentScore {
        let job_tokens = token_set(&job.description);

        let matched = self.query_tokens.intersection(&job_tokens).count();
        let score = matched as f64 / self.query_tokens.len() as f64;

        ComponentScore::scored(
            Component::Similarity,
            score,
            format!(
                "keyword overlap {}/{} query terms",
                matched,
                self.query_tokens.len()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, description: &str) -> JobRecord {
        JobRecord {
            id: "job".into(),
            title: title.into(),
            description: description.into(),
            ..JobRecord::default()
        }
    }

    #[test]
    fn all_query_terms_present_scores_one() {
        let matcher = KeywordMatcher::new("remote python engineer").unwrap();

        let score = matcher.score(&job(
            "",
            "We need a Python engineer to work remote, building data pipelines.",
        ));

        assert!(score.applicable);
        assert_eq!(score.value, 1.0);
        assert_eq!(score.details, "keyword overlap 3/3 query terms");
    }

    #[test]
    fn partial_overlap_is_precision_over_query_terms() {
        let matcher = KeywordMatcher::new("rust kubernetes golang sql").unwrap();

        let score = matcher.score(&job("Backend Engineer", "Rust services with SQL storage"));

        assert!((score.value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn title_words_do_not_count() {
        let matcher = KeywordMatcher::new("staff engineer").unwrap();

        let score = matcher.score(&job("Staff Engineer", "Own the platform"));

        assert!(score.applicable);
        assert_eq!(score.value, 0.0);
        assert_eq!(score.details, "keyword overlap 0/2 query terms");
    }

    #[test]
    fn query_without_tokens_has_no_matcher() {
        assert!(KeywordMatcher::new("  ?! ").is_none());
    }
}
