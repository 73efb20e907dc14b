use std::collections::BTreeSet;

use crate::{
    JobRecord, MatchQuery, embedding::tokenizer::tokenize_words, normalize::normalize_label,
};

/// Why a job was dropped before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    JobType(String),
    Location(String),
}

impl Exclusion {
    pub fn reason(&self) -> String {
        match self {
            Exclusion::JobType(job_type) => format!("job type '{job_type}' excluded"),
            Exclusion::Location(location) => format!("location '{location}' excluded"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HardFilterResult<'a> {
    /// Survivors in corpus order
    pub kept: Vec<&'a JobRecord>,
    pub excluded: Vec<(&'a JobRecord, Exclusion)>,
}

/// Non-negotiable exclusions from the query, normalized once per request.
#[derive(Debug, Clone, Default)]
pub struct HardFilter {
    job_types: BTreeSet<String>,
    /// Each excluded place as a word sequence
    locations: Vec<Vec<String>>,
}

impl HardFilter {
    pub fn from_query(query: &MatchQuery) -> Self {
        Self {
            job_types: query
                .hard_exclude_job_types
                .iter()
                .map(|t| normalize_label(t))
                .filter(|t| !t.is_empty())
                .collect(),
            locations: query
                .hard_exclude_locations
                .iter()
                .map(|l| tokenize_words(l))
                .filter(|words| !words.is_empty())
                .collect(),
        }
    }

    /// `None` when the job survives. Jobs with no job type or no location are never
    /// excluded by the corresponding rule.
    pub fn evaluate(&self, job: &JobRecord) -> Option<Exclusion> {
        if let Some(job_type) = job.job_type.as_deref() {
            if self.job_types.contains(&normalize_label(job_type)) {
                return Some(Exclusion::JobType(job_type.to_string()));
            }
        }

        if let Some(location) = job.location.as_deref() {
            // Whole words only: "us" does not exclude "Austin, TX", and a broader job
            // location ("Germany") does not match a narrower exclusion ("Berlin").
            let words = tokenize_words(location);
            if self
                .locations
                .iter()
                .any(|excluded| contains_phrase(&words, excluded))
            {
                return Some(Exclusion::Location(location.to_string()));
            }
        }

        None
    }

    /// Pure set reduction; survivor order follows the corpus.
    pub fn apply<'a>(&self, corpus: &'a [JobRecord]) -> HardFilterResult<'a> {
        let mut kept = Vec::with_capacity(corpus.len());
        let mut excluded = Vec::new();

        for job in corpus {
            match self.evaluate(job) {
                None => kept.push(job),
                Some(exclusion) => excluded.push((job, exclusion)),
            }
        }

        HardFilterResult { kept, excluded }
    }
}

fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    words.windows(phrase.len()).any(|window| window == phrase)
}

/// `filter(corpus, query)` in one call.
pub fn filter_jobs<'a>(corpus: &'a [JobRecord], query: &MatchQuery) -> Vec<&'a JobRecord> {
    HardFilter::from_query(query).apply(corpus).kept
}
