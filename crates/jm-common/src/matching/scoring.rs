use super::{
    component::ComponentScore,
    experience::{infer_experience_band, score_experience},
    location::{score_location, score_remote},
    salary::score_salary,
    skills::score_skills,
};
use crate::{JobRecord, MatchQuery};

#[derive(Debug, Clone, Default)]
pub struct FactorConfig {
    /// Fall back to seniority words in the title when a job carries no experience band
    pub infer_experience_band: bool,
}

/// Rule-based component scores for one job, in `Component::ALL` order minus similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorScores {
    pub skills: ComponentScore,
    pub experience: ComponentScore,
    pub salary: ComponentScore,
    pub location: ComponentScore,
    pub remote: ComponentScore,
}

impl FactorScores {
    pub fn into_vec(self) -> Vec<ComponentScore> {
        vec![
            self.skills,
            self.experience,
            self.salary,
            self.location,
            self.remote,
        ]
    }
}

/// Runs every factor scorer for a (query, job) pair. Holds configuration only, so a
/// single instance is shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct FactorScorer {
    config: FactorConfig,
}

impl FactorScorer {
    pub fn new(config: FactorConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, query: &MatchQuery, job: &JobRecord) -> FactorScores {
        FactorScores {
            skills: score_skills(&query.skills, job.required_skills.as_deref()),
            experience: self.score_experience(query, job),
            salary: score_salary(query.desired_salary.as_ref(), job.salary.as_ref()),
            location: score_location(
                &query.preferred_locations,
                &query.preferred_remote,
                job.location.as_deref(),
                job.remote_category,
            ),
            remote: score_remote(&query.preferred_remote, job.remote_category),
        }
    }

    fn score_experience(&self, query: &MatchQuery, job: &JobRecord) -> ComponentScore {
        let band = job.experience_band.or_else(|| {
            self.config
                .infer_experience_band
                .then(|| infer_experience_band(&job.title))
                .flatten()
        });
        score_experience(query.years_experience, band)
    }
}
