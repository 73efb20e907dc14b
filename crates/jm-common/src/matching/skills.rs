use std::collections::BTreeSet;

use super::component::{Component, ComponentScore};
use crate::normalize::normalize_label;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatchResult {
    pub match_percentage: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub reason: String,
}

fn normalize_skill_set(skills: &[String]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|skill| normalize_label(skill))
        .filter(|skill| !skill.is_empty())
        .collect()
}

/// Share of the job's required skills the candidate declares.
///
/// Exact case-insensitive match, no aliasing or fuzzy matching. Returns `None` when the
/// job lists no required skills, since the ratio is undefined there.
pub fn check_required_skills(
    job_skills: &[String],
    candidate_skills: &[String],
) -> Option<SkillMatchResult> {
    let required = normalize_skill_set(job_skills);
    if required.is_empty() {
        return None;
    }

    let declared = normalize_skill_set(candidate_skills);
    let matched_skills: Vec<String> = required.intersection(&declared).cloned().collect();
    let missing_skills: Vec<String> = required.difference(&declared).cloned().collect();
    let match_percentage = matched_skills.len() as f64 / required.len() as f64;

    let reason = format!(
        "{} of {} required skills ({:.0}%) matched: {} / missing: {}",
        matched_skills.len(),
        required.len(),
        match_percentage * 100.0,
        if matched_skills.is_empty() {
            "none".to_string()
        } else {
            matched_skills.join(", ")
        },
        if missing_skills.is_empty() {
            "none".to_string()
        } else {
            missing_skills.join(", ")
        }
    );

    Some(SkillMatchResult {
        match_percentage,
        matched_skills,
        missing_skills,
        reason,
    })
}

/// Skills component: |query ∩ job| / |job|.
///
/// Not applicable when the job's skill list is missing or empty. An empty query skill
/// list still scores (0): not declaring skills is information, not missing data.
pub fn score_skills(query_skills: &[String], job_skills: Option<&[String]>) -> ComponentScore {
    let Some(job_skills) = job_skills else {
        return ComponentScore::not_applicable(
            Component::Skills,
            "job has no required skills field",
        );
    };

    match check_required_skills(job_skills, query_skills) {
        Some(result) => {
            ComponentScore::scored(Component::Skills, result.match_percentage, result.reason)
        }
        None => ComponentScore::not_applicable(Component::Skills, "job lists no required skills"),
    }
}
