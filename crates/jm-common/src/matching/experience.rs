use super::component::{Component, ComponentScore};
use crate::{ExperienceBand, embedding::tokenizer::token_set};

/// Bands narrower than this still give partial credit to near misses.
const MIN_BAND_HALF_WIDTH_YEARS: f64 = 0.5;

/// Seniority words checked most-senior first so "Senior Staff Engineer" maps to staff.
const SENIORITY_BANDS: &[(&[&str], f64, f64)] = &[
    (&["principal", "staff", "distinguished"], 8.0, 15.0),
    (&["lead", "head"], 6.0, 10.0),
    (&["senior", "sr"], 5.0, 8.0),
    (&["mid", "intermediate"], 2.0, 5.0),
    (&["junior", "jr", "entry", "graduate"], 0.0, 2.0),
    (&["intern", "internship", "trainee"], 0.0, 1.0),
];

/// Guess an experience band from seniority words in a job title.
pub fn infer_experience_band(title: &str) -> Option<ExperienceBand> {
    let tokens = token_set(title);
    SENIORITY_BANDS
        .iter()
        .find(|(words, _, _)| words.iter().any(|word| tokens.contains(*word)))
        .map(|(_, min, max)| ExperienceBand::new(*min, *max))
}

/// Experience component: 1 − min(1, |years − midpoint| / half_width).
///
/// Not applicable when either the candidate's years or the job's band is unknown.
pub fn score_experience(years: Option<f64>, band: Option<ExperienceBand>) -> ComponentScore {
    let Some(band) = band else {
        return ComponentScore::not_applicable(Component::Experience, "job has no experience band");
    };
    let Some(years) = years.filter(|y| y.is_finite()) else {
        return ComponentScore::not_applicable(
            Component::Experience,
            "candidate experience unknown",
        );
    };

    let midpoint = band.midpoint();
    let half_width = band.half_width().max(MIN_BAND_HALF_WIDTH_YEARS);
    let distance = (years - midpoint).abs();
    let score = 1.0 - (distance / half_width).min(1.0);

    ComponentScore::scored(
        Component::Experience,
        score,
        format!(
            "{:.1}y vs band {:.1}-{:.1}y (midpoint {:.1}y)",
            years, band.min_years, band.max_years, midpoint
        ),
    )
}
