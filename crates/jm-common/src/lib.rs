pub mod api;
pub mod embedding;
pub mod logging;
pub mod matching;
pub mod normalize;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

// Commonly used data models for matching functions.

/// Work arrangement of a job, or one the candidate is willing to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCategory {
    #[serde(alias = "onsite", alias = "on-site", alias = "office")]
    OnSite,
    Hybrid,
    Remote,
}

impl RemoteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteCategory::OnSite => "on_site",
            RemoteCategory::Hybrid => "hybrid",
            RemoteCategory::Remote => "remote",
        }
    }

    /// Map a free-text work arrangement label onto a category.
    ///
    /// Hybrid wording is checked first so "remote-first hybrid" stays hybrid;
    /// returns `None` when nothing recognizable is present.
    pub fn parse_label(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        if lower.contains("hybrid") || lower.contains("flexible") || lower.contains("partial remote")
        {
            return Some(RemoteCategory::Hybrid);
        }

        if lower.contains("remote")
            || lower.contains("wfh")
            || lower.contains("work from home")
            || lower.contains("anywhere")
            || lower.contains("distributed")
        {
            return Some(RemoteCategory::Remote);
        }

        if lower.contains("on-site")
            || lower.contains("onsite")
            || lower.contains("on site")
            || lower.contains("in office")
            || lower.contains("in-office")
            || lower.contains("office")
        {
            return Some(RemoteCategory::OnSite);
        }

        None
    }
}

impl fmt::Display for RemoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RemoteCategory::parse_label(s).ok_or_else(|| format!("unrecognized remote category: {s}"))
    }
}

/// Salary bounds. Either side may be missing; a single currency is assumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl SalaryRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Years-of-experience band a job implies, e.g. 3 to 6 years for a mid-level role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceBand {
    pub min_years: f64,
    pub max_years: f64,
}

impl ExperienceBand {
    pub fn new(min_years: f64, max_years: f64) -> Self {
        if min_years <= max_years {
            Self {
                min_years,
                max_years,
            }
        } else {
            Self {
                min_years: max_years,
                max_years: min_years,
            }
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_years + self.max_years) / 2.0
    }

    pub fn half_width(&self) -> f64 {
        (self.max_years - self.min_years).abs() / 2.0
    }
}

/// A job listing as supplied by the job store. Read-only to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `None` when the field was never extracted, `Some(vec![])` when the job lists none.
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remote_category: Option<RemoteCategory>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub experience_band: Option<ExperienceBand>,
    /// Precomputed by the same embedding provider the engine queries with.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// What the candidate is looking for: free text for embedding, structured fields for factor scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub desired_salary: Option<SalaryRange>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub preferred_remote: Vec<RemoteCategory>,
    #[serde(default)]
    pub hard_exclude_job_types: Vec<String>,
    #[serde(default)]
    pub hard_exclude_locations: Vec<String>,
}

impl MatchQuery {
    /// Free text worth embedding, if any.
    pub fn text_form(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
