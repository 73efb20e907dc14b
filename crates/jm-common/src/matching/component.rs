use std::fmt;

use serde::{Deserialize, Serialize};

/// Named sub-score feeding a job's overall match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Similarity,
    Skills,
    Experience,
    Salary,
    Location,
    Remote,
}

impl Component {
    /// Fixed order used for every result's component list.
    pub const ALL: [Component; 6] = [
        Component::Similarity,
        Component::Skills,
        Component::Experience,
        Component::Salary,
        Component::Location,
        Component::Remote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Similarity => "similarity",
            Component::Skills => "skills",
            Component::Experience => "experience",
            Component::Salary => "salary",
            Component::Location => "location",
            Component::Remote => "remote",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Component::ALL
            .into_iter()
            .find(|component| component.as_str() == key.trim().to_ascii_lowercase())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One component's value in [0, 1].
///
/// `applicable == false` means the underlying data was missing; the ranker leaves
/// such components out of the weighted average instead of counting them as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub component: Component,
    pub value: f64,
    pub applicable: bool,
    pub details: String,
}

impl ComponentScore {
    /// Applicable score; the value is clamped to [0, 1] and NaN becomes 0.
    pub fn scored(component: Component, value: f64, details: impl Into<String>) -> Self {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        Self {
            component,
            value,
            applicable: true,
            details: details.into(),
        }
    }

    pub fn not_applicable(component: Component, details: impl Into<String>) -> Self {
        Self {
            component,
            value: 0.0,
            applicable: false,
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_values_are_clamped() {
        assert_eq!(ComponentScore::scored(Component::Skills, 1.7, "").value, 1.0);
        assert_eq!(ComponentScore::scored(Component::Skills, -0.2, "").value, 0.0);
        assert_eq!(ComponentScore::scored(Component::Skills, f64::NAN, "").value, 0.0);
    }

    #[test]
    fn keys_round_trip_through_names() {
        for component in Component::ALL {
            assert_eq!(Component::from_key(component.as_str()), Some(component));
        }
        assert_eq!(Component::from_key(" Salary "), Some(Component::Salary));
        assert_eq!(Component::from_key("bogus"), None);
    }

    #[test]
    fn not_applicable_scores_carry_zero() {
        let score = ComponentScore::not_applicable(Component::Salary, "no salary on job");
        assert!(!score.applicable);
        assert_eq!(score.value, 0.0);
    }
}
