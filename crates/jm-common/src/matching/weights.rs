use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use super::component::Component;

/// Baseline: every component counts equally.
/// Only relative size matters; normalization happens per job over applicable components.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    similarity: 1.0,
    skills: 1.0,
    experience: 1.0,
    salary: 1.0,
    location: 1.0,
    remote: 1.0,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("weight for {component} must not be negative (got {value})")]
    Negative { component: Component, value: f64 },
    #[error("weight for {component} must be a finite number")]
    NotFinite { component: Component },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub similarity: f64,
    pub skills: f64,
    pub experience: f64,
    pub salary: f64,
    pub location: f64,
    pub remote: f64,
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl Weights {
    /// Build weights from caller configuration.
    ///
    /// Omitted keys keep `DEFAULT_WEIGHTS`; unrecognized keys are ignored with a warning.
    /// Negative or non-finite values reject the whole map before any scoring happens.
    pub fn from_map(overrides: &HashMap<String, f64>) -> Result<Self, WeightsError> {
        // Sorted so warnings and the first reported error do not depend on hash order.
        let sorted: BTreeMap<&str, f64> = overrides
            .iter()
            .map(|(key, value)| (key.as_str(), *value))
            .collect();

        let mut weights = DEFAULT_WEIGHTS;
        for (key, value) in sorted {
            let Some(component) = Component::from_key(key) else {
                warn!(key, value, "ignoring unrecognized weight key");
                continue;
            };
            weights.set(component, value)?;
        }

        Ok(weights)
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Similarity => self.similarity,
            Component::Skills => self.skills,
            Component::Experience => self.experience,
            Component::Salary => self.salary,
            Component::Location => self.location,
            Component::Remote => self.remote,
        }
    }

    pub fn set(&mut self, component: Component, value: f64) -> Result<(), WeightsError> {
        if !value.is_finite() {
            return Err(WeightsError::NotFinite { component });
        }
        if value < 0.0 {
            return Err(WeightsError::Negative { component, value });
        }

        let slot = match component {
            Component::Similarity => &mut self.similarity,
            Component::Skills => &mut self.skills,
            Component::Experience => &mut self.experience,
            Component::Salary => &mut self.salary,
            Component::Location => &mut self.location,
            Component::Remote => &mut self.remote,
        };
        *slot = value;
        Ok(())
    }

    /// Re-check values assigned directly through the public fields.
    pub fn validate(&self) -> Result<(), WeightsError> {
        let mut copy = *self;
        for component in Component::ALL {
            copy.set(component, self.get(component))?;
        }
        Ok(())
    }
}
