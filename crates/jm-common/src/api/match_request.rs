use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::MatchQuery;

/// One ranking request as a caller submits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRequest {
    pub query: MatchQuery,
    /// `{component: weight}`; omitted keys keep the defaults
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl MatchRequest {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
