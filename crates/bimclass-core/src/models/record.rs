use serde::{Deserialize, Serialize};

use super::pattern::PatternKey;

/// A building-model element as materialized by the upstream record source.
///
/// Read-only: the core never mutates or writes records back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub category: String,
    pub family: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub material: String,
    pub location_type: String,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub diameter: Option<f64>,
}

impl RawRecord {
    /// The grouping key this record folds into. Exact, case-sensitive.
    pub fn pattern_key(&self) -> PatternKey {
        PatternKey {
            category: self.category.clone(),
            family: self.family.clone(),
            element_type: self.element_type.clone(),
            material: self.material.clone(),
            location_type: self.location_type.clone(),
        }
    }
}
