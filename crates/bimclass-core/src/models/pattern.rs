use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::RawRecord;

/// The five attributes that define pattern identity.
///
/// Two records belong to the same pattern iff all five match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternKey {
    pub category: String,
    pub family: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub material: String,
    pub location_type: String,
}

impl PatternKey {
    /// Fields in canonical hashing order.
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.category,
            &self.family,
            &self.element_type,
            &self.material,
            &self.location_type,
        ]
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.category, self.family, self.element_type, self.material, self.location_type
        )
    }
}

/// A summarized dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dimension {
    Length,
    Width,
    Height,
}

impl Dimension {
    /// All summarized dimensions in canonical order.
    pub const ALL: [Dimension; 3] = [Dimension::Length, Dimension::Width, Dimension::Height];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Width => "width",
            Self::Height => "height",
        }
    }

    /// Read this dimension off a record. Non-finite values count as missing.
    pub fn read(self, record: &RawRecord) -> Option<f64> {
        let value = match self {
            Self::Length => record.length,
            Self::Width => record.width,
            Self::Height => record.height,
        };
        value.filter(|v| v.is_finite())
    }
}

/// Min/max/mean of one dimension over the records that supply it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    pub min: f64,
    pub max: f64,
    /// Mean over contributing records, not over samples.
    pub avg: f64,
    /// Number of records that supplied this dimension.
    pub count: u64,
}

/// Per-dimension statistics. A dimension is `None` when no record supplied it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionStats {
    pub length: Option<DimensionSummary>,
    pub width: Option<DimensionSummary>,
    pub height: Option<DimensionSummary>,
}

impl DimensionStats {
    pub fn get(&self, dimension: Dimension) -> Option<&DimensionSummary> {
        match dimension {
            Dimension::Length => self.length.as_ref(),
            Dimension::Width => self.width.as_ref(),
            Dimension::Height => self.height.as_ref(),
        }
    }

    pub fn set(&mut self, dimension: Dimension, summary: Option<DimensionSummary>) {
        match dimension {
            Dimension::Length => self.length = summary,
            Dimension::Width => self.width = summary,
            Dimension::Height => self.height = summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// An aggregated, immutable snapshot of near-identical records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub key: PatternKey,
    /// Number of records folded into this pattern (always ≥ 1).
    pub element_count: u64,
    pub dimension_stats: DimensionStats,
    /// First N records by identifier.
    pub sample_elements: Vec<RawRecord>,
    /// Every contributing record identifier, sorted.
    pub element_ids: Vec<String>,
}

/// Stable cache key for a pattern: hex-encoded blake3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternHash(String);

impl PatternHash {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PatternHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatternHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for PatternHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PatternHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
