use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pattern::PatternHash;

/// A derived cost/quantity line attached to a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub code: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
}

/// Raw classifier output, before the core applies its confidence policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub commodity_code: Option<String>,
    pub pricing_code: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub confidence: f64,
}

/// Per-call context handed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationContext {
    pub batch_id: String,
    pub force_refresh: bool,
}

/// Advisory status. `Approved`/`Rejected` belong to the external approval
/// workflow and are deliberately not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    LowConfidence,
    Failed,
}

/// An advisory classification for one pattern.
///
/// Immutable once built. It carries no operation that can alter canonical
/// records; the only constructors enforce the confidence policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pattern_hash: PatternHash,
    commodity_code: Option<String>,
    pricing_code: Option<String>,
    line_items: Vec<LineItem>,
    confidence: f64,
    status: SuggestionStatus,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl Suggestion {
    /// Build a suggestion from classifier output.
    ///
    /// Confidence is clamped to [0.0, 1.0] (NaN becomes 0.0). Below
    /// `confidence_threshold` both codes are dropped and the status is
    /// `LowConfidence`: the core never guesses.
    pub fn from_classification(
        pattern_hash: PatternHash,
        classification: Classification,
        confidence_threshold: f64,
    ) -> Self {
        let confidence = if classification.confidence.is_nan() {
            0.0
        } else {
            classification.confidence.clamp(0.0, 1.0)
        };

        let (status, commodity_code, pricing_code) = if confidence < confidence_threshold {
            (SuggestionStatus::LowConfidence, None, None)
        } else {
            (
                SuggestionStatus::Pending,
                non_blank(classification.commodity_code),
                non_blank(classification.pricing_code),
            )
        };

        Self {
            pattern_hash,
            commodity_code,
            pricing_code,
            line_items: classification.line_items,
            confidence,
            status,
            failure_reason: None,
            created_at: Utc::now(),
        }
    }

    /// A failed classification. Never cached, never persisted.
    pub fn failed(pattern_hash: PatternHash, reason: impl Into<String>) -> Self {
        Self {
            pattern_hash,
            commodity_code: None,
            pricing_code: None,
            line_items: Vec::new(),
            confidence: 0.0,
            status: SuggestionStatus::Failed,
            failure_reason: Some(reason.into()),
            created_at: Utc::now(),
        }
    }

    pub fn pattern_hash(&self) -> &PatternHash {
        &self.pattern_hash
    }

    pub fn commodity_code(&self) -> Option<&str> {
        self.commodity_code.as_deref()
    }

    pub fn pricing_code(&self) -> Option<&str> {
        self.pricing_code.as_deref()
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn status(&self) -> SuggestionStatus {
        self.status
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_failed(&self) -> bool {
        self.status == SuggestionStatus::Failed
    }
}

fn non_blank(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}
