//! In-memory record source, for embedding and for tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use bimclass_core::errors::AggregationError;
use bimclass_core::models::RawRecord;
use bimclass_core::traits::IRecordSource;

/// Records held in a map keyed by id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordSource {
    records: HashMap<String, RawRecord>,
}

impl InMemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later records with the same id replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Load a JSON array of records.
    pub fn from_json_file(path: &Path) -> Result<Self, AggregationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AggregationError::SourceUnavailable {
                reason: format!("{}: {e}", path.display()),
            })?;
        let records: Vec<RawRecord> =
            serde_json::from_str(&content).map_err(|e| AggregationError::SourceUnavailable {
                reason: format!("{}: {e}", path.display()),
            })?;
        Ok(Self::from_records(records))
    }

    pub fn insert(&mut self, record: RawRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl IRecordSource for InMemoryRecordSource {
    async fn fetch_records(&self, ids: &[String]) -> Result<Vec<RawRecord>, AggregationError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect())
    }
}
