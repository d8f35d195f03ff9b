//! Incremental fold of records into patterns.
//!
//! Memory per pattern is bounded by the sample cap plus the id list; the
//! records themselves are dropped as soon as they are folded.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use bimclass_core::models::{
    Dimension, DimensionStats, DimensionSummary, Pattern, PatternKey, RawRecord,
};

/// Running min/max/sum for one dimension.
#[derive(Debug, Clone, Copy, Default)]
struct DimensionAccumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl DimensionAccumulator {
    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    fn finish(self) -> Option<DimensionSummary> {
        (self.count > 0).then(|| DimensionSummary {
            min: self.min,
            max: self.max,
            avg: self.sum / self.count as f64,
            count: self.count,
        })
    }
}

/// Heap entry ordered by record id, so the heap top is the largest id kept.
#[derive(Debug)]
struct Sample(RawRecord);

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Sample {}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sample {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

#[derive(Debug, Default)]
struct PatternAccumulator {
    element_ids: Vec<String>,
    dimensions: [DimensionAccumulator; 3],
    samples: BinaryHeap<Sample>,
}

impl PatternAccumulator {
    fn add(&mut self, record: RawRecord, sample_size: usize) {
        for (slot, dimension) in self.dimensions.iter_mut().zip(Dimension::ALL) {
            if let Some(value) = dimension.read(&record) {
                slot.add(value);
            }
        }
        self.element_ids.push(record.id.clone());

        // Keep the `sample_size` smallest ids seen so far.
        if self.samples.len() < sample_size {
            self.samples.push(Sample(record));
        } else if self
            .samples
            .peek()
            .is_some_and(|largest| record.id < largest.0.id)
        {
            self.samples.pop();
            self.samples.push(Sample(record));
        }
    }

    fn finish(mut self, key: PatternKey) -> Pattern {
        let mut dimension_stats = DimensionStats::default();
        for (acc, dimension) in self.dimensions.into_iter().zip(Dimension::ALL) {
            dimension_stats.set(dimension, acc.finish());
        }
        self.element_ids.sort_unstable();

        Pattern {
            key,
            element_count: self.element_ids.len() as u64,
            dimension_stats,
            sample_elements: self
                .samples
                .into_sorted_vec()
                .into_iter()
                .map(|s| s.0)
                .collect(),
            element_ids: self.element_ids,
        }
    }
}

/// Folds records into patterns keyed by their five grouping attributes.
///
/// The caller is responsible for feeding each record once.
#[derive(Debug)]
pub struct PatternFold {
    sample_size: usize,
    patterns: HashMap<PatternKey, PatternAccumulator>,
    records_folded: u64,
}

impl PatternFold {
    pub fn new(sample_size: usize) -> Self {
        Self {
            sample_size,
            patterns: HashMap::new(),
            records_folded: 0,
        }
    }

    pub fn add(&mut self, record: RawRecord) {
        let sample_size = self.sample_size;
        self.patterns
            .entry(record.pattern_key())
            .or_default()
            .add(record, sample_size);
        self.records_folded += 1;
    }

    pub fn records_folded(&self) -> u64 {
        self.records_folded
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Finish the fold. Patterns come back sorted by grouping key.
    pub fn finish(self) -> Vec<Pattern> {
        let mut patterns: Vec<Pattern> = self
            .patterns
            .into_iter()
            .map(|(key, acc)| acc.finish(key))
            .collect();
        patterns.sort_by(|a, b| a.key.cmp(&b.key));
        patterns
    }
}
