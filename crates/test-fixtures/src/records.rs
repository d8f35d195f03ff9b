//! Record builders.

use bimclass_core::models::RawRecord;

/// Fluent builder for a `RawRecord` with plausible defaults.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: RawRecord,
}

impl RecordBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            record: RawRecord {
                id: id.into(),
                category: "Walls".into(),
                family: "Basic Wall".into(),
                element_type: "Generic 200mm".into(),
                material: "Concrete".into(),
                location_type: "Level 1".into(),
                length: None,
                width: None,
                height: None,
                diameter: None,
            },
        }
    }

    pub fn category(mut self, v: impl Into<String>) -> Self {
        self.record.category = v.into();
        self
    }

    pub fn family(mut self, v: impl Into<String>) -> Self {
        self.record.family = v.into();
        self
    }

    pub fn element_type(mut self, v: impl Into<String>) -> Self {
        self.record.element_type = v.into();
        self
    }

    pub fn material(mut self, v: impl Into<String>) -> Self {
        self.record.material = v.into();
        self
    }

    pub fn location_type(mut self, v: impl Into<String>) -> Self {
        self.record.location_type = v.into();
        self
    }

    pub fn length(mut self, v: f64) -> Self {
        self.record.length = Some(v);
        self
    }

    pub fn width(mut self, v: f64) -> Self {
        self.record.width = Some(v);
        self
    }

    pub fn height(mut self, v: f64) -> Self {
        self.record.height = Some(v);
        self
    }

    pub fn build(self) -> RawRecord {
        self.record
    }
}

/// `element_count` records spread round-robin over exactly `pattern_count`
/// patterns (when `element_count >= pattern_count`).
///
/// Pattern `p` gets family `"Family {p:04}"` and length `1000 + p`. Ids are
/// `"el-{i:07}"`.
pub fn synthetic_records(element_count: usize, pattern_count: usize) -> Vec<RawRecord> {
    let pattern_count = pattern_count.max(1);
    (0..element_count)
        .map(|i| {
            let p = i % pattern_count;
            RecordBuilder::new(format!("el-{i:07}"))
                .category(format!("Category {}", p % 7))
                .family(format!("Family {p:04}"))
                .length(1000.0 + p as f64)
                .height(3000.0)
                .build()
        })
        .collect()
}
