//! Scripted classifier.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use bimclass_core::errors::ClassificationError;
use bimclass_core::models::{Classification, ClassificationContext, LineItem, Pattern};
use bimclass_core::traits::IClassifier;

/// Deterministic classifier: codes derive from the pattern key.
///
/// Families listed with `failing_family` fail; `with_delay` sleeps (on the
/// tokio clock) before answering; every call is counted per family.
#[derive(Debug)]
pub struct ScriptedClassifier {
    failing: HashSet<String>,
    delay: Option<Duration>,
    confidence: f64,
    calls: AtomicUsize,
    calls_by_family: Mutex<HashMap<String, usize>>,
}

impl Default for ScriptedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            delay: None,
            confidence: 0.92,
            calls: AtomicUsize::new(0),
            calls_by_family: Mutex::new(HashMap::new()),
        }
    }

    pub fn failing_family(mut self, family: impl Into<String>) -> Self {
        self.failing.insert(family.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, family: &str) -> usize {
        self.calls_by_family
            .lock()
            .unwrap()
            .get(family)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl IClassifier for ScriptedClassifier {
    async fn classify(
        &self,
        pattern: &Pattern,
        _context: &ClassificationContext,
    ) -> Result<Classification, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_family
            .lock()
            .unwrap()
            .entry(pattern.key.family.clone())
            .or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&pattern.key.family) {
            return Err(ClassificationError::Failed {
                reason: format!("scripted failure for {}", pattern.key.family),
            });
        }

        Ok(Classification {
            commodity_code: Some(format!("CC-{}", pattern.key.family)),
            pricing_code: Some(format!("PC-{}", pattern.key.element_type)),
            line_items: vec![LineItem {
                code: format!("LI-{}", pattern.key.material),
                description: format!("{} {}", pattern.key.category, pattern.key.family),
                quantity: pattern.element_count as f64,
                unit: "ea".into(),
            }],
            confidence: self.confidence,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
