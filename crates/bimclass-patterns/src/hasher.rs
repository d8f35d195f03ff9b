//! Canonical pattern hashing.
//!
//! The canonical form is a version tag, the five grouping fields each
//! length-prefixed, then length/width/height as a presence byte followed by
//! min/max/avg formatted at a fixed precision. Length prefixes keep
//! ("AB", "C") and ("A", "BC") apart; fixed-precision formatting keeps float
//! noise out of the key.

use bimclass_core::config::HashingConfig;
use bimclass_core::constants::{PATTERN_HASH_HEX_LEN, PATTERN_HASH_VERSION};
use bimclass_core::models::{Dimension, DimensionStats, Pattern, PatternHash, PatternKey};

/// Derives stable cache keys for patterns. Pure; holds only the precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternHasher {
    precision: u32,
}

impl PatternHasher {
    /// Hasher rounding dimension stats to `precision` decimals.
    pub fn new(precision: u32) -> Self {
        Self { precision }
    }

    /// Hasher using `hashing.precision`.
    pub fn from_config(config: &HashingConfig) -> Self {
        Self::new(config.precision)
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Hash a pattern by its grouping key and rounded dimension stats.
    ///
    /// Element count, samples, and element ids do not participate.
    pub fn hash(&self, pattern: &Pattern) -> PatternHash {
        self.hash_parts(&pattern.key, &pattern.dimension_stats)
    }

    /// Hash a grouping key and stats without building a `Pattern`.
    pub fn hash_parts(&self, key: &PatternKey, stats: &DimensionStats) -> PatternHash {
        let hex = blake3::hash(&self.canonical_bytes(key, stats)).to_hex();
        debug_assert_eq!(hex.len(), PATTERN_HASH_HEX_LEN);
        PatternHash::new(hex.to_string())
    }

    /// The exact byte string that gets digested.
    pub fn canonical_bytes(&self, key: &PatternKey, stats: &DimensionStats) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        push_field(&mut buf, PATTERN_HASH_VERSION.as_bytes());
        push_field(&mut buf, &self.precision.to_le_bytes());

        for field in key.fields() {
            push_field(&mut buf, field.as_bytes());
        }

        for dimension in Dimension::ALL {
            match stats.get(dimension) {
                Some(summary) => {
                    buf.push(1);
                    for value in [summary.min, summary.max, summary.avg] {
                        push_field(&mut buf, round_fixed(value, self.precision).as_bytes());
                    }
                }
                None => buf.push(0),
            }
        }
        buf
    }
}

impl Default for PatternHasher {
    fn default() -> Self {
        Self::from_config(&HashingConfig::default())
    }
}

fn push_field(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Format `value` with exactly `precision` decimals; "-0.00" collapses to "0.00".
pub(crate) fn round_fixed(value: f64, precision: u32) -> String {
    let formatted = format!("{:.*}", precision as usize, value);
    match formatted.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => formatted,
    }
}
