//! # bimclass-patterns
//!
//! Groups raw element records into patterns and derives their cache keys.
//! `PatternAggregator` streams records page by page from an `IRecordSource`;
//! `PatternHasher` turns a pattern's identity into a blake3 digest.

pub mod aggregator;
pub mod fold;
pub mod hasher;
pub mod source;

pub use aggregator::PatternAggregator;
pub use fold::PatternFold;
pub use hasher::PatternHasher;
pub use source::InMemoryRecordSource;
