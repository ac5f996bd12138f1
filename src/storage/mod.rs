//! Storage engine for Rankset
//!
//! The dual-structure sorted set core: a rank-indexed skip list holding the
//! `(score, element)` order, an element-to-score index for O(1) identity
//! lookups, and the facade that keeps the two consistent and applies the
//! bounded-size eviction policy.

pub mod score_index;
pub mod skiplist;
pub mod sorted_set;

pub use score_index::ScoreIndex;
pub use skiplist::SkipList;
pub use sorted_set::{RangeEntry, SortedSet, SortedSetConfig, Upserted};

/// Element identity: opaque to the engine, unique within one set
pub type ElementId = u64;

/// Score type; scores are not required to be unique
pub type Score = i64;
