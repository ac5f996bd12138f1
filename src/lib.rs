//! Rankset library
//!
//! An ordered, rank-addressable sorted set: unique elements bound to numeric
//! scores, queryable by score order (range, rank) and by element identity
//! (O(1) current score, existence), with an optional bounded-size eviction
//! policy. The core primitive behind leaderboards, priority queues, and
//! top-K working sets.
//!
//! ```
//! use rankset::{SortedSet, SortedSetConfig};
//!
//! let mut set = SortedSet::new();
//! set.upsert(1, 10).unwrap();
//! set.upsert(2, 20).unwrap();
//! set.upsert(3, 15).unwrap();
//!
//! assert_eq!(set.score_of(3), Some(15));
//! let range = set.range_by_index(0, 2);
//! assert_eq!(range[1].element, 3);
//!
//! let mut bounded = SortedSet::with_config(SortedSetConfig {
//!     max_length: 2,
//!     reverse: false,
//! });
//! bounded.upsert(1, 1).unwrap();
//! bounded.upsert(2, 2).unwrap();
//! let outcome = bounded.upsert(3, 3).unwrap();
//! assert_eq!(outcome.evicted, vec![3]);
//! ```

pub mod error;
pub mod storage;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use storage::{ElementId, RangeEntry, Score, SortedSet, SortedSetConfig, Upserted};
