//! Sorted set facade
//!
//! Composes the skip list and the score index behind a single API and keeps
//! the two mutually consistent: every element in the index has exactly one
//! skip-list node under its recorded `(score, element)` key, and vice versa.
//!
//! Mutations take `&mut self`, so the single-writer discipline the engine
//! assumes is enforced by the borrow checker; sharing a set across threads
//! requires external mutual exclusion supplied by the caller.

use crate::error::{EngineError, Result};

use super::score_index::ScoreIndex;
use super::skiplist::SkipList;
use super::{ElementId, Score};

/// Configuration fixed at creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortedSetConfig {
    /// Cardinality ceiling enforced after each upsert; 0 means unbounded
    pub max_length: usize,
    /// Display direction for [`SortedSet::range_by_index`]: false yields
    /// ascending `(score, element)` order, true the exact reverse
    pub reverse: bool,
}

/// One record of a range query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    pub element: ElementId,
    pub score: Score,
    /// 1-based display rank, counted from the start of the queried window
    /// and independent of the `reverse` flag
    pub rank: usize,
}

/// Result of a successful upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    /// 1-based ascending rank of the element right after the mutation,
    /// before the bounded-size policy ran
    pub rank: usize,
    /// Elements trimmed by the bounded-size policy, in ascending rank order;
    /// empty when the set is unbounded or under its ceiling
    pub evicted: Vec<ElementId>,
}

/// An ordered, rank-addressable sorted set
///
/// Unique elements bound to a numeric score, queryable both by score order
/// (range, rank) and by element identity (O(1) current score, existence).
pub struct SortedSet {
    list: SkipList,
    index: ScoreIndex,
    config: SortedSetConfig,
}

impl SortedSet {
    /// Create a new unbounded, ascending-display sorted set
    pub fn new() -> Self {
        Self::with_config(SortedSetConfig::default())
    }

    /// Create a new sorted set with the given configuration
    pub fn with_config(config: SortedSetConfig) -> Self {
        SortedSet {
            list: SkipList::new(),
            index: ScoreIndex::new(),
            config,
        }
    }

    /// The configuration this set was created with
    pub fn config(&self) -> SortedSetConfig {
        self.config
    }

    /// Insert an element or update its score.
    ///
    /// A fresh element is inserted; an existing element with a different
    /// score is relocated; an existing element with the same score is left
    /// alone (not an error). Afterwards the bounded-size policy may trim the
    /// set; trimmed elements are reported in the result.
    ///
    /// Fails only if the score index and the skip list disagree on
    /// membership, in which case nothing has been mutated.
    pub fn upsert(&mut self, element: ElementId, score: Score) -> Result<Upserted> {
        let rank = match self.index.get(element) {
            None => self.list.insert(score, element),
            Some(cur) if cur != score => {
                if !self.list.update_score(cur, element, score) {
                    return Err(EngineError::InvariantViolation { element });
                }
                self.list
                    .rank(score, element)
                    .ok_or(EngineError::InvariantViolation { element })?
            }
            Some(_) => self
                .list
                .rank(score, element)
                .ok_or(EngineError::InvariantViolation { element })?,
        };
        self.index.set(element, score);

        let evicted = self.enforce_max_length();
        Ok(Upserted { rank, evicted })
    }

    /// Get the current score of an element, O(1)
    pub fn score_of(&self, element: ElementId) -> Option<Score> {
        self.index.get(element)
    }

    /// Check membership, O(1)
    pub fn contains(&self, element: ElementId) -> bool {
        self.index.get(element).is_some()
    }

    /// Get the 1-based ascending rank of an element, or `None` if it is not
    /// a member
    pub fn rank_of(&self, element: ElementId) -> Option<usize> {
        let score = self.index.get(element)?;
        self.list.rank(score, element)
    }

    /// Remove an element.
    ///
    /// Removing a non-member is a normal outcome and returns false.
    pub fn remove(&mut self, element: ElementId) -> bool {
        let Some(score) = self.index.get(element) else {
            return false;
        };
        let deleted = self.list.delete(score, element);
        debug_assert!(deleted, "score index holds an element the skip list lacks");
        self.index.remove(element);
        true
    }

    /// Current cardinality
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Remove all elements, keeping the configuration
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Get a 0-based inclusive display-order range.
    ///
    /// `start` is clamped to 0 if negative; an inverted or empty window
    /// yields an empty result, never an error. Each entry's `rank` is
    /// `start + offset + 1`: a 1-based rank counted from the queried window,
    /// independent of the `reverse` flag.
    pub fn range_by_index(&self, start: i64, end: i64) -> Vec<RangeEntry> {
        let start = start.max(0);
        if end < start || start >= self.list.len() as i64 {
            return Vec::new();
        }
        // An end past the last index stops at the tail; clamping it here
        // also keeps the count arithmetic from overflowing on huge ends.
        let end = end.min(self.list.len() as i64 - 1);
        let start_idx = start as usize;
        let count = (end - start + 1) as usize;

        // Display index 0 is the head in ascending mode and the tail in
        // reverse mode; map it to a 1-based storage rank accordingly.
        let items = if self.config.reverse {
            self.list.range(self.list.len() - start_idx, count, true)
        } else {
            self.list.range(start_idx + 1, count, false)
        };

        items
            .into_iter()
            .enumerate()
            .map(|(offset, (element, score))| RangeEntry {
                element,
                score,
                rank: start_idx + offset + 1,
            })
            .collect()
    }

    /// Get all elements with scores in `min..=max`, in ascending order with
    /// ascending 1-based storage ranks
    pub fn range_by_score(&self, min: Score, max: Score) -> Vec<RangeEntry> {
        let items = self.list.range_by_score(min, max);
        let Some(&(element, score)) = items.first() else {
            return Vec::new();
        };
        let Some(base) = self.list.rank(score, element) else {
            return Vec::new();
        };
        items
            .into_iter()
            .enumerate()
            .map(|(offset, (element, score))| RangeEntry {
                element,
                score,
                rank: base + offset,
            })
            .collect()
    }

    /// Trim the set to its configured ceiling after an upsert.
    ///
    /// Eviction removes ranks `max_length+1..=len()` of the ascending
    /// storage order. The `reverse` display flag plays no part, so a set
    /// displayed highest-first keeps its lowest scores. Callers wanting
    /// top-N retention must invert their scores.
    fn enforce_max_length(&mut self) -> Vec<ElementId> {
        if self.config.max_length == 0 || self.list.len() <= self.config.max_length {
            return Vec::new();
        }
        let evicted = self
            .list
            .delete_range_by_rank(self.config.max_length + 1, self.list.len());
        for &element in &evicted {
            self.index.remove(element);
        }
        evicted
    }
}

impl Default for SortedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SortedSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedSet")
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
