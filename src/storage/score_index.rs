//! Element-to-score index
//!
//! The membership half of the sorted set's dual structure: a flat mapping
//! from element id to current score. Entry existence is authoritative for
//! "is this element a member", and the recorded score is what lets the
//! facade address the skip list by its exact `(score, element)` key.

use std::collections::HashMap;

use super::{ElementId, Score};

/// O(1) lookup table mirroring the skip list's membership
#[derive(Debug, Default)]
pub struct ScoreIndex {
    scores: HashMap<ElementId, Score>,
}

impl ScoreIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        ScoreIndex {
            scores: HashMap::new(),
        }
    }

    /// Get the current score of an element, or `None` if it is not a member
    pub fn get(&self, element: ElementId) -> Option<Score> {
        self.scores.get(&element).copied()
    }

    /// Record the current score of an element
    pub fn set(&mut self, element: ElementId, score: Score) {
        self.scores.insert(element, score);
    }

    /// Drop an element, returning its last recorded score
    pub fn remove(&mut self, element: ElementId) -> Option<Score> {
        self.scores.remove(&element)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Drop all members
    pub fn clear(&mut self) {
        self.scores.clear();
    }
}
