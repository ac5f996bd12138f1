//! Skip list implementation for the sorted set engine
//!
//! Provides a probabilistic balanced structure with O(log n) operations for
//! maintaining scored elements in sorted order. Every forward link carries a
//! span (the number of base-level nodes it skips), which makes rank lookups
//! and rank-range deletions O(log n) without per-node rank storage.
//!
//! Nodes live in an arena and address each other by stable indices; removed
//! slots are recycled through a free list. Relinking stays O(1) and no raw
//! pointers are involved.

use std::fmt::{self, Debug};

use rand::Rng;

use super::{ElementId, Score};

/// Maximum number of levels in the skip list
const MAX_LEVEL: usize = 32;

/// Probability of promoting a node to the next level
const PROBABILITY: f64 = 0.25;

/// Arena index of the header sentinel. The header is created with the list
/// and never removed, so index 0 is always valid.
const HEAD: usize = 0;

/// One level of a node: a forward link plus the number of base-level nodes
/// the link skips over.
#[derive(Debug, Clone, Default)]
struct Level {
    forward: Option<usize>,
    span: usize,
}

/// A node in the skip list
///
/// The backward link is only valid at the base level and supports reverse
/// traversal and tail tracking.
#[derive(Debug)]
struct Node {
    element: ElementId,
    score: Score,
    backward: Option<usize>,
    levels: Vec<Level>,
}

/// Rank-indexed skip list ordered by `(score, element)`, both ascending.
///
/// The element id tie-break is load-bearing: scores may repeat, and it is the
/// tie-break that turns `(score, element)` into a strict total order usable
/// as a unique key.
///
/// Callers are expected to know whether a key is present before calling
/// [`insert`](SkipList::insert), [`update_score`](SkipList::update_score) or
/// [`delete`](SkipList::delete); the sorted set facade resolves that through
/// its score index.
pub struct SkipList {
    arena: Vec<Node>,
    /// Recycled arena slots
    free: Vec<usize>,
    /// Last real node, `None` when empty
    tail: Option<usize>,
    /// Current height, 1..=MAX_LEVEL
    level: usize,
    /// Number of real nodes
    length: usize,
}

impl SkipList {
    /// Create a new empty skip list
    pub fn new() -> Self {
        let header = Node {
            element: 0, // sentinel value, never compared
            score: 0,
            backward: None,
            levels: vec![Level::default(); MAX_LEVEL],
        };

        SkipList {
            arena: vec![header],
            free: Vec::new(),
            tail: None,
            level: 1,
            length: 0,
        }
    }

    /// Get the number of elements
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Insert a new `(score, element)` key, returning its 1-based rank.
    ///
    /// Precondition: the key is not already present. Duplicated scores are
    /// allowed; re-inserting the same element is not, and the caller must
    /// have checked membership beforehand.
    pub fn insert(&mut self, score: Score, element: ElementId) -> usize {
        let mut update = [HEAD; MAX_LEVEL];
        // rank[i] holds the rank crossed to reach the insert position at
        // level i; rank[0] is the number of nodes before the new one.
        let mut rank = [0usize; MAX_LEVEL];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            while let Some(next) = self.arena[x].levels[i].forward {
                if self.key_of(next) < (score, element) {
                    rank[i] += self.arena[x].levels[i].span;
                    x = next;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        let height = self.random_level();
        if height > self.level {
            for i in self.level..height {
                rank[i] = 0;
                update[i] = HEAD;
                self.arena[HEAD].levels[i].span = self.length;
            }
            self.level = height;
        }

        let id = self.alloc(element, score, height);
        for i in 0..height {
            let pred = update[i];
            let pred_forward = self.arena[pred].levels[i].forward;
            let pred_span = self.arena[pred].levels[i].span;

            self.arena[id].levels[i].forward = pred_forward;
            self.arena[id].levels[i].span = pred_span - (rank[0] - rank[i]);
            self.arena[pred].levels[i].forward = Some(id);
            self.arena[pred].levels[i].span = (rank[0] - rank[i]) + 1;
        }

        // Levels above the new node's height now skip one more node
        for i in height..self.level {
            self.arena[update[i]].levels[i].span += 1;
        }

        self.arena[id].backward = if update[0] == HEAD {
            None
        } else {
            Some(update[0])
        };
        if let Some(next) = self.arena[id].levels[0].forward {
            self.arena[next].backward = Some(id);
        } else {
            self.tail = Some(id);
        }

        self.length += 1;
        rank[0] + 1
    }

    /// Change the score of an existing `(cur_score, element)` key.
    ///
    /// If the node's sorted position is unaffected by the change (its
    /// predecessor's score is still strictly below `new_score` and its
    /// successor's strictly above), the score is mutated in place with no
    /// relinking. Otherwise the node is unlinked and re-inserted under the
    /// new score.
    ///
    /// Precondition: the key exists. Returns false without mutating anything
    /// if it does not.
    pub fn update_score(&mut self, cur_score: Score, element: ElementId, new_score: Score) -> bool {
        let mut update = [HEAD; MAX_LEVEL];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.arena[x].levels[i].forward {
                if self.key_of(next) < (cur_score, element) {
                    x = next;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        let Some(x) = self.arena[x].levels[0].forward else {
            debug_assert!(false, "update_score: key not present");
            return false;
        };
        if self.key_of(x) != (cur_score, element) {
            debug_assert!(false, "update_score: key not present");
            return false;
        }

        let pred_ok = match self.arena[x].backward {
            None => true,
            Some(b) => self.arena[b].score < new_score,
        };
        let succ_ok = match self.arena[x].levels[0].forward {
            None => true,
            Some(f) => self.arena[f].score > new_score,
        };
        if pred_ok && succ_ok {
            self.arena[x].score = new_score;
            return true;
        }

        // No way to reuse the old position; unlink and insert fresh
        self.unlink(x, &update);
        self.release(x);
        self.insert(new_score, element);
        true
    }

    /// Remove the node with the exact `(score, element)` key.
    ///
    /// A missing key is a normal outcome and returns false.
    pub fn delete(&mut self, score: Score, element: ElementId) -> bool {
        let mut update = [HEAD; MAX_LEVEL];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.arena[x].levels[i].forward {
                if self.key_of(next) < (score, element) {
                    x = next;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        // Multiple nodes may share the score; only the exact (score, element)
        // key is removed.
        let target = self.arena[x].levels[0].forward;
        match target {
            Some(x) if self.key_of(x) == (score, element) => {
                self.unlink(x, &update);
                self.release(x);
                true
            }
            _ => false,
        }
    }

    /// Get the element at a 1-based rank, or `None` past the end.
    pub fn element_at_rank(&self, rank: usize) -> Option<(ElementId, Score)> {
        self.node_at_rank(rank).map(|id| {
            let node = &self.arena[id];
            (node.element, node.score)
        })
    }

    /// Get the 1-based rank of an exact `(score, element)` key, or `None` if
    /// the key is absent.
    pub fn rank(&self, score: Score, element: ElementId) -> Option<usize> {
        let mut rank = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.arena[x].levels[i].forward {
                if self.key_of(next) <= (score, element) {
                    rank += self.arena[x].levels[i].span;
                    x = next;
                } else {
                    break;
                }
            }
            if x != HEAD && self.key_of(x) == (score, element) {
                return Some(rank);
            }
        }
        None
    }

    /// Remove all nodes with 1-based ranks in `start..=end`, returning the
    /// removed elements in ascending order.
    ///
    /// A single descent finds the predecessor of `start`; each node is then
    /// unlinked exactly as a single delete would, so every per-step invariant
    /// holds throughout.
    pub fn delete_range_by_rank(&mut self, start: usize, end: usize) -> Vec<ElementId> {
        let mut removed = Vec::new();
        if start == 0 || start > end {
            return removed;
        }

        let mut update = [HEAD; MAX_LEVEL];
        let mut traversed = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.arena[x].levels[i].forward {
                let span = self.arena[x].levels[i].span;
                if traversed + span < start {
                    traversed += span;
                    x = next;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        traversed += 1;
        let mut cur = self.arena[x].levels[0].forward;
        while let Some(id) = cur {
            if traversed > end {
                break;
            }
            let next = self.arena[id].levels[0].forward;
            removed.push(self.arena[id].element);
            self.unlink(id, &update);
            self.release(id);
            traversed += 1;
            cur = next;
        }
        removed
    }

    /// Walk up to `count` nodes starting at a 1-based rank, forward or
    /// backward, returning `(element, score)` pairs in walk order.
    ///
    /// An out-of-range start rank yields an empty result.
    pub fn range(&self, start_rank: usize, count: usize, reverse: bool) -> Vec<(ElementId, Score)> {
        let mut items = Vec::new();

        // Start from the head/tail directly when possible, otherwise resolve
        // the starting node by rank.
        let mut node = if reverse {
            if start_rank == self.length && start_rank > 0 {
                self.tail
            } else {
                self.node_at_rank(start_rank)
            }
        } else if start_rank == 1 {
            self.arena[HEAD].levels[0].forward
        } else {
            self.node_at_rank(start_rank)
        };

        while let Some(id) = node {
            if items.len() == count {
                break;
            }
            let n = &self.arena[id];
            items.push((n.element, n.score));
            node = if reverse { n.backward } else { n.levels[0].forward };
        }
        items
    }

    /// Get all nodes with scores in `min..=max`, in ascending order.
    pub fn range_by_score(&self, min: Score, max: Score) -> Vec<(ElementId, Score)> {
        let mut items = Vec::new();

        // Skip to the first node with score >= min
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.arena[x].levels[i].forward {
                if self.arena[next].score < min {
                    x = next;
                } else {
                    break;
                }
            }
        }

        let mut node = self.arena[x].levels[0].forward;
        while let Some(id) = node {
            let n = &self.arena[id];
            if n.score > max {
                break;
            }
            items.push((n.element, n.score));
            node = n.levels[0].forward;
        }
        items
    }

    /// Get all items in ascending `(score, element)` order
    pub fn all_items(&self) -> Vec<(ElementId, Score)> {
        let mut items = Vec::with_capacity(self.length);
        let mut node = self.arena[HEAD].levels[0].forward;
        while let Some(id) = node {
            let n = &self.arena[id];
            items.push((n.element, n.score));
            node = n.levels[0].forward;
        }
        items
    }

    /// Remove all elements and recycle every node slot
    pub fn clear(&mut self) {
        self.arena.truncate(1);
        self.free.clear();
        for level in &mut self.arena[HEAD].levels {
            *level = Level::default();
        }
        self.tail = None;
        self.level = 1;
        self.length = 0;
    }

    // Helper methods

    /// The `(score, element)` ordering key of a node
    fn key_of(&self, id: usize) -> (Score, ElementId) {
        let node = &self.arena[id];
        (node.score, node.element)
    }

    /// Resolve a 1-based rank to an arena index by span-guided descent
    fn node_at_rank(&self, rank: usize) -> Option<usize> {
        if rank == 0 || rank > self.length {
            return None;
        }
        let mut traversed = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.arena[x].levels[i].forward {
                if traversed + self.arena[x].levels[i].span <= rank {
                    traversed += self.arena[x].levels[i].span;
                    x = next;
                } else {
                    break;
                }
            }
            if traversed == rank {
                return Some(x);
            }
        }
        None
    }

    /// Unlink a node at every level, fixing predecessor spans, the backward
    /// link of the successor (or the tail), and the list height.
    ///
    /// `update` must hold the rightmost node before `x` at every level, as
    /// collected by the descent that located `x`.
    fn unlink(&mut self, x: usize, update: &[usize; MAX_LEVEL]) {
        for i in 0..self.level {
            let pred = update[i];
            if self.arena[pred].levels[i].forward == Some(x) {
                let x_span = self.arena[x].levels[i].span;
                let x_forward = self.arena[x].levels[i].forward;
                let level = &mut self.arena[pred].levels[i];
                level.span += x_span;
                level.span -= 1;
                level.forward = x_forward;
            } else {
                // The link at this level jumps over x; it now skips one less
                self.arena[pred].levels[i].span -= 1;
            }
        }

        if let Some(next) = self.arena[x].levels[0].forward {
            self.arena[next].backward = self.arena[x].backward;
        } else {
            self.tail = self.arena[x].backward;
        }

        while self.level > 1 && self.arena[HEAD].levels[self.level - 1].forward.is_none() {
            self.level -= 1;
        }
        self.length -= 1;
    }

    /// Allocate a node of the given height, reusing a free slot if available
    fn alloc(&mut self, element: ElementId, score: Score, height: usize) -> usize {
        let node = Node {
            element,
            score,
            backward: None,
            levels: vec![Level::default(); height],
        };
        match self.free.pop() {
            Some(id) => {
                self.arena[id] = node;
                id
            }
            None => {
                self.arena.push(node);
                self.arena.len() - 1
            }
        }
    }

    /// Return an unlinked node's slot to the free list
    fn release(&mut self, id: usize) {
        self.arena[id].levels = Vec::new();
        self.arena[id].backward = None;
        self.free.push(id);
    }

    /// Generate a random height with a geometric distribution: each extra
    /// level is kept with probability 0.25, capped at MAX_LEVEL. Independent
    /// of the data being inserted.
    fn random_level(&self) -> usize {
        let mut rng = rand::thread_rng();
        let mut level = 1;
        while level < MAX_LEVEL && rng.gen::<f64>() < PROBABILITY {
            level += 1;
        }
        level
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SkipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SkipList {{ len: {}, level: {} }}", self.length, self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spans must agree with a plain base-level walk at every rank
    fn assert_spans_consistent(list: &SkipList) {
        let items = list.all_items();
        assert_eq!(items.len(), list.len());
        for (i, &(element, score)) in items.iter().enumerate() {
            let rank = i + 1;
            assert_eq!(list.element_at_rank(rank), Some((element, score)));
            assert_eq!(list.rank(score, element), Some(rank));
        }
        assert_eq!(list.element_at_rank(items.len() + 1), None);
    }

    #[test]
    fn test_insert_ordering() {
        let mut list = SkipList::new();

        assert_eq!(list.insert(30, 1), 1);
        assert_eq!(list.insert(10, 2), 1);
        assert_eq!(list.insert(20, 3), 2);

        assert_eq!(list.len(), 3);
        assert_eq!(list.all_items(), vec![(2, 10), (3, 20), (1, 30)]);
        assert_spans_consistent(&list);
    }

    #[test]
    fn test_duplicate_scores_tie_break_on_element() {
        let mut list = SkipList::new();

        list.insert(1, 30);
        list.insert(1, 10);
        list.insert(1, 20);

        // Same score: ascending element id decides the order
        assert_eq!(list.all_items(), vec![(10, 1), (20, 1), (30, 1)]);
        assert_eq!(list.rank(1, 10), Some(1));
        assert_eq!(list.rank(1, 20), Some(2));
        assert_eq!(list.rank(1, 30), Some(3));
        assert_spans_consistent(&list);
    }

    #[test]
    fn test_delete() {
        let mut list = SkipList::new();

        list.insert(10, 1);
        list.insert(20, 2);
        list.insert(30, 3);

        assert!(list.delete(20, 2));
        assert_eq!(list.len(), 2);
        assert_eq!(list.all_items(), vec![(1, 10), (3, 30)]);
        assert_spans_consistent(&list);

        // Missing key is a normal outcome
        assert!(!list.delete(20, 2));
        assert!(!list.delete(10, 99));
        assert_eq!(list.len(), 2);

        assert!(list.delete(10, 1));
        assert!(list.delete(30, 3));
        assert!(list.is_empty());
        assert_eq!(list.element_at_rank(1), None);
    }

    #[test]
    fn test_update_score_in_place() {
        let mut list = SkipList::new();

        list.insert(10, 1);
        list.insert(20, 2);
        list.insert(30, 3);

        // 20 -> 25 keeps element 2 between its neighbors
        assert!(list.update_score(20, 2, 25));
        assert_eq!(list.all_items(), vec![(1, 10), (2, 25), (3, 30)]);
        assert_spans_consistent(&list);
    }

    #[test]
    fn test_update_score_relocates() {
        let mut list = SkipList::new();

        list.insert(10, 1);
        list.insert(20, 2);
        list.insert(30, 3);

        // 20 -> 5 moves element 2 to the front
        assert!(list.update_score(20, 2, 5));
        assert_eq!(list.all_items(), vec![(2, 5), (1, 10), (3, 30)]);

        // 5 -> 40 moves it to the back
        assert!(list.update_score(5, 2, 40));
        assert_eq!(list.all_items(), vec![(1, 10), (3, 30), (2, 40)]);
        assert_spans_consistent(&list);
    }

    #[test]
    fn test_element_at_rank() {
        let mut list = SkipList::new();

        list.insert(10, 1);
        list.insert(20, 2);
        list.insert(30, 3);
        list.insert(40, 4);

        assert_eq!(list.element_at_rank(0), None);
        assert_eq!(list.element_at_rank(1), Some((1, 10)));
        assert_eq!(list.element_at_rank(2), Some((2, 20)));
        assert_eq!(list.element_at_rank(4), Some((4, 40)));
        assert_eq!(list.element_at_rank(5), None);
    }

    #[test]
    fn test_delete_range_by_rank() {
        let mut list = SkipList::new();

        for i in 1..=10 {
            list.insert(i * 10, i as ElementId);
        }

        let removed = list.delete_range_by_rank(3, 5);
        assert_eq!(removed, vec![3, 4, 5]);
        assert_eq!(list.len(), 7);
        assert_eq!(
            list.all_items(),
            vec![(1, 10), (2, 20), (6, 60), (7, 70), (8, 80), (9, 90), (10, 100)]
        );
        assert_spans_consistent(&list);

        // End rank past the list just stops at the tail
        let removed = list.delete_range_by_rank(6, 100);
        assert_eq!(removed, vec![9, 10]);
        assert_eq!(list.len(), 5);
        assert_spans_consistent(&list);

        // Degenerate ranges remove nothing
        assert!(list.delete_range_by_rank(0, 3).is_empty());
        assert!(list.delete_range_by_rank(4, 3).is_empty());
        assert!(list.delete_range_by_rank(6, 9).is_empty());
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_range_forward_and_backward() {
        let mut list = SkipList::new();

        list.insert(10, 1);
        list.insert(20, 2);
        list.insert(30, 3);
        list.insert(40, 4);

        assert_eq!(list.range(1, 2, false), vec![(1, 10), (2, 20)]);
        assert_eq!(list.range(3, 10, false), vec![(3, 30), (4, 40)]);
        assert_eq!(list.range(4, 2, true), vec![(4, 40), (3, 30)]);
        assert_eq!(list.range(2, 10, true), vec![(2, 20), (1, 10)]);
        assert!(list.range(5, 1, false).is_empty());
        assert!(list.range(0, 1, false).is_empty());
    }

    #[test]
    fn test_range_by_score() {
        let mut list = SkipList::new();

        list.insert(10, 1);
        list.insert(20, 2);
        list.insert(20, 5);
        list.insert(30, 3);
        list.insert(40, 4);

        assert_eq!(list.range_by_score(20, 30), vec![(2, 20), (5, 20), (3, 30)]);
        assert_eq!(list.range_by_score(15, 15), vec![]);
        assert_eq!(list.range_by_score(i64::MIN, i64::MAX).len(), 5);
    }

    #[test]
    fn test_tail_tracking() {
        let mut list = SkipList::new();

        list.insert(10, 1);
        list.insert(30, 3);
        list.insert(20, 2);
        assert_eq!(list.range(3, 3, true), vec![(3, 30), (2, 20), (1, 10)]);

        list.delete(30, 3);
        assert_eq!(list.range(2, 2, true), vec![(2, 20), (1, 10)]);

        list.delete(20, 2);
        list.delete(10, 1);
        assert!(list.range(0, 1, true).is_empty());
    }

    #[test]
    fn test_slot_reuse() {
        let mut list = SkipList::new();

        for i in 1..=100 {
            list.insert(i, i as ElementId);
        }
        let arena_len = list.arena.len();

        for i in 1..=50 {
            assert!(list.delete(i, i as ElementId));
        }
        for i in 101..=150 {
            list.insert(i, i as ElementId);
        }

        // Freed slots are recycled before the arena grows
        assert_eq!(list.arena.len(), arena_len);
        assert_eq!(list.len(), 100);
        assert_spans_consistent(&list);
    }

    #[test]
    fn test_clear() {
        let mut list = SkipList::new();

        for i in 1..=20 {
            list.insert(i, i as ElementId);
        }
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.all_items(), vec![]);
        list.insert(5, 1);
        assert_eq!(list.all_items(), vec![(1, 5)]);
    }

    #[test]
    fn test_randomized_span_consistency() {
        let mut list = SkipList::new();
        let mut rng = rand::thread_rng();
        let mut present: Vec<(ElementId, Score)> = Vec::new();

        for round in 0..2000u64 {
            let action = rng.gen_range(0..10);
            if action < 6 || present.is_empty() {
                let element = round;
                let score = rng.gen_range(-1000..1000);
                list.insert(score, element);
                present.push((element, score));
            } else if action < 8 {
                let idx = rng.gen_range(0..present.len());
                let (element, score) = present[idx];
                let new_score = rng.gen_range(-1000..1000);
                assert!(list.update_score(score, element, new_score));
                present[idx] = (element, new_score);
            } else {
                let idx = rng.gen_range(0..present.len());
                let (element, score) = present.swap_remove(idx);
                assert!(list.delete(score, element));
            }
        }

        assert_eq!(list.len(), present.len());
        let mut expected = present.clone();
        expected.sort_by_key(|&(element, score)| (score, element));
        assert_eq!(list.all_items(), expected);
        assert_spans_consistent(&list);
    }
}
