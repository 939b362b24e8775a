//! The sorted set / skip list container (spec section 4.2.5).
//!
//! Grounded directly on `original_source/pkg/container/sorted_set.go`: a
//! probabilistic multi-level linked list with per-level span counters for
//! O(log N) rank queries. The Go source's nodes hold raw `*skipListNode`
//! back-pointers; per spec section 9's design note ("weak/non-owning
//! indices... managed by the container's node arena"), this is translated
//! into a `Vec<Option<Node>>` arena addressed by `usize` handles plus a free
//! list for reclaimed slots, instead of carrying pointers or `Rc` into safe
//! Rust.

use bytes::Bytes;
use rand::Rng;
use std::collections::HashMap;

use crate::error::{VResult, VertexError};
use crate::util::normalize_index;

const MAX_LEVEL: usize = 32;
const SCALE_FACTOR: u32 = 4;

#[derive(Debug, Clone)]
struct Level {
    next: Option<usize>,
    span: usize,
}

#[derive(Debug, Clone)]
struct Node {
    score: f64,
    member: Bytes,
    levels: Vec<Level>,
    prev: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct VZSet {
    arena: Vec<Option<Node>>,
    free_list: Vec<usize>,
    head: Vec<Level>,
    tail: Option<usize>,
    level: usize,
    index: HashMap<Bytes, usize>,
}

impl Default for VZSet {
    fn default() -> Self {
        Self::new()
    }
}

impl VZSet {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            free_list: Vec::new(),
            head: (0..MAX_LEVEL)
                .map(|_| Level {
                    next: None,
                    span: 0,
                })
                .collect(),
            tail: None,
            level: 1,
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn random_level() -> usize {
        let mut level = 1;
        let mut rng = rand::thread_rng();
        while rng.gen::<u32>() % SCALE_FACTOR == 0 && level < MAX_LEVEL {
            level += 1;
        }
        level
    }

    fn node(&self, idx: usize) -> &Node {
        self.arena[idx].as_ref().expect("dangling skip list index")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node {
        self.arena[idx].as_mut().expect("dangling skip list index")
    }

    fn next_of(&self, at: Option<usize>, level: usize) -> Option<usize> {
        match at {
            None => self.head[level].next,
            Some(i) => self.node(i).levels[level].next,
        }
    }

    fn span_of(&self, at: Option<usize>, level: usize) -> usize {
        match at {
            None => self.head[level].span,
            Some(i) => self.node(i).levels[level].span,
        }
    }

    fn set_next(&mut self, at: Option<usize>, level: usize, next: Option<usize>) {
        match at {
            None => self.head[level].next = next,
            Some(i) => self.node_mut(i).levels[level].next = next,
        }
    }

    fn set_span(&mut self, at: Option<usize>, level: usize, span: usize) {
        match at {
            None => self.head[level].span = span,
            Some(i) => self.node_mut(i).levels[level].span = span,
        }
    }

    fn precedes(&self, idx: usize, score: f64, member: &[u8]) -> bool {
        let n = self.node(idx);
        n.score < score || (n.score == score && n.member.as_ref() < member)
    }

    fn alloc(&mut self, score: f64, member: Bytes, height: usize) -> usize {
        let node = Node {
            score,
            member,
            levels: (0..height)
                .map(|_| Level {
                    next: None,
                    span: 0,
                })
                .collect(),
            prev: None,
        };
        if let Some(slot) = self.free_list.pop() {
            self.arena[slot] = Some(node);
            slot
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    /// Insert a fresh member; caller (`add`) is responsible for evicting an
    /// existing entry under the same member first.
    fn insert(&mut self, score: f64, member: Bytes) {
        let mut update: Vec<Option<usize>> = vec![None; MAX_LEVEL];
        let mut rank: Vec<usize> = vec![0; MAX_LEVEL];
        let mut cur: Option<usize> = None;

        for level in (0..self.level).rev() {
            rank[level] = if level == self.level - 1 {
                0
            } else {
                rank[level + 1]
            };
            while let Some(nidx) = self.next_of(cur, level) {
                if self.precedes(nidx, score, &member) {
                    rank[level] += self.span_of(cur, level);
                    cur = Some(nidx);
                } else {
                    break;
                }
            }
            update[level] = cur;
        }

        let new_level = Self::random_level();
        if new_level > self.level {
            for level in self.level..new_level {
                rank[level] = 0;
                update[level] = None;
                self.set_span(None, level, self.len());
            }
            self.level = new_level;
        }

        let idx = self.alloc(score, member, new_level);

        for level in 0..new_level {
            let pred = update[level];
            let pred_next = self.next_of(pred, level);
            let pred_span = self.span_of(pred, level);
            self.node_mut(idx).levels[level].next = pred_next;
            self.node_mut(idx).levels[level].span = pred_span - (rank[0] - rank[level]);
            self.set_next(pred, level, Some(idx));
            self.set_span(pred, level, rank[0] - rank[level] + 1);
        }

        for level in new_level..self.level {
            let pred = update[level];
            let s = self.span_of(pred, level);
            self.set_span(pred, level, s + 1);
        }

        let prev = update[0];
        self.node_mut(idx).prev = prev;
        let next0 = self.node(idx).levels[0].next;
        match next0 {
            Some(nn) => self.node_mut(nn).prev = Some(idx),
            None => self.tail = Some(idx),
        }

        self.index.insert(self.node(idx).member.clone(), idx);
    }

    fn delete_node(&mut self, idx: usize) {
        let mut update: Vec<Option<usize>> = vec![None; MAX_LEVEL];
        let mut cur: Option<usize> = None;
        for level in (0..self.level).rev() {
            while let Some(nidx) = self.next_of(cur, level) {
                if nidx == idx {
                    break;
                }
                cur = Some(nidx);
            }
            update[level] = cur;
        }

        for level in 0..self.level {
            let pred = update[level];
            if self.next_of(pred, level) == Some(idx) {
                let node_next = self.node(idx).levels[level].next;
                let node_span = self.node(idx).levels[level].span;
                self.set_next(pred, level, node_next);
                let pred_span = self.span_of(pred, level);
                self.set_span(pred, level, pred_span + node_span - 1);
            } else {
                let pred_span = self.span_of(pred, level);
                self.set_span(pred, level, pred_span.saturating_sub(1));
            }
        }

        while self.level > 1 && self.head[self.level - 1].next.is_none() {
            self.level -= 1;
        }

        let node = self.arena[idx].take().expect("double free in skip list");
        let prev = node.prev;
        let next0 = node.levels.first().and_then(|l| l.next);
        match next0 {
            Some(nn) => self.node_mut(nn).prev = prev,
            None => self.tail = prev,
        }
        self.index.remove(&node.member);
        self.free_list.push(idx);
    }

    /// `add(scores[], members[])`: length mismatch fails. Adding an existing
    /// member under a different score is a delete-then-insert, preserving
    /// the member's identity (spec section 4.2.5, invariants).
    pub fn add(&mut self, scores: Vec<f64>, members: Vec<Bytes>) -> VResult<()> {
        if scores.len() != members.len() {
            return Err(VertexError::HashLengthMismatch);
        }
        for (score, member) in scores.into_iter().zip(members) {
            if let Some(&idx) = self.index.get(&member) {
                self.delete_node(idx);
            }
            self.insert(score, member);
        }
        Ok(())
    }

    pub fn del(&mut self, members: &[Bytes]) {
        for member in members {
            if let Some(&idx) = self.index.get(member) {
                self.delete_node(idx);
            }
        }
    }

    pub fn score(&self, member: &[u8]) -> VResult<f64> {
        let idx = *self.index.get(member).ok_or(VertexError::EntryNotFound)?;
        Ok(self.node(idx).score)
    }

    /// Delete-then-insert at the new score, per spec section 4.2.5.
    pub fn increase_by(&mut self, member: &[u8], delta: f64) -> VResult<f64> {
        let idx = *self.index.get(member).ok_or(VertexError::EntryNotFound)?;
        let node = self.node(idx);
        let new_score = node.score + delta;
        let member = node.member.clone();
        self.delete_node(idx);
        self.insert(new_score, member);
        Ok(new_score)
    }

    pub fn pop_min(&mut self) -> VResult<(Bytes, f64)> {
        let idx = self.head[0].next.ok_or(VertexError::SortedSetEmpty)?;
        let node = self.node(idx);
        let result = (node.member.clone(), node.score);
        self.delete_node(idx);
        Ok(result)
    }

    pub fn pop_max(&mut self) -> VResult<(Bytes, f64)> {
        let idx = self.tail.ok_or(VertexError::SortedSetEmpty)?;
        let node = self.node(idx);
        let result = (node.member.clone(), node.score);
        self.delete_node(idx);
        Ok(result)
    }

    /// 0-based rank, computed by walking the same top-down descent used by
    /// `insert`, stopping just before the target node.
    fn rank_of(&self, idx: usize) -> usize {
        let target = self.node(idx);
        let (score, member) = (target.score, target.member.clone());
        let mut rank = 0usize;
        let mut cur: Option<usize> = None;
        for level in (0..self.level).rev() {
            while let Some(nidx) = self.next_of(cur, level) {
                if nidx != idx && self.precedes(nidx, score, &member) {
                    rank += self.span_of(cur, level);
                    cur = Some(nidx);
                } else {
                    break;
                }
            }
        }
        rank
    }

    pub fn rank(&self, member: &[u8]) -> VResult<usize> {
        let idx = *self.index.get(member).ok_or(VertexError::EntryNotFound)?;
        Ok(self.rank_of(idx))
    }

    fn node_at_rank(&self, rank: usize) -> Option<usize> {
        let mut cur: Option<usize> = None;
        let mut traversed = 0usize;
        for level in (0..self.level).rev() {
            while let Some(nidx) = self.next_of(cur, level) {
                let span = self.span_of(cur, level);
                if traversed + span <= rank {
                    traversed += span;
                    cur = Some(nidx);
                } else {
                    break;
                }
            }
        }
        self.next_of(cur, 0)
    }

    pub fn count(&self, min: f64, max: f64) -> usize {
        let mut cur: Option<usize> = None;
        for level in (0..self.level).rev() {
            while let Some(nidx) = self.next_of(cur, level) {
                if self.node(nidx).score < min {
                    cur = Some(nidx);
                } else {
                    break;
                }
            }
        }
        let mut count = 0;
        let mut walk = self.next_of(cur, 0);
        while let Some(idx) = walk {
            let node = self.node(idx);
            if node.score > max {
                break;
            }
            count += 1;
            walk = node.levels[0].next;
        }
        count
    }

    /// Indices negative-normalized, inclusive.
    pub fn range_by_rank(&self, start: i64, end: i64) -> Vec<(Bytes, f64)> {
        let len = self.len();
        if len == 0 {
            return Vec::new();
        }
        let start = normalize_index(start, len).unwrap_or(0).min(len);
        let end = match normalize_index(end, len) {
            Some(e) => e.min(len - 1),
            None => return Vec::new(),
        };
        if start > end || start >= len {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(end - start + 1);
        let mut walk = self.node_at_rank(start);
        for _ in start..=end {
            match walk {
                Some(idx) => {
                    let node = self.node(idx);
                    out.push((node.member.clone(), node.score));
                    walk = node.levels[0].next;
                }
                None => break,
            }
        }
        out
    }

    pub fn range_by_score(&self, min: f64, max: f64) -> Vec<(Bytes, f64)> {
        let mut cur: Option<usize> = None;
        for level in (0..self.level).rev() {
            while let Some(nidx) = self.next_of(cur, level) {
                if self.node(nidx).score < min {
                    cur = Some(nidx);
                } else {
                    break;
                }
            }
        }
        let mut out = Vec::new();
        let mut walk = self.next_of(cur, 0);
        while let Some(idx) = walk {
            let node = self.node(idx);
            if node.score > max {
                break;
            }
            out.push((node.member.clone(), node.score));
            walk = node.levels[0].next;
        }
        out
    }

    pub fn del_range_by_rank(&mut self, start: i64, end: i64) {
        let members: Vec<Bytes> = self
            .range_by_rank(start, end)
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        self.del(&members);
    }

    pub fn del_range_by_score(&mut self, min: f64, max: f64) {
        let members: Vec<Bytes> = self
            .range_by_score(min, max)
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        self.del(&members);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &str) -> Bytes {
        Bytes::from(s.to_owned())
    }

    /// Spec section 8: after `add([1,2,3],[a,b,c])`, `rank(b)=1`, `pop-min`
    /// yields `a`, and `rank(c)` becomes 1.
    #[test]
    fn add_rank_pop_min_law() {
        let mut z = VZSet::new();
        z.add(vec![1.0, 2.0, 3.0], vec![b("a"), b("b"), b("c")]).unwrap();

        assert_eq!(z.rank(b"b").unwrap(), 1);

        let (member, score) = z.pop_min().unwrap();
        assert_eq!(member, b("a"));
        assert_eq!(score, 1.0);

        assert_eq!(z.rank(b"c").unwrap(), 1);
    }

    #[test]
    fn pop_max_yields_the_highest_score() {
        let mut z = VZSet::new();
        z.add(vec![1.0, 2.0, 3.0], vec![b("a"), b("b"), b("c")]).unwrap();
        let (member, score) = z.pop_max().unwrap();
        assert_eq!(member, b("c"));
        assert_eq!(score, 3.0);
    }

    #[test]
    fn pop_min_on_empty_set_is_an_error() {
        let mut z = VZSet::new();
        assert!(matches!(z.pop_min(), Err(VertexError::SortedSetEmpty)));
    }

    #[test]
    fn range_by_rank_is_ascending_by_score() {
        let mut z = VZSet::new();
        z.add(vec![3.0, 1.0, 2.0], vec![b("c"), b("a"), b("b")]).unwrap();
        let members: Vec<Bytes> = z
            .range_by_rank(0, -1)
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        assert_eq!(members, vec![b("a"), b("b"), b("c")]);
    }

    #[test]
    fn increase_by_reorders_the_member() {
        let mut z = VZSet::new();
        z.add(vec![1.0, 2.0, 3.0], vec![b("a"), b("b"), b("c")]).unwrap();
        let new_score = z.increase_by(b"a", 5.0).unwrap();
        assert_eq!(new_score, 6.0);
        assert_eq!(z.rank(b"a").unwrap(), 2);
        assert_eq!(z.score(b"a").unwrap(), 6.0);
    }

    #[test]
    fn add_with_mismatched_lengths_fails() {
        let mut z = VZSet::new();
        assert!(matches!(
            z.add(vec![1.0], vec![b("a"), b("b")]),
            Err(VertexError::HashLengthMismatch)
        ));
    }
}
