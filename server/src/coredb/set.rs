//! The set container (spec section 4.2.4). Iteration order is unspecified,
//! as the spec allows; membership is byte-exact.

use bytes::Bytes;
use rand::seq::SliceRandom;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct VSet {
    members: HashSet<Bytes>,
}

impl VSet {
    pub fn new() -> Self {
        Self {
            members: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the number newly added.
    pub fn add(&mut self, values: Vec<Bytes>) -> usize {
        let mut added = 0;
        for v in values {
            if self.members.insert(v) {
                added += 1;
            }
        }
        added
    }

    /// Returns the number removed.
    pub fn delete(&mut self, values: &[Bytes]) -> usize {
        let mut removed = 0;
        for v in values {
            if self.members.remove(v) {
                removed += 1;
            }
        }
        removed
    }

    pub fn is_member(&self, v: &[u8]) -> bool {
        self.members.contains(v)
    }

    pub fn members(&self) -> Vec<Bytes> {
        self.members.iter().cloned().collect()
    }

    /// Select up to `|count|` members. The spec treats a negative count as
    /// fully equivalent to positive clipping since the backing store is a
    /// set (no duplicates are representable either way).
    pub fn random_member(&self, count: i64) -> Vec<Bytes> {
        let n = count.unsigned_abs() as usize;
        let all = self.members();
        let mut rng = rand::thread_rng();
        all.choose_multiple(&mut rng, n.min(all.len()))
            .cloned()
            .collect()
    }

    pub fn pop(&mut self, count: i64) -> Vec<Bytes> {
        let n = count.unsigned_abs() as usize;
        let mut rng = rand::thread_rng();
        let chosen: Vec<Bytes> = self
            .members
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .choose_multiple(&mut rng, n.min(self.members.len()))
            .cloned()
            .collect();
        for c in &chosen {
            self.members.remove(c);
        }
        chosen
    }

    pub fn diff(&self, others: &[&VSet]) -> VSet {
        let mut result = self.clone();
        for other in others {
            result.members.retain(|m| !other.members.contains(m));
        }
        result
    }

    pub fn intersect(&self, others: &[&VSet]) -> VSet {
        let mut result = self.clone();
        result
            .members
            .retain(|m| others.iter().all(|o| o.members.contains(m)));
        result
    }

    pub fn union(&self, others: &[&VSet]) -> VSet {
        let mut result = self.clone();
        for other in others {
            for m in &other.members {
                result.members.insert(m.clone());
            }
        }
        result
    }
}
