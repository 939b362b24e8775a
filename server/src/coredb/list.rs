//! The list container (spec section 4.2.2).
//!
//! The spec describes a doubly-linked list with sentinel nodes so that push
//! and pop at either end are O(1) and the back-pointers are "weak,
//! non-owning... managed by the container's node arena" (spec section 9,
//! design notes). `VecDeque` gives exactly those complexity and ownership
//! properties in safe Rust without hand-rolled arena indices, so it is used
//! here in place of a literal sentinel-node linked list.

use crate::coredb::string::RString;
use crate::error::{VResult, VertexError};
use crate::util::normalize_index;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct VList {
    items: VecDeque<RString>,
}

impl VList {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_head(&mut self, values: Vec<RString>) -> usize {
        for v in values {
            self.items.push_front(v);
        }
        self.items.len()
    }

    pub fn push_tail(&mut self, values: Vec<RString>) -> usize {
        for v in values {
            self.items.push_back(v);
        }
        self.items.len()
    }

    pub fn pop_head(&mut self) -> VResult<RString> {
        self.items.pop_front().ok_or(VertexError::EmptyList)
    }

    pub fn pop_tail(&mut self) -> VResult<RString> {
        self.items.pop_back().ok_or(VertexError::EmptyList)
    }

    fn normalize(&self, i: i64) -> Option<usize> {
        let idx = normalize_index(i, self.items.len())?;
        if idx < self.items.len() {
            Some(idx)
        } else {
            None
        }
    }

    pub fn index(&self, i: i64) -> VResult<&RString> {
        let idx = self.normalize(i).ok_or(VertexError::OutOfRange)?;
        Ok(&self.items[idx])
    }

    /// Inclusive bounds; `r` clips to `len - 1`; a normalized `l > r` after
    /// clipping yields empty rather than an error. Only an `l` that still
    /// lies outside the list after normalization is an error.
    pub fn range(&self, l: i64, r: i64) -> VResult<Vec<RString>> {
        let len = self.items.len();
        if len == 0 {
            return Ok(Vec::new());
        }
        let l_norm = normalize_index(l, len).ok_or(VertexError::OutOfRange)?;
        if l_norm >= len {
            return Err(VertexError::OutOfRange);
        }
        let r_norm = match normalize_index(r, len) {
            Some(v) => v.min(len - 1),
            None => return Ok(Vec::new()),
        };
        if l_norm > r_norm {
            return Ok(Vec::new());
        }
        Ok(self.items.range(l_norm..=r_norm).cloned().collect())
    }

    pub fn trim(&mut self, l: i64, r: i64) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let l_norm = normalize_index(l, len).unwrap_or(0).min(len);
        let r_norm = match normalize_index(r, len) {
            Some(v) => v.min(len - 1),
            None => {
                self.items.clear();
                return;
            }
        };
        if l_norm > r_norm {
            self.items.clear();
            return;
        }
        let kept: VecDeque<RString> = self.items.range(l_norm..=r_norm).cloned().collect();
        self.items = kept;
    }

    pub fn set(&mut self, i: i64, v: RString) -> VResult<()> {
        let idx = self.normalize(i).ok_or(VertexError::OutOfRange)?;
        self.items[idx] = v;
        Ok(())
    }

    /// Linear scan for the first element byte-equal to `pivot`; insert
    /// adjacent to it. Returns the new length, or `NoSuchPivot` if the pivot
    /// is absent (the spec's sentinel -1 is folded into this error).
    pub fn insert(&mut self, pivot: &[u8], v: RString, after: bool) -> VResult<usize> {
        let pos = self
            .items
            .iter()
            .position(|item| item.bytes().as_ref() == pivot)
            .ok_or(VertexError::NoSuchPivot)?;
        let at = if after { pos + 1 } else { pos };
        self.items.insert(at, v);
        Ok(self.items.len())
    }

    /// `count > 0`: scan head-to-tail removing up to `count`.
    /// `count < 0`: scan tail-to-head removing up to `|count|`.
    /// `count == 0`: remove all matches. Returns the number removed.
    pub fn remove(&mut self, count: i64, v: &[u8]) -> usize {
        let is_match = |item: &RString| item.bytes().as_ref() == v;
        if count == 0 {
            let before = self.items.len();
            self.items.retain(|item| !is_match(item));
            return before - self.items.len();
        }
        let limit = count.unsigned_abs() as usize;
        let mut removed = 0;
        if count > 0 {
            let mut kept = VecDeque::with_capacity(self.items.len());
            for item in self.items.drain(..) {
                if removed < limit && is_match(&item) {
                    removed += 1;
                } else {
                    kept.push_back(item);
                }
            }
            self.items = kept;
        } else {
            let mut kept = VecDeque::with_capacity(self.items.len());
            for item in self.items.drain(..).rev() {
                if removed < limit && is_match(&item) {
                    removed += 1;
                } else {
                    kept.push_front(item);
                }
            }
            self.items = kept;
        }
        removed
    }
}
