//! The string container (spec section 3, "String value (container form)",
//! and section 4.2.1, "Global string map").

use crate::error::{VResult, VertexError};
use crate::util::{fnv1a64, normalize_index, parse_i64};
use bytes::Bytes;

/// An owned byte sequence with a cached fingerprint, a cached parsed integer
/// (present iff the bytes decode as a base-10 i64), and a cached length.
#[derive(Debug, Clone)]
pub struct RString {
    bytes: Bytes,
    fingerprint: u64,
    int_cache: Option<i64>,
    len: usize,
}

impl RString {
    pub fn new(bytes: Bytes) -> Self {
        let int_cache = parse_i64(&bytes);
        let fingerprint = fnv1a64(&bytes);
        let len = bytes.len();
        Self {
            bytes,
            fingerprint,
            int_cache,
            len,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    fn set_bytes(&mut self, bytes: Bytes) {
        self.int_cache = parse_i64(&bytes);
        self.fingerprint = fnv1a64(&bytes);
        self.len = bytes.len();
        self.bytes = bytes;
    }

    /// `append(key, suffix)`: returns the resulting length.
    pub fn append(&mut self, suffix: &[u8]) -> usize {
        let mut buf = Vec::with_capacity(self.bytes.len() + suffix.len());
        buf.extend_from_slice(&self.bytes);
        buf.extend_from_slice(suffix);
        self.set_bytes(Bytes::from(buf));
        self.len
    }

    /// `increase(key, delta)`: atomically updates both the integer variant
    /// and the byte representation. Fails `NotInteger` if the current value
    /// is not a valid i64 encoding.
    pub fn increase(&mut self, delta: i64) -> VResult<i64> {
        let current = self.int_cache.ok_or(VertexError::NotInteger)?;
        let next = current.wrapping_add(delta);
        self.set_bytes(Bytes::from(next.to_string()));
        Ok(next)
    }

    pub fn decrease(&mut self, delta: i64) -> VResult<i64> {
        let current = self.int_cache.ok_or(VertexError::NotInteger)?;
        let next = current.wrapping_sub(delta);
        self.set_bytes(Bytes::from(next.to_string()));
        Ok(next)
    }

    /// `get-range(key, start, end)`: 0-based, inclusive-inclusive, negative
    /// indices count from the end, out-of-range bounds clip to the string's
    /// extent, an inverted range yields empty.
    pub fn get_range(&self, start: i64, end: i64) -> Bytes {
        let len = self.len;
        if len == 0 {
            return Bytes::new();
        }
        let start = normalize_index(start, len).unwrap_or(0).min(len);
        let end = match normalize_index(end, len) {
            Some(e) => e.min(len.saturating_sub(1)),
            None => return Bytes::new(),
        };
        if start > end || start >= len {
            return Bytes::new();
        }
        self.bytes.slice(start..=end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spec section 8: if the value parses as i64, `incrby`/`decrby`
    /// produce the arithmetic result and update the byte form.
    #[test]
    fn increase_updates_both_the_integer_and_byte_form() {
        let mut s = RString::new(Bytes::from_static(b"10"));
        assert_eq!(s.increase(5).unwrap(), 15);
        assert_eq!(s.bytes().as_ref(), &b"15"[..]);
        assert_eq!(s.decrease(20).unwrap(), -5);
        assert_eq!(s.bytes().as_ref(), &b"-5"[..]);
    }

    /// Spec section 8: a non-i64 value fails `not-integer` without
    /// modification.
    #[test]
    fn increase_on_non_integer_value_fails_without_modification() {
        let mut s = RString::new(Bytes::from_static(b"not-a-number"));
        assert!(matches!(s.increase(1), Err(VertexError::NotInteger)));
        assert_eq!(s.bytes().as_ref(), &b"not-a-number"[..]);
        assert!(matches!(s.decrease(1), Err(VertexError::NotInteger)));
        assert_eq!(s.bytes().as_ref(), &b"not-a-number"[..]);
    }
}
