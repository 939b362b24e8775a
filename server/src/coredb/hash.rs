//! The hash container (spec section 4.2.3).

use crate::coredb::string::RString;
use crate::error::{VResult, VertexError};
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct VHash {
    fields: HashMap<Bytes, RString>,
}

impl VHash {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the count of newly inserted fields (updates to existing
    /// fields don't count).
    pub fn set(&mut self, pairs: Vec<(Bytes, RString)>) -> usize {
        let mut inserted = 0;
        for (field, value) in pairs {
            if self.fields.insert(field, value).is_none() {
                inserted += 1;
            }
        }
        inserted
    }

    pub fn get(&self, field: &[u8]) -> Option<&RString> {
        self.fields.get(field)
    }

    pub fn exists(&self, field: &[u8]) -> bool {
        self.fields.contains_key(field)
    }

    pub fn del(&mut self, fields: &[Bytes]) -> usize {
        let mut removed = 0;
        for field in fields {
            if self.fields.remove(field.as_ref()).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn keys(&self) -> Vec<Bytes> {
        self.fields.keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<RString> {
        self.fields.values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(Bytes, RString)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn field_length(&self, field: &[u8]) -> VResult<usize> {
        self.fields
            .get(field)
            .map(|v| v.len())
            .ok_or(VertexError::FieldMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spec section 8: `hset` of a new field returns 1, of an existing
    /// field returns 0, and an existing field's value is updated.
    #[test]
    fn set_reports_only_newly_inserted_fields() {
        let mut h = VHash::new();
        let inserted = h.set(vec![(Bytes::from_static(b"f"), RString::new(Bytes::from_static(b"v1")))]);
        assert_eq!(inserted, 1);

        let inserted = h.set(vec![(Bytes::from_static(b"f"), RString::new(Bytes::from_static(b"v2")))]);
        assert_eq!(inserted, 0);
        assert_eq!(h.get(b"f").unwrap().bytes().as_ref(), &b"v2"[..]);
    }
}
