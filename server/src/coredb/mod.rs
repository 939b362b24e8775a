//! The typed in-memory container data model (spec section 3 and 4.2).
//!
//! Grounded on the teacher's `coredb`/`corestore` shape: a sharded concurrent
//! map owning typed containers behind a single namespace object. The
//! teacher's own `htable.rs` reaches for `dashmap::DashMap` as its backing
//! concurrent map; this module keeps that choice for the same reason -- per
//! key locking without a single global mutex, so commands on disjoint
//! containers still run in parallel (spec section 5, "Container mutations").

pub mod hash;
pub mod list;
pub mod set;
pub mod string;
pub mod zset;

use crate::error::{VResult, VertexError};
use bytes::Bytes;
use dashmap::mapref::one::{Ref, RefMut};
use dashmap::DashMap;

pub use hash::VHash;
pub use list::VList;
pub use set::VSet;
pub use string::RString;
pub use zset::VZSet;

/// The type tag a container carries (spec section 3, "Container variants").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    Str,
    List,
    Hash,
    Set,
    ZSet,
}

/// One typed container, keyed by a key in the global namespace.
#[derive(Debug, Clone)]
pub enum Container {
    Str(RString),
    List(VList),
    Hash(VHash),
    Set(VSet),
    ZSet(VZSet),
}

impl Container {
    pub fn kind(&self) -> ContainerType {
        match self {
            Self::Str(_) => ContainerType::Str,
            Self::List(_) => ContainerType::List,
            Self::Hash(_) => ContainerType::Hash,
            Self::Set(_) => ContainerType::Set,
            Self::ZSet(_) => ContainerType::ZSet,
        }
    }
}

/// The process-wide key -> container namespace. A key resolves to at most
/// one container; a command declares the type it needs and an error is
/// raised if an existing container under that key carries a different type
/// (spec section 3, "Namespace invariants").
#[derive(Debug, Default)]
pub struct Namespace {
    map: DashMap<Bytes, Container>,
}

impl Namespace {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<Ref<'_, Bytes, Container>> {
        self.map.get(key)
    }

    pub fn get_mut(&self, key: &[u8]) -> Option<RefMut<'_, Bytes, Container>> {
        self.map.get_mut(key)
    }

    pub fn exists(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    pub fn remove(&self, key: &[u8]) -> bool {
        self.map.remove(key).is_some()
    }

    /// Resolve `key` under `kind`, creating an empty container of that type
    /// if it is missing and `create` is true. Fails with
    /// `ContainerTypeMismatch` if a container exists under a different type.
    pub fn resolve_mut(
        &self,
        key: &Bytes,
        kind: ContainerType,
        create: bool,
    ) -> VResult<RefMut<'_, Bytes, Container>> {
        if !self.map.contains_key(key.as_ref()) {
            if !create {
                return Err(VertexError::KeyMissing);
            }
            let empty = match kind {
                ContainerType::Str => Container::Str(RString::new(Bytes::new())),
                ContainerType::List => Container::List(VList::new()),
                ContainerType::Hash => Container::Hash(VHash::new()),
                ContainerType::Set => Container::Set(VSet::new()),
                ContainerType::ZSet => Container::ZSet(VZSet::new()),
            };
            self.map.insert(key.clone(), empty);
        }
        let entry = self.map.get_mut(key.as_ref()).expect("just inserted");
        if entry.kind() != kind {
            return Err(VertexError::ContainerTypeMismatch);
        }
        Ok(entry)
    }

    /// Read-only resolution: fails `KeyMissing` if absent, fails
    /// `ContainerTypeMismatch` if present under a different type.
    pub fn resolve(&self, key: &[u8], kind: ContainerType) -> VResult<Ref<'_, Bytes, Container>> {
        let entry = self.map.get(key).ok_or(VertexError::KeyMissing)?;
        if entry.kind() != kind {
            return Err(VertexError::ContainerTypeMismatch);
        }
        Ok(entry)
    }

    pub fn set_str(&self, key: Bytes, value: RString) {
        self.map.insert(key, Container::Str(value));
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
