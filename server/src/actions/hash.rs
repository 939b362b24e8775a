//! Hash commands (spec section 4.2.3 and the "hash" rows of spec section 6).

use super::{ensure_arity, Command};
use crate::coredb::{Container, ContainerType, Namespace, RString, VHash};
use crate::error::{VResult, VertexError};
use crate::resp::Resp;
use bytes::Bytes;

fn with_hash<R>(
    ns: &Namespace,
    key: &[u8],
    on_missing: impl FnOnce() -> R,
    on_present: impl FnOnce(&VHash) -> VResult<R>,
) -> VResult<R> {
    match ns.get(key) {
        None => Ok(on_missing()),
        Some(entry) => match &*entry {
            Container::Hash(h) => on_present(h),
            _ => Err(VertexError::ContainerTypeMismatch),
        },
    }
}

pub struct HSet {
    keys: [Bytes; 1],
    pairs: Vec<(Bytes, RString)>,
}

impl HSet {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 3 && n % 2 == 1)?;
        let key = args.remove(0);
        let mut pairs = Vec::with_capacity(args.len() / 2);
        for pair in args.chunks_exact(2) {
            pairs.push((pair[0].clone(), RString::new(pair[1].clone())));
        }
        Ok(Self { keys: [key], pairs })
    }
}

impl Command for HSet {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        true
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = ns.resolve_mut(&self.keys[0], ContainerType::Hash, true)?;
        let Container::Hash(h) = &mut *entry else {
            unreachable!("resolve_mut guarantees the declared type")
        };
        let inserted = h.set(self.pairs);
        Ok(Resp::Integer(inserted as i64))
    }
}

pub struct HGet {
    keys: [Bytes; 1],
    field: Bytes,
}

impl HGet {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 2)?;
        let field = args.pop().unwrap();
        let key = args.pop().unwrap();
        Ok(Self { keys: [key], field })
    }
}

impl Command for HGet {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let found = with_hash(
            ns,
            &self.keys[0],
            || None,
            |h| Ok(h.get(&self.field).map(|v| v.bytes().clone())),
        )?;
        Ok(match found {
            Some(b) => Resp::bulk(b),
            None => Resp::null_bulk(),
        })
    }
}

pub struct HExists {
    keys: [Bytes; 1],
    field: Bytes,
}

impl HExists {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 2)?;
        let field = args.pop().unwrap();
        let key = args.pop().unwrap();
        Ok(Self { keys: [key], field })
    }
}

impl Command for HExists {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let exists = with_hash(ns, &self.keys[0], || false, |h| Ok(h.exists(&self.field)))?;
        Ok(Resp::Integer(exists as i64))
    }
}

pub struct HStrLen {
    keys: [Bytes; 1],
    field: Bytes,
}

impl HStrLen {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 2)?;
        let field = args.pop().unwrap();
        let key = args.pop().unwrap();
        Ok(Self { keys: [key], field })
    }
}

impl Command for HStrLen {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let len = with_hash(ns, &self.keys[0], || 0, |h| {
            Ok(h.field_length(&self.field).unwrap_or(0))
        })?;
        Ok(Resp::Integer(len as i64))
    }
}

pub struct HMGet {
    keys: [Bytes; 1],
    fields: Vec<Bytes>,
}

impl HMGet {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 2)?;
        let key = args.remove(0);
        Ok(Self { keys: [key], fields: args })
    }
}

impl Command for HMGet {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let values = with_hash(
            ns,
            &self.keys[0],
            || vec![None; self.fields.len()],
            |h| {
                Ok(self
                    .fields
                    .iter()
                    .map(|f| h.get(f).map(|v| v.bytes().clone()))
                    .collect())
            },
        )?;
        Ok(Resp::array(
            values
                .into_iter()
                .map(|v| v.map(Resp::bulk).unwrap_or_else(Resp::null_bulk))
                .collect(),
        ))
    }
}

pub struct HKeys {
    keys: [Bytes; 1],
}

impl HKeys {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for HKeys {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let keys = with_hash(ns, &self.keys[0], Vec::new, |h| Ok(h.keys()))?;
        Ok(Resp::array(keys.into_iter().map(Resp::bulk).collect()))
    }
}

pub struct HVals {
    keys: [Bytes; 1],
}

impl HVals {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for HVals {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let vals = with_hash(ns, &self.keys[0], Vec::new, |h| Ok(h.values()))?;
        Ok(Resp::array(
            vals.into_iter().map(|v| Resp::bulk(v.bytes().clone())).collect(),
        ))
    }
}

pub struct HGetAll {
    keys: [Bytes; 1],
}

impl HGetAll {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for HGetAll {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let entries = with_hash(ns, &self.keys[0], Vec::new, |h| Ok(h.entries()))?;
        let mut out = Vec::with_capacity(entries.len() * 2);
        for (field, value) in entries {
            out.push(Resp::bulk(field));
            out.push(Resp::bulk(value.bytes().clone()));
        }
        Ok(Resp::array(out))
    }
}

pub struct HLen {
    keys: [Bytes; 1],
}

impl HLen {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for HLen {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let len = with_hash(ns, &self.keys[0], || 0, |h| Ok(h.len()))?;
        Ok(Resp::Integer(len as i64))
    }
}

pub struct HDel {
    keys: [Bytes; 1],
    fields: Vec<Bytes>,
}

impl HDel {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 2)?;
        let key = args.remove(0);
        Ok(Self { keys: [key], fields: args })
    }
}

impl Command for HDel {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Hash
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let removed = match ns.get_mut(&self.keys[0]) {
            None => 0,
            Some(mut entry) => {
                let Container::Hash(h) = &mut *entry else {
                    return Err(VertexError::ContainerTypeMismatch);
                };
                h.del(&self.fields)
            }
        };
        Ok(Resp::Integer(removed as i64))
    }
}
