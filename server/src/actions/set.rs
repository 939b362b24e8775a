//! Set commands (spec section 4.2.4 and the "set" rows of spec section 6).

use super::{ensure_arity, Command};
use crate::coredb::{Container, ContainerType, Namespace, VSet};
use crate::error::{VResult, VertexError};
use crate::resp::Resp;
use bytes::Bytes;

fn with_set<R>(
    ns: &Namespace,
    key: &[u8],
    on_missing: impl FnOnce() -> R,
    on_present: impl FnOnce(&VSet) -> VResult<R>,
) -> VResult<R> {
    match ns.get(key) {
        None => Ok(on_missing()),
        Some(entry) => match &*entry {
            Container::Set(s) => on_present(s),
            _ => Err(VertexError::ContainerTypeMismatch),
        },
    }
}

pub struct SAdd {
    keys: [Bytes; 1],
    values: Vec<Bytes>,
}

impl SAdd {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 2)?;
        let key = args.remove(0);
        Ok(Self {
            keys: [key],
            values: args,
        })
    }
}

impl Command for SAdd {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
    }
    fn should_create(&self) -> bool {
        true
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = ns.resolve_mut(&self.keys[0], ContainerType::Set, true)?;
        let Container::Set(s) = &mut *entry else {
            unreachable!("resolve_mut guarantees the declared type")
        };
        let added = s.add(self.values);
        Ok(Resp::Integer(added as i64))
    }
}

pub struct SRem {
    keys: [Bytes; 1],
    values: Vec<Bytes>,
}

impl SRem {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 2)?;
        let key = args.remove(0);
        Ok(Self {
            keys: [key],
            values: args,
        })
    }
}

impl Command for SRem {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
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
                let Container::Set(s) = &mut *entry else {
                    return Err(VertexError::ContainerTypeMismatch);
                };
                s.delete(&self.values)
            }
        };
        Ok(Resp::Integer(removed as i64))
    }
}

pub struct SIsMember {
    keys: [Bytes; 1],
    value: Bytes,
}

impl SIsMember {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 2)?;
        let value = args.pop().unwrap();
        let key = args.pop().unwrap();
        Ok(Self { keys: [key], value })
    }
}

impl Command for SIsMember {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let is_member = with_set(ns, &self.keys[0], || false, |s| Ok(s.is_member(&self.value)))?;
        Ok(Resp::Integer(is_member as i64))
    }
}

pub struct SMembers {
    keys: [Bytes; 1],
}

impl SMembers {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for SMembers {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let members = with_set(ns, &self.keys[0], Vec::new, |s| Ok(s.members()))?;
        Ok(Resp::array(members.into_iter().map(Resp::bulk).collect()))
    }
}

/// `srandmember key [count]`: with no count, selects exactly one member
/// (null if the set is empty or missing); with a count, selects up to
/// `|count|` members (spec section 4.2.4 -- negative count is equivalent to
/// positive clipping here since the backing set has no duplicates).
pub struct SRandMember {
    keys: [Bytes; 1],
    count: Option<i64>,
}

impl SRandMember {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1 || n == 2)?;
        let count = if args.len() == 2 {
            let raw = args.pop().unwrap();
            Some(crate::util::parse_i64(&raw).ok_or(VertexError::NotInteger)?)
        } else {
            None
        };
        let key = args.pop().unwrap();
        Ok(Self { keys: [key], count })
    }
}

impl Command for SRandMember {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let picked = with_set(ns, &self.keys[0], Vec::new, |s| {
            Ok(s.random_member(self.count.unwrap_or(1)))
        })?;
        match self.count {
            None => Ok(picked
                .into_iter()
                .next()
                .map(Resp::bulk)
                .unwrap_or_else(Resp::null_bulk)),
            Some(_) => Ok(Resp::array(picked.into_iter().map(Resp::bulk).collect())),
        }
    }
}

pub struct SPop {
    keys: [Bytes; 1],
    count: Option<i64>,
}

impl SPop {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1 || n == 2)?;
        let count = if args.len() == 2 {
            let raw = args.pop().unwrap();
            Some(crate::util::parse_i64(&raw).ok_or(VertexError::NotInteger)?)
        } else {
            None
        };
        let key = args.pop().unwrap();
        Ok(Self { keys: [key], count })
    }
}

impl Command for SPop {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let popped = match ns.get_mut(&self.keys[0]) {
            None => Vec::new(),
            Some(mut entry) => {
                let Container::Set(s) = &mut *entry else {
                    return Err(VertexError::ContainerTypeMismatch);
                };
                s.pop(self.count.unwrap_or(1))
            }
        };
        match self.count {
            None => Ok(popped
                .into_iter()
                .next()
                .map(Resp::bulk)
                .unwrap_or_else(Resp::null_bulk)),
            Some(_) => Ok(Resp::array(popped.into_iter().map(Resp::bulk).collect())),
        }
    }
}

pub struct SCard {
    keys: [Bytes; 1],
}

impl SCard {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for SCard {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let len = with_set(ns, &self.keys[0], || 0, |s| Ok(s.len()))?;
        Ok(Resp::Integer(len as i64))
    }
}

#[derive(Clone, Copy)]
pub enum Combine {
    Diff,
    Inter,
    Union,
}

/// `sdiff`/`sinter`/`sunion`: the first key is the base set, remaining keys
/// are the "others" operand list (spec section 4.2.4). A missing key among
/// the operands is treated as an empty set.
pub struct SCombine {
    keys: Vec<Bytes>,
    op: Combine,
}

impl SCombine {
    pub fn parse(args: Vec<Bytes>, op: Combine) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 1)?;
        Ok(Self { keys: args, op })
    }
}

impl Command for SCombine {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Set
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let empty = VSet::new();
        let mut owned = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match ns.get(key) {
                None => owned.push(empty.clone()),
                Some(entry) => match &*entry {
                    Container::Set(s) => owned.push(s.clone()),
                    _ => return Err(VertexError::ContainerTypeMismatch),
                },
            }
        }
        let (base, others) = owned.split_first().expect("arity >= 1 guarantees one key");
        let others: Vec<&VSet> = others.iter().collect();
        let result = match self.op {
            Combine::Diff => base.diff(&others),
            Combine::Inter => base.intersect(&others),
            Combine::Union => base.union(&others),
        };
        Ok(Resp::array(
            result.members().into_iter().map(Resp::bulk).collect(),
        ))
    }
}
