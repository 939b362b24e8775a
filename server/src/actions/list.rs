//! List commands (spec section 4.2.2 and the "list" rows of spec section 6).

use super::{ensure_arity, Command};
use crate::coredb::{Container, ContainerType, Namespace, RString, VList};
use crate::error::{VResult, VertexError};
use crate::resp::Resp;
use bytes::Bytes;

fn with_list<R>(
    ns: &Namespace,
    key: &[u8],
    on_missing: impl FnOnce() -> R,
    on_present: impl FnOnce(&VList) -> VResult<R>,
) -> VResult<R> {
    match ns.get(key) {
        None => Ok(on_missing()),
        Some(entry) => match &*entry {
            Container::List(l) => on_present(l),
            _ => Err(VertexError::ContainerTypeMismatch),
        },
    }
}

pub struct Push {
    keys: [Bytes; 1],
    values: Vec<RString>,
    head: bool,
}

impl Push {
    pub fn parse(mut args: Vec<Bytes>, head: bool) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 2)?;
        let key = args.remove(0);
        Ok(Self {
            keys: [key],
            values: args.into_iter().map(RString::new).collect(),
            head,
        })
    }
}

impl Command for Push {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        true
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = ns.resolve_mut(&self.keys[0], ContainerType::List, true)?;
        let Container::List(l) = &mut *entry else {
            unreachable!("resolve_mut guarantees the declared type")
        };
        let len = if self.head {
            l.push_head(self.values)
        } else {
            l.push_tail(self.values)
        };
        Ok(Resp::Integer(len as i64))
    }
}

pub struct Pop {
    keys: [Bytes; 1],
    head: bool,
}

impl Pop {
    pub fn parse(args: Vec<Bytes>, head: bool) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
            head,
        })
    }
}

impl Command for Pop {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = match ns.get_mut(&self.keys[0]) {
            Some(e) => e,
            None => return Err(VertexError::EmptyList),
        };
        let Container::List(l) = &mut *entry else {
            return Err(VertexError::ContainerTypeMismatch);
        };
        let popped = if self.head { l.pop_head()? } else { l.pop_tail()? };
        Ok(Resp::bulk(popped.bytes().clone()))
    }
}

pub struct LIndex {
    keys: [Bytes; 1],
    index: i64,
}

impl LIndex {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 2)?;
        let idx_raw = args.pop().unwrap();
        let key = args.pop().unwrap();
        let index = crate::util::parse_i64(&idx_raw).ok_or(VertexError::NotInteger)?;
        Ok(Self { keys: [key], index })
    }
}

impl Command for LIndex {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        match ns.get(&self.keys[0]) {
            None => Err(VertexError::OutOfRange),
            Some(entry) => match &*entry {
                Container::List(l) => l.index(self.index).map(|v| Resp::bulk(v.bytes().clone())),
                _ => Err(VertexError::ContainerTypeMismatch),
            },
        }
    }
}

pub struct LInsert {
    keys: [Bytes; 1],
    after: bool,
    pivot: Bytes,
    value: RString,
}

impl LInsert {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 4)?;
        let value = args.pop().unwrap();
        let pivot = args.pop().unwrap();
        let where_raw = args.pop().unwrap();
        let key = args.pop().unwrap();
        let after = match where_raw.to_ascii_uppercase().as_slice() {
            b"AFTER" => true,
            b"BEFORE" => false,
            _ => return Err(VertexError::ArgumentInvalid),
        };
        Ok(Self {
            keys: [key],
            after,
            pivot,
            value: RString::new(value),
        })
    }
}

impl Command for LInsert {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = match ns.get_mut(&self.keys[0]) {
            Some(e) => e,
            None => return Err(VertexError::NoSuchPivot),
        };
        let Container::List(l) = &mut *entry else {
            return Err(VertexError::ContainerTypeMismatch);
        };
        let len = l.insert(&self.pivot, self.value, self.after)?;
        Ok(Resp::Integer(len as i64))
    }
}

pub struct LLen {
    keys: [Bytes; 1],
}

impl LLen {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for LLen {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let len = with_list(ns, &self.keys[0], || 0, |l| Ok(l.len()))?;
        Ok(Resp::Integer(len as i64))
    }
}

pub struct LRange {
    keys: [Bytes; 1],
    l: i64,
    r: i64,
}

impl LRange {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 3)?;
        let r_raw = args.pop().unwrap();
        let l_raw = args.pop().unwrap();
        let key = args.pop().unwrap();
        let l = crate::util::parse_i64(&l_raw).ok_or(VertexError::NotInteger)?;
        let r = crate::util::parse_i64(&r_raw).ok_or(VertexError::NotInteger)?;
        Ok(Self { keys: [key], l, r })
    }
}

impl Command for LRange {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let items = with_list(ns, &self.keys[0], Vec::new, |l| l.range(self.l, self.r))?;
        Ok(Resp::array(
            items.into_iter().map(|v| Resp::bulk(v.bytes().clone())).collect(),
        ))
    }
}

pub struct LTrim {
    keys: [Bytes; 1],
    l: i64,
    r: i64,
}

impl LTrim {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 3)?;
        let r_raw = args.pop().unwrap();
        let l_raw = args.pop().unwrap();
        let key = args.pop().unwrap();
        let l = crate::util::parse_i64(&l_raw).ok_or(VertexError::NotInteger)?;
        let r = crate::util::parse_i64(&r_raw).ok_or(VertexError::NotInteger)?;
        Ok(Self { keys: [key], l, r })
    }
}

impl Command for LTrim {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        if let Some(mut entry) = ns.get_mut(&self.keys[0]) {
            let Container::List(l) = &mut *entry else {
                return Err(VertexError::ContainerTypeMismatch);
            };
            l.trim(self.l, self.r);
        }
        Ok(Resp::ok())
    }
}

pub struct LRem {
    keys: [Bytes; 1],
    count: i64,
    value: Bytes,
}

impl LRem {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 3)?;
        let value = args.pop().unwrap();
        let count_raw = args.pop().unwrap();
        let key = args.pop().unwrap();
        let count = crate::util::parse_i64(&count_raw).ok_or(VertexError::NotInteger)?;
        Ok(Self {
            keys: [key],
            count,
            value,
        })
    }
}

impl Command for LRem {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
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
                let Container::List(l) = &mut *entry else {
                    return Err(VertexError::ContainerTypeMismatch);
                };
                l.remove(self.count, &self.value)
            }
        };
        Ok(Resp::Integer(removed as i64))
    }
}

pub struct LSet {
    keys: [Bytes; 1],
    index: i64,
    value: RString,
}

impl LSet {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 3)?;
        let value = args.pop().unwrap();
        let idx_raw = args.pop().unwrap();
        let key = args.pop().unwrap();
        let index = crate::util::parse_i64(&idx_raw).ok_or(VertexError::NotInteger)?;
        Ok(Self {
            keys: [key],
            index,
            value: RString::new(value),
        })
    }
}

impl Command for LSet {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::List
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = match ns.get_mut(&self.keys[0]) {
            Some(e) => e,
            None => return Err(VertexError::OutOfRange),
        };
        let Container::List(l) = &mut *entry else {
            return Err(VertexError::ContainerTypeMismatch);
        };
        l.set(self.index, self.value)?;
        Ok(Resp::ok())
    }
}
