//! Global string map commands (spec section 4.2.1 and the "global" rows of
//! the command table in spec section 6).
//!
//! Read commands that see a missing key report the container's "not
//! present" encoding (null-bulk, zero, etc.) per spec section 3's namespace
//! invariants, rather than treating `key-missing` as a wire error -- that
//! mapping is reserved for commands which the spec explicitly calls out as
//! erroring on a miss (`increase`/`decrease`, per spec section 9's first
//! Open Question, preserved here as a deliberate non-Redis-parity choice).

use super::{ensure_arity, Command};
use crate::coredb::{Container, ContainerType, Namespace, RString};
use crate::error::{VResult, VertexError};
use crate::resp::Resp;
use bytes::Bytes;

fn read_str(ns: &Namespace, key: &[u8]) -> VResult<Option<RString>> {
    match ns.get(key) {
        None => Ok(None),
        Some(entry) => match &*entry {
            Container::Str(s) => Ok(Some(s.clone())),
            _ => Err(VertexError::ContainerTypeMismatch),
        },
    }
}

pub struct Set {
    keys: [Bytes; 1],
    value: Bytes,
}

impl Set {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 2)?;
        let value = args.pop().unwrap();
        let key = args.pop().unwrap();
        Ok(Self {
            keys: [key],
            value,
        })
    }
}

impl Command for Set {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        true
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        ns.resolve_mut(&self.keys[0], ContainerType::Str, true)?;
        ns.set_str(self.keys[0].clone(), RString::new(self.value));
        Ok(Resp::ok())
    }
}

pub struct Get {
    keys: [Bytes; 1],
}

impl Get {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for Get {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        match read_str(ns, &self.keys[0])? {
            Some(s) => Ok(Resp::bulk(s.bytes().clone())),
            None => Ok(Resp::null_bulk()),
        }
    }
}

pub struct MSet {
    keys: Vec<Bytes>,
    values: Vec<Bytes>,
}

impl MSet {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 2 && n % 2 == 0)?;
        let mut keys = Vec::with_capacity(args.len() / 2);
        let mut values = Vec::with_capacity(args.len() / 2);
        for pair in args.chunks_exact(2) {
            keys.push(pair[0].clone());
            values.push(pair[1].clone());
        }
        Ok(Self { keys, values })
    }
}

impl Command for MSet {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        true
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        for (key, value) in self.keys.iter().zip(self.values.into_iter()) {
            ns.resolve_mut(key, ContainerType::Str, true)?;
            ns.set_str(key.clone(), RString::new(value));
        }
        Ok(Resp::ok())
    }
}

pub struct MGet {
    keys: Vec<Bytes>,
}

impl MGet {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 1)?;
        Ok(Self { keys: args })
    }
}

impl Command for MGet {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut out = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            out.push(match read_str(ns, key)? {
                Some(s) => Resp::bulk(s.bytes().clone()),
                None => Resp::null_bulk(),
            });
        }
        Ok(Resp::array(out))
    }
}

pub struct Exists {
    keys: Vec<Bytes>,
}

impl Exists {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n >= 1)?;
        Ok(Self { keys: args })
    }
}

impl Command for Exists {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let count = self.keys.iter().filter(|k| ns.exists(k)).count();
        Ok(Resp::Integer(count as i64))
    }
}

pub struct StrLen {
    keys: [Bytes; 1],
}

impl StrLen {
    pub fn parse(args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 1)?;
        Ok(Self {
            keys: [args.into_iter().next().unwrap()],
        })
    }
}

impl Command for StrLen {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let len = read_str(ns, &self.keys[0])?.map(|s| s.len()).unwrap_or(0);
        Ok(Resp::Integer(len as i64))
    }
}

pub struct Append {
    keys: [Bytes; 1],
    suffix: Bytes,
}

impl Append {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 2)?;
        let suffix = args.pop().unwrap();
        let key = args.pop().unwrap();
        Ok(Self {
            keys: [key],
            suffix,
        })
    }
}

impl Command for Append {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        true
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = ns.resolve_mut(&self.keys[0], ContainerType::Str, true)?;
        let Container::Str(s) = &mut *entry else {
            unreachable!("resolve_mut guarantees the declared type")
        };
        let len = s.append(&self.suffix);
        Ok(Resp::Integer(len as i64))
    }
}

/// Backs `incr`/`incrby`/`decr`/`decrby`: `sign` is `1` or `-1`, `fixed_one`
/// is true for the no-explicit-delta `incr`/`decr` forms.
pub struct IncrDecr {
    keys: [Bytes; 1],
    delta: i64,
}

impl IncrDecr {
    pub fn parse(mut args: Vec<Bytes>, sign: i64, fixed_one: bool) -> VResult<Self> {
        if fixed_one {
            ensure_arity(&args, |n| n == 1)?;
            let key = args.pop().unwrap();
            Ok(Self {
                keys: [key],
                delta: sign,
            })
        } else {
            ensure_arity(&args, |n| n == 2)?;
            let raw_delta = args.pop().unwrap();
            let key = args.pop().unwrap();
            let magnitude = std::str::from_utf8(&raw_delta)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(VertexError::NotInteger)?;
            Ok(Self {
                keys: [key],
                delta: sign * magnitude,
            })
        }
    }
}

impl Command for IncrDecr {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        true
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        let mut entry = ns.resolve_mut(&self.keys[0], ContainerType::Str, false)?;
        let Container::Str(s) = &mut *entry else {
            unreachable!("resolve_mut guarantees the declared type")
        };
        let next = if self.delta >= 0 {
            s.increase(self.delta)?
        } else {
            s.decrease(-self.delta)?
        };
        Ok(Resp::Integer(next))
    }
}

pub struct GetRange {
    keys: [Bytes; 1],
    start: i64,
    end: i64,
}

impl GetRange {
    pub fn parse(mut args: Vec<Bytes>) -> VResult<Self> {
        ensure_arity(&args, |n| n == 3)?;
        let end_raw = args.pop().unwrap();
        let start_raw = args.pop().unwrap();
        let key = args.pop().unwrap();
        let start = crate::util::parse_i64(&start_raw).ok_or(VertexError::NotInteger)?;
        let end = crate::util::parse_i64(&end_raw).ok_or(VertexError::NotInteger)?;
        Ok(Self {
            keys: [key],
            start,
            end,
        })
    }
}

impl Command for GetRange {
    fn keys(&self) -> &[Bytes] {
        &self.keys
    }
    fn target_container_type(&self) -> ContainerType {
        ContainerType::Str
    }
    fn should_create(&self) -> bool {
        false
    }
    fn is_modifying(&self) -> bool {
        false
    }
    fn execute(self: Box<Self>, ns: &Namespace) -> VResult<Resp> {
        match read_str(ns, &self.keys[0])? {
            Some(s) => Ok(Resp::bulk(s.get_range(self.start, self.end))),
            None => Ok(Resp::bulk(Bytes::new())),
        }
    }
}
