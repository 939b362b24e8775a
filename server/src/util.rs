//! Small stateless helpers shared across the engine.

/// FNV-1a-64 over a byte string. Used only as an equality accelerator for
/// string containers (spec section 3, "Fingerprint" in the glossary) -- never
/// as identity.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Normalize a possibly-negative, Redis-style index against a collection of
/// length `len`. Returns `None` if the resulting index is still negative
/// (i.e. out of range on the left).
pub fn normalize_index(idx: i64, len: usize) -> Option<usize> {
    if idx >= 0 {
        Some(idx as usize)
    } else {
        let len = len as i64;
        let normalized = len + idx;
        if normalized < 0 {
            None
        } else {
            Some(normalized as usize)
        }
    }
}

/// Parse a byte string as a base-10 i64, the way the string container's
/// integer cache does (spec section 3).
pub fn parse_i64(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse::<i64>().ok()
}
