//! Stable 64-bit hashing.
//!
//! Every "quantum" amplitude and phase in this crate is derived from FNV-1a
//! 64. The choice is fixed: output values of both encoders, the template
//! grammar and the coordinate fallback all depend on it, and changing it
//! changes every cached result.

use std::collections::BTreeSet;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Separator folded in between parts so ("ab", "c") != ("a", "bc").
const PART_SEPARATOR: u8 = 0xff;

/// FNV-1a over raw bytes.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Incremental FNV-1a over a sequence of parts.
#[derive(Clone, Copy, Debug)]
pub struct StableHasher {
    state: u64,
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StableHasher {
    pub fn new() -> Self {
        Self { state: FNV_OFFSET }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn str(mut self, s: &str) -> Self {
        self.write_bytes(s.as_bytes());
        self.write_bytes(&[PART_SEPARATOR]);
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.write_bytes(&v.to_le_bytes());
        self.write_bytes(&[PART_SEPARATOR]);
        self
    }

    pub fn finish(self) -> u64 {
        self.state
    }
}

pub fn hash_str(s: &str) -> u64 {
    fnv1a(s.as_bytes())
}

/// hash(s, i): a string combined with a component index.
pub fn hash_indexed(s: &str, index: usize) -> u64 {
    StableHasher::new().str(s).u64(index as u64).finish()
}

/// Order-independent digest of a keyword set.
/// BTreeSet iteration is sorted, so insertion order never matters.
pub fn hash_keywords(keywords: &BTreeSet<String>) -> u64 {
    keywords
        .iter()
        .fold(StableHasher::new(), |h, k| h.str(k))
        .finish()
}

/// Map a hash onto [0, 1).
pub fn unit_interval(hash: u64) -> f64 {
    (hash >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_part_boundaries_matter() {
        let a = StableHasher::new().str("ab").str("c").finish();
        let b = StableHasher::new().str("a").str("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_indexed_differs_per_index() {
        assert_ne!(hash_indexed("寺", 0), hash_indexed("寺", 1));
        assert_eq!(hash_indexed("寺", 3), hash_indexed("寺", 3));
    }

    #[test]
    fn test_keyword_hash_order_independent() {
        let a: BTreeSet<String> = ["寺", "石段", "古い"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["古い", "寺", "石段"].iter().map(|s| s.to_string()).collect();
        assert_eq!(hash_keywords(&a), hash_keywords(&b));
    }

    #[test]
    fn test_unit_interval_bounds() {
        for h in [0, 1, u64::MAX, u64::MAX / 2, hash_str("x")] {
            let u = unit_interval(h);
            assert!((0.0..1.0).contains(&u), "out of range: {u}");
        }
    }
}
