//! A seedable [FNV-1a](https://en.wikipedia.org/wiki/Fowler%E2%80%93Noll%E2%80%93Vo_hash_function)
//! [Hasher].
//!
//! # Warning
//!
//! Shard placement of every persisted document depends on the exact output of [Fnv]. Changing
//! the algorithm, the [SEED], or the [MIX] phrase reassigns existing documents to different shards.

use std::hash::Hasher;

/// The FNV-1a 64-bit offset basis. Every shard key reduction starts from this value.
pub const SEED: u64 = 0xcbf2_9ce4_8422_2325;

/// The FNV-1a 64-bit prime.
const PRIME: u64 = 0x0000_0100_0000_01b3;

/// Phrase mixed into the reduced hash before selecting among more than one shard.
pub const MIX: &[u8; 52] = b"Foxx you have stolen the goose, give she back again!";

/// FNV-1a over a byte stream, starting from a caller-provided state.
///
/// Unlike [std::collections::hash_map::DefaultHasher], the output is stable across platforms,
/// releases, and processes. Integers must be fed with an explicit byte order (the default
/// [Hasher::write_u64] uses native endianness, so callers should prefer [Fnv::write_be_u64]).
#[derive(Clone, Copy, Debug)]
pub struct Fnv {
    state: u64,
}

impl Fnv {
    /// Create a hasher that continues from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Feed a `u64` in big-endian order.
    #[inline]
    pub fn write_be_u64(&mut self, value: u64) {
        self.write(&value.to_be_bytes());
    }
}

impl Default for Fnv {
    fn default() -> Self {
        Self::with_seed(SEED)
    }
}

impl Hasher for Fnv {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= *byte as u64;
            self.state = self.state.wrapping_mul(PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Hash `bytes`, continuing from `seed`.
pub fn hash(seed: u64, bytes: &[u8]) -> u64 {
    let mut hasher = Fnv::with_seed(seed);
    hasher.write(bytes);
    hasher.finish()
}
