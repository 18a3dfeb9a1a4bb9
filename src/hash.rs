//! Hash functions for Bloom filters
//!
//! Implements 32-bit FNV-1, FNV-1a and MurmurHash3 over raw bytes. Filters only ever
//! use the FNV-1a / MurmurHash3 pair; FNV-1 is kept for callers that want to pick
//! their own functions through [`HashFunctionFactory`].

use crate::{FilterError, Result};
use std::fmt;

/// Trait for hash functions used in Bloom filters
pub trait HashFunction: Send + Sync {
    /// Hash a byte sequence into 32 bits
    fn hash(&self, bytes: &[u8]) -> u32;

    /// Get a name/identifier for this hash function
    fn name(&self) -> String;
}

/// 32-bit FNV offset basis
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// 32-bit FNV prime, 2^24 + 2^8 + 0x93
const FNV_PRIME: u32 = 16_777_619;

/// Sign-extended byte value; bytes >= 0x80 also set the high 24 bits
#[inline]
fn fnv_byte(b: u8) -> u32 {
    b as i8 as i32 as u32
}

/// FNV-1: multiply, then xor in the byte
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1;

impl HashFunction for Fnv1 {
    fn hash(&self, bytes: &[u8]) -> u32 {
        bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
            hash.wrapping_mul(FNV_PRIME) ^ fnv_byte(b)
        })
    }

    fn name(&self) -> String {
        "fnv1".to_string()
    }
}

/// FNV-1a: xor in the byte, then multiply
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1a;

impl HashFunction for Fnv1a {
    fn hash(&self, bytes: &[u8]) -> u32 {
        bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
            (hash ^ fnv_byte(b)).wrapping_mul(FNV_PRIME)
        })
    }

    fn name(&self) -> String {
        "fnv1a".to_string()
    }
}

const C1: i32 = 0xcc9e_2d51_u32 as i32;
const C2: i32 = 0x1b87_3593_u32 as i32;
const R1: u32 = 15;
const R2: u32 = 13;
const M: i64 = 5;
const N: i32 = 0xe654_6b64_u32 as i32;
const FMIX1: i32 = 0x85eb_ca6b_u32 as i32;
const FMIX2: i32 = 0xc2b2_ae35_u32 as i32;

/// MurmurHash3, x86 32-bit flavour
///
/// The block state is carried in a signed 64-bit accumulator: every 32-bit quantity
/// mixed into it is sign-extended, the body rotation shifts the full 64 bits by
/// `R2` in both directions, and only the low 32 bits of the final avalanche are
/// returned. Hashes are stable across runs and platforms, e.g. `"test"` with seed 0
/// hashes to `2056757994`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MurmurHash3 {
    seed: i32,
}

impl MurmurHash3 {
    /// MurmurHash3 with the default seed of 0
    pub fn new() -> Self {
        MurmurHash3 { seed: 0 }
    }

    pub fn with_seed(seed: i32) -> Self {
        MurmurHash3 { seed }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    #[inline]
    fn mix_k(k: i32) -> i32 {
        k.wrapping_mul(C1).rotate_left(R1).wrapping_mul(C2)
    }
}

impl HashFunction for MurmurHash3 {
    fn hash(&self, bytes: &[u8]) -> u32 {
        let mut hash = i64::from(self.seed);

        let mut chunks = bytes.chunks_exact(4);
        for chunk in &mut chunks {
            let k = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            hash ^= i64::from(Self::mix_k(k));
            hash = (hash << R2) | ((hash as u64) >> R2) as i64;
            hash = hash.wrapping_mul(M).wrapping_add(i64::from(N));
        }

        // tail is mixed even when empty; mix_k(0) == 0
        let k = chunks
            .remainder()
            .iter()
            .enumerate()
            .fold(0i32, |k, (i, &b)| k | (i32::from(b) << (8 * i)));
        hash ^= i64::from(Self::mix_k(k));

        hash ^= bytes.len() as i64;
        hash ^= ((hash as u64) >> 16) as i64;
        hash = hash.wrapping_mul(i64::from(FMIX1));
        hash ^= ((hash as u64) >> 13) as i64;
        hash = hash.wrapping_mul(i64::from(FMIX2));
        hash ^= ((hash as u64) >> 16) as i64;

        hash as u32
    }

    fn name(&self) -> String {
        format!("murmur3-{}", self.seed)
    }
}

/// The two base hashes feeding double hashing, in order (h1, h2)
pub struct HashFunctionPair {
    first: Box<dyn HashFunction>,
    second: Box<dyn HashFunction>,
}

impl HashFunctionPair {
    pub fn new(first: Box<dyn HashFunction>, second: Box<dyn HashFunction>) -> Self {
        HashFunctionPair { first, second }
    }

    /// FNV-1a for h1, MurmurHash3 (seed 0) for h2
    pub fn bloom_default() -> Self {
        let [first, second] = HashFunctionFactory::bloom_filter_hashes();
        HashFunctionPair { first, second }
    }

    /// Compute (h1, h2) for a byte sequence
    #[inline]
    pub fn hashes(&self, bytes: &[u8]) -> (u32, u32) {
        (self.first.hash(bytes), self.second.hash(bytes))
    }

    pub fn names(&self) -> (String, String) {
        (self.first.name(), self.second.name())
    }
}

impl fmt::Debug for HashFunctionPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (first, second) = self.names();
        f.debug_tuple("HashFunctionPair")
            .field(&first)
            .field(&second)
            .finish()
    }
}

/// Constructors for the hash functions known to this crate
pub struct HashFunctionFactory;

impl HashFunctionFactory {
    /// The fixed pair every filter hashes with
    pub fn bloom_filter_hashes() -> [Box<dyn HashFunction>; 2] {
        [Box::new(Fnv1a), Box::new(MurmurHash3::new())]
    }

    /// Every available function, in a stable order
    pub fn all() -> Vec<Box<dyn HashFunction>> {
        vec![Box::new(Fnv1), Box::new(Fnv1a), Box::new(MurmurHash3::new())]
    }

    /// Look a function up by name prefix, ignoring case and surrounding whitespace
    ///
    /// `"fnv1a..."` must be tested before `"fnv1..."` since the latter is its prefix.
    pub fn from_name(name: &str) -> Result<Box<dyn HashFunction>> {
        let name = name.trim().to_lowercase();
        if name.starts_with("murmur") {
            Ok(Box::new(MurmurHash3::new()))
        } else if name.starts_with("fnv1a") {
            Ok(Box::new(Fnv1a))
        } else if name.starts_with("fnv1") {
            Ok(Box::new(Fnv1))
        } else {
            Err(FilterError::InvalidInput(format!(
                "Unknown hash function: {}",
                name
            )))
        }
    }
}
