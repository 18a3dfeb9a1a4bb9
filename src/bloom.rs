//! Standard and partitioned Bloom filters
//!
//! A space-efficient probabilistic data structure for membership testing. Both
//! variants derive every probe from two base hashes with double hashing; they only
//! differ in how a probe is mapped onto the bit array (see [`IndexLayout`]).

use crate::config::{FilterConfig, IndexLayout};
use crate::hash::HashFunctionPair;
use crate::Result;
use bit_vec::BitVec;
use std::fmt::Display;
use tracing::debug;

/// Raw probe values for one item: h1, h2, then h1 + i * h2
///
/// Arithmetic is signed and wrapping; callers reduce each value into range.
#[inline]
pub(crate) fn probe_values(h1: u32, h2: u32, num_probes: usize) -> impl Iterator<Item = i64> {
    let (h1, h2) = (i64::from(h1), i64::from(h2));
    (0..num_probes).map(move |i| match i {
        0 => h1,
        1 => h2,
        _ => h1.wrapping_add((i as i64).wrapping_mul(h2)),
    })
}

/// A Bloom filter over a fixed bit array
pub struct BloomFilter {
    /// Bit array storing the filter data
    bits: BitVec,
    /// (h1, h2) base hashes
    hashes: HashFunctionPair,
    config: FilterConfig,
    /// Number of items added (for statistics)
    count: usize,
}

impl BloomFilter {
    /// Create a standard Bloom filter with `num_bits` bits and `num_hashes` probes
    pub fn new(num_bits: usize, num_hashes: usize) -> Result<Self> {
        Ok(Self::from_config(FilterConfig::with_size(num_bits, num_hashes)?))
    }

    /// Create a standard Bloom filter sized for `expected_items` at `probability`
    pub fn with_accuracy(expected_items: usize, probability: f64) -> Result<Self> {
        Ok(Self::from_config(FilterConfig::with_accuracy(
            expected_items,
            probability,
        )?))
    }

    /// Create a standard Bloom filter of `num_bits` bits tuned for `probability`
    pub fn with_probability(probability: f64, num_bits: usize) -> Result<Self> {
        Ok(Self::from_config(FilterConfig::with_probability(
            probability,
            num_bits,
        )?))
    }

    /// Create a partitioned Bloom filter with `num_bits` bits and `num_hashes` slices
    pub fn partitioned(num_bits: usize, num_hashes: usize) -> Result<Self> {
        Ok(Self::from_config(
            FilterConfig::with_size(num_bits, num_hashes)?.partitioned()?,
        ))
    }

    pub fn partitioned_with_accuracy(expected_items: usize, probability: f64) -> Result<Self> {
        Ok(Self::from_config(
            FilterConfig::with_accuracy(expected_items, probability)?.partitioned()?,
        ))
    }

    pub fn partitioned_with_probability(probability: f64, num_bits: usize) -> Result<Self> {
        Ok(Self::from_config(
            FilterConfig::with_probability(probability, num_bits)?.partitioned()?,
        ))
    }

    /// Create a filter from an already validated configuration
    pub fn from_config(config: FilterConfig) -> Self {
        debug!(
            num_bits = config.num_bits(),
            num_hashes = config.num_hashes(),
            partitioned = config.is_partitioned(),
            "Created bloom filter"
        );

        BloomFilter {
            bits: BitVec::from_elem(config.num_bits(), false),
            hashes: HashFunctionPair::bloom_default(),
            config,
            count: 0,
        }
    }

    /// Add an item, hashed through its `Display` text encoded as UTF-8
    pub fn add<T: Display + ?Sized>(&mut self, item: &T) {
        self.add_bytes(item.to_string().as_bytes());
    }

    /// Add an already encoded item
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        let indices: Vec<usize> = self.indices(bytes).collect();
        for index in indices {
            self.bits.set(index, true);
        }

        self.count += 1;
    }

    /// Add every item of a collection
    pub fn add_all<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        for item in items {
            self.add(&item);
        }
    }

    /// Check if an item might be in the filter
    /// Returns true if the item might be present (with possible false positives)
    /// Returns false if the item is definitely not present
    pub fn query<T: Display + ?Sized>(&self, item: &T) -> bool {
        self.query_bytes(item.to_string().as_bytes())
    }

    pub fn query_bytes(&self, bytes: &[u8]) -> bool {
        self.indices(bytes)
            .all(|index| self.bits.get(index).unwrap_or(false))
    }

    /// Bit indices probed for `bytes`, in probe order
    pub fn indices<'a>(&'a self, bytes: &[u8]) -> impl Iterator<Item = usize> + 'a {
        let (h1, h2) = self.hashes.hashes(bytes);
        probe_values(h1, h2, self.config.num_probes())
            .enumerate()
            .map(move |(probe, raw)| self.config.locate(probe, raw))
    }

    /// Number of set bits
    pub fn bits_set(&self) -> usize {
        self.bits.iter().filter(|&bit| bit).count()
    }

    /// Get the current load factor (fraction of bits set)
    pub fn load_factor(&self) -> f64 {
        self.bits_set() as f64 / self.bits.len() as f64
    }

    /// Get the estimated false positive rate
    pub fn estimated_fpr(&self) -> f64 {
        self.load_factor().powi(self.config.num_hashes() as i32)
    }

    /// Get statistics about the filter
    pub fn stats(&self) -> BloomStats {
        BloomStats {
            num_bits: self.bits.len(),
            num_hashes: self.config.num_hashes(),
            partitioned: self.config.is_partitioned(),
            items_added: self.count,
            bits_set: self.bits_set(),
            load_factor: self.load_factor(),
            estimated_fpr: self.estimated_fpr(),
        }
    }

    /// Get the number of items added
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if nothing has been added yet
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the size of the bit array
    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    /// Get the number of hash functions (k)
    pub fn num_hashes(&self) -> usize {
        self.config.num_hashes()
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn is_partitioned(&self) -> bool {
        self.config.is_partitioned()
    }

    /// Slice boundaries, if the filter is partitioned
    pub fn partition_boundaries(&self) -> Option<&[usize]> {
        match self.config.layout() {
            IndexLayout::Partitioned(boundaries) => Some(boundaries.as_slice()),
            IndexLayout::Flat => None,
        }
    }

    /// Read-only view of the bit array
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }
}

/// Statistics about a Bloom filter
#[derive(Debug, Clone)]
pub struct BloomStats {
    pub num_bits: usize,
    pub num_hashes: usize,
    pub partitioned: bool,
    pub items_added: usize,
    pub bits_set: usize,
    pub load_factor: f64,
    pub estimated_fpr: f64,
}

impl std::fmt::Display for BloomStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} Stats:\n\
             - Size: {} bits ({} set)\n\
             - Hash functions: {}\n\
             - Items added: {}\n\
             - Load factor: {:.3}\n\
             - Estimated FPR: {:.6}",
            if self.partitioned {
                "PartitionedBloomFilter"
            } else {
                "BloomFilter"
            },
            self.num_bits,
            self.bits_set,
            self.num_hashes,
            self.items_added,
            self.load_factor,
            self.estimated_fpr
        )
    }
}
