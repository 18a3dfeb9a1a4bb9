//! # Scalable Bloom
//!
//! Probabilistic set membership built from two base hashes (FNV-1a and MurmurHash3)
//! and double hashing. Three filters share one implementation:
//!
//! - a standard Bloom filter whose probes range over the whole bit array,
//! - a partitioned Bloom filter where probe `i` only touches slice `i`,
//! - a scalable Bloom filter that chains partitioned filters and tightens the
//!   target false positive probability every time it grows.

pub mod bloom;
pub mod config;
pub mod hash;
pub mod partition;
pub mod scalable;
pub mod utils;

pub use bloom::{BloomFilter, BloomStats};
pub use config::{FilterConfig, IndexLayout};
pub use hash::{
    Fnv1, Fnv1a, HashFunction, HashFunctionFactory, HashFunctionPair, MurmurHash3,
};
pub use partition::PartitionBoundaries;
pub use scalable::{ScalableBloomFilter, ScalableStats, DEFAULT_TIGHTENING_RATIO};

// Python bindings
#[cfg(feature = "python")]
pub mod python_module;

/// Errors raised while building or feeding a filter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid array size: {0}")]
    InvalidSize(String),
    #[error("Invalid hash count: {0}")]
    InvalidHashCount(String),
    #[error("Invalid probability: {0}")]
    InvalidProbability(String),
    #[error("Invalid fill limit: {0}")]
    InvalidFillLimit(String),
    #[error("Invalid tightening ratio: {0}")]
    InvalidRatio(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
