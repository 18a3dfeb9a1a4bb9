//! Immutable filter configuration
//!
//! A [`FilterConfig`] fixes the bit array size, the number of probes and the index
//! layout once, before the filter exists. Filters never rebind any of them.

use crate::partition::PartitionBoundaries;
use crate::utils::{optimal_num_hashes, optimal_parameters, validate_probability};
use crate::{FilterError, Result};

/// How raw probe values are mapped onto the bit array
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLayout {
    /// Every probe may land anywhere in `0..m`
    Flat,
    /// Probe `i` lands in its own slice
    Partitioned(PartitionBoundaries),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    num_bits: usize,
    num_hashes: usize,
    layout: IndexLayout,
}

impl FilterConfig {
    /// Flat layout with `num_bits` bits and `num_hashes` probes
    pub fn with_size(num_bits: usize, num_hashes: usize) -> Result<Self> {
        if num_bits == 0 {
            return Err(FilterError::InvalidSize(
                "Bit array size must be > 0".to_string(),
            ));
        }
        if num_hashes == 0 {
            return Err(FilterError::InvalidHashCount(
                "Number of hash functions must be > 0".to_string(),
            ));
        }

        Ok(FilterConfig {
            num_bits,
            num_hashes,
            layout: IndexLayout::Flat,
        })
    }

    /// Size the filter for `expected_items` at false positive probability `probability`
    pub fn with_accuracy(expected_items: usize, probability: f64) -> Result<Self> {
        let params = optimal_parameters(expected_items, probability)?;
        Self::with_size(params.num_bits, params.num_hashes)
    }

    /// Keep a caller-chosen `num_bits` and derive the probe count from `probability`
    pub fn with_probability(probability: f64, num_bits: usize) -> Result<Self> {
        validate_probability(probability)?;
        Self::with_size(num_bits, optimal_num_hashes(probability))
    }

    /// Switch to one slice per probe
    pub fn partitioned(self) -> Result<Self> {
        let boundaries = PartitionBoundaries::new(self.num_bits, self.num_hashes)?;
        debug_assert_eq!(boundaries.num_bits(), self.num_bits);
        Ok(FilterConfig {
            layout: IndexLayout::Partitioned(boundaries),
            ..self
        })
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn layout(&self) -> &IndexLayout {
        &self.layout
    }

    pub fn is_partitioned(&self) -> bool {
        matches!(self.layout, IndexLayout::Partitioned(_))
    }

    /// Number of bits touched per item; the (h1, h2) pair is always used
    pub fn num_probes(&self) -> usize {
        self.num_hashes.max(2)
    }

    /// Map the raw value of probe `probe` to a bit index in `0..num_bits`
    ///
    /// With a partitioned layout, probes past the last slice share the last slice.
    #[inline]
    pub fn locate(&self, probe: usize, raw: i64) -> usize {
        match &self.layout {
            IndexLayout::Flat => raw.rem_euclid(self.num_bits as i64) as usize,
            IndexLayout::Partitioned(boundaries) => {
                boundaries.locate(probe.min(boundaries.len() - 1), raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_size_validation() {
        assert!(matches!(
            FilterConfig::with_size(0, 4),
            Err(FilterError::InvalidSize(_))
        ));
        assert!(matches!(
            FilterConfig::with_size(20, 0),
            Err(FilterError::InvalidHashCount(_))
        ));

        let config = FilterConfig::with_size(20, 4).unwrap();
        assert_eq!(config.num_bits(), 20);
        assert_eq!(config.num_hashes(), 4);
        assert_eq!(config.layout(), &IndexLayout::Flat);
    }

    #[test]
    fn test_with_accuracy() {
        let config = FilterConfig::with_accuracy(100, 0.001).unwrap();
        assert_eq!(config.num_bits(), 1437);
        assert_eq!(config.num_hashes(), 10);

        assert!(matches!(
            FilterConfig::with_accuracy(100, 0.0),
            Err(FilterError::InvalidProbability(_))
        ));
        assert!(matches!(
            FilterConfig::with_accuracy(100, 1.2),
            Err(FilterError::InvalidProbability(_))
        ));
        // p = 1 needs zero bits
        assert!(matches!(
            FilterConfig::with_accuracy(100, 1.0),
            Err(FilterError::InvalidSize(_))
        ));
        assert!(matches!(
            FilterConfig::with_accuracy(0, 0.01),
            Err(FilterError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_with_probability() {
        let config = FilterConfig::with_probability(0.001, 100).unwrap();
        assert_eq!(config.num_bits(), 100);
        assert_eq!(config.num_hashes(), 10);

        assert!(matches!(
            FilterConfig::with_probability(-1.0, 100),
            Err(FilterError::InvalidProbability(_))
        ));
    }

    #[test]
    fn test_partitioned() {
        let config = FilterConfig::with_size(20, 4).unwrap().partitioned().unwrap();
        assert!(config.is_partitioned());
        match config.layout() {
            IndexLayout::Partitioned(boundaries) => {
                assert_eq!(boundaries.as_slice(), &[5, 10, 15, 20]);
                assert_eq!(boundaries.num_bits(), config.num_bits());
            }
            IndexLayout::Flat => panic!("expected a partitioned layout"),
        }

        assert!(FilterConfig::with_size(3, 4).unwrap().partitioned().is_err());
    }

    #[test]
    fn test_locate_flat_handles_negative_values() {
        let config = FilterConfig::with_size(97, 5).unwrap();
        for raw in [-1, -97, -98, i64::MIN, i64::MAX, 0, 96, 97] {
            assert!(config.locate(2, raw) < 97);
        }
        assert_eq!(config.locate(2, -1), 96);
    }

    #[test]
    fn test_single_hash_uses_last_slice() {
        let config = FilterConfig::with_size(10, 1).unwrap().partitioned().unwrap();
        assert_eq!(config.num_probes(), 2);
        assert_eq!(config.locate(0, 13), 3);
        assert_eq!(config.locate(1, 13), 3);
    }
}
