//! Slice boundaries for partitioned Bloom filters
//!
//! The bit array is cut into `k` contiguous slices, one per probe. Slice `i` spans
//! `boundaries[i - 1]..boundaries[i]` (with `boundaries[-1] = 0`), so a probe can
//! never set a bit owned by another probe.

use crate::{FilterError, Result};
use std::ops::Range;

/// Cumulative, exclusive upper bounds of each slice
///
/// `m` bits are split into `k` near-equal slices: every slice gets `m / k` bits and
/// the first `m % k` slices get one extra.
pub fn create_partition_boundaries(num_bits: usize, num_slices: usize) -> Vec<usize> {
    if num_slices == 0 {
        return Vec::new();
    }

    let base = num_bits / num_slices;
    let remainder = num_bits % num_slices;

    let mut last = 0;
    (0..num_slices)
        .map(|i| {
            last += base + usize::from(i < remainder);
            last
        })
        .collect()
}

/// Validated slice layout of a bit array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionBoundaries {
    bounds: Vec<usize>,
}

impl PartitionBoundaries {
    /// Split `num_bits` into `num_slices` slices
    ///
    /// Every slice must hold at least one bit, so `num_bits >= num_slices >= 1`.
    pub fn new(num_bits: usize, num_slices: usize) -> Result<Self> {
        if num_slices == 0 {
            return Err(FilterError::InvalidHashCount(
                "Number of slices must be > 0".to_string(),
            ));
        }
        if num_bits < num_slices {
            return Err(FilterError::InvalidSize(format!(
                "Cannot split {} bits into {} non-empty slices",
                num_bits, num_slices
            )));
        }

        Ok(PartitionBoundaries {
            bounds: create_partition_boundaries(num_bits, num_slices),
        })
    }

    /// Number of slices
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.bounds
    }

    /// Total number of bits covered
    pub fn num_bits(&self) -> usize {
        self.bounds.last().copied().unwrap_or(0)
    }

    /// Bit range owned by `slice`
    pub fn slice(&self, slice: usize) -> Range<usize> {
        let start = if slice == 0 { 0 } else { self.bounds[slice - 1] };
        start..self.bounds[slice]
    }

    /// Map a raw probe value into `slice`
    ///
    /// The Euclidean remainder keeps negative (wrapped) probe values inside the slice.
    #[inline]
    pub fn locate(&self, slice: usize, raw: i64) -> usize {
        let range = self.slice(slice);
        let len = (range.end - range.start) as i64;
        range.start + raw.rem_euclid(len) as usize
    }
}
