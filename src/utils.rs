//! Parameter derivation and validation shared by every filter

use crate::{FilterError, Result};
use std::f64::consts::LN_2;

/// Bit array size and hash count for a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParameters {
    pub num_bits: usize,
    pub num_hashes: usize,
}

/// Reject probabilities outside (0, 1]; NaN is rejected too
pub fn validate_probability(probability: f64) -> Result<()> {
    if probability > 0.0 && probability <= 1.0 {
        Ok(())
    } else {
        Err(FilterError::InvalidProbability(format!(
            "False positive probability must be in (0, 1], got {}",
            probability
        )))
    }
}

/// Bits needed to hold `expected_items` at `probability`: floor(n * |ln p| / (ln 2)^2)
pub fn optimal_num_bits(expected_items: usize, probability: f64) -> usize {
    let ln2_squared = LN_2 * LN_2;
    (expected_items as f64 * probability.ln().abs() / ln2_squared) as usize
}

/// Hash count for `probability`: ceil(log2(1 / p))
pub fn optimal_num_hashes(probability: f64) -> usize {
    ((1.0 / probability).ln() / LN_2).ceil() as usize
}

/// Derive (m, k) from an expected item count and a target false positive probability
pub fn optimal_parameters(expected_items: usize, probability: f64) -> Result<FilterParameters> {
    validate_probability(probability)?;
    Ok(FilterParameters {
        num_bits: optimal_num_bits(expected_items, probability),
        num_hashes: optimal_num_hashes(probability),
    })
}

/// Theoretical false positive rate after `items` insertions: (1 - e^(-kn/m))^k
pub fn expected_fpr(num_bits: usize, num_hashes: usize, items: usize) -> f64 {
    if num_bits == 0 {
        return 1.0;
    }
    let k = num_hashes as f64;
    let exponent = -k * items as f64 / num_bits as f64;
    (1.0 - exponent.exp()).powi(num_hashes as i32)
}
