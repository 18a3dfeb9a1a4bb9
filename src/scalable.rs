//! Scalable Bloom filter
//!
//! An append-only chain of partitioned Bloom filters. Items go into the newest link;
//! once it holds `fill_limit` items a new link is appended whose target false
//! positive probability is the previous one multiplied by the tightening ratio.
//! Queries scan the chain oldest first, so the chain's false positive probability is
//! the union of its links' probabilities.

use crate::bloom::BloomFilter;
use crate::{FilterError, Result};
use std::fmt::Display;
use tracing::{debug, info};

/// Tightening ratio used by [`ScalableBloomFilter::new`]
pub const DEFAULT_TIGHTENING_RATIO: f64 = 0.9;

pub struct ScalableBloomFilter {
    /// Oldest first; never reordered or shrunk
    filters: Vec<BloomFilter>,
    /// Target probability each link was sized for, parallel to `filters`
    probabilities: Vec<f64>,
    fill_limit: usize,
    tightening_ratio: f64,
    items_in_current: usize,
    count: usize,
}

impl ScalableBloomFilter {
    /// Create a scalable filter with the default tightening ratio of 0.9
    pub fn new(fill_limit: usize, probability: f64) -> Result<Self> {
        Self::with_tightening_ratio(fill_limit, probability, DEFAULT_TIGHTENING_RATIO)
    }

    /// Create a scalable filter
    ///
    /// # Arguments
    /// * `fill_limit` - Items a link holds before the next link is appended
    /// * `probability` - Target false positive probability of the first link
    /// * `tightening_ratio` - Factor applied to the probability for each new link
    ///
    /// A ratio of `0` is accepted, but the second link would need probability `0`, so
    /// once the first link holds `fill_limit - 1` items every further `add` fails with
    /// [`FilterError::InvalidProbability`]. The chain stays queryable and unchanged.
    pub fn with_tightening_ratio(
        fill_limit: usize,
        probability: f64,
        tightening_ratio: f64,
    ) -> Result<Self> {
        if fill_limit == 0 {
            return Err(FilterError::InvalidFillLimit(
                "Fill ratio limit must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&probability) {
            return Err(FilterError::InvalidProbability(format!(
                "False positive probability must be in [0, 1], got {}",
                probability
            )));
        }
        if !(0.0..=1.0).contains(&tightening_ratio) {
            return Err(FilterError::InvalidRatio(format!(
                "Tightening ratio must be in [0, 1], got {}",
                tightening_ratio
            )));
        }

        let first = BloomFilter::partitioned_with_accuracy(fill_limit, probability)?;

        Ok(ScalableBloomFilter {
            filters: vec![first],
            probabilities: vec![probability],
            fill_limit,
            tightening_ratio,
            items_in_current: 0,
            count: 0,
        })
    }

    /// Add an item, hashed through its `Display` text encoded as UTF-8
    ///
    /// Fails only if the link this insertion would append cannot be built, in which
    /// case the filter is left untouched.
    pub fn add<T: Display + ?Sized>(&mut self, item: &T) -> Result<()> {
        self.add_bytes(item.to_string().as_bytes())
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let next = if self.items_in_current + 1 >= self.fill_limit {
            Some(self.next_link()?)
        } else {
            None
        };

        self.current_mut().add_bytes(bytes);
        self.count += 1;

        match next {
            Some((filter, probability)) => {
                self.filters.push(filter);
                self.probabilities.push(probability);
                self.items_in_current = 0;
                info!(
                    filters = self.filters.len(),
                    probability, "Scalable bloom filter grew"
                );
            }
            None => self.items_in_current += 1,
        }

        Ok(())
    }

    /// Add every item of a collection, stopping at the first failure
    pub fn add_all<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        for item in items {
            self.add(&item)?;
        }
        Ok(())
    }

    /// Check if an item might be in any link of the chain
    pub fn query<T: Display + ?Sized>(&self, item: &T) -> bool {
        self.query_bytes(item.to_string().as_bytes())
    }

    pub fn query_bytes(&self, bytes: &[u8]) -> bool {
        self.filters.iter().any(|filter| filter.query_bytes(bytes))
    }

    /// Query a single link; `None` if `index` is past the end of the chain
    pub fn query_filter<T: Display + ?Sized>(&self, index: usize, item: &T) -> Option<bool> {
        self.filters.get(index).map(|filter| filter.query(item))
    }

    fn next_link(&self) -> Result<(BloomFilter, f64)> {
        let probability = self.current_probability() * self.tightening_ratio;
        debug!(
            fill_limit = self.fill_limit,
            probability, "Building next scalable bloom filter link"
        );
        let filter = BloomFilter::partitioned_with_accuracy(self.fill_limit, probability)?;
        Ok((filter, probability))
    }

    fn current_mut(&mut self) -> &mut BloomFilter {
        let last = self.filters.len() - 1;
        &mut self.filters[last]
    }

    /// The link receiving new items
    pub fn current(&self) -> &BloomFilter {
        &self.filters[self.filters.len() - 1]
    }

    /// Target probability of the newest link
    pub fn current_probability(&self) -> f64 {
        self.probabilities[self.probabilities.len() - 1]
    }

    /// Target probability of every link, oldest first
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Upper bound on the chain's false positive probability: 1 - prod(1 - p_i)
    pub fn compound_fpr_bound(&self) -> f64 {
        1.0 - self
            .probabilities
            .iter()
            .map(|p| 1.0 - p)
            .product::<f64>()
    }

    pub fn filters(&self) -> &[BloomFilter] {
        &self.filters
    }

    pub fn num_filters(&self) -> usize {
        self.filters.len()
    }

    pub fn fill_limit(&self) -> usize {
        self.fill_limit
    }

    pub fn tightening_ratio(&self) -> f64 {
        self.tightening_ratio
    }

    /// Items added to the newest link since it was appended
    pub fn items_in_current(&self) -> usize {
        self.items_in_current
    }

    /// Total number of items added
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total bits across all links
    pub fn num_bits(&self) -> usize {
        self.filters.iter().map(BloomFilter::num_bits).sum()
    }

    pub fn stats(&self) -> ScalableStats {
        ScalableStats {
            num_filters: self.filters.len(),
            fill_limit: self.fill_limit,
            tightening_ratio: self.tightening_ratio,
            items_added: self.count,
            items_in_current: self.items_in_current,
            total_bits: self.num_bits(),
            current_probability: self.current_probability(),
            compound_fpr_bound: self.compound_fpr_bound(),
        }
    }
}

/// Statistics about a scalable Bloom filter
#[derive(Debug, Clone)]
pub struct ScalableStats {
    pub num_filters: usize,
    pub fill_limit: usize,
    pub tightening_ratio: f64,
    pub items_added: usize,
    pub items_in_current: usize,
    pub total_bits: usize,
    pub current_probability: f64,
    pub compound_fpr_bound: f64,
}

impl std::fmt::Display for ScalableStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ScalableBloomFilter Stats:\n\
             - Filters: {} (fill limit {}, ratio {})\n\
             - Items added: {} ({} in current)\n\
             - Total size: {} bits\n\
             - Current target FPR: {:.6}\n\
             - Compound FPR bound: {:.6}",
            self.num_filters,
            self.fill_limit,
            self.tightening_ratio,
            self.items_added,
            self.items_in_current,
            self.total_bits,
            self.current_probability,
            self.compound_fpr_bound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalable_construction() {
        let filter = ScalableBloomFilter::with_tightening_ratio(100, 0.01, 0.8).unwrap();

        assert_eq!(filter.fill_limit(), 100);
        assert!((filter.current_probability() - 0.01).abs() < 1e-12);
        assert!((filter.tightening_ratio() - 0.8).abs() < 1e-12);
        assert_eq!(filter.num_filters(), 1);
        assert!(filter.current().is_partitioned());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_scalable_default_ratio() {
        let filter = ScalableBloomFilter::new(100, 0.01).unwrap();
        assert_eq!(filter.tightening_ratio(), DEFAULT_TIGHTENING_RATIO);
        assert_eq!(filter.num_filters(), 1);
    }

    #[test]
    fn test_scalable_invalid_parameters() {
        assert!(matches!(
            ScalableBloomFilter::new(0, 0.01),
            Err(FilterError::InvalidFillLimit(_))
        ));
        assert!(matches!(
            ScalableBloomFilter::new(100, -0.5),
            Err(FilterError::InvalidProbability(_))
        ));
        assert!(matches!(
            ScalableBloomFilter::new(100, 1.5),
            Err(FilterError::InvalidProbability(_))
        ));
        assert!(matches!(
            ScalableBloomFilter::with_tightening_ratio(100, 0.01, 1.1),
            Err(FilterError::InvalidRatio(_))
        ));
        assert!(matches!(
            ScalableBloomFilter::with_tightening_ratio(100, 0.01, -0.1),
            Err(FilterError::InvalidRatio(_))
        ));
    }

    #[test]
    fn test_scalable_edge_probabilities_fail_in_first_link() {
        assert!(matches!(
            ScalableBloomFilter::new(100, 0.0),
            Err(FilterError::InvalidProbability(_))
        ));
        assert!(matches!(
            ScalableBloomFilter::new(100, 1.0),
            Err(FilterError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_scalable_query() {
        let mut filter = ScalableBloomFilter::new(100, 0.01).unwrap();

        filter.add("testItem").unwrap();
        assert!(filter.query("testItem"));
        assert!(!filter.query("randomItem"));
        assert_eq!(filter.query_filter(0, "testItem"), Some(true));
        assert_eq!(filter.query_filter(1, "testItem"), None);
    }

    #[test]
    fn test_scalable_growth() {
        let mut filter = ScalableBloomFilter::new(100, 0.01).unwrap();

        for i in 0..99 {
            filter.add(&i).unwrap();
        }
        assert_eq!(filter.num_filters(), 1);
        assert_eq!(filter.items_in_current(), 99);

        filter.add(&99).unwrap();
        assert_eq!(filter.num_filters(), 2);
        assert_eq!(filter.items_in_current(), 0);
        assert!((filter.current_probability() - 0.01 * 0.9).abs() < 1e-12);
        assert_eq!(filter.probabilities().len(), 2);

        // the item that filled the first link lives there
        assert_eq!(filter.query_filter(0, &99), Some(true));
        assert!(filter.current().is_empty());

        filter.add(&100).unwrap();
        assert_eq!(filter.query_filter(1, &100), Some(true));
        assert_eq!(filter.len(), 101);
    }

    #[test]
    fn test_scalable_links_tighten() {
        let mut filter = ScalableBloomFilter::with_tightening_ratio(10, 0.1, 0.5).unwrap();
        filter.add_all(0..35).unwrap();

        assert_eq!(filter.num_filters(), 4);
        let expected = [0.1, 0.05, 0.025, 0.0125];
        for (actual, expected) in filter.probabilities().iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-12);
        }
        // tighter links need more bits for the same fill limit
        let sizes: Vec<usize> = filter.filters().iter().map(|f| f.num_bits()).collect();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_scalable_growth_failure_leaves_filter_untouched() {
        let mut filter = ScalableBloomFilter::with_tightening_ratio(3, 0.01, 0.0).unwrap();
        filter.add("a").unwrap();
        filter.add("b").unwrap();

        let bits_before = filter.current().bits_set();
        assert!(matches!(
            filter.add("c"),
            Err(FilterError::InvalidProbability(_))
        ));
        assert_eq!(filter.num_filters(), 1);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.items_in_current(), 2);
        assert_eq!(filter.current().bits_set(), bits_before);
    }

    #[test]
    fn test_scalable_zero_ratio_stays_stuck() {
        let mut filter = ScalableBloomFilter::with_tightening_ratio(3, 0.01, 0.0).unwrap();
        filter.add_all(["a", "b"]).unwrap();
        let bits_before = filter.current().bits_set();

        for item in ["c", "d", "e"] {
            assert!(matches!(
                filter.add(item),
                Err(FilterError::InvalidProbability(_))
            ));
        }
        assert!(filter.add_all(["f"]).is_err());

        assert_eq!(filter.num_filters(), 1);
        assert_eq!(filter.probabilities(), &[0.01]);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.items_in_current(), 2);
        assert_eq!(filter.current().bits_set(), bits_before);
        assert!(filter.query("a") && filter.query("b"));
    }

    #[test]
    fn test_scalable_no_false_negatives() {
        let mut filter = ScalableBloomFilter::new(50, 0.01).unwrap();
        let items: Vec<String> = (0..500).map(|i| format!("read-{}", i)).collect();

        filter.add_all(&items).unwrap();

        assert_eq!(filter.num_filters(), 11);
        assert!(items.iter().all(|item| filter.query(item)));
    }

    #[test]
    fn test_scalable_stats() {
        let mut filter = ScalableBloomFilter::new(10, 0.01).unwrap();
        filter.add_all(0..15).unwrap();

        let stats = filter.stats();
        assert_eq!(stats.num_filters, 2);
        assert_eq!(stats.items_added, 15);
        assert_eq!(stats.items_in_current, 5);
        assert!(stats.compound_fpr_bound > 0.01 && stats.compound_fpr_bound < 0.02);
        assert!(stats.to_string().starts_with("ScalableBloomFilter Stats:"));
    }
}
