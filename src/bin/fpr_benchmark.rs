use fnv::FnvHashSet;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scalable_bloom::utils::expected_fpr;
use scalable_bloom::{BloomFilter, ScalableBloomFilter};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const TARGET_FPR: f64 = 0.01;
const QUERY_COUNT: usize = 20_000;
const ITEM_LEN: usize = 12;

/// One measured configuration
struct Measurement {
    kind: &'static str,
    elements: usize,
    num_bits: usize,
    insert_rate: f64,
    query_rate: f64,
    false_positives: usize,
    false_positive_rate: f64,
    expected_rate: f64,
}

/// Membership operations shared by the filters under test
trait Benchable {
    fn insert(&mut self, item: &str) -> scalable_bloom::Result<()>;
    fn contains(&self, item: &str) -> bool;
    fn size_in_bits(&self) -> usize;
    fn expected(&self, elements: usize) -> f64;
}

impl Benchable for BloomFilter {
    fn insert(&mut self, item: &str) -> scalable_bloom::Result<()> {
        self.add(item);
        Ok(())
    }

    fn contains(&self, item: &str) -> bool {
        self.query(item)
    }

    fn size_in_bits(&self) -> usize {
        self.num_bits()
    }

    fn expected(&self, elements: usize) -> f64 {
        expected_fpr(self.num_bits(), self.num_hashes(), elements)
    }
}

impl Benchable for ScalableBloomFilter {
    fn insert(&mut self, item: &str) -> scalable_bloom::Result<()> {
        self.add(item)
    }

    fn contains(&self, item: &str) -> bool {
        self.query(item)
    }

    fn size_in_bits(&self) -> usize {
        self.num_bits()
    }

    fn expected(&self, _elements: usize) -> f64 {
        self.compound_fpr_bound()
    }
}

fn random_item(rng: &mut StdRng) -> String {
    (0..ITEM_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

fn measure<F: Benchable>(
    kind: &'static str,
    mut filter: F,
    inserted: &[String],
    absent: &[String],
) -> Result<Measurement, Box<dyn std::error::Error>> {
    let start = Instant::now();
    for item in inserted {
        filter.insert(item)?;
    }
    let insert_time = start.elapsed().as_secs_f64();

    let misses = inserted.iter().filter(|item| !filter.contains(item)).count();
    if misses > 0 {
        return Err(format!("{} reported {} false negatives", kind, misses).into());
    }

    let start = Instant::now();
    let false_positives = absent.iter().filter(|item| filter.contains(item)).count();
    let query_time = start.elapsed().as_secs_f64();

    let rate = |count: usize, secs: f64| {
        if secs > 0.0 {
            count as f64 / secs
        } else {
            f64::INFINITY
        }
    };

    Ok(Measurement {
        kind,
        elements: inserted.len(),
        num_bits: filter.size_in_bits(),
        insert_rate: rate(inserted.len(), insert_time),
        query_rate: rate(absent.len(), query_time),
        false_positives,
        false_positive_rate: false_positives as f64 / absent.len() as f64,
        expected_rate: filter.expected(inserted.len()),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("False positive benchmark (target p = {})", TARGET_FPR);
    println!("{}", "=".repeat(55));

    let element_counts: Vec<usize> = (1..=5).map(|i| i * 2_000).collect();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut results = Vec::new();

    for &n_elements in &element_counts {
        println!("Testing {} elements...", n_elements);

        let mut seen = FnvHashSet::default();
        let mut inserted = Vec::with_capacity(n_elements);
        while inserted.len() < n_elements {
            let item = random_item(&mut rng);
            if seen.insert(item.clone()) {
                inserted.push(item);
            }
        }

        let mut absent = Vec::with_capacity(QUERY_COUNT);
        while absent.len() < QUERY_COUNT {
            let item = random_item(&mut rng);
            if !seen.contains(&item) {
                absent.push(item);
            }
        }

        results.push(measure(
            "bloom",
            BloomFilter::with_accuracy(n_elements, TARGET_FPR)?,
            &inserted,
            &absent,
        )?);
        results.push(measure(
            "partitioned",
            BloomFilter::partitioned_with_accuracy(n_elements, TARGET_FPR)?,
            &inserted,
            &absent,
        )?);
        // the chain grows five times over the run
        results.push(measure(
            "scalable",
            ScalableBloomFilter::new((n_elements / 5).max(1), TARGET_FPR)?,
            &inserted,
            &absent,
        )?);
    }

    println!("\nResults (CSV format):");
    println!("kind,elements,bits,insert_rate,query_rate,false_positives,false_positive_rate,expected_rate");
    for m in &results {
        println!(
            "{},{},{},{:.0},{:.0},{},{:.6},{:.6}",
            m.kind,
            m.elements,
            m.num_bits,
            m.insert_rate,
            m.query_rate,
            m.false_positives,
            m.false_positive_rate,
            m.expected_rate
        );
    }

    Ok(())
}
