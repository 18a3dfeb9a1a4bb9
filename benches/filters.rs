use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scalable_bloom::{BloomFilter, Fnv1a, HashFunction, MurmurHash3, ScalableBloomFilter};

fn bench_hashes(c: &mut Criterion) {
    let input = b"ACGTTGCAACGTTGCAACGTTGCAACGTTGCA";
    c.bench_function("fnv1a", |b| b.iter(|| black_box(Fnv1a.hash(black_box(input)))));
    c.bench_function("murmur3", |b| {
        let murmur = MurmurHash3::new();
        b.iter(|| black_box(murmur.hash(black_box(input))))
    });
}

fn bench_filters(c: &mut Criterion) {
    let items: Vec<String> = (0..10_000).map(|i| format!("kmer-{}", i)).collect();

    let mut bloom = BloomFilter::with_accuracy(items.len(), 0.01).unwrap();
    let mut partitioned = BloomFilter::partitioned_with_accuracy(items.len(), 0.01).unwrap();
    let mut scalable = ScalableBloomFilter::new(1_000, 0.01).unwrap();
    for item in &items {
        bloom.add(item);
        partitioned.add(item);
        scalable.add(item).unwrap();
    }

    c.bench_function("bloom_add", |b| {
        let mut filter = BloomFilter::with_accuracy(items.len(), 0.01).unwrap();
        b.iter(|| filter.add(black_box("kmer-42")))
    });
    c.bench_function("bloom_query", |b| {
        b.iter(|| black_box(bloom.query(black_box("absent-42"))))
    });
    c.bench_function("partitioned_query", |b| {
        b.iter(|| black_box(partitioned.query(black_box("absent-42"))))
    });
    c.bench_function("scalable_query_miss", |b| {
        b.iter(|| black_box(scalable.query(black_box("absent-42"))))
    });
}

criterion_group!(benches, bench_hashes, bench_filters);
criterion_main!(benches);
