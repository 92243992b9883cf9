//! Clustering engine benchmarks.
//!
//! Sweeps item counts for the three expensive operations: the raw Pearson
//! metric, full pairwise matrix construction, and the cache-accelerated
//! agglomeration itself.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use dendra_cluster::{pearson, Clusterer, ProfileClusterSource, ProfileTable, SimilarityMatrix};
use dendra_core::CancelToken;

// =========================================================================
// Profile generation — deterministic LCG, two noisy anti-correlated groups
// =========================================================================

fn lcg_next(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*state >> 33) as f64 / (u32::MAX as f64)
}

fn synthetic_profiles(items: usize, points: usize, seed: u64) -> ProfileTable {
    let mut state = seed;
    let rows = (0..items)
        .map(|item| {
            let rising = item % 2 == 0;
            (0..points)
                .map(|p| {
                    let base = if rising {
                        p as f64
                    } else {
                        (points - p) as f64
                    };
                    base + lcg_next(&mut state) * 0.5
                })
                .collect()
        })
        .collect();
    ProfileTable::from_rows(rows).expect("rows are rectangular")
}

// =========================================================================
// Benchmarks
// =========================================================================

fn bench_pearson(c: &mut Criterion) {
    let mut group = c.benchmark_group("pearson");
    for points in [100usize, 1_000, 10_000] {
        let mut state = 42;
        let a: Vec<f64> = (0..points).map(|_| lcg_next(&mut state)).collect();
        let b: Vec<f64> = (0..points).map(|_| lcg_next(&mut state)).collect();
        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |bench, _| {
            bench.iter(|| pearson(black_box(&a), black_box(&b)).unwrap())
        });
    }
    group.finish();
}

fn bench_similarity_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_matrix");
    for items in [8usize, 32, 64] {
        let table = synthetic_profiles(items, 200, 7);
        group.throughput(Throughput::Elements((items * (items - 1) / 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |bench, _| {
            bench.iter(|| {
                SimilarityMatrix::compute(black_box(&table), &CancelToken::new(), |_, _| {})
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_clusterer(c: &mut Criterion) {
    let mut group = c.benchmark_group("agglomerative_clustering");
    group.sample_size(20);
    for items in [16usize, 64, 128] {
        let table = synthetic_profiles(items, 100, 11);
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |bench, _| {
            bench.iter(|| {
                let source = ProfileClusterSource::new(table.clone());
                Clusterer::new(source).run(|_, _| {}).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_pearson,
    bench_similarity_matrix,
    bench_clusterer,
);
criterion_main!(benches);
