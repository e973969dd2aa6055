//! # PPRL Blocking Benchmarks
//!
//! | Operation | Scaling |
//! |-----------|---------|
//! | P-Sig build | O(n * groups) |
//! | Lambda-fold build | O(n * Lambda * K) |
//! | Merge | O(parties * blocks) |
//! | Bit position derivation | O(k) per signature |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pprl_blocking::domain::{double_metaphone, flip_bloom_filter};
use pprl_blocking::{BlockingApi, BlockingService};
use pprl_tests::fixtures::{lambda_name_config, psig_ratio_config, synthetic_parties};
use std::time::Duration;

fn bench_flip_bloom_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("flip-bloom-filter");

    for k in [4, 20, 100] {
        group.throughput(Throughput::Elements(k as u64));
        group.bench_with_input(BenchmarkId::new("hashes", k), &k, |b, &k| {
            b.iter(|| black_box(flip_bloom_filter(black_box("0_Fredrick"), 2048, k)))
        });
    }
    group.finish();
}

fn bench_double_metaphone(c: &mut Criterion) {
    let names = ["Smith", "Schmidt", "Joyce", "Wang", "Fredrick", "Lindsay"];
    c.bench_function("double-metaphone", |b| {
        b.iter(|| {
            for name in names {
                black_box(double_metaphone(black_box(name)));
            }
        })
    });
}

fn bench_candidate_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate-blocks");
    group.measurement_time(Duration::from_secs(10));
    let service = BlockingService::new();

    for size in [100, 1_000, 5_000] {
        let party = synthetic_parties(42, 1, size, size / 2).remove(0);
        group.throughput(Throughput::Elements(size as u64));

        let psig = psig_ratio_config();
        group.bench_with_input(BenchmarkId::new("p-sig", size), &party, |b, party| {
            b.iter(|| black_box(service.generate_candidate_blocks(&party.dataset, &psig)))
        });

        let lambda = lambda_name_config();
        group.bench_with_input(BenchmarkId::new("lambda-fold", size), &party, |b, party| {
            b.iter(|| black_box(service.generate_candidate_blocks(&party.dataset, &lambda)))
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let service = BlockingService::new();

    for parties in [2, 4, 8] {
        let datasets: Vec<_> = synthetic_parties(7, parties, 1_000, 500)
            .into_iter()
            .map(|p| p.dataset)
            .collect();
        let results = service
            .generate_candidate_blocks_parallel(&datasets, &lambda_name_config())
            .expect("synthetic parties build");

        group.bench_with_input(BenchmarkId::new("lambda-fold", parties), &results, |b, results| {
            b.iter(|| black_box(service.generate_blocks(results, 2)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_flip_bloom_filter,
    bench_double_metaphone,
    bench_candidate_blocks,
    bench_merge,
);
criterion_main!(benches);
