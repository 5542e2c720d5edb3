//! Evaluation benchmarks.
//!
//! Run with: `cargo bench -p rmac-eval-core --bench evaluation`
//!
//! Measures grid generation and corpus mAP on a synthetic similarity matrix
//! the size of the Oxford 5k benchmark (55 queries × 5063 images).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rmac_eval_core::config::EvaluatorConfig;
use rmac_eval_core::evaluation::{evaluate, RelevanceSet, SimilarityMatrix};
use rmac_eval_core::regions::generate_regions;

const NUM_QUERIES: usize = 55;
const NUM_DATASET: usize = 5063;
const RELEVANT_PER_QUERY: usize = 50;

/// Deterministic pseudo-random scores in [0, 1).
fn synthetic_matrix() -> SimilarityMatrix {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let values = (0..NUM_QUERIES * NUM_DATASET)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 40) as f32 / (1u64 << 24) as f32
        })
        .collect();
    SimilarityMatrix::new(NUM_QUERIES, NUM_DATASET, values).expect("valid shape")
}

fn synthetic_relevance() -> Vec<RelevanceSet> {
    (0..NUM_QUERIES)
        .map(|q| {
            (0..RELEVANT_PER_QUERY)
                .map(|i| (q * 97 + i * 101) % NUM_DATASET)
                .collect()
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let sim = synthetic_matrix();
    let relevance = synthetic_relevance();

    let mut group = c.benchmark_group("evaluate");
    for (name, config) in [
        ("parallel", EvaluatorConfig::default()),
        ("sequential", EvaluatorConfig::default().sequential()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter(|| evaluate(black_box(&sim), black_box(&relevance), config))
        });
    }
    group.finish();
}

fn bench_regions(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_regions");
    for levels in [1, 3, 5] {
        group.bench_with_input(BenchmarkId::from_parameter(levels), &levels, |b, &l| {
            b.iter(|| generate_regions(black_box(768), black_box(1024), l))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_regions);
criterion_main!(benches);
