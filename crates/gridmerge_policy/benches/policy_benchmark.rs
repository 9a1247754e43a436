//! Benchmark for merge decisions.
//!
//! Run with: cargo bench --package gridmerge_policy --bench policy_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridmerge_core::{Census, GridState};
use gridmerge_policy::{MergePolicy, PolicyConfig};

fn full_board() -> GridState {
    GridState::with_units(
        0,
        &[
            ("chemist", 4),
            ("cauldron", 1),
            ("cauldron", 1),
            ("cauldron", 2),
            ("cauldron", 3),
            ("knight_statue", 2),
            ("knight_statue", 2),
            ("knight_statue", 3),
            ("zealot", 3),
            ("zealot", 3),
            ("crystal", 5),
            ("hunter", 4),
            ("hunter", 4),
        ],
    )
}

fn benchmark_census(c: &mut Criterion) {
    let grid = full_board();
    c.bench_function("census_aggregate", |b| {
        b.iter(|| black_box(Census::aggregate(&grid)));
    });
}

fn benchmark_decide(c: &mut Criterion) {
    let grid = full_board();
    let mut policy = MergePolicy::new(PolicyConfig::default()).unwrap();
    let census = policy.census_for(&grid);

    c.bench_function("decide_full_board", |b| {
        b.iter(|| black_box(policy.decide(&grid, &census)));
    });
}

criterion_group!(benches, benchmark_census, benchmark_decide);
criterion_main!(benches);
