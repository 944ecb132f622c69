use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use stripack::{
    instance::{Instance, Variant},
    solver::driver::{solve_default, SolveConfig},
};

fn bench_instance() -> Instance {
    Instance::new(6, vec![2, 3, 1, 2], vec![2, 1, 3, 2]).unwrap()
}

fn solve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("strip_packing");
    for variant in [Variant::Fixed, Variant::Rotatable] {
        group.bench_with_input(
            BenchmarkId::new("solve", variant),
            &variant,
            |b, &variant| {
                let instance = bench_instance();
                let config =
                    SolveConfig::new(variant).with_deadline(Duration::from_secs(60));
                b.iter(|| solve_default(&instance, &config).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, solve_benchmark);
criterion_main!(benches);
