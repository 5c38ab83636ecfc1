//! Benchmarks for the generation step.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use torus_life::{
    engine::{Grid, WorkerPool},
    schema::{Pattern, Seed},
};

fn bench_generation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_step");

    for size in [64, 128, 256, 512] {
        let seed = Seed {
            pattern: Pattern::Random {
                density: 0.35,
                seed: 42,
            },
        };
        let grid = seed.generate(size, size);

        for workers in [1, 2, 4, 8] {
            let pool = WorkerPool::new(workers);
            let mut next = Grid::new(size, size);

            group.bench_with_input(
                BenchmarkId::new(format!("{size}x{size}"), workers),
                &workers,
                |b, _| {
                    b.iter(|| {
                        let flipped = pool.step_into(black_box(&grid), &mut next);
                        black_box(flipped);
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_generation_step);
criterion_main!(benches);
