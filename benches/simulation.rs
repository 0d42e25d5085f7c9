//! Performance benchmarks for SUCCESSION

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use succession::disturbance;
use succession::grid::Neighborhood;
use succession::store::EntityStore;
use succession::{Config, Position, SimRng, World};

fn benchmark_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");

    for size in [20, 50, 100].iter() {
        let mut config = Config::default();
        config.world.width = *size;
        config.world.height = *size;
        config.species.mouse.initial_count = size * size / 20;
        config.species.cat.initial_count = size * size / 100;

        let mut world = World::new_with_seed(config, 42).unwrap();

        // Warm up
        world.run(10).unwrap();

        group.bench_with_input(BenchmarkId::new("size", size), size, |b, _| {
            b.iter(|| {
                world.step().unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_disturbance_sweep(c: &mut Criterion) {
    let mut config = Config::default();
    config.world.width = 100;
    config.world.height = 100;
    let world = World::new_with_seed(config.clone(), 42).unwrap();
    let mut rng = SimRng::seed_from_u64(7);

    c.bench_function("disturbance_sweep", |b| {
        b.iter_batched(
            || world.store().clone(),
            |mut store: EntityStore| disturbance::sweep(&mut store, &mut rng, &config, 100),
            criterion::BatchSize::LargeInput,
        );
    });
}

fn benchmark_neighborhood(c: &mut Criterion) {
    let world = World::new_with_seed(Config::default(), 42).unwrap();
    let grid = world.store().grid();

    c.bench_function("moore_neighborhood_r3", |b| {
        b.iter(|| grid.neighborhood(black_box(Position::new(0, 0)), Neighborhood::Moore, 3, false));
    });
}

criterion_group!(
    benches,
    benchmark_world_step,
    benchmark_disturbance_sweep,
    benchmark_neighborhood,
);

criterion_main!(benches);
