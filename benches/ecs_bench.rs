#![allow(dead_code)]
//! Benchmarks covering the core storage operations: spawning, despawning,
//! lookup, archetype migration, and query iteration.
//!
//! Run with: cargo bench

use archetype_store::{define_registry, World};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

#[derive(Debug, Clone, Copy, Default)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Health(u32);

#[derive(Debug, Clone, Copy, Default)]
struct Damage(f32);

define_registry!(BenchRegistry: Position, Velocity, Health, Damage);

fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("spawn_1k_single_component", |b| {
        b.iter(|| {
            let mut world: World<BenchRegistry> = World::new().unwrap();
            for i in 0..1_000 {
                world.create_with((Position { x: i as f32, y: 0.0, z: 0.0 },));
            }
        });
    });

    group.bench_function("spawn_1k_two_components", |b| {
        b.iter(|| {
            let mut world: World<BenchRegistry> = World::new().unwrap();
            for i in 0..1_000 {
                world.create_with((
                    Position { x: i as f32, y: 0.0, z: 0.0 },
                    Velocity { x: 1.0, y: 0.0, z: 0.0 },
                ));
            }
        });
    });

    group.bench_function("spawn_1k_four_components", |b| {
        b.iter(|| {
            let mut world: World<BenchRegistry> = World::new().unwrap();
            for i in 0..1_000 {
                world.create_with((
                    Position { x: i as f32, y: 0.0, z: 0.0 },
                    Velocity { x: 1.0, y: 0.0, z: 0.0 },
                    Health(100),
                    Damage(10.5),
                ));
            }
        });
    });

    group.finish();
}

fn bench_spawn_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn_large");

    for count in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("spawn_with_3_components", count),
            count,
            |b, &count| {
                b.iter(|| {
                    let mut world: World<BenchRegistry> = World::new().unwrap();
                    for i in 0..count {
                        world.create_with((
                            Position { x: i as f32, y: 0.0, z: 0.0 },
                            Velocity { x: 1.0, y: 0.0, z: 0.0 },
                            Health(100),
                        ));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("get_component", count),
            count,
            |b, &count| {
                let mut world: World<BenchRegistry> = World::new().unwrap();
                let entities: Vec<_> = (0..count)
                    .map(|i| world.create_with((Position { x: i as f32, y: 0.0, z: 0.0 }, Health(100))))
                    .collect();

                b.iter(|| {
                    for &entity in &entities {
                        black_box(world.get::<Position>(entity).ok());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("destroy");

    group.bench_function("destroy_1k_entities", |b| {
        b.iter_batched(
            || {
                let mut world: World<BenchRegistry> = World::new().unwrap();
                let entities: Vec<_> = (0..1_000)
                    .map(|i| world.create_with((Position { x: i as f32, y: 0.0, z: 0.0 }, Health(100))))
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for entity in entities {
                    let _ = world.destroy(entity);
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_archetype_segregation(c: &mut Criterion) {
    c.bench_function("archetype_segregation_1k", |b| {
        b.iter(|| {
            let mut world: World<BenchRegistry> = World::new().unwrap();

            for i in 0..250 {
                world.create_with((
                    Position { x: i as f32, y: 0.0, z: 0.0 },
                    Velocity { x: 1.0, y: 0.0, z: 0.0 },
                ));
            }
            for i in 0..250 {
                world.create_with((Position { x: i as f32, y: 0.0, z: 0.0 }, Health(100)));
            }
            for i in 0..250 {
                world.create_with((
                    Position { x: i as f32, y: 0.0, z: 0.0 },
                    Velocity { x: 1.0, y: 0.0, z: 0.0 },
                    Health(100),
                ));
            }
            for i in 0..250 {
                world.create_with((Position { x: i as f32, y: 0.0, z: 0.0 },));
            }
        });
    });
}

fn bench_query_iteration(c: &mut Criterion) {
    c.bench_function("query_mut_iteration_100k", |b| {
        let mut world: World<BenchRegistry> = World::new().unwrap();
        for i in 0..100_000 {
            world.create_with((
                Position { x: i as f32, y: 0.0, z: 0.0 },
                Velocity { x: 1.0, y: 0.0, z: 0.0 },
                Health(100),
            ));
        }

        b.iter(|| {
            for (pos, vel) in world.query_mut::<(&mut Position, &Velocity)>() {
                pos.x += vel.x;
            }
        });
    });

    c.bench_function("query_count_100k", |b| {
        let mut world: World<BenchRegistry> = World::new().unwrap();
        for i in 0..100_000 {
            world.create_with((
                Position { x: i as f32, y: 0.0, z: 0.0 },
                Velocity { x: 1.0, y: 0.0, z: 0.0 },
            ));
        }

        b.iter(|| {
            black_box(world.count::<(&Position, &Velocity)>());
        });
    });
}

criterion_group!(
    benches,
    bench_spawn,
    bench_spawn_large,
    bench_lookup,
    bench_destroy,
    bench_archetype_segregation,
    bench_query_iteration
);

criterion_main!(benches);
