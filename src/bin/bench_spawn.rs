#![allow(dead_code)]

use archetype_store::{define_registry, World};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Health(u32);

define_registry!(BenchRegistry: Position, Velocity, Health);

fn main() {
    println!("Running spawn benchmarks...");

    // Warm up
    let mut world: World<BenchRegistry> = World::new().unwrap();
    let start = Instant::now();
    for _ in 0..1000 {
        world.create_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)));
    }
    println!("Warmup (1k entities): {:?}", start.elapsed());

    // Benchmark spawning with 2 components
    let mut world: World<BenchRegistry> = World::new().unwrap();
    let start = Instant::now();
    for _ in 0..10_000 {
        world.create_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)));
    }
    println!("Spawn 10k entities (2 components): {:?}", start.elapsed());

    // Benchmark spawning with 3 components
    let mut world: World<BenchRegistry> = World::new().unwrap();
    let start = Instant::now();
    for _ in 0..10_000 {
        world.create_with((
            Position(1.0, 2.0, 3.0),
            Velocity(1.0, 0.0, 0.0),
            Health(100),
        ));
    }
    println!("Spawn 10k entities (3 components): {:?}", start.elapsed());

    // Benchmark mixed spawning
    let mut world: World<BenchRegistry> = World::new().unwrap();
    let start = Instant::now();
    for i in 0..10_000 {
        if i % 2 == 0 {
            world.create_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)));
        } else {
            world.create_with((
                Position(1.0, 2.0, 3.0),
                Velocity(1.0, 0.0, 0.0),
                Health(100),
            ));
        }
    }
    println!("Spawn 10k entities (mixed): {:?}", start.elapsed());
}
