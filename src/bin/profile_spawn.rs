#![allow(dead_code, unused_imports)]

use archetype_store::{define_registry, World};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Health(u32);

define_registry!(ProfileRegistry: Position, Velocity, Health);

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(world))]
fn profile_spawns(world: &mut World<ProfileRegistry>, count: usize) {
    let _span = tracing::info_span!("spawn_loop", count = count).entered();
    for i in 0..count {
        if i % 1_000 == 0 {
            tracing::info!("spawning entity {}/{}", i, count);
        }
        world.create_with((
            Position(1.0, 2.0, 3.0),
            Velocity(1.0, 0.0, 0.0),
            Health(100),
        ));
    }
}

#[cfg(feature = "profiling")]
fn main() {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut world: World<ProfileRegistry> = World::new().unwrap();

    println!("Warming up...");
    {
        let _span = tracing::info_span!("warmup").entered();
        for _ in 0..1000 {
            world.create_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)));
        }
    }

    println!("Profiling spawn with 3 components...");
    let start = Instant::now();
    profile_spawns(&mut world, 10_000);
    println!("Spawn 10k entities complete in: {:?}", start.elapsed());
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_spawn binary requires --features profiling");
}
