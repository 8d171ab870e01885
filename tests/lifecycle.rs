use archetype_store::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct A(u32);
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct B(u32);
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct C(u32);

define_registry!(LifecycleRegistry: A, B, C);

#[test]
fn counts_partition_entities_by_signature() {
    let mut world: World<LifecycleRegistry> = World::new().unwrap();
    for _ in 0..3 {
        world.create_with((A::default(),));
    }
    for _ in 0..2 {
        world.create_with((A::default(), B::default()));
    }
    world.create_with((B::default(), C::default()));

    assert_eq!(world.count::<Entity>(), 6);
    assert_eq!(world.count::<&A>(), 5);
    assert_eq!(world.count::<&B>(), 3);
    assert_eq!(world.count::<(&A, Exclude<B>)>(), 3);
}

#[test]
fn swap_remove_preserves_every_other_entity() {
    let mut world: World<LifecycleRegistry> = World::new().unwrap();
    let entities: Vec<Entity> = (0..10).map(|i| world.create_with((A(i),))).collect();

    world.destroy(entities[3]).unwrap();

    let mut seen: Vec<Entity> = world.query::<Entity>().collect();
    seen.sort_by_key(|e| e.id());
    assert_eq!(seen.len(), 9);
    assert!(!seen.contains(&entities[3]));

    // the entity that was previously last (e9) was swapped into row 3 and
    // still carries its original value.
    assert_eq!(world.get::<A>(entities[9]).unwrap().0, 9);
}

#[test]
fn destroyed_handle_never_resolves_to_the_reused_slot() {
    let mut world: World<LifecycleRegistry> = World::new().unwrap();
    let e = world.create_with((A(1),));
    world.destroy(e).unwrap();
    let e2 = world.create_with((A(2),));

    assert!(world.get::<A>(e).is_err());
    assert_eq!(world.get::<A>(e2).unwrap().0, 2);
    assert_eq!(e.id(), e2.id());
    assert_ne!(e.version(), e2.version());
}

#[test]
fn add_component_migrates_without_disturbing_existing_values() {
    let mut world: World<LifecycleRegistry> = World::new().unwrap();
    let e = world.create_with((A(1), B(2)));

    world.add(e, C(3)).unwrap();

    assert_eq!(world.get::<A>(e).unwrap().0, 1);
    assert_eq!(world.get::<B>(e).unwrap().0, 2);
    assert_eq!(world.get::<C>(e).unwrap().0, 3);
}

#[test]
fn exclude_of_an_included_type_is_a_no_op() {
    let mut world: World<LifecycleRegistry> = World::new().unwrap();
    world.create_with((A(1),));
    world.create_with((A(2), B(1)));

    let with_include: Vec<Entity> = world.query::<(Entity, &A)>().map(|(e, _)| e).collect();
    let with_include_and_self_exclude: Vec<Entity> = world
        .query::<(Entity, &A, Exclude<A>)>()
        .map(|(e, _, _)| e)
        .collect();

    assert_eq!(with_include.len(), with_include_and_self_exclude.len());
    for e in &with_include {
        assert!(with_include_and_self_exclude.contains(e));
    }
}
