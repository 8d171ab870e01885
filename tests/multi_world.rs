use archetype_store::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Position {
    x: f32,
}

define_registry!(MultiWorldRegistry: Position);

#[test]
fn any_world_lookup_finds_the_owning_world_and_misses_elsewhere() {
    let mut worlds: Worlds<MultiWorldRegistry> = Worlds::new();
    let w1 = worlds.create_world().unwrap();
    let w2 = worlds.create_world().unwrap();

    let e = worlds
        .get_mut(w1)
        .unwrap()
        .create_with((Position { x: 1.0 },));

    assert!(worlds.get(w1).unwrap().get::<Position>(e).is_ok());
    assert!(worlds.get(w2).unwrap().get::<Position>(e).is_err());
    assert_eq!(worlds.get_component_any_world::<Position>(e).unwrap().x, 1.0);

    worlds.remove(w1);
    assert!(worlds.get_component_any_world::<Position>(e).is_none());
}

#[test]
fn entity_handle_from_one_world_is_never_alive_in_another() {
    let mut w1: World<MultiWorldRegistry> = World::new().unwrap();
    let mut w2: World<MultiWorldRegistry> = World::new().unwrap();

    let e = w1.create_with((Position { x: 5.0 },));

    assert!(w1.is_alive(e));
    assert!(!w2.is_alive(e));
    assert!(w2.create_with((Position::default(),)).world() != e.world());
}
