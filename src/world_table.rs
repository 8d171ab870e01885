// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide table of live world slots.
//!
//! Every [`crate::world::World`] registers itself here on construction and
//! releases its slot on drop. An [`crate::entity::Entity`] carries its
//! owning world's index directly (`entity.world()`), so cross-world
//! resolution never has to search: `WorldTable::is_live` is a direct
//! array lookup.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::component::Component;
use crate::entity::{Entity, MAX_WORLDS};
use crate::error::{EcsError, Result};
use crate::registry::Registry;
use crate::world::World;

/// Bookkeeping shared by every live world: which of the `MAX_WORLDS`
/// index slots are currently assigned.
pub struct WorldTable {
    /// `occupied[i]` is set while world index `i` is assigned to a live world.
    occupied: [AtomicBool; MAX_WORLDS],
    free_list: Mutex<SmallVec<[u8; 32]>>,
}

impl WorldTable {
    fn new() -> Self {
        // `MAX_WORLDS` is a crate constant (256), so a fixed-size array
        // literal of atomics is built explicitly rather than via `Default`
        // (which isn't implemented for arrays this way without `Copy`).
        let occupied = std::array::from_fn(|_| AtomicBool::new(false));
        let free_list = Mutex::new((0..MAX_WORLDS as u8).rev().collect());
        WorldTable { occupied, free_list }
    }

    /// The single process-wide table.
    pub fn global() -> &'static WorldTable {
        static TABLE: std::sync::OnceLock<WorldTable> = std::sync::OnceLock::new();
        TABLE.get_or_init(WorldTable::new)
    }

    /// Reserve the next free world index, marking it occupied.
    pub fn acquire(&self) -> Result<u8> {
        let mut free = self.free_list.lock();
        let idx = free.pop().ok_or(EcsError::WorldTableExhausted)?;
        self.occupied[idx as usize].store(true, Ordering::Release);
        Ok(idx)
    }

    /// Release a world index back to the free list.
    pub fn release(&self, idx: u8) {
        self.occupied[idx as usize].store(false, Ordering::Release);
        self.free_list.lock().push(idx);
    }

    /// Whether `idx` currently names a live, registered world.
    pub fn is_live(&self, idx: u8) -> bool {
        self.occupied[idx as usize].load(Ordering::Acquire)
    }
}

/// A caller-owned group of same-registry worlds, indexed by each member's
/// own [`World::world_index`], giving an entity handle a way to resolve
/// its component data without the caller first tracking down which world
/// created it.
///
/// A process-wide registry of raw world pointers would let this lookup
/// work with no container to pass around, but it would alias a `*const
/// World<R>` behind the owning value's back, which is unsound the moment
/// that value moves. `Worlds<R>` instead owns its member worlds directly,
/// so resolving an entity against the group is governed by ordinary move
/// and borrow rules instead of unsafe aliasing.
pub struct Worlds<R: Registry> {
    slots: Vec<Option<World<R>>>,
}

impl<R: Registry> Worlds<R> {
    pub fn new() -> Self {
        Worlds { slots: Vec::new() }
    }

    /// Construct a fresh world and register it under its own world index.
    pub fn create_world(&mut self) -> Result<u8> {
        let world = World::new()?;
        Ok(self.insert(world))
    }

    /// Register an already-constructed world under its own
    /// [`World::world_index`], replacing whatever (if anything) previously
    /// occupied that slot.
    pub fn insert(&mut self, world: World<R>) -> u8 {
        let idx = world.world_index();
        if self.slots.len() <= idx as usize {
            self.slots.resize_with(idx as usize + 1, || None);
        }
        self.slots[idx as usize] = Some(world);
        idx
    }

    /// The world registered at `world_index`, if any.
    pub fn get(&self, world_index: u8) -> Option<&World<R>> {
        self.slots.get(world_index as usize)?.as_ref()
    }

    /// Mutably borrow the world registered at `world_index`, if any.
    pub fn get_mut(&mut self, world_index: u8) -> Option<&mut World<R>> {
        self.slots.get_mut(world_index as usize)?.as_mut()
    }

    /// Drop and return the world registered at `world_index`, if any. Its
    /// slot becomes a miss for subsequent any-world lookups.
    pub fn remove(&mut self, world_index: u8) -> Option<World<R>> {
        self.slots.get_mut(world_index as usize)?.take()
    }

    /// Resolve `entity`'s component `C` by dispatching on the world index
    /// packed into the handle itself, without the caller naming a world.
    pub fn get_component_any_world<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.get(entity.world())?.get::<C>(entity).ok()
    }
}

impl<R: Registry> Default for Worlds<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release_round_trip() {
        let table = WorldTable::new();
        let a = table.acquire().unwrap();
        assert!(table.is_live(a));
        table.release(a);
        assert!(!table.is_live(a));
    }

    #[test]
    fn exhaustion_is_reported() {
        let table = WorldTable::new();
        let mut acquired = Vec::new();
        for _ in 0..MAX_WORLDS {
            acquired.push(table.acquire().unwrap());
        }
        assert!(matches!(table.acquire(), Err(EcsError::WorldTableExhausted)));
        table.release(acquired.pop().unwrap());
        assert!(table.acquire().is_ok());
    }

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Position {
        x: f32,
    }

    crate::define_registry!(WorldsTestRegistry: Position);

    #[test]
    fn any_world_lookup_resolves_across_member_worlds() {
        let mut worlds: Worlds<WorldsTestRegistry> = Worlds::new();
        let w1 = worlds.create_world().unwrap();
        let w2 = worlds.create_world().unwrap();

        let e = worlds
            .get_mut(w1)
            .unwrap()
            .create_with((Position { x: 1.0 },));

        assert_eq!(
            worlds.get(w1).unwrap().get::<Position>(e).unwrap().x,
            1.0
        );
        assert!(worlds.get(w2).unwrap().get::<Position>(e).is_err());
        assert_eq!(
            worlds.get_component_any_world::<Position>(e).unwrap().x,
            1.0
        );

        worlds.remove(w1);
        assert!(worlds.get_component_any_world::<Position>(e).is_none());
    }
}
