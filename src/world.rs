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

//! World: owns every archetype for one registry, the entity indirection
//! table, and the free list of reusable entity ids.

use ahash::AHashMap;

#[cfg(feature = "profiling")]
use tracing::trace;

use crate::archetype::Archetype;
use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::component::{Bundle, Component, DefaultBundle};
use crate::entity::{Entity, EntityLocation, VERSION_MASK};
use crate::error::{EcsError, Result};
use crate::query::{Query, QueryMut};
use crate::registry::{bit_of, qualifies, resolve_filter, Registry, Signature};
use crate::world_table::WorldTable;

struct Slot {
    /// Always kept within `VERSION_MASK`, matching the width `Entity::new`
    /// truncates to — see the wraparound in `World::destroy`.
    version: u32,
    location: EntityLocation,
}

/// Owns every archetype, indexed by signature mask, for component
/// catalogue `R`. Registers itself with the process-wide [`WorldTable`]
/// on construction and releases its slot on drop, so entity handles
/// stay meaningful across worlds.
pub struct World<R: Registry> {
    world_index: u8,
    bucket_size: usize,
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    archetypes: Vec<Archetype<R>>,
    archetype_of_mask: AHashMap<u64, usize>,
}

impl<R: Registry> World<R> {
    /// Create a world with the default bucket size.
    pub fn new() -> Result<Self> {
        Self::with_bucket_size(DEFAULT_BUCKET_SIZE)
    }

    /// Create a world whose archetypes allocate `bucket_size` rows per bucket.
    pub fn with_bucket_size(bucket_size: usize) -> Result<Self> {
        let world_index = WorldTable::global().acquire()?;
        let mut world = World {
            world_index,
            bucket_size,
            slots: Vec::new(),
            free_list: Vec::new(),
            archetypes: Vec::new(),
            archetype_of_mask: AHashMap::new(),
        };
        // Archetype 0 is always the empty signature, so a freshly spawned
        // tag entity never needs a special case.
        world.archetype_for_mask(0);
        Ok(world)
    }

    #[inline]
    pub fn world_index(&self) -> u8 {
        self.world_index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn archetype_for_mask(&mut self, mask: u64) -> usize {
        if let Some(&idx) = self.archetype_of_mask.get(&mask) {
            return idx;
        }
        let archetype = Archetype::new(mask, self.bucket_size, R::drop_fn_of);
        let idx = self.archetypes.len();
        self.archetypes.push(archetype);
        self.archetype_of_mask.insert(mask, idx);
        #[cfg(feature = "profiling")]
        trace!(mask, idx, "created archetype");
        idx
    }

    /// Borrow two distinct archetypes mutably at once.
    fn two_mut(&mut self, a: usize, b: usize) -> (&mut Archetype<R>, &mut Archetype<R>) {
        assert_ne!(a, b, "cannot borrow the same archetype twice");
        if a < b {
            let (left, right) = self.archetypes.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.archetypes.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    fn allocate_slot(&mut self) -> (u32, u32) {
        if let Some(id) = self.free_list.pop() {
            let slot = &self.slots[id as usize];
            (id, slot.version)
        } else {
            let id = self.slots.len() as u32;
            self.slots.push(Slot {
                version: 0,
                location: EntityLocation::NONE,
            });
            #[cfg(feature = "profiling")]
            trace!(world = self.world_index, len = self.slots.len(), "grew entity table");
            (id, 0)
        }
    }

    /// Spawn a new entity with every component default-constructed.
    pub fn create<B: DefaultBundle>(&mut self) -> Entity {
        self.create_with(B::default_bundle())
    }

    /// Spawn a new entity holding the given bundle's values.
    pub fn create_with<B: Bundle>(&mut self, bundle: B) -> Entity {
        let mask = B::mask::<R>();
        let arch_idx = self.archetype_for_mask(mask);
        let (id, version) = self.allocate_slot();
        let entity = Entity::new(id, version, self.world_index);

        let archetype = &mut self.archetypes[arch_idx];
        let row = archetype.allocate_row(entity);
        unsafe {
            bundle.write_into::<R>(archetype, row);
        }

        self.slots[id as usize].location = EntityLocation {
            archetype_id: arch_idx as u32,
            row: row as u32,
        };
        entity
    }

    fn resolve(&self, entity: Entity) -> Result<EntityLocation> {
        if entity.world() != self.world_index {
            return Err(EcsError::WorldNotFound);
        }
        let slot = self
            .slots
            .get(entity.id() as usize)
            .ok_or(EcsError::EntityNotFound)?;
        if slot.version != entity.version() || slot.location.archetype_id == u32::MAX {
            return Err(EcsError::EntityNotFound);
        }
        Ok(slot.location)
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.resolve(entity).is_ok()
    }

    /// Destroy an entity, dropping every component it still carries.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        let location = self.resolve(entity)?;
        let archetype = &mut self.archetypes[location.archetype_id as usize];
        let replaced = unsafe { archetype.erase(location.row as usize) };
        if let Some(moved) = replaced {
            self.slots[moved.id() as usize].location.row = location.row;
        }

        let id = entity.id();
        self.slots[id as usize].version = (self.slots[id as usize].version + 1) & VERSION_MASK;
        self.slots[id as usize].location = EntityLocation::NONE;
        self.free_list.push(id);
        Ok(())
    }

    /// Borrow component `C` on `entity`.
    pub fn get<C: Component>(&self, entity: Entity) -> Result<&C> {
        let location = self.resolve(entity)?;
        let archetype = &self.archetypes[location.archetype_id as usize];
        let idx = R::index_of::<C>().ok_or(EcsError::ComponentNotFound)?;
        let ptr = archetype
            .try_component_ptr(idx, location.row as usize)
            .ok_or(EcsError::ComponentNotFound)?;
        Ok(unsafe { &*ptr.cast::<C>() })
    }

    /// Mutably borrow component `C` on `entity`.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Result<&mut C> {
        let location = self.resolve(entity)?;
        let archetype = &self.archetypes[location.archetype_id as usize];
        let idx = R::index_of::<C>().ok_or(EcsError::ComponentNotFound)?;
        let ptr = archetype
            .try_component_ptr(idx, location.row as usize)
            .ok_or(EcsError::ComponentNotFound)?;
        Ok(unsafe { &mut *ptr.cast::<C>() })
    }

    /// Whether `entity` carries component `C`.
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        match self.resolve(entity) {
            Ok(location) => {
                let archetype = &self.archetypes[location.archetype_id as usize];
                match R::index_of::<C>() {
                    Some(idx) => archetype.has_component(idx),
                    None => false,
                }
            }
            Err(_) => false,
        }
    }

    /// Attach component `C` to `entity`, migrating it to the archetype for
    /// its new signature.
    ///
    /// # Errors
    /// [`EcsError::ComponentAlreadyPresent`] if `entity` already carries `C`.
    pub fn add<C: Component>(&mut self, entity: Entity, value: C) -> Result<()> {
        let location = self.resolve(entity)?;
        let old_idx = location.archetype_id as usize;
        let bit = bit_of::<R, C>();
        let old_mask = self.archetypes[old_idx].mask();
        if old_mask & bit != 0 {
            return Err(EcsError::ComponentAlreadyPresent);
        }
        let new_mask = old_mask | bit;
        let new_idx = self.archetype_for_mask(new_mask);
        #[cfg(feature = "profiling")]
        trace!(entity = ?entity, old_mask, new_mask, "migrating entity for add_component");

        let (old_arch, new_arch) = self.two_mut(old_idx, new_idx);
        let (new_row, replaced) =
            unsafe { old_arch.move_row_to(location.row as usize, new_arch) };
        if let Some(moved) = replaced {
            self.slots[moved.id() as usize].location.row = location.row;
        }

        let comp_idx = R::index_of::<C>().expect("component registered: bit was computed from it");
        unsafe {
            new_arch
                .component_ptr(comp_idx, new_row)
                .cast::<C>()
                .write(value);
        }

        self.slots[entity.id() as usize].location = EntityLocation {
            archetype_id: new_idx as u32,
            row: new_row as u32,
        };
        Ok(())
    }

    /// Detach component `C` from `entity`, returning its value and
    /// migrating the entity to the archetype for its reduced signature.
    ///
    /// # Errors
    /// [`EcsError::ComponentNotFound`] if `entity` doesn't carry `C`.
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Result<C> {
        let location = self.resolve(entity)?;
        let old_idx = location.archetype_id as usize;
        let bit = bit_of::<R, C>();
        let old_mask = self.archetypes[old_idx].mask();
        if old_mask & bit == 0 {
            return Err(EcsError::ComponentNotFound);
        }
        let new_mask = old_mask & !bit;
        let new_idx = self.archetype_for_mask(new_mask);

        let comp_idx = R::index_of::<C>().expect("component registered: bit was computed from it");
        let value = unsafe {
            let ptr = self.archetypes[old_idx]
                .component_ptr(comp_idx, location.row as usize)
                .cast::<C>();
            ptr.read()
        };

        let (old_arch, new_arch) = self.two_mut(old_idx, new_idx);
        let (new_row, replaced) = unsafe {
            old_arch.move_row_to_excluding(location.row as usize, new_arch, bit)
        };
        if let Some(moved) = replaced {
            self.slots[moved.id() as usize].location.row = location.row;
        }

        self.slots[entity.id() as usize].location = EntityLocation {
            archetype_id: new_idx as u32,
            row: new_row as u32,
        };
        Ok(value)
    }

    /// Run a stable (read-only) query over every archetype qualifying for `T`.
    pub fn query<T: Signature<R>>(&self) -> Query<'_, R, T> {
        let (include, exclude) = resolve_filter::<R, T>();
        Query::new(&self.archetypes, include, exclude)
    }

    /// Run a mutable query over every archetype qualifying for `T`.
    pub fn query_mut<T: Signature<R>>(&mut self) -> QueryMut<'_, R, T> {
        let (include, exclude) = resolve_filter::<R, T>();
        QueryMut::new(&mut self.archetypes, include, exclude)
    }

    /// Count entities qualifying for `T` without visiting each one.
    pub fn count<T: Signature<R>>(&self) -> usize {
        let (include, exclude) = resolve_filter::<R, T>();
        self.archetypes
            .iter()
            .filter(|a| qualifies(a.mask(), include, exclude))
            .map(|a| a.len())
            .sum()
    }
}

impl<R: Registry> Default for World<R> {
    fn default() -> Self {
        Self::new().expect("world table exhausted while constructing a default world")
    }
}

impl<R: Registry> Drop for World<R> {
    fn drop(&mut self) {
        WorldTable::global().release(self.world_index);
    }
}
