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

//! Queries: iterate every entity across every archetype qualifying for a
//! type list, in archetype-insertion order.
//!
//! `Query` borrows archetypes immutably and its type list may only
//! contain [`Entity`], shared component references, and [`Exclude`]
//! markers. `QueryMut` borrows archetypes mutably and additionally
//! allows `&mut C` elements. The split is enforced by two distinct
//! fetch traits rather than a runtime check, so a stable query can never
//! hand out a mutable alias.

use crate::archetype::Archetype;
use crate::component::{Component, Exclude};
use crate::entity::Entity;
use crate::registry::Registry;

/// Produces one query result item from an archetype row. Implemented for
/// [`Entity`], `&C`, and [`Exclude`] (which contributes nothing — it only
/// participates in mask filtering, see [`crate::registry::Signature`]).
pub trait Fetch<'a, R: Registry> {
    type Item;

    /// # Safety
    /// `row < archetype.len()` and `archetype` must actually qualify for
    /// whatever mask this fetch's type contributes to (checked by the
    /// query's include/exclude filter before this is ever called).
    unsafe fn fetch(archetype: &'a Archetype<R>, row: usize) -> Self::Item;
}

impl<'a, R: Registry> Fetch<'a, R> for Entity {
    type Item = Entity;
    unsafe fn fetch(archetype: &'a Archetype<R>, row: usize) -> Entity {
        archetype.entity_at(row)
    }
}

impl<'a, R: Registry, C: Component> Fetch<'a, R> for &'a C {
    type Item = &'a C;
    unsafe fn fetch(archetype: &'a Archetype<R>, row: usize) -> &'a C {
        let idx = R::index_of::<C>().expect("fetched component must be registered");
        &*archetype.component_ptr(idx, row).cast::<C>()
    }
}

impl<'a, R: Registry, C: Component> Fetch<'a, R> for Exclude<C> {
    type Item = ();
    unsafe fn fetch(_archetype: &'a Archetype<R>, _row: usize) -> () {}
}

/// Like [`Fetch`], but also allows `&mut C` — used by [`QueryMut`], which
/// holds an exclusive borrow of the archetype list.
pub trait FetchMut<'a, R: Registry> {
    type Item;

    /// # Safety
    /// Same contract as [`Fetch::fetch`].
    unsafe fn fetch_mut(archetype: &'a Archetype<R>, row: usize) -> Self::Item;
}

impl<'a, R: Registry> FetchMut<'a, R> for Entity {
    type Item = Entity;
    unsafe fn fetch_mut(archetype: &'a Archetype<R>, row: usize) -> Entity {
        archetype.entity_at(row)
    }
}

impl<'a, R: Registry, C: Component> FetchMut<'a, R> for &'a C {
    type Item = &'a C;
    unsafe fn fetch_mut(archetype: &'a Archetype<R>, row: usize) -> &'a C {
        <&'a C as Fetch<'a, R>>::fetch(archetype, row)
    }
}

impl<'a, R: Registry, C: Component> FetchMut<'a, R> for &'a mut C {
    type Item = &'a mut C;
    unsafe fn fetch_mut(archetype: &'a Archetype<R>, row: usize) -> &'a mut C {
        let idx = R::index_of::<C>().expect("fetched component must be registered");
        &mut *archetype.component_ptr(idx, row).cast::<C>()
    }
}

impl<'a, R: Registry, C: Component> FetchMut<'a, R> for Exclude<C> {
    type Item = ();
    unsafe fn fetch_mut(_archetype: &'a Archetype<R>, _row: usize) -> () {}
}

macro_rules! impl_fetch_tuple {
    ($($T:ident),+) => {
        impl<'a, R: Registry, $($T: Fetch<'a, R>),+> Fetch<'a, R> for ($($T,)+) {
            type Item = ($($T::Item,)+);
            unsafe fn fetch(archetype: &'a Archetype<R>, row: usize) -> Self::Item {
                ($($T::fetch(archetype, row),)+)
            }
        }

        impl<'a, R: Registry, $($T: FetchMut<'a, R>),+> FetchMut<'a, R> for ($($T,)+) {
            type Item = ($($T::Item,)+);
            unsafe fn fetch_mut(archetype: &'a Archetype<R>, row: usize) -> Self::Item {
                ($($T::fetch_mut(archetype, row),)+)
            }
        }
    };
}

impl_fetch_tuple!(A);
impl_fetch_tuple!(A, B);
impl_fetch_tuple!(A, B, C);
impl_fetch_tuple!(A, B, C, D);
impl_fetch_tuple!(A, B, C, D, E);
impl_fetch_tuple!(A, B, C, D, E, F);
impl_fetch_tuple!(A, B, C, D, E, F, G);
impl_fetch_tuple!(A, B, C, D, E, F, G, H);

/// Position within the archetype list and the row inside the current
/// archetype; advances archetype-by-archetype, row-by-row.
struct Cursor {
    archetype_idx: usize,
    row: usize,
}

/// A read-only query over every archetype satisfying `T`'s filter.
pub struct Query<'a, R: Registry, T> {
    archetypes: &'a [Archetype<R>],
    include: u64,
    exclude: u64,
    cursor: Cursor,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, R: Registry, T> Query<'a, R, T> {
    pub(crate) fn new(archetypes: &'a [Archetype<R>], include: u64, exclude: u64) -> Self {
        Query {
            archetypes,
            include,
            exclude,
            cursor: Cursor { archetype_idx: 0, row: 0 },
            _marker: std::marker::PhantomData,
        }
    }

    /// Advance the cursor to the next archetype that qualifies for this
    /// query's filter, starting the row count over at 0. Re-checks the
    /// current archetype's length on every call rather than caching it,
    /// since `len()` can change between iterations.
    fn advance_to_match(&mut self) -> Option<&'a Archetype<R>> {
        loop {
            let archetype = self.archetypes.get(self.cursor.archetype_idx)?;
            if archetype.qualifies(self.include, self.exclude) && self.cursor.row < archetype.len() {
                return Some(archetype);
            }
            self.cursor.archetype_idx += 1;
            self.cursor.row = 0;
        }
    }
}

impl<'a, R: Registry, T: Fetch<'a, R>> Iterator for Query<'a, R, T> {
    type Item = T::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let archetype = self.advance_to_match()?;
        let row = self.cursor.row;
        self.cursor.row += 1;
        // SAFETY: archetype qualifies for T's mask and `row < len()`.
        Some(unsafe { T::fetch(archetype, row) })
    }
}

/// A mutating query over every archetype satisfying `T`'s filter.
///
/// Holds an exclusive borrow of the world's archetype list for its whole
/// lifetime, so structural changes (spawns, despawns, add/remove) cannot
/// interleave with iteration — the borrow checker rules out the hazard
/// the swap-remove re-read heuristic exists for in implementations
/// without it.
pub struct QueryMut<'a, R: Registry, T> {
    archetypes: &'a mut [Archetype<R>],
    include: u64,
    exclude: u64,
    cursor: Cursor,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, R: Registry, T> QueryMut<'a, R, T> {
    pub(crate) fn new(archetypes: &'a mut [Archetype<R>], include: u64, exclude: u64) -> Self {
        QueryMut {
            archetypes,
            include,
            exclude,
            cursor: Cursor { archetype_idx: 0, row: 0 },
            _marker: std::marker::PhantomData,
        }
    }
}

impl<'a, R: Registry, T: FetchMut<'a, R>> Iterator for QueryMut<'a, R, T> {
    type Item = T::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let archetype = self.archetypes.get(self.cursor.archetype_idx)?;
            if !archetype.qualifies(self.include, self.exclude) || self.cursor.row >= archetype.len() {
                self.cursor.archetype_idx += 1;
                self.cursor.row = 0;
                continue;
            }
            let row = self.cursor.row;
            self.cursor.row += 1;
            // SAFETY: archetype qualifies for T's mask and `row < len()`.
            // Reborrowing through the raw pointer below extends the
            // archetype reference to `'a`, matching the slice's own
            // lifetime rather than this call's local borrow.
            let archetype_ptr: *const Archetype<R> = archetype;
            return Some(unsafe { T::fetch_mut(&*archetype_ptr, row) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_registry;
    use crate::world::World;

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Position {
        x: f32,
        y: f32,
    }
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Velocity {
        x: f32,
    }

    define_registry!(Reg: Position, Velocity);

    #[test]
    fn stable_query_yields_every_matching_row() {
        let mut world: World<Reg> = World::new().unwrap();
        world.create_with((Position { x: 1.0, y: 0.0 },));
        world.create_with((Position { x: 2.0, y: 0.0 }, Velocity { x: 9.0 }));

        let xs: Vec<f32> = world.query::<&Position>().map(|p| p.x).collect();
        let mut sorted = xs.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted, vec![1.0, 2.0]);
    }

    #[test]
    fn mutable_query_writes_through() {
        let mut world: World<Reg> = World::new().unwrap();
        let e = world.create_with((Position { x: 0.0, y: 0.0 }, Velocity { x: 5.0 }));

        for (pos, vel) in world.query_mut::<(&mut Position, &Velocity)>() {
            pos.x += vel.x;
        }

        assert_eq!(world.get::<Position>(e).unwrap().x, 5.0);
    }

    #[test]
    fn exclude_filters_out_matching_archetype() {
        let mut world: World<Reg> = World::new().unwrap();
        world.create_with((Position::default(), Velocity::default()));
        world.create_with((Position::default(),));

        let count = world.query::<(&Position, Exclude<Velocity>)>().count();
        assert_eq!(count, 1);
    }
}
