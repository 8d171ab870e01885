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

//! Component trait, the `Exclude` query filter marker, and `Bundle`.
//!
//! Components are plain value types attached to entities; they carry no
//! identity of their own. Bundles (tuples of components) are what
//! `World::create_with` accepts when spawning an entity with initial
//! values.

use std::marker::PhantomData;

use crate::archetype::Archetype;
use crate::registry::Registry;

/// Marker trait for component value types.
///
/// Components must be 'static (no borrowed data).
pub trait Component: 'static + Send + Sync {}

/// Automatically implement `Component` for all valid types.
impl<T: 'static + Send + Sync> Component for T {}

/// Wrapper marking a component as a *negative* filter in a query: the
/// query matches only archetypes that do **not** carry `C`, unless `C` is
/// also requested as an include elsewhere in the same query (include
/// wins — see [`crate::registry::resolve_filter`]).
pub struct Exclude<C: Component>(PhantomData<C>);

// DO NOT implement Bundle for T: Component.
// This conflicts with the tuple implementations below.

/// Bundle of components.
///
/// Allows spawning an entity with multiple initial component values at
/// once. Only tuples of registered component types implement this.
pub trait Bundle: Send + Sync + 'static {
    /// The signature mask this bundle maps to under registry `R`.
    fn mask<R: Registry>() -> u64
    where
        Self: Sized;

    /// Move-construct every component of the bundle into the archetype's
    /// column for `row`.
    ///
    /// # Safety
    /// `row` must be a row just allocated (and not yet holding live
    /// component values) in an archetype whose mask is exactly
    /// `Self::mask::<R>()`.
    unsafe fn write_into<R: Registry>(self, archetype: &Archetype<R>, row: usize)
    where
        Self: Sized;
}

// Macro for tuple Bundle implementations
macro_rules! impl_bundle {
    ($($T:ident),*) => {
        impl<$($T: Component),*> Bundle for ($($T,)*) {
            fn mask<R: Registry>() -> u64 {
                0 $(| crate::registry::bit_of::<R, $T>())*
            }

            #[allow(non_snake_case)]
            unsafe fn write_into<R: Registry>(self, archetype: &Archetype<R>, row: usize) {
                let ($($T,)*) = self;
                $(
                    let idx = R::index_of::<$T>().expect("bundle component missing from registry");
                    archetype.component_ptr(idx, row).cast::<$T>().write($T);
                )*
                let _ = row;
            }
        }
    };
}

// Implement for tuples of 0-8 components. The empty tuple spawns an
// entity with no components (the world's permanently bootstrapped
// archetype 0).
impl_bundle!();
impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

/// Bundle whose components are all `Default`, enabling `World::create::<B>()`
/// (which default-constructs) alongside `World::create_with` (which takes
/// explicit values). Rust has no implicit default-constructibility, so
/// spawning-with-defaults is expressed here as a trait bound rather than
/// an overload.
pub trait DefaultBundle: Bundle {
    fn default_bundle() -> Self;
}

macro_rules! impl_default_bundle {
    ($($T:ident),*) => {
        impl<$($T: Component + Default),*> DefaultBundle for ($($T,)*) {
            #[allow(clippy::unused_unit)]
            fn default_bundle() -> Self {
                ($($T::default(),)*)
            }
        }
    };
}

impl_default_bundle!();
impl_default_bundle!(A);
impl_default_bundle!(A, B);
impl_default_bundle!(A, B, C);
impl_default_bundle!(A, B, C, D);
impl_default_bundle!(A, B, C, D, E);
impl_default_bundle!(A, B, C, D, E, F);
impl_default_bundle!(A, B, C, D, E, F, G);
impl_default_bundle!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    #![allow(dead_code)]
    use super::*;
    use crate::define_registry;

    #[derive(Debug, Clone, Copy, Default)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Copy, Default)]
    struct Velocity {
        x: f32,
    }

    define_registry!(Reg: Position, Velocity);

    #[test]
    fn test_bundle_mask_matches_bit_of() {
        use crate::registry::bit_of;
        let mask = <(Position, Velocity)>::mask::<Reg>();
        assert_eq!(mask, bit_of::<Reg, Position>() | bit_of::<Reg, Velocity>());
    }

    #[test]
    fn test_default_bundle() {
        let (p, v) = <(Position, Velocity)>::default_bundle();
        assert_eq!(p.x, 0.0);
        assert_eq!(v.x, 0.0);
    }
}
