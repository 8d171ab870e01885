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

//! Compile-time component catalogue.
//!
//! A [`Registry`] fixes, once and for all, the ordered list of component
//! types an application's worlds can hold. Each component is assigned a
//! stable index in `[0, N)` and a bit `1 << index` in a `u64` signature
//! mask; `N` is therefore capped at 64.

use std::any::TypeId;

use crate::component::{Component, Exclude};
use crate::entity::Entity;

/// Maximum number of components a single registry may hold (bits in a `u64` mask).
pub const MAX_COMPONENTS: usize = 64;

/// A fixed, ordered catalogue of component types.
///
/// Implemented by the zero-sized type produced by [`define_registry!`].
/// Never implement this by hand; the macro is what keeps `index_of`
/// consistent with `component_layout`.
pub trait Registry: 'static {
    /// Number of registered component types.
    const LEN: usize;

    /// Position of `C` in the registry's component list, if registered.
    fn index_of<C: Component>() -> Option<u8>;

    /// Byte size and alignment of the component at `index`.
    fn layout_of(index: u8) -> (usize, usize);

    /// Drop glue for the component at `index`, for the archetype builder.
    fn drop_fn_of(index: u8) -> Option<unsafe fn(*mut u8)>;

    /// `true` if `C` is a component type known to this registry.
    fn contains<C: Component>() -> bool {
        Self::index_of::<C>().is_some()
    }
}

/// `1 << idx(C)` for a real, registered component; `0` for the `Entity`
/// query parameter (it contributes nothing to a signature mask).
#[inline]
pub fn bit_of<R: Registry, C: Component>() -> u64 {
    match R::index_of::<C>() {
        Some(idx) => 1u64 << idx,
        None => 0,
    }
}

/// A type-level list of query arguments used to compute include/exclude
/// masks. Implemented for [`Entity`], shared/mutable component references,
/// [`Exclude`] wrappers, and tuples of these up to 8 elements.
///
/// Note this is deliberately **not** a blanket impl over `C: Component`:
/// `&C` and `C` would then both independently satisfy `C: Component` (any
/// `'static + Send + Sync` reference is itself a component by the blanket
/// in [`crate::component`]), and the two impls would overlap for the
/// compiler. Binding `Signature` directly to the reference shapes that
/// actually appear in a query's type list sidesteps that coherence
/// conflict entirely.
pub trait Signature<R: Registry> {
    /// Bits contributed to the *include* mask.
    fn include_mask() -> u64;
    /// Bits contributed to the *exclude* mask (before the include-wins policy is applied).
    fn exclude_mask() -> u64;
}

/// The `entity` query parameter: contributes nothing to either mask.
impl<R: Registry> Signature<R> for Entity {
    fn include_mask() -> u64 {
        0
    }
    fn exclude_mask() -> u64 {
        0
    }
}

impl<'a, R: Registry, C: Component> Signature<R> for &'a C {
    fn include_mask() -> u64 {
        bit_of::<R, C>()
    }
    fn exclude_mask() -> u64 {
        0
    }
}

impl<'a, R: Registry, C: Component> Signature<R> for &'a mut C {
    fn include_mask() -> u64 {
        bit_of::<R, C>()
    }
    fn exclude_mask() -> u64 {
        0
    }
}

impl<R: Registry, C: Component> Signature<R> for Exclude<C> {
    fn include_mask() -> u64 {
        0
    }
    fn exclude_mask() -> u64 {
        bit_of::<R, C>()
    }
}

/// `mask_of<Ts...>()`: bitwise OR of `bit_of` over every component in the list.
pub fn mask_of<R: Registry, T: Signature<R>>() -> u64 {
    T::include_mask()
}

/// Resolve an include mask `I` and an exclude mask `E` from a query's type
/// list, applying the "include wins" policy: any bit set in both `I` and
/// the raw exclude contribution is cleared from the final exclude mask.
pub fn resolve_filter<R: Registry, T: Signature<R>>() -> (u64, u64) {
    let include = T::include_mask();
    let exclude = T::exclude_mask() & !include;
    (include, exclude)
}

/// `qualifies(archetype_mask, include, exclude)`: does an archetype with
/// the given signature satisfy this include/exclude pair?
#[inline]
pub fn qualifies(archetype_mask: u64, include: u64, exclude: u64) -> bool {
    (archetype_mask & include) == include && (archetype_mask & exclude) == 0
}

macro_rules! impl_signature_tuple {
    ($($T:ident),+) => {
        impl<R: Registry, $($T: Signature<R>),+> Signature<R> for ($($T,)+) {
            fn include_mask() -> u64 {
                0 $(| $T::include_mask())+
            }
            fn exclude_mask() -> u64 {
                0 $(| $T::exclude_mask())+
            }
        }
    };
}

impl_signature_tuple!(A);
impl_signature_tuple!(A, B);
impl_signature_tuple!(A, B, C);
impl_signature_tuple!(A, B, C, D);
impl_signature_tuple!(A, B, C, D, E);
impl_signature_tuple!(A, B, C, D, E, F);
impl_signature_tuple!(A, B, C, D, E, F, G);
impl_signature_tuple!(A, B, C, D, E, F, G, H);

/// Per-component size/alignment/`TypeId` table, built once by
/// `define_registry!` and consulted by the archetype builder when it lays
/// out a bucket for a runtime-computed mask.
#[doc(hidden)]
pub struct ComponentLayout {
    pub type_id: TypeId,
    pub size: usize,
    pub align: usize,
    pub drop_fn: Option<unsafe fn(*mut u8)>,
}

impl ComponentLayout {
    pub const fn of<T: Component>() -> Self {
        ComponentLayout {
            type_id: TypeId::of::<T>(),
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
            // `needs_drop` is not const-evaluable through a trait bound here;
            // `define_registry!` installs the real function pointer at
            // first use via `OnceLock` (see the macro body).
            drop_fn: None,
        }
    }
}

/// Declares a concrete [`Registry`] type over an ordered list of component
/// types.
///
/// ```ignore
/// struct Position(f32, f32);
/// struct Velocity(f32, f32);
/// struct Health(u32);
///
/// define_registry!(GameRegistry: Position, Velocity, Health);
/// ```
///
/// Generates a zero-sized marker type (`GameRegistry` above) implementing
/// [`Registry`]. Index lookups are resolved against a `TypeId` table built
/// once, lazily, behind a `OnceLock` — the registry's component *list* is
/// fixed at compile time (by the macro invocation), but the `TypeId -> u8`
/// lookup itself is cached rather than truly `const`, since stable Rust has
/// no const-evaluable `TypeId` ordering. This is an explicit, documented
/// trade-off (see DESIGN.md); it does not change the contract: the list is
/// still closed and `N <= 64` is still enforced once, at first use.
#[macro_export]
macro_rules! define_registry {
    ($name:ident : $($c:ty),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $name {
            fn table() -> &'static [(std::any::TypeId, usize, usize, Option<unsafe fn(*mut u8)>)] {
                static TABLE: std::sync::OnceLock<Vec<(std::any::TypeId, usize, usize, Option<unsafe fn(*mut u8)>)>> =
                    std::sync::OnceLock::new();
                TABLE.get_or_init(|| {
                    fn drop_fn_of<T: 'static>() -> Option<unsafe fn(*mut u8)> {
                        if std::mem::needs_drop::<T>() {
                            Some(|ptr: *mut u8| unsafe { std::ptr::drop_in_place(ptr as *mut T) })
                        } else {
                            None
                        }
                    }
                    let v = vec![
                        $(
                            (
                                std::any::TypeId::of::<$c>(),
                                std::mem::size_of::<$c>(),
                                std::mem::align_of::<$c>(),
                                drop_fn_of::<$c>(),
                            )
                        ),+
                    ];
                    assert!(
                        v.len() <= $crate::registry::MAX_COMPONENTS,
                        "registry {} exceeds the 64-component limit",
                        stringify!($name)
                    );
                    v
                })
            }
        }

        impl $crate::registry::Registry for $name {
            const LEN: usize = { let mut n = 0usize; $( let _ = stringify!($c); n += 1; )+ n };

            fn index_of<C: $crate::component::Component>() -> Option<u8> {
                let tid = std::any::TypeId::of::<C>();
                Self::table().iter().position(|(t, ..)| *t == tid).map(|i| i as u8)
            }

            fn layout_of(index: u8) -> (usize, usize) {
                let (_, size, align, _) = Self::table()[index as usize];
                (size, align)
            }

            fn drop_fn_of(index: u8) -> Option<unsafe fn(*mut u8)> {
                Self::table()[index as usize].3
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::component::Exclude;

    struct A;
    struct B;
    struct C;

    define_registry!(TestRegistry: A, B, C);

    #[test]
    fn indices_are_stable_and_ordered() {
        use super::Registry;
        assert_eq!(TestRegistry::index_of::<A>(), Some(0));
        assert_eq!(TestRegistry::index_of::<B>(), Some(1));
        assert_eq!(TestRegistry::index_of::<C>(), Some(2));
        assert_eq!(TestRegistry::LEN, 3);
    }

    #[test]
    fn unregistered_type_has_no_index() {
        use super::Registry;
        struct NotRegistered;
        assert_eq!(TestRegistry::index_of::<NotRegistered>(), None);
    }

    #[test]
    fn bit_mask_of_combines_components() {
        use super::{bit_of, mask_of};
        let mask = mask_of::<TestRegistry, (&A, &B)>();
        assert_eq!(mask, bit_of::<TestRegistry, A>() | bit_of::<TestRegistry, B>());
    }

    #[test]
    fn exclude_wins_for_include() {
        use super::{qualifies, resolve_filter};
        // <A, Exclude<A>> is equivalent to <A>: include wins.
        let (include, exclude) = resolve_filter::<TestRegistry, (&A, Exclude<A>)>();
        let a_bit = super::bit_of::<TestRegistry, A>();
        assert_eq!(include, a_bit);
        assert_eq!(exclude, 0);
        assert!(qualifies(a_bit, include, exclude));
    }
}
