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

//! Archetype storage: the set of entities sharing one component
//! signature, packed densely across a list of [`Bucket`]s.
//!
//! Rows are numbered `0..n` and are always packed: on removal the last
//! row is swapped into the hole. Both the static query fast path and
//! the runtime add/remove-component path drive the same concrete
//! `Archetype` — there is no separate type-erased twin.

use std::marker::PhantomData;

use crate::bucket::Bucket;
use crate::entity::Entity;
use crate::registry::{qualifies, Registry, MAX_COMPONENTS};

/// Sentinel offset meaning "this component is absent from the archetype".
const ABSENT: u16 = u16::MAX;

/// One archetype: a signature mask, its per-component column offsets, and
/// the dense list of buckets backing its rows.
pub struct Archetype<R: Registry> {
    mask: u64,
    bucket_size: usize,
    /// `offsets[i]` is `byte_offset(component i) / bucket_size`, or
    /// [`ABSENT`] if component `i` isn't part of this archetype's mask.
    offsets: [u16; MAX_COMPONENTS],
    item_sizes: [usize; MAX_COMPONENTS],
    drop_fns: [Option<unsafe fn(*mut u8)>; MAX_COMPONENTS],
    bucket_bytes: usize,
    bucket_align: usize,
    buckets: Vec<Box<Bucket>>,
    n: usize,
    _registry: PhantomData<R>,
}

impl<R: Registry> Archetype<R> {
    /// Build the archetype for `mask`, computing the bucket byte layout
    /// from the registry's per-component size/alignment table.
    ///
    /// # Panics
    /// If a component's offset, measured in bucket-size units, would not
    /// fit in 16 bits. This is a fatal configuration mistake (too many
    /// wide components sharing a mask) rather than a recoverable error.
    pub fn new(mask: u64, bucket_size: usize, drop_fn_lookup: impl Fn(u8) -> Option<unsafe fn(*mut u8)>) -> Self {
        let mut offsets = [ABSENT; MAX_COMPONENTS];
        let mut item_sizes = [0usize; MAX_COMPONENTS];
        let mut drop_fns: [Option<unsafe fn(*mut u8)>; MAX_COMPONENTS] = [None; MAX_COMPONENTS];

        // Entity column is placed first.
        let mut cursor = std::mem::size_of::<Entity>() * bucket_size;
        let mut align = std::mem::align_of::<Entity>();

        for idx in 0..MAX_COMPONENTS as u8 {
            if mask & (1u64 << idx) == 0 {
                continue;
            }
            let (size, comp_align) = R::layout_of(idx);
            align = align.max(comp_align);

            let offset_units = cursor / bucket_size;
            assert!(
                offset_units <= ABSENT as usize - 1,
                "component offset overflow: archetype mask {mask:#x} component {idx} no longer fits a u16 bucket-unit offset"
            );
            offsets[idx as usize] = offset_units as u16;
            item_sizes[idx as usize] = size;
            drop_fns[idx as usize] = drop_fn_lookup(idx);

            // `size` is always a multiple of `comp_align` in Rust, so
            // `size * bucket_size` is always a multiple of `comp_align`:
            // no manual padding is ever required between columns.
            cursor += size * bucket_size;
        }

        // Bucket capacity itself is used as the allocation alignment when
        // it's a convenient power of two (the common, SIMD-friendly case);
        // otherwise alignment falls back to the widest component.
        if bucket_size.is_power_of_two() {
            align = align.max(bucket_size);
        }
        let bucket_bytes = align_up(cursor, align);

        Archetype {
            mask,
            bucket_size,
            offsets,
            item_sizes,
            drop_fns,
            bucket_bytes,
            bucket_align: align,
            buckets: Vec::new(),
            n: 0,
            _registry: PhantomData,
        }
    }

    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    #[inline]
    pub fn has_component(&self, idx: u8) -> bool {
        self.offsets[idx as usize] != ABSENT
    }

    /// `qualifies(self.mask, include, exclude)`.
    #[inline]
    pub fn qualifies(&self, include: u64, exclude: u64) -> bool {
        qualifies(self.mask, include, exclude)
    }

    #[inline]
    fn bucket_of(&self, row: usize) -> (usize, usize) {
        (row / self.bucket_size, row % self.bucket_size)
    }

    /// Pointer to component `idx`'s slot at `row`. Caller guarantees
    /// `idx` is present in this archetype's mask.
    #[inline]
    pub fn component_ptr(&self, idx: u8, row: usize) -> *mut u8 {
        debug_assert!(self.has_component(idx));
        let (bucket_idx, slot) = self.bucket_of(row);
        let offset = self.offsets[idx as usize] as usize * self.bucket_size;
        let size = self.item_sizes[idx as usize];
        unsafe { self.buckets[bucket_idx].column_ptr(offset, size, slot) }
    }

    /// Returns `None` if component `idx` is absent from this archetype.
    #[inline]
    pub fn try_component_ptr(&self, idx: u8, row: usize) -> Option<*mut u8> {
        if self.has_component(idx) {
            Some(self.component_ptr(idx, row))
        } else {
            None
        }
    }

    #[inline]
    pub fn entity_at(&self, row: usize) -> Entity {
        let (bucket_idx, slot) = self.bucket_of(row);
        unsafe { self.buckets[bucket_idx].entity_at(slot) }
    }

    fn set_entity_at(&self, row: usize, entity: Entity) {
        let (bucket_idx, slot) = self.bucket_of(row);
        unsafe { self.buckets[bucket_idx].set_entity_at(slot, entity) }
    }

    fn ensure_bucket_capacity(&mut self, rows: usize) {
        let needed = rows.div_ceil(self.bucket_size).max(1);
        while self.buckets.len() < needed {
            self.buckets
                .push(Box::new(Bucket::new(self.bucket_bytes, self.bucket_align)));
        }
    }

    /// `emplace(e) -> row`: reserve a new row and record the owning
    /// entity. Component slots are left uninitialized; the caller (via a
    /// [`crate::component::Bundle`] or explicit writes) must fill every
    /// present column before the row becomes observable to queries.
    pub fn allocate_row(&mut self, entity: Entity) -> usize {
        let row = self.n;
        self.ensure_bucket_capacity(row + 1);
        self.set_entity_at(row, entity);
        self.n += 1;
        let (bucket_idx, slot) = self.bucket_of(row);
        self.buckets[bucket_idx].set_fill((slot + 1).max(self.buckets[bucket_idx].fill()));
        row
    }

    /// Drop every present component at `row`, without touching row
    /// bookkeeping. Used both by plain `erase` and, before a cross-
    /// archetype move, for the components that don't survive the move.
    unsafe fn drop_components_at(&self, row: usize, mask: u64) {
        for idx in ones(mask) {
            if let Some(drop_fn) = self.drop_fns[idx as usize] {
                drop_fn(self.component_ptr(idx, row));
            }
        }
    }

    /// Swap the last row into `row`'s slot (bitwise move, no drop of the
    /// destination — caller guarantees `row`'s old contents were already
    /// disposed of, by drop or by move-out) and shrink `n`. Returns the
    /// entity that used to own the last row, if a swap occurred.
    unsafe fn close_hole(&mut self, row: usize) -> Option<Entity> {
        let last = self.n - 1;
        let replaced = if row != last {
            let moved_entity = self.entity_at(last);
            for idx in ones(self.mask) {
                let size = self.item_sizes[idx as usize];
                let src = self.component_ptr(idx, last);
                let dst = self.component_ptr(idx, row);
                std::ptr::copy_nonoverlapping(src, dst, size);
            }
            self.set_entity_at(row, moved_entity);
            Some(moved_entity)
        } else {
            None
        };
        self.n -= 1;
        self.shrink_trailing_bucket();
        replaced
    }

    /// If the trailing bucket no longer holds any live row, free it
    /// eagerly rather than waiting for the archetype to be dropped.
    fn shrink_trailing_bucket(&mut self) {
        let needed = self.n.div_ceil(self.bucket_size);
        while self.buckets.len() > needed {
            self.buckets.pop();
        }
    }

    /// `erase(row) -> replaced_id`: swap-remove. Destructs every
    /// component at `row`, then closes the hole.
    ///
    /// # Safety
    /// `row < self.len()`.
    pub unsafe fn erase(&mut self, row: usize) -> Option<Entity> {
        self.drop_components_at(row, self.mask);
        self.close_hole(row)
    }

    /// `move_row_to`: migrate every component in `self.mask ∩ dest.mask`
    /// from `row` into a freshly allocated row of `dest`. Components
    /// present only in `self` are destructed; components present only in
    /// `dest` are left uninitialized for the caller to fill. Closes the
    /// hole left in `self` via the same swap-remove used by `erase`.
    ///
    /// # Safety
    /// `row < self.len()`; `dest` must be a different archetype (not
    /// `self`).
    pub unsafe fn move_row_to(
        &mut self,
        row: usize,
        dest: &mut Archetype<R>,
    ) -> (usize, Option<Entity>) {
        self.move_row_to_excluding(row, dest, 0)
    }

    /// Like [`Self::move_row_to`], but components in `keep_alive` (which
    /// must be a subset of the components only `self` has) are neither
    /// copied into `dest` nor dropped — the caller has already moved
    /// their value out (e.g. via `ptr::read`) and is responsible for it.
    ///
    /// # Safety
    /// Same as `move_row_to`; additionally every bit in `keep_alive` must
    /// have already been read out of `row` by the caller before this call.
    pub unsafe fn move_row_to_excluding(
        &mut self,
        row: usize,
        dest: &mut Archetype<R>,
        keep_alive: u64,
    ) -> (usize, Option<Entity>) {
        let entity = self.entity_at(row);
        let new_row = dest.allocate_row(entity);

        let intersect = self.mask & dest.mask;
        for idx in ones(intersect) {
            let size = self.item_sizes[idx as usize];
            let src = self.component_ptr(idx, row);
            let dst = dest.component_ptr(idx, new_row);
            std::ptr::copy_nonoverlapping(src, dst, size);
        }

        let only_self = self.mask & !dest.mask & !keep_alive;
        self.drop_components_at(row, only_self);

        let replaced = self.close_hole(row);
        (new_row, replaced)
    }

    pub fn buckets(&self) -> &[Box<Bucket>] {
        &self.buckets
    }
}

impl<R: Registry> Drop for Archetype<R> {
    fn drop(&mut self) {
        // Destruct every live row's components before the buckets
        // themselves are freed (`Bucket::drop` only frees bytes).
        for row in 0..self.n {
            unsafe {
                self.drop_components_at(row, self.mask);
            }
        }
    }
}

pub(crate) fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Iterate the set bit indices of a `u64` mask, ascending.
pub(crate) fn ones(mut mask: u64) -> impl Iterator<Item = u8> {
    std::iter::from_fn(move || {
        if mask == 0 {
            None
        } else {
            let idx = mask.trailing_zeros() as u8;
            mask &= mask - 1;
            Some(idx)
        }
    })
}
