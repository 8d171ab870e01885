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

//! Fixed-capacity bucket: one unit of archetype allocation.
//!
//! A bucket holds up to [`DEFAULT_BUCKET_SIZE`] entities (configurable per
//! world) worth of columnar component data plus a parallel column of
//! entity back-references, all inside a *single* raw allocation aligned
//! to the bucket's capacity. [`crate::archetype::Archetype`] computes the
//! byte layout (entity column first, then one aligned column per present
//! component); `Bucket` only owns the bytes and knows how many of its
//! slots are live.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::entity::Entity;

/// Entities per bucket when a world doesn't request a different size.
pub const DEFAULT_BUCKET_SIZE: usize = 64;

/// A single fixed-capacity arena backing one archetype's rows `[base, base + B)`.
pub struct Bucket {
    ptr: NonNull<u8>,
    layout: Layout,
    /// Number of populated slots, `0..=bucket_size`. Rows at
    /// `fill..bucket_size` are uninitialized and must never be read.
    fill: usize,
}

impl Bucket {
    /// Allocate a new, zero-filled bucket with the given total byte size
    /// and alignment (both computed by the owning archetype).
    pub fn new(total_size: usize, align: usize) -> Self {
        let layout = Layout::from_size_align(total_size.max(1), align)
            .expect("bucket layout: invalid size/align");
        // SAFETY: layout has non-zero size (`.max(1)` above).
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout));
        Bucket {
            ptr,
            layout,
            fill: 0,
        }
    }

    #[inline]
    pub fn fill(&self) -> usize {
        self.fill
    }

    #[inline]
    pub fn set_fill(&mut self, fill: usize) {
        self.fill = fill;
    }

    /// Pointer to the entity back-reference column, which always starts
    /// at offset 0.
    #[inline]
    pub fn entity_column(&self) -> *mut Entity {
        self.ptr.as_ptr().cast::<Entity>()
    }

    #[inline]
    pub unsafe fn entity_at(&self, slot: usize) -> Entity {
        debug_assert!(slot < self.fill);
        *self.entity_column().add(slot)
    }

    #[inline]
    pub unsafe fn set_entity_at(&self, slot: usize, entity: Entity) {
        self.entity_column().add(slot).write(entity);
    }

    /// Raw pointer to a component column at byte `offset`, the column's
    /// item `size`, for `slot`. Caller guarantees `offset` was computed by
    /// the owning archetype and therefore lies within this allocation.
    #[inline]
    pub unsafe fn column_ptr(&self, offset: usize, size: usize, slot: usize) -> *mut u8 {
        self.ptr.as_ptr().add(offset).add(slot * size)
    }

    pub fn byte_size(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for Bucket {
    fn drop(&mut self) {
        // SAFETY: allocated with the same layout in `new`. Component and
        // entity destructors for any still-live slots are run by the
        // owning archetype *before* the bucket itself is dropped (see
        // `Archetype::drop`), so this is purely freeing memory.
        unsafe {
            alloc::dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}
