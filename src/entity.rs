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

//! Entity handles: a 64-bit `(id, version, world)` triple, and the
//! per-world slot it resolves to.

/// Bits of the 32-bit version/world word reserved for the world index.
/// Fixed at 8 (256 worlds, 16,777,216 id reuses before a false positive
/// could theoretically occur) — see DESIGN.md for why this is a crate
/// constant rather than a further generic parameter.
pub const WORLD_BITS: u32 = 8;
const VERSION_BITS: u32 = 32 - WORLD_BITS;
/// Mask of the bits `version` actually occupies in the packed handle word.
/// `Entity::new` always truncates to this range; anything that increments
/// a generation counter outside of `Entity` itself (the world's slot
/// table) must wrap at this same mask, or the two can desynchronize
/// permanently once the raw counter exceeds it.
pub(crate) const VERSION_MASK: u32 = (1u32 << VERSION_BITS) - 1;
const WORLD_MASK: u64 = (1u64 << WORLD_BITS) - 1;

/// Maximum number of worlds addressable by [`WORLD_BITS`].
pub const MAX_WORLDS: usize = 1 << WORLD_BITS;

/// A 64-bit entity handle: `id` (32 bits) indexes into the owning world's
/// indirection table, `version` is a generational tag incremented on
/// reuse, and `world` indexes the process-wide world table.
///
/// Entity handles are copyable values; they own nothing. Dangling handles
/// (stale version, wrong world, or `id == npos`) always resolve to a miss
/// — never to the wrong entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    id: u32,
    version_world: u32,
}

impl Entity {
    /// `id == npos` means the handle does not refer to any slot.
    pub const NPOS: u32 = u32::MAX;

    pub(crate) fn new(id: u32, version: u32, world: u8) -> Self {
        debug_assert!((world as u64) <= WORLD_MASK);
        let version_world = ((version & VERSION_MASK) as u64) | ((world as u64) << VERSION_BITS);
        Entity {
            id,
            version_world: version_world as u32,
        }
    }

    /// A handle that never resolves to a live entity.
    pub const fn invalid() -> Self {
        Entity {
            id: Self::NPOS,
            version_world: 0,
        }
    }

    /// Index into the owning world's indirection table.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Generational tag, incremented each time the slot is freed.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version_world & VERSION_MASK
    }

    /// Index into the process-wide world table.
    #[inline]
    pub fn world(&self) -> u8 {
        (self.version_world as u64 >> VERSION_BITS) as u8
    }

    /// `false` iff `id == npos`. A `true` result does not by itself mean
    /// the entity is still alive — it only means the handle was
    /// constructed by a world (as opposed to [`Entity::invalid`]). Use
    /// `World::resolve`/`World::is_alive` to check liveness.
    #[inline]
    pub fn valid(&self) -> bool {
        self.id != Self::NPOS
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id())
            .field("version", &self.version())
            .field("world", &self.world())
            .finish()
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Entity location within a world: the archetype and row currently
/// holding its components. Held per-slot in the world's indirection
/// table alongside the free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    pub archetype_id: u32,
    pub row: u32,
}

impl EntityLocation {
    pub(crate) const NONE: EntityLocation = EntityLocation {
        archetype_id: u32::MAX,
        row: u32::MAX,
    };
}
