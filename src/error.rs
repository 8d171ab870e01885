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

//! Error types.

use std::fmt;

/// Errors returned by fallible storage operations.
///
/// Configuration mistakes that can only happen once, at startup (too many
/// component types for a registry, a component offset that overflows its
/// 16-bit encoding) are reported as panics instead — see
/// [`crate::archetype::Archetype::new`] and `define_registry!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// The entity handle doesn't resolve to a live row: stale version,
    /// freed slot, or an id past the table's length.
    EntityNotFound,

    /// The entity is alive but the requested component isn't part of its
    /// archetype.
    ComponentNotFound,

    /// `add::<C>` was called for a component already present on the
    /// entity's archetype.
    ComponentAlreadyPresent,

    /// Every one of the process's world index slots is in use.
    WorldTableExhausted,

    /// `entity.world()` doesn't name a currently live world.
    WorldNotFound,
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::EntityNotFound => write!(f, "entity not found"),
            EcsError::ComponentNotFound => write!(f, "component not found on entity"),
            EcsError::ComponentAlreadyPresent => write!(f, "component already present on entity"),
            EcsError::WorldTableExhausted => write!(f, "no free world index slots remain"),
            EcsError::WorldNotFound => write!(f, "entity's world is not currently live"),
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias used throughout storage and query operations.
pub type Result<T> = std::result::Result<T, EcsError>;
