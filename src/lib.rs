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

//! A columnar, archetype-based entity-component store.
//!
//! Components for a single application are declared once with
//! [`define_registry!`], fixing their number and identity at compile time.
//! Entities with the same set of component types live packed together in
//! one archetype's columnar storage; adding or removing a component moves
//! the entity's row to the archetype for its new signature.
//!
//! ```
//! use archetype_store::{define_registry, World};
//!
//! #[derive(Debug, Clone, Copy, Default)]
//! struct Position { x: f32, y: f32 }
//! #[derive(Debug, Clone, Copy, Default)]
//! struct Velocity { x: f32, y: f32 }
//!
//! define_registry!(GameRegistry: Position, Velocity);
//!
//! let mut world: World<GameRegistry> = World::new().unwrap();
//! let e = world.create_with((Position::default(), Velocity { x: 1.0, y: 0.0 }));
//!
//! for (pos, vel) in world.query_mut::<(&mut Position, &Velocity)>() {
//!     pos.x += vel.x;
//!     pos.y += vel.y;
//! }
//! assert_eq!(world.get::<Position>(e).unwrap().x, 1.0);
//! ```

pub mod archetype;
pub mod bucket;
pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod registry;
pub mod world;
pub mod world_table;

pub mod prelude;

pub use archetype::Archetype;
pub use bucket::Bucket;
pub use component::{Bundle, Component, DefaultBundle, Exclude};
pub use entity::{Entity, EntityLocation};
pub use error::{EcsError, Result};
pub use query::{Fetch, FetchMut, Query, QueryMut};
pub use registry::{Registry, Signature};
pub use world::World;
pub use world_table::{WorldTable, Worlds};
