//! Convenient re-exports of commonly used types.
//!
//! ```
//! use archetype_store::prelude::*;
//! ```

pub use crate::component::{Bundle, Component, DefaultBundle, Exclude};
pub use crate::define_registry;
pub use crate::entity::Entity;
pub use crate::error::{EcsError, Result};
pub use crate::query::{Query, QueryMut};
pub use crate::registry::Registry;
pub use crate::world::World;
pub use crate::world_table::Worlds;
