//! Archetype-indexed component storage for Scenery.
//!
//! This crate provides:
//! - [`ComponentStore`] - Entities, components, queries, transitions, singletons
//! - [`TypeRegistry`] - Registration-time component type tokens
//! - [`ComponentColumn`] - Slot-based storage for one component type
//! - [`ArchetypeIndex`] - Archetype to entity buckets
//! - [`EntityDirectory`] - Generational entity allocation and external ids
//! - [`TransitionLog`] - Per-frame archetype change records
//! - [`Query`] - Typed component access for iteration
//!
//! Scene serialization is driven by [`ComponentStore::transfer`] over any
//! [`scenery_transfer::Serializer`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod column;
pub mod component;
pub mod driver;
pub mod entity;
pub mod index;
pub mod query;
pub mod registry;
pub mod singleton;
pub mod store;
pub mod transition;

pub use column::{ComponentColumn, ErasedColumn};
pub use component::{Component, ComponentKind, ComponentSet, EntityId, Singleton};
pub use driver::{ENTITIES_SCOPE, SCENE_SCOPE};
pub use entity::EntityDirectory;
pub use index::ArchetypeIndex;
pub use query::{Lookup, Query, QueryColumns};
pub use registry::{ComponentInfo, ComponentType, TypeRegistry};
pub use singleton::SingletonRegistry;
pub use store::ComponentStore;
pub use transition::{ArchetypeTransition, TransitionLog};

pub use scenery_foundation::{Archetype, AssetId, Entity, Error, ErrorKind, Result, StoreConfig};
