//! Component and singleton traits, and the built-in identity component.

use scenery_foundation::{Archetype, AssetId, Result};
use scenery_transfer::{Serializer, SerializerExt, Transfer};

use crate::registry::TypeRegistry;

/// How a component type behaves when an entity is duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Ordinary data, copied on duplication.
    Data,
    /// Marker state (selection, editor flags), not copied on duplication.
    Tag,
    /// Entity identity, replaced with a fresh value on duplication.
    Identity,
}

/// A type that can be attached to entities.
///
/// `NAME` is the key used in scene files and must be unique per store.
pub trait Component: Clone + Send + Sync + 'static {
    /// Stable name of the component type.
    const NAME: &'static str;

    /// Duplication behavior.
    const KIND: ComponentKind = ComponentKind::Data;
}

/// A store-wide value with at most one instance per type.
pub trait Singleton: Send + Sync + 'static {
    /// Stable name of the singleton type.
    const NAME: &'static str;
}

/// A set of component types, used to select entities.
///
/// Implemented for every [`Component`] and for tuples of sets.
pub trait ComponentSet {
    /// Returns the archetype mask of the set.
    ///
    /// Fails if any member type is unregistered.
    fn archetype(registry: &TypeRegistry) -> Result<Archetype>;
}

impl<T: Component> ComponentSet for T {
    fn archetype(registry: &TypeRegistry) -> Result<Archetype> {
        Ok(Archetype::single(registry.require::<T>()?.bit()))
    }
}

macro_rules! impl_component_set_tuple {
    ($($S:ident),+) => {
        impl<$($S: ComponentSet),+> ComponentSet for ($($S,)+) {
            fn archetype(registry: &TypeRegistry) -> Result<Archetype> {
                let mut mask = Archetype::EMPTY;
                $(mask = mask.union($S::archetype(registry)?);)+
                Ok(mask)
            }
        }
    };
}

impl_component_set_tuple!(A);
impl_component_set_tuple!(A, B);
impl_component_set_tuple!(A, B, C);
impl_component_set_tuple!(A, B, C, D);
impl_component_set_tuple!(A, B, C, D, E);
impl_component_set_tuple!(A, B, C, D, E, F);
impl_component_set_tuple!(A, B, C, D, E, F, G);
impl_component_set_tuple!(A, B, C, D, E, F, G, H);

/// The identity every scene entity carries.
///
/// Registered by every store as its first component type. Adding it binds
/// `id` to the entity for [`ComponentStore::get_entity`](crate::ComponentStore::get_entity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntityId {
    /// The stable external id.
    pub id: AssetId,
}

impl EntityId {
    /// Wraps an asset id.
    #[must_use]
    pub const fn new(id: AssetId) -> Self {
        Self { id }
    }
}

impl Component for EntityId {
    const NAME: &'static str = "EntityID";
    const KIND: ComponentKind = ComponentKind::Identity;
}

impl Transfer for EntityId {
    fn transfer<S: Serializer + ?Sized>(&mut self, serializer: &mut S) -> Result<()> {
        serializer.field(&mut self.id, "ID")
    }
}
