//! The component store.
//!
//! `ComponentStore` ties the registry, columns, archetype index, entity
//! directory, transition log, and singletons together behind one API. Every
//! archetype change goes through a single update step: leave the old
//! bucket, join the new one, record the new archetype, log the transition.

use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::thread;

use tracing::{debug, trace, warn};

use scenery_foundation::{Archetype, AssetId, AssetIdGenerator, Entity, Error, Result, StoreConfig};
use scenery_transfer::Transfer;

use crate::component::{Component, ComponentKind, ComponentSet, EntityId, Singleton};
use crate::driver::TransferHooks;
use crate::entity::EntityDirectory;
use crate::index::ArchetypeIndex;
use crate::query::{Lookup, Query, QueryColumns};
use crate::registry::{ComponentInfo, ComponentType, TypeRegistry};
use crate::singleton::SingletonRegistry;
use crate::transition::{ArchetypeTransition, TransitionLog};

/// Archetype-indexed entity/component storage.
///
/// Stores are plain values; any number can coexist (a game scene next to
/// editor preview scenes, for example).
///
/// # Example
///
/// ```
/// use scenery_storage::{Component, ComponentStore};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Position { x: f32, y: f32 }
///
/// impl Component for Position {
///     const NAME: &'static str = "Position";
/// }
///
/// let mut store = ComponentStore::new();
/// store.register_component::<Position>().unwrap();
///
/// let e = store.create_entity().unwrap();
/// store.add_component(e, Position { x: 10.0, y: 20.0 }).unwrap();
///
/// store.for_each::<&mut Position>(|_, pos| pos.x += 1.0).unwrap();
/// assert_eq!(store.get_component::<Position>(e), Some(&Position { x: 11.0, y: 20.0 }));
/// ```
#[derive(Debug)]
pub struct ComponentStore {
    pub(crate) config: StoreConfig,
    pub(crate) registry: TypeRegistry,
    pub(crate) index: ArchetypeIndex,
    pub(crate) directory: EntityDirectory,
    pub(crate) transitions: TransitionLog,
    pub(crate) singletons: SingletonRegistry,
    pending_destroy: BTreeSet<Entity>,
    ids: AssetIdGenerator,
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentStore {
    /// Creates a store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store with the given configuration.
    ///
    /// [`EntityId`] is registered first, so it always has bit 0.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let mut registry = TypeRegistry::new();
        let identity = registry.register_with::<EntityId>(Some(TransferHooks::of::<EntityId>()));
        debug_assert!(identity.is_ok());

        Self {
            index: ArchetypeIndex::new(),
            directory: EntityDirectory::new(config.recycle_entities, config.max_entities),
            transitions: TransitionLog::new(),
            singletons: SingletonRegistry::new(),
            pending_destroy: BTreeSet::new(),
            ids: AssetIdGenerator::new(config.seed),
            registry,
            config,
        }
    }

    /// The configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The type registry.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a component type.
    pub fn register_component<T: Component>(&mut self) -> Result<ComponentType> {
        let ty = self.registry.register::<T>()?;
        debug!(component = T::NAME, bit = ty.bit(), "registered component type");
        Ok(ty)
    }

    /// Registers a component type that takes part in scene serialization.
    pub fn register_transferable<T: Component + Transfer + Default>(&mut self) -> Result<ComponentType> {
        let ty = self.registry.register_with::<T>(Some(TransferHooks::of::<T>()))?;
        debug!(component = T::NAME, bit = ty.bit(), "registered transferable component type");
        Ok(ty)
    }

    /// Declares a singleton type that takes part in scene serialization.
    ///
    /// Returns false if it was already declared.
    pub fn register_singleton<T: Singleton + Transfer + Default>(&mut self) -> bool {
        self.singletons.declare::<T>()
    }

    /// Returns the token of a registered component type.
    #[must_use]
    pub fn component_type<T: Component>(&self) -> Option<ComponentType> {
        self.registry.lookup::<T>()
    }

    /// Metadata for every registered component type, in bit order.
    #[must_use]
    pub fn components(&self) -> &[ComponentInfo] {
        self.registry.infos()
    }

    /// Metadata for the component type registered under `name`.
    #[must_use]
    pub fn component_info(&self, name: &str) -> Option<&ComponentInfo> {
        self.registry.info(self.registry.lookup_name(name)?)
    }

    fn resolve<T: Component>(&mut self) -> Result<ComponentType> {
        if let Some(ty) = self.registry.lookup::<T>() {
            return Ok(ty);
        }
        if !self.config.implicit_registration {
            return Err(Error::not_registered(T::NAME));
        }
        let ty = self.registry.register::<T>()?;
        warn!(component = T::NAME, bit = ty.bit(), "registered component type on first use");
        Ok(ty)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with a fresh [`EntityId`].
    pub fn create_entity(&mut self) -> Result<Entity> {
        let id = self.ids.next_id();
        self.create_entity_with_id(id)
    }

    /// Creates an entity with the given external id.
    pub fn create_entity_with_id(&mut self, id: AssetId) -> Result<Entity> {
        let entity = self.create_entity_without_id()?;
        self.add_component(entity, EntityId::new(id))?;
        Ok(entity)
    }

    /// Creates an entity with no components.
    ///
    /// Used when loading, where the identity comes from the data.
    pub fn create_entity_without_id(&mut self) -> Result<Entity> {
        let entity = self.directory.spawn()?;
        self.index.insert(Archetype::EMPTY, entity);
        trace!(%entity, "created entity");
        Ok(entity)
    }

    /// Destroys an entity and all of its components immediately.
    ///
    /// The components stay readable through
    /// [`for_transition_from`](Self::for_transition_from) until
    /// [`clear_transitions`](Self::clear_transitions).
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.directory.validate(entity)?;
        if let Some(id) = self.asset_id(entity) {
            self.directory.unbind(id, entity);
        }

        let archetype = self.directory.destroy(entity)?;
        for bit in archetype.iter() {
            if let Some(column) = self.registry.erased_mut(ComponentType::from_bit(bit)) {
                let retired = column.retire(entity);
                debug_assert!(retired, "{entity:?} missing from column {bit}");
            }
        }
        self.index.remove(archetype, entity);
        self.transitions.record(entity, archetype, Archetype::EMPTY);
        self.pending_destroy.remove(&entity);

        trace!(%entity, "destroyed entity");
        Ok(())
    }

    /// Marks an entity for destruction at the end of the frame.
    ///
    /// It stays valid and queryable until
    /// [`destroy_deferred_entities`](Self::destroy_deferred_entities).
    pub fn destroy_entity_deferred(&mut self, entity: Entity) -> Result<()> {
        self.directory.validate(entity)?;
        self.pending_destroy.insert(entity);
        Ok(())
    }

    /// Returns true if the entity is marked for deferred destruction.
    #[must_use]
    pub fn is_pending_destroy(&self, entity: Entity) -> bool {
        self.pending_destroy.contains(&entity)
    }

    /// Destroys every entity marked with
    /// [`destroy_entity_deferred`](Self::destroy_entity_deferred).
    ///
    /// Returns how many were destroyed. Entities already destroyed in the
    /// meantime are skipped.
    pub fn destroy_deferred_entities(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_destroy);
        let mut destroyed = 0;
        for entity in pending {
            match self.destroy_entity(entity) {
                Ok(()) => destroyed += 1,
                Err(err) => trace!(%entity, error = %err, "skipping deferred destroy"),
            }
        }
        if destroyed > 0 {
            debug!(count = destroyed, "destroyed deferred entities");
        }
        destroyed
    }

    /// Creates a copy of an entity.
    ///
    /// Data components are cloned. Tag components are not copied. The copy
    /// gets a fresh [`EntityId`]. The copy's archetype is logged as one
    /// transition from empty.
    pub fn duplicate_entity(&mut self, entity: Entity) -> Result<Entity> {
        self.directory.validate(entity)?;
        let source = self.directory.archetype(entity).unwrap_or_default();
        let copy = self.directory.spawn()?;

        let mut archetype = Archetype::EMPTY;
        for bit in source.iter() {
            let ty = ComponentType::from_bit(bit);
            if self.registry.info(ty).map(|info| info.kind) != Some(ComponentKind::Data) {
                continue;
            }
            if let Some(column) = self.registry.erased_mut(ty) {
                if column.duplicate(entity, copy)? {
                    archetype = archetype.with(bit);
                }
            }
        }

        let id = self.ids.next_id();
        let identity = self.registry.require::<EntityId>()?;
        if let Some(column) = self.registry.column_mut::<EntityId>() {
            column.insert(copy, EntityId::new(id))?;
            archetype = archetype.with(identity.bit());
            self.directory.bind(id, copy);
        }

        self.directory.set_archetype(copy, archetype)?;
        self.index.insert(archetype, copy);
        self.transitions.record(copy, Archetype::EMPTY, archetype);

        trace!(source = %entity, %copy, "duplicated entity");
        Ok(copy)
    }

    /// Returns true if the handle refers to a live entity.
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.directory.exists(entity)
    }

    /// Looks up an entity by external id.
    #[must_use]
    pub fn get_entity(&self, id: AssetId) -> Option<Entity> {
        self.directory.resolve(id)
    }

    /// Returns the external id of an entity.
    #[must_use]
    pub fn asset_id(&self, entity: Entity) -> Option<AssetId> {
        self.get_component::<EntityId>(entity).map(|identity| identity.id)
    }

    /// All live entities in ascending order.
    #[must_use]
    pub fn all_entities(&self) -> Vec<Entity> {
        self.directory.iter().collect()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.directory.len()
    }

    /// Number of components on an entity; zero for dead handles.
    #[must_use]
    pub fn component_count(&self, entity: Entity) -> usize {
        self.archetype_of(entity).map_or(0, |a| a.count() as usize)
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component.
    ///
    /// Fails if the entity is dead, the type is unregistered (unless
    /// implicit registration is on), or the entity already has one.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<()> {
        self.directory.validate(entity)?;
        let ty = self.resolve::<T>()?;
        let identity = (&value as &dyn Any)
            .downcast_ref::<EntityId>()
            .map(|identity| identity.id);

        self.registry
            .column_mut::<T>()
            .ok_or_else(|| Error::not_registered(T::NAME))?
            .insert(entity, value)?;

        if let Some(id) = identity.filter(|id| id.is_valid()) {
            if let Some(previous) = self.directory.bind(id, entity) {
                warn!(%id, %previous, %entity, "asset id rebound to another entity");
            }
        }

        let old = self.archetype_or_err(entity)?;
        self.move_entity(entity, old, old.with(ty.bit()))
    }

    /// Detaches a component.
    ///
    /// The value stays readable through
    /// [`for_transition_from`](Self::for_transition_from) until
    /// [`clear_transitions`](Self::clear_transitions).
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<()> {
        self.directory.validate(entity)?;
        let ty = self.registry.require::<T>()?;
        let identity = if TypeId::of::<T>() == TypeId::of::<EntityId>() {
            self.asset_id(entity)
        } else {
            None
        };

        let retired = self
            .registry
            .column_mut::<T>()
            .ok_or_else(|| Error::not_registered(T::NAME))?
            .retire(entity);
        if !retired {
            return Err(Error::component_not_found(entity, T::NAME));
        }

        if let Some(id) = identity {
            self.directory.unbind(id, entity);
        }

        let old = self.archetype_or_err(entity)?;
        self.move_entity(entity, old, old.without(ty.bit()))
    }

    /// Returns a component of an entity.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.registry.column::<T>()?.get(entity)
    }

    /// Returns a component of an entity mutably.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.registry.column_mut::<T>()?.get_mut(entity)
    }

    /// Returns true if the entity has a component of type `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.registry
            .column::<T>()
            .is_some_and(|column| column.contains(entity))
    }

    fn archetype_or_err(&self, entity: Entity) -> Result<Archetype> {
        self.directory
            .archetype(entity)
            .ok_or_else(|| Error::entity_not_found(entity))
    }

    fn move_entity(&mut self, entity: Entity, old: Archetype, new: Archetype) -> Result<()> {
        self.index.relocate(entity, old, new);
        self.directory.set_archetype(entity, new)?;
        self.transitions.record(entity, old, new);
        Ok(())
    }

    // =========================================================================
    // Archetypes and queries
    // =========================================================================

    /// Computes the archetype mask of a component set.
    ///
    /// Never registers anything; unknown types are an error.
    pub fn archetype<S: ComponentSet>(&self) -> Result<Archetype> {
        S::archetype(&self.registry)
    }

    /// Returns the current archetype of a live entity.
    #[must_use]
    pub fn archetype_of(&self, entity: Entity) -> Option<Archetype> {
        self.directory.archetype(entity)
    }

    /// Calls `f` for every entity holding all of `Q`'s components.
    ///
    /// Entities are visited in ascending order within each archetype.
    pub fn for_each<Q: Query>(&mut self, mut f: impl FnMut(Entity, Q::Item<'_>)) -> Result<()> {
        let mask = Q::archetype(&self.registry)?;
        let mut columns = QueryColumns::<Q>::extract(&mut self.registry)?;
        for entity in self.index.entities(mask) {
            if let Some(item) = columns.fetch(entity, Lookup::Live) {
                f(entity, item);
            }
        }
        Ok(())
    }

    /// Like [`for_each`](Self::for_each), but spreads the matching entities
    /// over worker threads.
    ///
    /// The entities are split into at most
    /// [`StoreConfig::worker_count`] chunks. Each worker gets exclusive
    /// borrows for its own entities only, and every worker has finished
    /// when this returns. A panicking callback propagates once all workers
    /// have joined.
    pub fn for_each_async<Q, F>(&mut self, f: F) -> Result<()>
    where
        Q: Query,
        F: Fn(Entity, Q::Item<'_>) + Sync,
        for<'a> Q::Item<'a>: Send,
    {
        let mask = Q::archetype(&self.registry)?;
        let entities: Vec<Entity> = self.index.entities(mask).collect();
        if entities.is_empty() {
            return Ok(());
        }
        let workers = self.config.worker_count().clamp(1, entities.len());

        let mut columns = QueryColumns::<Q>::extract(&mut self.registry)?;
        let mut work: Vec<(Entity, Q::Item<'_>)> = entities
            .iter()
            .copied()
            .zip(columns.fetch_many(&entities))
            .filter_map(|(entity, item)| Some((entity, item?)))
            .collect();

        let chunk_size = work.len().div_ceil(workers).max(1);
        let mut chunks = Vec::with_capacity(workers);
        while !work.is_empty() {
            let rest = work.split_off(chunk_size.min(work.len()));
            chunks.push(std::mem::replace(&mut work, rest));
        }

        trace!(query = Q::name(), entities = entities.len(), chunks = chunks.len(), "running async query");
        let f = &f;
        thread::scope(|scope| {
            for chunk in chunks {
                scope.spawn(move || {
                    for (entity, item) in chunk {
                        f(entity, item);
                    }
                });
            }
        });
        Ok(())
    }

    /// Returns entities holding every component in `S`, in ascending order.
    ///
    /// With `exclude_supersets`, only entities whose component set is
    /// exactly `S` are returned.
    pub fn get_entities<S: ComponentSet>(&self, exclude_supersets: bool) -> Result<Vec<Entity>> {
        let mask = S::archetype(&self.registry)?;
        let mut entities: Vec<Entity> = if exclude_supersets {
            self.index
                .bucket(mask)
                .map(|bucket| bucket.iter().copied().collect())
                .unwrap_or_default()
        } else {
            self.index.entities(mask).collect()
        };
        entities.sort_unstable();
        Ok(entities)
    }

    /// Returns the lowest entity holding every component in `S`.
    pub fn find_first<S: ComponentSet>(&self) -> Result<Option<Entity>> {
        let mask = S::archetype(&self.registry)?;
        Ok(self
            .index
            .matching(mask)
            .filter_map(|(_, bucket)| bucket.first().copied())
            .min())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Archetype changes since the last [`clear_transitions`](Self::clear_transitions).
    #[must_use]
    pub fn transitions(&self) -> &[ArchetypeTransition] {
        self.transitions.records()
    }

    /// Calls `f` for every entity that started matching `Q` this frame.
    ///
    /// Components removed later in the frame are still bound. Records whose
    /// components cannot be resolved are skipped.
    pub fn for_transition_to<Q: Query>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) -> Result<()> {
        self.replay::<Q>(true, f)
    }

    /// Calls `f` for every entity that stopped matching `Q` this frame.
    ///
    /// The entity may already be destroyed; its removed components are
    /// bound from the values retired this frame. A component removed and
    /// re-added within the frame binds the removed value.
    pub fn for_transition_from<Q: Query>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) -> Result<()> {
        self.replay::<Q>(false, f)
    }

    fn replay<Q: Query>(&mut self, rising: bool, mut f: impl FnMut(Entity, Q::Item<'_>)) -> Result<()> {
        let mask = Q::archetype(&self.registry)?;
        let mut columns = QueryColumns::<Q>::extract(&mut self.registry)?;
        let (entities, lookup): (Vec<Entity>, _) = if rising {
            (self.transitions.rising(mask).map(|t| t.entity).collect(), Lookup::WithRetired)
        } else {
            (self.transitions.falling(mask).map(|t| t.entity).collect(), Lookup::RetiredFirst)
        };
        for entity in entities {
            match columns.fetch(entity, lookup) {
                Some(item) => f(entity, item),
                None => trace!(%entity, query = Q::name(), "skipping unresolved transition"),
            }
        }
        Ok(())
    }

    /// Ends the frame: drops the transition log and retired values.
    pub fn clear_transitions(&mut self) {
        trace!(records = self.transitions.len(), "clearing transitions");
        self.transitions.clear();
        self.registry.clear_retired();
    }

    // =========================================================================
    // Singletons
    // =========================================================================

    /// Adds a singleton. Fails if one of this type exists.
    pub fn add_singleton<T: Singleton>(&mut self, value: T) -> Result<()> {
        self.singletons.add(value)
    }

    /// Adds or replaces a singleton, returning the previous value.
    pub fn insert_singleton<T: Singleton>(&mut self, value: T) -> Option<T> {
        self.singletons.insert(value)
    }

    /// Returns the singleton of type `T`.
    #[must_use]
    pub fn get_singleton<T: Singleton>(&self) -> Option<&T> {
        self.singletons.get()
    }

    /// Returns the singleton of type `T` mutably.
    pub fn get_singleton_mut<T: Singleton>(&mut self) -> Option<&mut T> {
        self.singletons.get_mut()
    }

    /// Removes and returns the singleton of type `T`.
    pub fn remove_singleton<T: Singleton>(&mut self) -> Option<T> {
        self.singletons.remove()
    }

    /// Returns true if a singleton of type `T` exists.
    #[must_use]
    pub fn has_singleton<T: Singleton>(&self) -> bool {
        self.singletons.contains::<T>()
    }

    /// Runs `f` on the singleton of type `T`, if present.
    pub fn with_singleton<T: Singleton, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.singletons.get_mut().map(f)
    }
}
