//! Scene serialization driver.
//!
//! Walks a store through any [`Serializer`] backend:
//!
//! ```text
//! Scene
//! ├── <singleton name>      one object per declared singleton
//! └── Entities              array, one element per entity
//!     └── <component name>  one object per transferable component
//! ```
//!
//! The store never sees the wire format. Saving visits entities in
//! ascending order and components in registration order, so equal stores
//! produce equal documents.

use tracing::debug;

use scenery_foundation::{Entity, Error, ErrorKind, Result};
use scenery_transfer::{Serializer, Transfer};

use crate::component::Component;
use crate::registry::ComponentType;
use crate::store::ComponentStore;

/// Name of the outermost object scope.
pub const SCENE_SCOPE: &str = "Scene";

/// Name of the entity array scope.
pub const ENTITIES_SCOPE: &str = "Entities";

type HookFn = fn(&mut ComponentStore, Entity, &mut dyn Serializer) -> Result<()>;

/// Type-erased save/load entry points for one component type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TransferHooks {
    save: HookFn,
    load: HookFn,
}

impl TransferHooks {
    pub(crate) fn of<T: Component + Transfer + Default>() -> Self {
        Self {
            save: save_component::<T>,
            load: load_component::<T>,
        }
    }
}

fn save_component<T: Component + Transfer>(
    store: &mut ComponentStore,
    entity: Entity,
    serializer: &mut dyn Serializer,
) -> Result<()> {
    match store.get_component_mut::<T>(entity) {
        Some(value) => value.transfer(serializer),
        None => Ok(()),
    }
}

fn load_component<T: Component + Transfer + Default>(
    store: &mut ComponentStore,
    entity: Entity,
    serializer: &mut dyn Serializer,
) -> Result<()> {
    let mut value = T::default();
    value.transfer(serializer)?;
    store.add_component(entity, value)
}

impl ComponentStore {
    /// Saves or loads the whole scene, depending on the serializer's
    /// direction.
    ///
    /// Loading adds entities to whatever the store already holds, and
    /// replaces the declared singletons the input has entries for.
    /// [`Direction::ReadWrite`] serializers are driven like saving.
    ///
    /// [`Direction::ReadWrite`]: scenery_transfer::Direction::ReadWrite
    pub fn transfer(&mut self, serializer: &mut dyn Serializer) -> Result<()> {
        if !serializer.push_object(SCENE_SCOPE)? {
            return Err(Error::new(ErrorKind::MissingScope(SCENE_SCOPE.to_string())));
        }
        self.singletons
            .transfer(serializer)
            .map_err(|e| e.within(SCENE_SCOPE))?;
        let count = self
            .transfer_entities(serializer)
            .map_err(|e| e.within(SCENE_SCOPE))?;
        serializer.pop_object()?;

        debug!(
            direction = ?serializer.direction(),
            entities = count,
            singletons = self.singletons.len(),
            "transferred scene"
        );
        Ok(())
    }

    fn transfer_entities(&mut self, serializer: &mut dyn Serializer) -> Result<usize> {
        if !serializer.push_array(ENTITIES_SCOPE)? {
            return Ok(0);
        }

        let hooks: Vec<(ComponentType, &'static str, TransferHooks)> = self
            .registry
            .infos()
            .iter()
            .filter_map(|info| info.transfer.map(|hooks| (info.ty, info.name, hooks)))
            .collect();

        let mut count = 0;
        if serializer.direction().reads() {
            for entity in self.all_entities() {
                let archetype = self.archetype_of(entity).unwrap_or_default();
                serializer.begin_element()?;
                for (ty, name, hooks) in &hooks {
                    if !archetype.has(ty.bit()) {
                        continue;
                    }
                    serializer.push_object(name)?;
                    (hooks.save)(self, entity, serializer)
                        .map_err(|e| locate(e, name, count, entity))?;
                    serializer.pop_object()?;
                }
                serializer.end_element()?;
                count += 1;
            }
        } else {
            while serializer.begin_element()? {
                let entity = self.create_entity_without_id()?;
                for (_, name, hooks) in &hooks {
                    if !serializer.push_object(name)? {
                        continue;
                    }
                    (hooks.load)(self, entity, serializer)
                        .map_err(|e| locate(e, name, count, entity))?;
                    serializer.pop_object()?;
                }
                serializer.end_element()?;
                count += 1;
            }
        }

        serializer.pop_array()?;
        Ok(count)
    }
}

fn locate(error: Error, component: &str, element: usize, entity: Entity) -> Error {
    error
        .within(component)
        .within(format!("{ENTITIES_SCOPE}[{element}]"))
        .for_entity(entity)
}
