//! Entity lifecycle with generational indices.
//!
//! The `EntityDirectory` allocates handles, tracks each live entity's
//! archetype, and maps external asset ids back to entities.

use std::collections::HashMap;

use scenery_foundation::{Archetype, AssetId, Entity, Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy)]
struct Slot {
    /// Even generations are free, odd generations are alive.
    generation: u32,
    archetype: Archetype,
}

/// Allocates entities and records their archetypes.
///
/// Without recycling, every index is used once and handles increase
/// monotonically. With recycling, destroyed indices go on a free list and
/// come back with a bumped generation.
#[derive(Debug, Clone, Default)]
pub struct EntityDirectory {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live_count: usize,
    external: HashMap<AssetId, Entity>,
    recycle: bool,
    max_entities: Option<usize>,
}

impl EntityDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new(recycle: bool, max_entities: Option<usize>) -> Self {
        Self {
            recycle,
            max_entities,
            ..Self::default()
        }
    }

    /// Allocates a new entity with the empty archetype.
    pub fn spawn(&mut self) -> Result<Entity> {
        if let Some(limit) = self.max_entities {
            if self.live_count >= limit {
                return Err(Error::new(ErrorKind::CapacityExceeded { limit }));
            }
        }

        let entity = if let Some(index) = self.recycle.then(|| self.free_list.pop()).flatten() {
            let slot = &mut self.slots[index as usize];
            // Was even/free, now odd/alive
            slot.generation = slot.generation.wrapping_add(1);
            slot.archetype = Archetype::EMPTY;
            Entity::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|index| *index != u32::MAX)
                .ok_or_else(|| Error::new(ErrorKind::CapacityExceeded { limit: u32::MAX as usize }))?;
            self.slots.push(Slot {
                generation: 1,
                archetype: Archetype::EMPTY,
            });
            Entity::new(index, 1)
        };

        self.live_count += 1;
        Ok(entity)
    }

    /// Frees an entity.
    ///
    /// Returns the archetype it had. External id bindings are left to the
    /// caller, which knows the entity's id.
    pub fn destroy(&mut self, entity: Entity) -> Result<Archetype> {
        self.validate(entity)?;
        let slot = &mut self.slots[entity.index as usize];
        let archetype = slot.archetype;
        // Was odd/alive, now even/free
        slot.generation = slot.generation.wrapping_add(1);
        slot.archetype = Archetype::EMPTY;
        if self.recycle {
            self.free_list.push(entity.index);
        }
        self.live_count -= 1;
        Ok(archetype)
    }

    /// Checks if an entity exists and is not stale.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.validate(entity).is_ok()
    }

    /// Validates that an entity is live.
    pub fn validate(&self, entity: Entity) -> Result<()> {
        let Some(slot) = self.slots.get(entity.index as usize) else {
            return Err(Error::entity_not_found(entity));
        };
        if slot.generation != entity.generation {
            return Err(Error::stale_entity(entity));
        }
        if slot.generation % 2 == 0 {
            return Err(Error::entity_not_found(entity));
        }
        Ok(())
    }

    /// Returns the archetype of a live entity.
    #[must_use]
    pub fn archetype(&self, entity: Entity) -> Option<Archetype> {
        self.validate(entity).ok()?;
        self.slots.get(entity.index as usize).map(|slot| slot.archetype)
    }

    /// Records a new archetype for a live entity.
    pub fn set_archetype(&mut self, entity: Entity, archetype: Archetype) -> Result<()> {
        self.validate(entity)?;
        self.slots[entity.index as usize].archetype = archetype;
        Ok(())
    }

    /// Maps an external id to an entity, replacing any previous mapping.
    pub fn bind(&mut self, id: AssetId, entity: Entity) -> Option<Entity> {
        self.external.insert(id, entity).filter(|previous| *previous != entity)
    }

    /// Removes the mapping for `id` if it points at `entity`.
    pub fn unbind(&mut self, id: AssetId, entity: Entity) {
        if self.external.get(&id) == Some(&entity) {
            self.external.remove(&id);
        }
    }

    /// Looks up the entity bound to an external id.
    #[must_use]
    pub fn resolve(&self, id: AssetId) -> Option<Entity> {
        self.external.get(&id).copied()
    }

    /// Returns the total number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live entities in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.generation % 2 == 1)
            .filter_map(|(index, slot)| Some(Entity::new(u32::try_from(index).ok()?, slot.generation)))
    }
}
