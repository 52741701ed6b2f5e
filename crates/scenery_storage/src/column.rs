//! Per-type component columns.
//!
//! A column keeps its values in a slot vector with a side index from entity
//! to slot. Removal vacates a slot without moving anything; the lowest
//! vacant slot is reused by the next insert.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};

use scenery_foundation::{Entity, Error, ErrorKind, Result};

use crate::component::Component;

/// Storage for every value of one component type.
///
/// Values removed since the last [`clear_retired`](Self::clear_retired) are
/// kept aside so that end-of-frame consumers can still read them.
#[derive(Debug, Clone)]
pub struct ComponentColumn<T> {
    slots: Vec<Option<T>>,
    index: HashMap<Entity, usize>,
    vacant: BTreeSet<usize>,
    retired: HashMap<Entity, T>,
}

impl<T: Component> Default for ComponentColumn<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentColumn<T> {
    /// Creates an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            vacant: BTreeSet::new(),
            retired: HashMap::new(),
        }
    }

    /// Stores a value for `entity`.
    ///
    /// Fails if the entity already has a value in this column.
    pub fn insert(&mut self, entity: Entity, value: T) -> Result<()> {
        if self.index.contains_key(&entity) {
            return Err(Error::new(ErrorKind::DuplicateComponent {
                entity,
                component: T::NAME,
            }));
        }
        let slot = if let Some(slot) = self.vacant.pop_first() {
            self.slots[slot] = Some(value);
            slot
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.index.insert(entity, slot);
        Ok(())
    }

    /// Removes and returns the value for `entity`.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        self.vacant.insert(slot);
        self.slots[slot].take()
    }

    /// Removes the value for `entity`, keeping it readable until the next
    /// [`clear_retired`](Self::clear_retired). Returns false if absent.
    pub fn retire(&mut self, entity: Entity) -> bool {
        match self.remove(entity) {
            Some(value) => {
                self.retired.insert(entity, value);
                true
            }
            None => false,
        }
    }

    /// Returns the value for `entity`.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let slot = *self.index.get(&entity)?;
        self.slots[slot].as_ref()
    }

    /// Returns the value for `entity` mutably.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = *self.index.get(&entity)?;
        self.slots[slot].as_mut()
    }

    /// Returns the live value, falling back to a retired one.
    #[must_use]
    pub fn get_or_retired(&self, entity: Entity) -> Option<&T> {
        self.get(entity).or_else(|| self.retired.get(&entity))
    }

    /// Mutable variant of [`get_or_retired`](Self::get_or_retired).
    pub fn get_mut_or_retired(&mut self, entity: Entity) -> Option<&mut T> {
        match self.index.get(&entity) {
            Some(&slot) => self.slots[slot].as_mut(),
            None => self.retired.get_mut(&entity),
        }
    }

    /// Returns the value retired this frame, falling back to the live one.
    ///
    /// A value removed and re-added within one frame resolves to the
    /// removed value.
    #[must_use]
    pub fn get_retired_or_live(&self, entity: Entity) -> Option<&T> {
        self.retired.get(&entity).or_else(|| self.get(entity))
    }

    /// Mutable variant of [`get_retired_or_live`](Self::get_retired_or_live).
    pub fn get_mut_retired_or_live(&mut self, entity: Entity) -> Option<&mut T> {
        if self.retired.contains_key(&entity) {
            return self.retired.get_mut(&entity);
        }
        let slot = *self.index.get(&entity)?;
        self.slots[slot].as_mut()
    }

    /// Returns disjoint mutable borrows for a list of entities.
    ///
    /// The result lines up with `entities`. Entities without a value, and
    /// repeats of an entity already borrowed, yield `None`.
    pub fn get_many_mut(&mut self, entities: &[Entity]) -> Vec<Option<&mut T>> {
        let mut cells: Vec<Option<&mut T>> = self.slots.iter_mut().map(Option::as_mut).collect();
        entities
            .iter()
            .map(|entity| {
                let slot = *self.index.get(entity)?;
                cells.get_mut(slot)?.take()
            })
            .collect()
    }

    /// Returns true if `entity` has a live value.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the column holds no live values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of allocated slots, occupied or vacant.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of vacant slots awaiting reuse.
    #[must_use]
    pub fn vacant_count(&self) -> usize {
        self.vacant.len()
    }

    /// Number of retired values.
    #[must_use]
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Iterates over live values in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.index
            .iter()
            .filter_map(|(entity, &slot)| self.slots[slot].as_ref().map(|value| (*entity, value)))
    }
}

/// Type-erased view of a [`ComponentColumn`].
///
/// Operations that touch every component of an entity (destroy, duplicate,
/// end of frame) go through this trait.
pub trait ErasedColumn: Send + Sync {
    /// Returns true if `entity` has a live value.
    fn contains(&self, entity: Entity) -> bool;

    /// Retires the value for `entity`. Returns false if absent.
    fn retire(&mut self, entity: Entity) -> bool;

    /// Copies the value of `from` onto `to`. Returns false if `from` has none.
    fn duplicate(&mut self, from: Entity, to: Entity) -> Result<bool>;

    /// Drops every retired value.
    fn clear_retired(&mut self);

    /// Number of live values.
    fn len(&self) -> usize;

    /// Returns true if the column holds no live values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcasts for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts for typed mutable access.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcasts an owned column.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Component> ErasedColumn for ComponentColumn<T> {
    fn contains(&self, entity: Entity) -> bool {
        ComponentColumn::contains(self, entity)
    }

    fn retire(&mut self, entity: Entity) -> bool {
        ComponentColumn::retire(self, entity)
    }

    fn duplicate(&mut self, from: Entity, to: Entity) -> Result<bool> {
        let Some(value) = self.get(from).cloned() else {
            return Ok(false);
        };
        self.insert(to, value)?;
        Ok(true)
    }

    fn clear_retired(&mut self) {
        self.retired.clear();
    }

    fn len(&self) -> usize {
        ComponentColumn::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
