//! Archetype index: which entities hold exactly which component set.

use std::collections::{BTreeMap, BTreeSet};

use scenery_foundation::{Archetype, Entity};

/// Buckets of entities keyed by their exact archetype.
///
/// Buckets are created on first insert and dropped when they empty out.
/// Both buckets and entities within a bucket iterate in ascending order.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeIndex {
    buckets: BTreeMap<Archetype, BTreeSet<Entity>>,
}

impl ArchetypeIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity` to the bucket for `archetype`.
    pub fn insert(&mut self, archetype: Archetype, entity: Entity) {
        self.buckets.entry(archetype).or_default().insert(entity);
    }

    /// Removes `entity` from the bucket for `archetype`.
    ///
    /// Returns false if it was not there.
    pub fn remove(&mut self, archetype: Archetype, entity: Entity) -> bool {
        let Some(bucket) = self.buckets.get_mut(&archetype) else {
            return false;
        };
        let removed = bucket.remove(&entity);
        if bucket.is_empty() {
            self.buckets.remove(&archetype);
        }
        removed
    }

    /// Moves `entity` between buckets.
    pub fn relocate(&mut self, entity: Entity, from: Archetype, to: Archetype) {
        if from == to {
            return;
        }
        let removed = self.remove(from, entity);
        debug_assert!(removed, "{entity:?} missing from its archetype bucket");
        self.insert(to, entity);
    }

    /// Returns the bucket for an exact archetype.
    #[must_use]
    pub fn bucket(&self, archetype: Archetype) -> Option<&BTreeSet<Entity>> {
        self.buckets.get(&archetype)
    }

    /// Iterates over buckets whose archetype is a superset of `mask`.
    pub fn matching(&self, mask: Archetype) -> impl Iterator<Item = (Archetype, &BTreeSet<Entity>)> + '_ {
        self.buckets
            .iter()
            .filter(move |(archetype, _)| archetype.contains(mask))
            .map(|(archetype, bucket)| (*archetype, bucket))
    }

    /// Iterates over entities in buckets matching `mask`.
    pub fn entities(&self, mask: Archetype) -> impl Iterator<Item = Entity> + '_ {
        self.matching(mask).flat_map(|(_, bucket)| bucket.iter().copied())
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
