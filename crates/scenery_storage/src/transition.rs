//! Frame-scoped log of archetype changes.
//!
//! Reactive systems (physics bodies, render proxies) poll the log for
//! entities that started or stopped matching a component set this frame.

use scenery_foundation::{Archetype, Entity};

/// One archetype change of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeTransition {
    /// The entity that changed.
    pub entity: Entity,
    /// Archetype before the change.
    pub old: Archetype,
    /// Archetype after the change. Empty for destroyed entities.
    pub new: Archetype,
}

impl ArchetypeTransition {
    /// True if the entity started matching `mask` with this change.
    #[must_use]
    pub const fn is_rising_edge(&self, mask: Archetype) -> bool {
        self.new.contains(mask) && !self.old.contains(mask)
    }

    /// True if the entity stopped matching `mask` with this change.
    #[must_use]
    pub const fn is_falling_edge(&self, mask: Archetype) -> bool {
        self.old.contains(mask) && !self.new.contains(mask)
    }
}

/// Append-only record of transitions since the last clear.
#[derive(Debug, Clone, Default)]
pub struct TransitionLog {
    records: Vec<ArchetypeTransition>,
}

impl TransitionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record unless the archetype did not change.
    pub fn record(&mut self, entity: Entity, old: Archetype, new: Archetype) {
        if old != new {
            self.records.push(ArchetypeTransition { entity, old, new });
        }
    }

    /// Records in the order they happened.
    #[must_use]
    pub fn records(&self) -> &[ArchetypeTransition] {
        &self.records
    }

    /// Records where an entity started matching `mask`.
    pub fn rising(&self, mask: Archetype) -> impl Iterator<Item = &ArchetypeTransition> + '_ {
        self.records.iter().filter(move |t| t.is_rising_edge(mask))
    }

    /// Records where an entity stopped matching `mask`.
    pub fn falling(&self, mask: Archetype) -> impl Iterator<Item = &ArchetypeTransition> + '_ {
        self.records.iter().filter(move |t| t.is_falling_edge(mask))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
