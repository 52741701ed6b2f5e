//! Integration tests for Entity, Archetype, and AssetId

use std::collections::HashSet;

use proptest::prelude::*;
use scenery_foundation::{Archetype, AssetId, AssetIdGenerator, Entity, MAX_COMPONENT_TYPES};

// =============================================================================
// Entity
// =============================================================================

#[test]
fn entity_equality_includes_generation() {
    assert_eq!(Entity::new(1, 1), Entity::new(1, 1));
    assert_ne!(Entity::new(1, 1), Entity::new(1, 3));
    assert_ne!(Entity::new(1, 1), Entity::new(2, 1));
}

#[test]
fn entity_null() {
    assert!(Entity::null().is_null());
    assert!(!Entity::new(0, 1).is_null());
}

#[test]
fn entity_display_and_debug() {
    let e = Entity::new(42, 3);
    assert_eq!(format!("{e}"), "#42");
    assert_eq!(format!("{e:?}"), "Entity(42v3)");
}

#[test]
fn entity_hashes_by_value() {
    let set: HashSet<Entity> = [Entity::new(1, 1), Entity::new(1, 1), Entity::new(2, 1)]
        .into_iter()
        .collect();
    assert_eq!(set.len(), 2);
}

// =============================================================================
// Archetype
// =============================================================================

#[test]
fn archetype_superset_matching() {
    let query = Archetype::EMPTY.with(1).with(2);
    let exact = query;
    let superset = query.with(5);
    let partial = Archetype::EMPTY.with(1);

    assert!(exact.contains(query));
    assert!(superset.contains(query));
    assert!(!partial.contains(query));
    assert!(superset.contains(Archetype::EMPTY));
}

#[test]
fn archetype_single_out_of_range_is_empty() {
    assert_eq!(Archetype::single(63).bits(), 1 << 63);
    let bit = u32::try_from(MAX_COMPONENT_TYPES).unwrap();
    assert!(Archetype::single(bit).is_empty());
}

#[test]
fn archetype_iter_ascending() {
    let a = Archetype::from_bits(0b1010_0101);
    assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 2, 5, 7]);
    assert_eq!(a.count(), 4);
}

#[test]
fn archetype_union_and_intersects() {
    let a = Archetype::EMPTY.with(0);
    let b = Archetype::EMPTY.with(3);
    assert!(!a.intersects(b));
    let u = a.union(b);
    assert!(u.intersects(a));
    assert!(u.contains(b));
    assert_eq!(u.without(0), b);
}

// =============================================================================
// AssetId
// =============================================================================

#[test]
fn asset_id_zero_is_invalid() {
    assert!(!AssetId::INVALID.is_valid());
    assert!(AssetId::from(1).is_valid());
    assert_eq!(AssetId::new(0xff).to_string(), "00000000000000ff");
}

#[test]
fn seeded_generators_repeat() {
    let mut a = AssetIdGenerator::seeded(99);
    let mut b = AssetIdGenerator::seeded(99);
    for _ in 0..100 {
        assert_eq!(a.next_id(), b.next_id());
    }
}

#[test]
fn generated_ids_are_valid_and_distinct() {
    let mut generator = AssetIdGenerator::new(None);
    let ids: HashSet<AssetId> = (0..1_000).map(|_| generator.next_id()).collect();
    assert_eq!(ids.len(), 1_000);
    assert!(ids.iter().all(|id| id.is_valid()));
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn with_then_has(bits in any::<u64>(), bit in 0u32..64) {
        let a = Archetype::from_bits(bits).with(bit);
        prop_assert!(a.has(bit));
        prop_assert!(!a.without(bit).has(bit));
    }

    #[test]
    fn union_contains_both(a in any::<u64>(), b in any::<u64>()) {
        let (a, b) = (Archetype::from_bits(a), Archetype::from_bits(b));
        let u = a.union(b);
        prop_assert!(u.contains(a));
        prop_assert!(u.contains(b));
    }

    #[test]
    fn iter_matches_count(bits in any::<u64>()) {
        let a = Archetype::from_bits(bits);
        prop_assert_eq!(a.iter().count(), a.count() as usize);
        prop_assert_eq!(a.iter().fold(Archetype::EMPTY, Archetype::with), a);
    }
}
