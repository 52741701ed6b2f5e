//! Integration tests for entity lifecycle

use scenery_storage::{AssetId, EntityId, ErrorKind, StoreConfig};

use crate::fixtures::{Position, Selected, Velocity, store, store_with};

// =============================================================================
// Creation and Destruction
// =============================================================================

#[test]
fn create_and_destroy() {
    let mut store = store();
    let e = store.create_entity().unwrap();
    assert!(store.is_valid(e));
    assert_eq!(store.entity_count(), 1);

    store.destroy_entity(e).unwrap();
    assert!(!store.is_valid(e));
    assert_eq!(store.entity_count(), 0);
    assert!(store.get_component::<EntityId>(e).is_none());
}

#[test]
fn destroy_twice_fails() {
    let mut store = store();
    let e = store.create_entity().unwrap();
    store.destroy_entity(e).unwrap();
    let err = store.destroy_entity(e).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::StaleEntity(_) | ErrorKind::EntityNotFound(_)));
}

#[test]
fn indices_are_not_reused_by_default() {
    let mut store = store();
    let a = store.create_entity_without_id().unwrap();
    store.destroy_entity(a).unwrap();
    let b = store.create_entity_without_id().unwrap();
    assert_ne!(a.index, b.index);
}

#[test]
fn recycled_indices_bump_generation() {
    let mut store = store_with(StoreConfig::default().with_recycle_entities(true));
    let a = store.create_entity_without_id().unwrap();
    store.destroy_entity(a).unwrap();
    let b = store.create_entity_without_id().unwrap();

    assert_eq!(a.index, b.index);
    assert_ne!(a.generation, b.generation);
    assert!(store.is_valid(b));
    assert!(!store.is_valid(a));
}

#[test]
fn all_entities_ascending() {
    let mut store = store();
    let ids: Vec<_> = (0..5).map(|_| store.create_entity_without_id().unwrap()).collect();
    store.destroy_entity(ids[2]).unwrap();
    assert_eq!(store.all_entities(), vec![ids[0], ids[1], ids[3], ids[4]]);
}

#[test]
fn max_entities_is_enforced() {
    let mut store = store_with(StoreConfig::default().with_max_entities(2));
    let a = store.create_entity_without_id().unwrap();
    store.create_entity_without_id().unwrap();

    let err = store.create_entity_without_id().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CapacityExceeded { limit: 2 }));

    store.destroy_entity(a).unwrap();
    assert!(store.create_entity_without_id().is_ok());
}

// =============================================================================
// External Ids
// =============================================================================

#[test]
fn entity_lookup_by_asset_id() {
    let mut store = store();
    let e = store.create_entity_with_id(AssetId::new(1234)).unwrap();
    assert_eq!(store.get_entity(AssetId::new(1234)), Some(e));
    assert_eq!(store.asset_id(e), Some(AssetId::new(1234)));
    assert_eq!(store.get_component::<EntityId>(e).map(|id| id.id), Some(AssetId::new(1234)));
}

#[test]
fn destroy_unbinds_asset_id() {
    let mut store = store();
    let e = store.create_entity_with_id(AssetId::new(5)).unwrap();
    store.destroy_entity(e).unwrap();
    assert_eq!(store.get_entity(AssetId::new(5)), None);
}

#[test]
fn generated_ids_are_distinct() {
    let mut store = store();
    let a = store.create_entity().unwrap();
    let b = store.create_entity().unwrap();
    assert_ne!(store.asset_id(a), store.asset_id(b));
}

#[test]
fn entities_without_id_have_empty_archetype() {
    let mut store = store();
    let e = store.create_entity_without_id().unwrap();
    assert_eq!(store.component_count(e), 0);
    assert_eq!(store.asset_id(e), None);
}

// =============================================================================
// Deferred Destruction
// =============================================================================

#[test]
fn deferred_destroy_waits_for_flush() {
    let mut store = store();
    let a = store.create_entity().unwrap();
    let b = store.create_entity().unwrap();
    store.add_component(a, Position::default()).unwrap();

    store.destroy_entity_deferred(a).unwrap();
    store.destroy_entity_deferred(b).unwrap();
    assert!(store.is_valid(a));
    assert!(store.is_pending_destroy(a));
    assert_eq!(store.get_entities::<Position>(false).unwrap(), vec![a]);

    assert_eq!(store.destroy_deferred_entities(), 2);
    assert!(!store.is_valid(a));
    assert!(!store.is_valid(b));
    assert!(!store.is_pending_destroy(a));
    assert_eq!(store.destroy_deferred_entities(), 0);
}

#[test]
fn deferred_entity_destroyed_early_is_skipped() {
    let mut store = store();
    let a = store.create_entity().unwrap();
    let b = store.create_entity().unwrap();
    store.destroy_entity_deferred(a).unwrap();
    store.destroy_entity_deferred(b).unwrap();
    store.destroy_entity(a).unwrap();

    assert_eq!(store.destroy_deferred_entities(), 1);
    assert!(!store.is_valid(b));
    assert!(!store.is_pending_destroy(a));
    assert_eq!(store.destroy_deferred_entities(), 0);
}

#[test]
fn deferring_dead_entity_fails() {
    let mut store = store();
    let a = store.create_entity().unwrap();
    store.destroy_entity(a).unwrap();
    assert!(store.destroy_entity_deferred(a).is_err());
}

// =============================================================================
// Duplication
// =============================================================================

#[test]
fn duplicate_copies_data_components() {
    let mut store = store();
    let e = store.create_entity().unwrap();
    store.add_component(e, Position { x: 1.0, y: 2.0 }).unwrap();
    store.add_component(e, Velocity { x: 3.0, y: 4.0 }).unwrap();
    store.add_component(e, Selected).unwrap();

    let copy = store.duplicate_entity(e).unwrap();
    assert_ne!(copy, e);
    assert_eq!(store.get_component::<Position>(copy), Some(&Position { x: 1.0, y: 2.0 }));
    assert_eq!(store.get_component::<Velocity>(copy), Some(&Velocity { x: 3.0, y: 4.0 }));
    assert!(!store.has_component::<Selected>(copy));
    assert_eq!(store.component_count(copy), 3);
}

#[test]
fn duplicate_is_independent() {
    let mut store = store();
    let e = store.create_entity().unwrap();
    store.add_component(e, Position { x: 1.0, y: 1.0 }).unwrap();
    let copy = store.duplicate_entity(e).unwrap();

    store.get_component_mut::<Position>(copy).unwrap().x = 9.0;
    assert_eq!(store.get_component::<Position>(e).unwrap().x, 1.0);
}

#[test]
fn duplicate_gets_fresh_identity() {
    let mut store = store();
    let e = store.create_entity().unwrap();
    let copy = store.duplicate_entity(e).unwrap();
    let id = store.asset_id(copy).unwrap();
    assert_ne!(Some(id), store.asset_id(e));
    assert_eq!(store.get_entity(id), Some(copy));
}
