//! Malformed scene data and error locations

use scenery::foundation::{ErrorCategory, ErrorKind};
use scenery::transfer::{Document, Node};

use crate::init_tracing;
use crate::scenes::{empty_scene, sample_scene, save};

fn object(fields: Vec<(&str, Node)>) -> Node {
    Node::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn scene_with_entities(entities: Vec<Node>) -> Document {
    Document::new(object(vec![(
        "Scene",
        object(vec![("Entities", Node::Array(entities))]),
    )]))
}

#[test]
fn missing_scene_scope() {
    init_tracing();
    let doc = Document::new(object(vec![]));
    let mut store = empty_scene(1);
    let err = store.transfer(&mut doc.reader()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingScope(ref scope) if scope == "Scene"));
    assert_eq!(err.category(), ErrorCategory::Data);
}

#[test]
fn missing_entities_array_loads_nothing() {
    let doc = Document::new(object(vec![("Scene", object(vec![]))]));
    let mut store = empty_scene(1);
    store.transfer(&mut doc.reader()).unwrap();
    assert_eq!(store.entity_count(), 0);
}

#[test]
fn type_error_is_located() {
    let doc = scene_with_entities(vec![
        object(vec![("Health", object(vec![("current", Node::Int(5))]))]),
        object(vec![("Health", object(vec![("current", Node::Text("lots".into()))]))]),
    ]);

    let mut store = empty_scene(1);
    let err = store.transfer(&mut doc.reader()).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch { expected: "int", found: "text", .. }
    ));

    let ctx = err.context.unwrap();
    assert_eq!(ctx.path, vec!["Scene", "Entities[1]", "Health"]);
    let entity = ctx.entity.unwrap();
    assert!(store.is_valid(entity));
    assert_eq!(format!("{ctx}"), format!("at Scene/Entities[1]/Health (entity {entity})"));
}

#[test]
fn range_error_is_located() {
    let doc = scene_with_entities(vec![object(vec![(
        "Label",
        object(vec![("layer", Node::UInt(999))]),
    )])]);

    let mut store = empty_scene(1);
    let err = store.transfer(&mut doc.reader()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OutOfRange { ref field, .. } if field == "layer"));
    assert_eq!(err.context.unwrap().path, vec!["Scene", "Entities[0]", "Label"]);
}

#[test]
fn wrong_scope_shape() {
    let doc = Document::new(object(vec![(
        "Scene",
        object(vec![("Entities", object(vec![]))]),
    )]));
    let mut store = empty_scene(1);
    let err = store.transfer(&mut doc.reader()).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch { expected: "array", found: "object", .. }
    ));
    assert_eq!(err.context.unwrap().path, vec!["Scene"]);
}

#[test]
fn duplicate_asset_ids_rebind_to_latest() {
    let (mut original, _) = sample_scene();
    let doc = save(&mut original);

    let mut store = empty_scene(1);
    store.transfer(&mut doc.reader()).unwrap();
    let first = store.get_entity(scenery::foundation::AssetId::new(100)).unwrap();
    store.transfer(&mut doc.reader()).unwrap();
    let second = store.get_entity(scenery::foundation::AssetId::new(100)).unwrap();

    assert_ne!(first, second);
    assert!(store.is_valid(first));
    assert_eq!(store.entity_count(), 6);
}
